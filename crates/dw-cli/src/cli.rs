//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Domain time watchdog.
///
/// Tracks continuous time on a watched web domain from host lifecycle events
/// and warns past a threshold via local notification, in-page overlay, and
/// webhook.
#[derive(Debug, Parser)]
#[command(name = "dw", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the tracking daemon: host events in on stdin, overlay and status
    /// messages out on stdout, one JSON object per line.
    Run,

    /// Show tracked options and accumulated domain time.
    Status,

    /// Inspect or change tracked options.
    Options {
        #[command(subcommand)]
        action: OptionsAction,
    },
}

/// Actions on tracked options.
#[derive(Debug, Subcommand)]
pub enum OptionsAction {
    /// Print current options (merged over defaults) as JSON.
    Show,

    /// Update options; unspecified fields keep their stored values.
    Set {
        /// Domain to watch, matched by substring.
        #[arg(long)]
        domain: Option<String>,

        /// Minutes before the warning fires; may be fractional. Unparsable
        /// values fall back to 15.
        #[arg(long)]
        threshold_minutes: Option<String>,

        /// Discord webhook URL; an empty string disables delivery.
        #[arg(long)]
        discord_webhook_url: Option<String>,

        /// Send a webhook message when the threshold is exceeded.
        #[arg(long)]
        enable_discord: Option<bool>,

        /// Show a desktop notification when the threshold is exceeded.
        #[arg(long)]
        enable_local_notif: Option<bool>,

        /// Tell the tracked tab to show its overlay when the threshold is
        /// exceeded.
        #[arg(long)]
        enable_overlay: Option<bool>,

        /// Master switch for session tracking.
        #[arg(long)]
        tracking_enabled: Option<bool>,
    },
}
