//! Delivery transports for threshold alerts.
//!
//! Two channels live here: the Discord-style webhook POST and the local
//! desktop notification (a `notify-send` / `osascript` subprocess). Both are
//! best-effort: callers log failures and never retry, and a failure in one
//! channel must never suppress another. The overlay channel is not a
//! transport; it is a line on the daemon's stdout and stays in `dw-cli`.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;

use dw_core::alert::{LocalAlert, WebhookAlert};

/// Request timeout applied to webhook deliveries.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The webhook request failed (network or HTTP status).
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The notifier subprocess could not be launched.
    #[error("failed to launch notifier command: {0}")]
    Command(#[from] std::io::Error),
    /// The notifier subprocess reported failure.
    #[error("notifier command exited with {status}")]
    CommandStatus { status: std::process::ExitStatus },
}

/// Webhook body: `{"content": "..."}`.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Discord-style webhook client.
///
/// Safe to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
}

impl fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookClient").finish_non_exhaustive()
    }
}

impl WebhookClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(NotifyError::ClientBuild)?;
        Ok(Self { http })
    }

    /// Posts the alert content as JSON.
    ///
    /// Non-2xx statuses are errors too; the caller logs and drops them.
    pub async fn post(&self, alert: &WebhookAlert) -> Result<(), NotifyError> {
        self.http
            .post(&alert.url)
            .json(&WebhookPayload {
                content: &alert.content,
            })
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!(url = %alert.url, "webhook delivered");
        Ok(())
    }
}

/// Shows a desktop notification, fire-and-forget.
///
/// Uses `notify-send` where available and `osascript` on macOS. A missing
/// notifier binary surfaces as an error for the caller to log; nothing is
/// retried.
pub async fn send_local(alert: &LocalAlert) -> Result<(), NotifyError> {
    let output = notifier_command(alert).output().await?;
    if !output.status.success() {
        return Err(NotifyError::CommandStatus {
            status: output.status,
        });
    }
    tracing::debug!(title = %alert.title, "local notification shown");
    Ok(())
}

#[cfg(target_os = "macos")]
fn notifier_command(alert: &LocalAlert) -> Command {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        escape_osascript(&alert.message),
        escape_osascript(&alert.title),
    );
    let mut command = Command::new("osascript");
    command.args(["-e", &script]);
    command
}

#[cfg(not(target_os = "macos"))]
fn notifier_command(alert: &LocalAlert) -> Command {
    let mut command = Command::new("notify-send");
    command.args([
        "--app-name",
        dw_core::alert::NOTIFICATION_ID,
        &alert.title,
        &alert.message,
    ]);
    command
}

#[cfg(target_os = "macos")]
fn escape_osascript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
