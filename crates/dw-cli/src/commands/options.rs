//! Options surface: inspect and change tracked options.
//!
//! `set` persists a patch and then, when the saved configuration has Discord
//! delivery enabled, mirrors a human-readable summary of it to the webhook.
//! Delivery is best-effort and never fails the command.

use std::io::Write;

use anyhow::{Context, Result};

use dw_core::alert::WebhookAlert;
use dw_core::{Options, OptionsPatch};
use dw_notify::WebhookClient;
use dw_store::Store;

/// Prints the current options (merged over defaults) as JSON.
pub fn show<W: Write>(writer: &mut W, store: &Store) -> Result<()> {
    let options = store.get_options()?;
    writeln!(writer, "{}", serde_json::to_string_pretty(&options)?)?;
    Ok(())
}

/// Persists `patch` and announces the new configuration on the webhook.
pub async fn set<W: Write>(writer: &mut W, store: &mut Store, patch: &OptionsPatch) -> Result<()> {
    let mut options = store.get_options()?;
    patch.apply(&mut options);
    store.set_options(patch).context("failed to save options")?;
    writeln!(writer, "Options saved.")?;

    if options.enable_discord && !options.discord_webhook_url.is_empty() {
        let client = WebhookClient::new().context("failed to build webhook client")?;
        let alert = WebhookAlert {
            url: options.discord_webhook_url.clone(),
            content: summarize(&options),
        };
        if let Err(error) = client.post(&alert).await {
            tracing::warn!(%error, "configuration summary webhook failed");
        }
    }
    Ok(())
}

/// Human-readable summary of the saved configuration.
fn summarize(options: &Options) -> String {
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    [
        "Domain warden configuration updated".to_string(),
        format!("Watched domain: {}", options.domain),
        format!("Warn after: {} minutes", options.threshold_minutes),
        format!(
            "Local notification: {}",
            on_off(options.enable_local_notif)
        ),
        format!("Overlay: {}", on_off(options.enable_overlay)),
        format!("Discord: {}", on_off(options.enable_discord)),
        format!("Tracking: {}", on_off(options.tracking_enabled)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[tokio::test]
    async fn set_persists_the_patch() {
        let mut store = Store::open_in_memory().unwrap();
        let patch = OptionsPatch {
            domain: Some("example.com".to_string()),
            tracking_enabled: Some(false),
            ..OptionsPatch::default()
        };

        let mut output = Vec::new();
        set(&mut output, &mut store, &patch).await.unwrap();

        let options = store.get_options().unwrap();
        assert_eq!(options.domain, "example.com");
        assert!(!options.tracking_enabled);
        assert_eq!(String::from_utf8(output).unwrap(), "Options saved.\n");
    }

    #[tokio::test]
    async fn set_without_webhook_url_makes_no_network_call() {
        // enable_discord on but URL empty: must complete without attempting
        // delivery (nothing listens anywhere in this test).
        let mut store = Store::open_in_memory().unwrap();
        let patch = OptionsPatch {
            enable_discord: Some(true),
            ..OptionsPatch::default()
        };

        let mut output = Vec::new();
        set(&mut output, &mut store, &patch).await.unwrap();
        assert!(store.get_options().unwrap().enable_discord);
    }

    #[test]
    fn show_prints_merged_options() {
        let store = Store::open_in_memory().unwrap();

        let mut output = Vec::new();
        show(&mut output, &store).unwrap();

        let options: Options =
            serde_json::from_str(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn summary_names_every_setting() {
        let options = Options {
            domain: "example.com".to_string(),
            threshold_minutes: 30.0,
            enable_discord: true,
            ..Options::default()
        };

        assert_snapshot!(summarize(&options), @r"
        Domain warden configuration updated
        Watched domain: example.com
        Warn after: 30 minutes
        Local notification: on
        Overlay: on
        Discord: on
        Tracking: on
        ");
    }
}
