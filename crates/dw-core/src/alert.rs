//! Alert planning for the fired threshold alarm.

use crate::domain::domain_matches;
use crate::options::Options;
use crate::session::{ActiveSession, TabId};

/// Fixed identifier for the local desktop notification.
pub const NOTIFICATION_ID: &str = "dw-threshold-alert";

/// Fixed title for the local desktop notification.
pub const NOTIFICATION_TITLE: &str = "Continuous browsing warning";

/// Local desktop notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAlert {
    pub title: String,
    pub message: String,
}

/// Webhook delivery content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookAlert {
    pub url: String,
    pub content: String,
}

/// The independent deliveries owed for one fired alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPlan {
    pub local: Option<LocalAlert>,
    pub webhook: Option<WebhookAlert>,
    /// Tab to send the `TIME_EXCEEDED` overlay message to.
    pub overlay_tab: Option<TabId>,
}

/// Plans deliveries for a fired alarm against *live* state.
///
/// Options and session must be re-read at fire time, never taken from the
/// moment the alarm was scheduled. Returns `None` when the alarm is stale:
/// tracking has been disabled, the session has ended, or the tab has moved off
/// the watched domain. A stale alarm is dropped silently. Each channel is
/// gated by its own flag; the webhook additionally requires a non-empty URL.
#[must_use]
pub fn plan_alert(session: Option<&ActiveSession>, options: &Options) -> Option<AlertPlan> {
    if !options.tracking_enabled {
        return None;
    }
    let session = session?;
    if !domain_matches(&session.domain, &options.domain) {
        tracing::debug!(domain = %session.domain, "alarm is stale, suppressing alert");
        return None;
    }

    let local = options.enable_local_notif.then(|| LocalAlert {
        title: NOTIFICATION_TITLE.to_string(),
        message: format!(
            "You have been on {} for over {} minutes. Time for a break?",
            options.domain, options.threshold_minutes
        ),
    });

    let webhook = (options.enable_discord && !options.discord_webhook_url.is_empty()).then(|| {
        WebhookAlert {
            url: options.discord_webhook_url.clone(),
            content: format!(
                "Warning: {} has been open continuously for more than {} minutes!",
                options.domain, options.threshold_minutes
            ),
        }
    });

    let overlay_tab = options.enable_overlay.then_some(session.tab_id);

    Some(AlertPlan {
        local,
        webhook,
        overlay_tab,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session_on(domain: &str) -> ActiveSession {
        ActiveSession {
            tab_id: 7,
            domain: domain.to_string(),
            started_at: Utc::now(),
        }
    }

    fn watching(domain: &str) -> Options {
        Options {
            domain: domain.to_string(),
            ..Options::default()
        }
    }

    #[test]
    fn default_flags_fire_local_and_overlay_but_not_webhook() {
        let session = session_on("example.com");
        let plan = plan_alert(Some(&session), &watching("example.com")).unwrap();

        let local = plan.local.unwrap();
        assert_eq!(local.title, NOTIFICATION_TITLE);
        assert!(local.message.contains("example.com"));
        assert!(local.message.contains("15"));
        assert_eq!(plan.overlay_tab, Some(7));
        assert!(plan.webhook.is_none());
    }

    #[test]
    fn webhook_requires_flag_and_url() {
        let session = session_on("example.com");

        // Flag on, URL empty: no network call may be attempted.
        let options = Options {
            enable_discord: true,
            ..watching("example.com")
        };
        let plan = plan_alert(Some(&session), &options).unwrap();
        assert!(plan.webhook.is_none());

        let options = Options {
            enable_discord: true,
            discord_webhook_url: "https://discord.test/hook".to_string(),
            ..watching("example.com")
        };
        let plan = plan_alert(Some(&session), &options).unwrap();
        let webhook = plan.webhook.unwrap();
        assert_eq!(webhook.url, "https://discord.test/hook");
        assert!(webhook.content.contains("example.com"));
    }

    #[test]
    fn channels_are_independently_gated() {
        let session = session_on("example.com");
        let options = Options {
            enable_local_notif: false,
            enable_overlay: false,
            enable_discord: true,
            discord_webhook_url: "https://discord.test/hook".to_string(),
            ..watching("example.com")
        };
        let plan = plan_alert(Some(&session), &options).unwrap();

        assert!(plan.local.is_none());
        assert!(plan.overlay_tab.is_none());
        assert!(plan.webhook.is_some());
    }

    #[test]
    fn stale_alarm_is_suppressed() {
        // Session moved to another domain after scheduling.
        let session = session_on("other.com");
        assert!(plan_alert(Some(&session), &watching("example.com")).is_none());

        // Session ended entirely.
        assert!(plan_alert(None, &watching("example.com")).is_none());
    }

    #[test]
    fn disabled_tracking_suppresses_everything() {
        let session = session_on("example.com");
        let options = Options {
            tracking_enabled: false,
            ..watching("example.com")
        };
        assert!(plan_alert(Some(&session), &options).is_none());
    }

    #[test]
    fn fractional_threshold_renders_in_messages() {
        let session = session_on("example.com");
        let options = Options {
            threshold_minutes: 1.5,
            ..watching("example.com")
        };
        let plan = plan_alert(Some(&session), &options).unwrap();
        assert!(plan.local.unwrap().message.contains("1.5"));
    }
}
