//! Tracked configuration and its defaults.

use serde::{Deserialize, Serialize};

/// Threshold applied when the configured value is unparsable or non-positive.
pub const DEFAULT_THRESHOLD_MINUTES: f64 = 15.0;

/// Tracked configuration.
///
/// Read back from the store at every decision point rather than cached, so a
/// concurrent settings save is visible to the next event immediately. Serde
/// names mirror the persisted storage keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// The watched domain, matched by substring containment.
    pub domain: String,
    /// Minutes of continuous time before the alarm fires. May be fractional.
    pub threshold_minutes: f64,
    /// Webhook endpoint for the Discord channel; empty disables delivery.
    pub discord_webhook_url: String,
    pub enable_discord: bool,
    pub enable_local_notif: bool,
    pub enable_overlay: bool,
    pub tracking_enabled: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            domain: "twitter.com".to_string(),
            threshold_minutes: DEFAULT_THRESHOLD_MINUTES,
            discord_webhook_url: String::new(),
            enable_discord: false,
            enable_local_notif: true,
            enable_overlay: true,
            tracking_enabled: true,
        }
    }
}

/// Clamps a threshold to the documented fallback when it is unusable.
///
/// The threshold must be a positive number of minutes; anything else (NaN,
/// infinities, zero, negatives) becomes [`DEFAULT_THRESHOLD_MINUTES`].
#[must_use]
pub fn sanitize_threshold(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        DEFAULT_THRESHOLD_MINUTES
    }
}

/// Parses a threshold from form input, falling back on failure.
#[must_use]
pub fn parse_threshold(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .map_or(DEFAULT_THRESHOLD_MINUTES, sanitize_threshold)
}

/// A partial update to [`Options`]; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsPatch {
    pub domain: Option<String>,
    pub threshold_minutes: Option<f64>,
    pub discord_webhook_url: Option<String>,
    pub enable_discord: Option<bool>,
    pub enable_local_notif: Option<bool>,
    pub enable_overlay: Option<bool>,
    pub tracking_enabled: Option<bool>,
}

impl OptionsPatch {
    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.threshold_minutes.is_none()
            && self.discord_webhook_url.is_none()
            && self.enable_discord.is_none()
            && self.enable_local_notif.is_none()
            && self.enable_overlay.is_none()
            && self.tracking_enabled.is_none()
    }

    /// Applies the set fields on top of `options`.
    pub fn apply(&self, options: &mut Options) {
        if let Some(domain) = &self.domain {
            options.domain.clone_from(domain);
        }
        if let Some(threshold) = self.threshold_minutes {
            options.threshold_minutes = sanitize_threshold(threshold);
        }
        if let Some(url) = &self.discord_webhook_url {
            options.discord_webhook_url.clone_from(url);
        }
        if let Some(enabled) = self.enable_discord {
            options.enable_discord = enabled;
        }
        if let Some(enabled) = self.enable_local_notif {
            options.enable_local_notif = enabled;
        }
        if let Some(enabled) = self.enable_overlay {
            options.enable_overlay = enabled;
        }
        if let Some(enabled) = self.tracking_enabled {
            options.tracking_enabled = enabled;
        }
    }
}
