//! Alarm reconciliation: decides whether the threshold alarm should exist.

use std::time::Duration;

use crate::domain::domain_matches;
use crate::options::{Options, sanitize_threshold};
use crate::session::ActiveSession;

/// Name of the single alarm slot.
pub const ALARM_NAME: &str = "dw-threshold";

/// What the alarm slot must do after a session or options change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmDecision {
    /// No alarm may remain pending.
    Clear,
    /// Replace any pending alarm with one firing after `delay`.
    Arm { delay: Duration },
}

/// Reconciles the alarm slot against the live session and options.
///
/// The alarm exists iff tracking is enabled and the active session's domain
/// matches the watched domain. Arming overwrites whatever was pending: the
/// alarm is re-armed on every session start, never decremented, so calling
/// this twice with unchanged inputs still leaves exactly one pending alarm.
#[must_use]
pub fn reconcile(session: Option<&ActiveSession>, options: &Options) -> AlarmDecision {
    if !options.tracking_enabled {
        return AlarmDecision::Clear;
    }
    let Some(session) = session else {
        return AlarmDecision::Clear;
    };
    if !domain_matches(&session.domain, &options.domain) {
        tracing::debug!(
            domain = %session.domain,
            watched = %options.domain,
            "domain not matched, clearing alarm"
        );
        return AlarmDecision::Clear;
    }

    let minutes = sanitize_threshold(options.threshold_minutes);
    AlarmDecision::Arm {
        delay: Duration::from_secs_f64(minutes * 60.0),
    }
}
