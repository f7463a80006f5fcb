//! Read-only status reporting for the options surface.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::options::Options;
use crate::session::ActiveSession;

/// Snapshot answered to a `GET_STATUS` query.
///
/// Timestamps are epoch milliseconds; the caller turns `next_alarm` into a
/// countdown by subtracting its own clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub tracking_enabled: bool,
    pub current_domain: Option<String>,
    pub session_start_time: Option<i64>,
    pub next_alarm: Option<i64>,
}

impl StatusReport {
    /// Builds a report from fresh options, the live session, and the pending
    /// alarm's absolute fire time.
    #[must_use]
    pub fn new(
        options: &Options,
        session: Option<&ActiveSession>,
        next_alarm: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            tracking_enabled: options.tracking_enabled,
            current_domain: session.map(|s| s.domain.clone()),
            session_start_time: session.map(|s| s.started_at.timestamp_millis()),
            next_alarm: next_alarm.map(|at| at.timestamp_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn report_without_a_session_is_all_nulls() {
        let report = StatusReport::new(&Options::default(), None, None);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["trackingEnabled"], true);
        assert_eq!(json["currentDomain"], serde_json::Value::Null);
        assert_eq!(json["sessionStartTime"], serde_json::Value::Null);
        assert_eq!(json["nextAlarm"], serde_json::Value::Null);
    }

    #[test]
    fn report_carries_epoch_millis() {
        let started = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let fire_at = Utc.timestamp_opt(1_700_000_900, 0).unwrap();
        let session = ActiveSession {
            tab_id: 4,
            domain: "example.com".to_string(),
            started_at: started,
        };

        let report = StatusReport::new(&Options::default(), Some(&session), Some(fire_at));

        assert_eq!(report.current_domain.as_deref(), Some("example.com"));
        assert_eq!(report.session_start_time, Some(1_700_000_000_000));
        assert_eq!(report.next_alarm, Some(1_700_000_900_000));
    }
}
