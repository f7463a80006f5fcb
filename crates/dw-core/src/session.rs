//! The single active session and the per-domain time ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Host tab identifier.
pub type TabId = i64;

/// Accumulated whole minutes per domain.
pub type DomainLedger = BTreeMap<String, u64>;

/// The one session being timed right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    /// The owning tab; exactly one tab is tracked at a time.
    pub tab_id: TabId,
    pub domain: String,
    pub started_at: DateTime<Utc>,
}

/// Minutes credited to a domain by a session end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredit {
    pub domain: String,
    pub minutes: u64,
}

/// Owns the active session and the ledger it feeds.
///
/// At most one session exists at any time; starting a new one always ends the
/// previous one first. The ledger is mutated only by [`end_session`], and every
/// returned credit (including a zero-minute one) means the caller owes a
/// write-through flush to the store.
///
/// [`end_session`]: SessionTracker::end_session
#[derive(Debug, Default)]
pub struct SessionTracker {
    active: Option<ActiveSession>,
    ledger: DomainLedger,
}

impl SessionTracker {
    /// Creates a tracker over a ledger loaded from the store.
    #[must_use]
    pub const fn new(ledger: DomainLedger) -> Self {
        Self {
            active: None,
            ledger,
        }
    }

    #[must_use]
    pub const fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    #[must_use]
    pub const fn ledger(&self) -> &DomainLedger {
        &self.ledger
    }

    /// Starts a session for `tab_id` on `domain`, ending any previous session
    /// first. Returns the credit from that implicit end, if there was one.
    pub fn start_session(
        &mut self,
        tab_id: TabId,
        domain: String,
        now: DateTime<Utc>,
    ) -> Option<SessionCredit> {
        let credit = self.end_session(now);
        tracing::debug!(%domain, tab_id, "session started");
        self.active = Some(ActiveSession {
            tab_id,
            domain,
            started_at: now,
        });
        credit
    }

    /// Ends the active session, crediting whole elapsed minutes to its domain.
    ///
    /// No-op when no session is active. Sub-minute sessions credit zero
    /// (truncation, not rounding). Does not touch the alarm; that is the
    /// caller's responsibility.
    pub fn end_session(&mut self, now: DateTime<Utc>) -> Option<SessionCredit> {
        let session = self.active.take()?;
        let elapsed = now.signed_duration_since(session.started_at);
        let minutes = u64::try_from(elapsed.num_minutes().max(0)).unwrap_or_default();

        let total = self.ledger.entry(session.domain.clone()).or_insert(0);
        *total = total.saturating_add(minutes);
        tracing::debug!(domain = %session.domain, minutes, total = *total, "session ended");

        Some(SessionCredit {
            domain: session.domain,
            minutes,
        })
    }

    /// Discards the in-flight session without crediting it.
    ///
    /// Used for instantaneous invalidation (tracking toggled off); the open
    /// interval since the last `end_session` boundary is knowingly lost.
    pub fn clear_session(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn start_sets_the_active_session() {
        let mut tracker = SessionTracker::default();
        let credit = tracker.start_session(3, "example.com".to_string(), at(0));

        assert!(credit.is_none());
        let session = tracker.active().unwrap();
        assert_eq!(session.tab_id, 3);
        assert_eq!(session.domain, "example.com");
        assert_eq!(session.started_at, at(0));
    }

    #[test]
    fn at_most_one_session_exists() {
        let mut tracker = SessionTracker::default();
        tracker.start_session(1, "a.com".to_string(), at(0));
        let credit = tracker.start_session(2, "b.com".to_string(), at(120));

        // The first session was ended before the second began.
        assert_eq!(
            credit,
            Some(SessionCredit {
                domain: "a.com".to_string(),
                minutes: 2,
            })
        );
        assert_eq!(tracker.active().unwrap().tab_id, 2);
        assert_eq!(tracker.ledger().get("a.com"), Some(&2));
    }

    #[test]
    fn end_credits_whole_minutes_only() {
        let mut tracker = SessionTracker::default();
        tracker.start_session(1, "example.com".to_string(), at(0));
        let credit = tracker.end_session(at(150)).unwrap();

        assert_eq!(credit.minutes, 2);
        assert_eq!(tracker.ledger().get("example.com"), Some(&2));
    }

    #[test]
    fn sub_minute_session_credits_zero() {
        let mut tracker = SessionTracker::default();
        tracker.start_session(1, "example.com".to_string(), at(0));
        let credit = tracker.end_session(at(59)).unwrap();

        assert_eq!(credit.minutes, 0);
        assert_eq!(tracker.ledger().get("example.com"), Some(&0));
    }

    #[test]
    fn ending_twice_is_a_no_op_the_second_time() {
        let mut tracker = SessionTracker::default();
        tracker.start_session(1, "example.com".to_string(), at(0));

        assert!(tracker.end_session(at(60)).is_some());
        assert!(tracker.end_session(at(600)).is_none());
        assert_eq!(tracker.ledger().get("example.com"), Some(&1));
    }

    #[test]
    fn totals_accumulate_across_sessions() {
        let mut tracker = SessionTracker::default();
        tracker.start_session(1, "example.com".to_string(), at(0));
        tracker.end_session(at(60));
        tracker.start_session(1, "example.com".to_string(), at(1000));
        tracker.end_session(at(1180));

        assert_eq!(tracker.ledger().get("example.com"), Some(&4));
    }

    #[test]
    fn clock_skew_never_credits_negative_time() {
        let mut tracker = SessionTracker::default();
        tracker.start_session(1, "example.com".to_string(), at(300));
        let credit = tracker.end_session(at(0)).unwrap();

        assert_eq!(credit.minutes, 0);
    }

    #[test]
    fn clear_discards_without_crediting() {
        let ledger = DomainLedger::from([("example.com".to_string(), 7)]);
        let mut tracker = SessionTracker::new(ledger);
        tracker.start_session(1, "example.com".to_string(), at(0));
        tracker.clear_session();

        assert!(tracker.active().is_none());
        assert_eq!(tracker.ledger().get("example.com"), Some(&7));
        // Nothing left to end.
        assert!(tracker.end_session(at(600)).is_none());
    }

    #[test]
    fn new_preserves_the_loaded_ledger() {
        let ledger = DomainLedger::from([("a.com".to_string(), 12)]);
        let mut tracker = SessionTracker::new(ledger);
        tracker.start_session(2, "a.com".to_string(), at(0));
        tracker.end_session(at(180));

        assert_eq!(tracker.ledger().get("a.com"), Some(&15));
    }
}
