//! Host lifecycle event routing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmDecision, reconcile};
use crate::domain::extract_domain;
use crate::options::Options;
use crate::session::{ActiveSession, DomainLedger, SessionCredit, SessionTracker, TabId};

/// Sentinel window id meaning "no browser window has focus".
pub const WINDOW_ID_NONE: i64 = -1;

/// A lifecycle or query event forwarded by the host shim, one JSON object per
/// stdin line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A tab became active. `url` is absent when the host-side tab lookup
    /// failed (tab already closed).
    #[serde(rename_all = "camelCase")]
    TabActivated {
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
    },
    /// A tab progressed through a navigation. Only `status == "complete"` on
    /// the tracked tab has any effect.
    #[serde(rename_all = "camelCase")]
    TabUpdated {
        tab_id: TabId,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
    /// Browser window focus moved, possibly to nowhere. For a real window the
    /// host includes that window's active tab, when it has one.
    #[serde(rename_all = "camelCase")]
    WindowFocusChanged {
        window_id: i64,
        #[serde(default)]
        tab_id: Option<TabId>,
        #[serde(default)]
        url: Option<String>,
    },
    /// A tab was closed.
    #[serde(rename_all = "camelCase")]
    TabRemoved { tab_id: TabId },
    /// Status query from the options surface.
    #[serde(rename = "GET_STATUS")]
    GetStatus,
}

/// Outcome of routing one host event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Required change to the alarm slot, if any.
    pub alarm: Option<AlarmDecision>,
    /// The ledger changed and must be flushed to the store.
    pub ledger_dirty: bool,
    /// The host asked for a status report.
    pub status_requested: bool,
}

impl Outcome {
    const fn none() -> Self {
        Self {
            alarm: None,
            ledger_dirty: false,
            status_requested: false,
        }
    }
}

/// Drives the session tracker from host lifecycle events.
///
/// Owns all mutable tracking state; the surrounding loop processes one event
/// at a time and re-reads options before each call, so a concurrent settings
/// save is visible to the very next event. Handlers re-validate tab identity
/// against the tracked tab before mutating anything.
#[derive(Debug, Default)]
pub struct Router {
    tracker: SessionTracker,
}

impl Router {
    /// Creates a router over a ledger loaded from the store.
    #[must_use]
    pub const fn new(ledger: DomainLedger) -> Self {
        Self {
            tracker: SessionTracker::new(ledger),
        }
    }

    #[must_use]
    pub const fn session(&self) -> Option<&ActiveSession> {
        self.tracker.active()
    }

    #[must_use]
    pub const fn ledger(&self) -> &DomainLedger {
        self.tracker.ledger()
    }

    /// Ends the active session outside event dispatch (daemon shutdown).
    /// Returns the credit so the caller can flush the ledger.
    pub fn end_session(&mut self, now: DateTime<Utc>) -> Option<SessionCredit> {
        self.tracker.end_session(now)
    }

    /// Routes one event. `options` must be freshly read from the store.
    pub fn handle(&mut self, event: &HostEvent, options: &Options, now: DateTime<Utc>) -> Outcome {
        match event {
            HostEvent::GetStatus => Outcome {
                status_requested: true,
                ..Outcome::none()
            },
            _ if !options.tracking_enabled => {
                // Short-circuits every other rule. The open interval is
                // discarded, not credited.
                tracing::debug!("tracking disabled, clearing state");
                self.tracker.clear_session();
                Outcome {
                    alarm: Some(AlarmDecision::Clear),
                    ..Outcome::none()
                }
            }
            HostEvent::TabActivated { tab_id, url } => {
                self.activate(*tab_id, url.as_deref(), options, now)
            }
            HostEvent::TabUpdated {
                tab_id,
                status,
                url,
            } => {
                if Some(*tab_id) != self.tracked_tab() {
                    return Outcome::none();
                }
                if status.as_deref() != Some("complete") {
                    return Outcome::none();
                }
                self.activate(*tab_id, url.as_deref(), options, now)
            }
            HostEvent::WindowFocusChanged {
                window_id,
                tab_id,
                url,
            } => {
                if *window_id == WINDOW_ID_NONE {
                    let credit = self.tracker.end_session(now);
                    Outcome {
                        alarm: Some(AlarmDecision::Clear),
                        ledger_dirty: credit.is_some(),
                        status_requested: false,
                    }
                } else if let Some(tab_id) = tab_id {
                    self.activate(*tab_id, url.as_deref(), options, now)
                } else {
                    // The focused window has no active tab.
                    Outcome::none()
                }
            }
            HostEvent::TabRemoved { tab_id } => {
                if Some(*tab_id) != self.tracked_tab() {
                    return Outcome::none();
                }
                let credit = self.tracker.end_session(now);
                Outcome {
                    alarm: Some(AlarmDecision::Clear),
                    ledger_dirty: credit.is_some(),
                    status_requested: false,
                }
            }
        }
    }

    /// End-old / start-new for a tab known to be active with `url`.
    ///
    /// A missing URL means the host-side lookup failed: return early, mutate
    /// nothing. An unresolvable hostname ends the old session and starts none,
    /// so no alarm can be armed for it.
    fn activate(
        &mut self,
        tab_id: TabId,
        url: Option<&str>,
        options: &Options,
        now: DateTime<Utc>,
    ) -> Outcome {
        let Some(url) = url else {
            tracing::debug!(tab_id, "tab lookup failed, ignoring event");
            return Outcome::none();
        };

        let domain = extract_domain(url);
        let credit = if domain.is_empty() {
            tracing::debug!(tab_id, url, "no resolvable hostname");
            self.tracker.end_session(now)
        } else {
            self.tracker.start_session(tab_id, domain, now)
        };

        Outcome {
            alarm: Some(reconcile(self.tracker.active(), options)),
            ledger_dirty: credit.is_some(),
            status_requested: false,
        }
    }

    fn tracked_tab(&self) -> Option<TabId> {
        self.tracker.active().map(|session| session.tab_id)
    }
}
