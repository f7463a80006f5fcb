//! Core session-tracking logic for the domain warden.
//!
//! This crate contains the fundamental types and logic for:
//! - Domain extraction: URL string → hostname, tolerant of malformed input
//! - Session tracking: the single active session and the per-domain ledger
//! - Alarm reconciliation: deciding whether the threshold alarm should exist
//! - Alert planning: which channels fire when the alarm goes off
//! - Event routing: driving the tracker from host lifecycle events
//!
//! Everything here is pure and synchronous. Timestamps are passed in by the
//! caller, storage and delivery live in `dw-store` and `dw-notify`.

pub mod alarm;
pub mod alert;
pub mod domain;
pub mod options;
pub mod router;
pub mod session;
pub mod status;

pub use alarm::{ALARM_NAME, AlarmDecision, reconcile};
pub use alert::{AlertPlan, LocalAlert, WebhookAlert, plan_alert};
pub use domain::{domain_matches, extract_domain};
pub use options::{DEFAULT_THRESHOLD_MINUTES, Options, OptionsPatch};
pub use router::{HostEvent, Outcome, Router, WINDOW_ID_NONE};
pub use session::{ActiveSession, DomainLedger, SessionCredit, SessionTracker, TabId};
pub use status::StatusReport;
