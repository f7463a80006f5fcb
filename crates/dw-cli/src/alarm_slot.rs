//! The single named alarm slot.
//!
//! One deferred callback at most, identified by [`dw_core::ALARM_NAME`].
//! Arming overwrites whatever is pending (last-write-wins, never two alarms),
//! clearing aborts the pending task. The absolute fire time is kept so status
//! queries can report it.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

/// At most one pending deferred callback.
#[derive(Debug, Default)]
pub struct AlarmSlot {
    handle: Option<JoinHandle<()>>,
    fire_at: Option<DateTime<Utc>>,
}

impl AlarmSlot {
    /// Arms the slot: aborts any pending alarm and schedules `on_fire` to run
    /// after `delay`.
    pub fn arm<F, Fut>(&mut self, delay: Duration, now: DateTime<Utc>, on_fire: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.clear();
        self.fire_at = chrono::Duration::from_std(delay).ok().map(|d| now + d);
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire().await;
        }));
    }

    /// Clears the slot, aborting any pending alarm. A fired alarm must also be
    /// cleared here so it never repeats.
    pub fn clear(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.fire_at = None;
    }

    /// Absolute fire time of the pending alarm, if one exists.
    #[must_use]
    pub const fn scheduled_time(&self) -> Option<DateTime<Utc>> {
        self.fire_at
    }
}
