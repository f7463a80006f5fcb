//! The tracking daemon.
//!
//! Host lifecycle events arrive as JSON lines on stdin; overlay messages and
//! status responses leave as JSON lines on stdout (logs go to stderr). A
//! single mpsc channel merges stdin events with alarm fires, and one consumer
//! loop processes them in arrival order, so each handler runs to completion
//! before the next is dispatched, so the tracker needs no locking. Options
//! are re-read from the store for every event.

use std::io::Write as _;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use dw_core::session::TabId;
use dw_core::{AlarmDecision, HostEvent, Router, StatusReport, plan_alert};
use dw_notify::{WebhookClient, send_local};
use dw_store::Store;

use crate::alarm_slot::AlarmSlot;

/// Events merged into the daemon's single consumer loop.
#[derive(Debug)]
enum LoopEvent {
    /// A parsed line from the host shim.
    Host(HostEvent),
    /// The threshold alarm went off.
    AlarmFired,
    /// stdin reached end of file; the host is gone.
    Shutdown,
}

/// Overlay instruction for the tracked tab, relayed by the host shim.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OverlayMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    tab_id: TabId,
}

/// Runs the daemon until the host closes stdin.
pub async fn run(store: Store) -> Result<()> {
    let ledger = store
        .load_domain_times()
        .context("failed to load domain times")?;
    let mut router = Router::new(ledger);
    let webhook = WebhookClient::new().context("failed to build webhook client")?;
    let mut slot = AlarmSlot::default();
    let (tx, mut rx) = mpsc::channel::<LoopEvent>(64);

    spawn_stdin_reader(tx.clone());
    tracing::info!("daemon started");

    while let Some(event) = rx.recv().await {
        match event {
            LoopEvent::Shutdown => break,
            LoopEvent::Host(event) => {
                if let Err(error) = handle_host_event(&mut router, &store, &mut slot, &tx, &event)
                {
                    tracing::error!(%error, ?event, "event dropped");
                }
            }
            LoopEvent::AlarmFired => {
                let result = handle_alarm_fired(&router, &store, &webhook);
                // Fired or suppressed, the alarm never repeats.
                slot.clear();
                if let Err(error) = result {
                    tracing::error!(%error, "alarm handling failed");
                }
            }
        }
    }

    // Credit the in-flight session before exiting.
    slot.clear();
    if router.end_session(Utc::now()).is_some() {
        store
            .save_domain_times(router.ledger())
            .context("failed to flush domain times")?;
    }
    tracing::info!("daemon stopped");
    Ok(())
}

/// Forwards stdin lines into the loop, skipping malformed ones.
fn spawn_stdin_reader(tx: mpsc::Sender<LoopEvent>) {
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<HostEvent>(line) {
                        Ok(event) => {
                            if tx.send(LoopEvent::Host(event)).await.is_err() {
                                return;
                            }
                        }
                        Err(error) => {
                            tracing::warn!(%error, line, "skipping malformed event");
                        }
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    tracing::warn!(%error, "stdin read failed");
                    break;
                }
            }
        }
        let _ = tx.send(LoopEvent::Shutdown).await;
    });
}

/// Routes one host event: fresh options, tracker update, ledger flush, alarm
/// reconciliation, status reply.
fn handle_host_event(
    router: &mut Router,
    store: &Store,
    slot: &mut AlarmSlot,
    tx: &mpsc::Sender<LoopEvent>,
    event: &HostEvent,
) -> Result<()> {
    let options = store.get_options().context("failed to read options")?;
    let now = Utc::now();
    let outcome = router.handle(event, &options, now);

    if outcome.ledger_dirty {
        store
            .save_domain_times(router.ledger())
            .context("failed to flush domain times")?;
    }

    match outcome.alarm {
        Some(AlarmDecision::Clear) => slot.clear(),
        Some(AlarmDecision::Arm { delay }) => {
            let fire_tx = tx.clone();
            slot.arm(delay, now, move || async move {
                let _ = fire_tx.send(LoopEvent::AlarmFired).await;
            });
        }
        None => {}
    }

    if outcome.status_requested {
        let report = StatusReport::new(&options, router.session(), slot.scheduled_time());
        write_line(&serde_json::to_string(&report)?)?;
    }
    Ok(())
}

/// Re-checks live state and dispatches the planned channels.
///
/// Local notification and webhook run as detached tasks so a slow or failing
/// channel never blocks the loop or the other channels; failures are logged
/// and dropped.
fn handle_alarm_fired(router: &Router, store: &Store, webhook: &WebhookClient) -> Result<()> {
    let options = store.get_options().context("failed to re-read options")?;
    let Some(plan) = plan_alert(router.session(), &options) else {
        return Ok(());
    };
    tracing::info!(domain = %options.domain, "threshold exceeded");

    if let Some(local) = plan.local {
        tokio::spawn(async move {
            if let Err(error) = send_local(&local).await {
                tracing::warn!(%error, "local notification failed");
            }
        });
    }

    if let Some(alert) = plan.webhook {
        let client = webhook.clone();
        tokio::spawn(async move {
            if let Err(error) = client.post(&alert).await {
                tracing::warn!(%error, "webhook delivery failed");
            }
        });
    }

    if let Some(tab_id) = plan.overlay_tab {
        let message = OverlayMessage {
            kind: "TIME_EXCEEDED",
            tab_id,
        };
        write_line(&serde_json::to_string(&message)?)?;
    }
    Ok(())
}

/// Writes one protocol line to stdout, flushed immediately.
fn write_line(line: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").context("failed to write to stdout")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}
