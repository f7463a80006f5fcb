//! Storage layer for the domain warden.
//!
//! A single `kv` table holds JSON-encoded values under fixed keys: the seven
//! tracked option fields plus the accumulated per-domain ledger. Options are
//! merged over defaults key-by-key on every read; there is no cache, so a
//! settings save is visible to the next read immediately. A value that fails
//! to parse falls back to its default rather than erroring.
//!
//! # Thread Safety
//!
//! [`Store`] wraps a `rusqlite::Connection`, which is `Send` but not `Sync`:
//! an instance can be moved between threads but not shared without external
//! synchronization. The daemon keeps its store on the event-loop task.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::de::DeserializeOwned;
use thiserror::Error;

use dw_core::options::{Options, OptionsPatch, sanitize_threshold};
use dw_core::session::DomainLedger;

/// Storage key for the watched domain.
pub const KEY_DOMAIN: &str = "domain";
/// Storage key for the threshold in minutes.
pub const KEY_THRESHOLD_MINUTES: &str = "thresholdMinutes";
/// Storage key for the webhook endpoint.
pub const KEY_DISCORD_WEBHOOK_URL: &str = "discordWebhookUrl";
/// Storage key for the webhook enable flag.
pub const KEY_ENABLE_DISCORD: &str = "enableDiscord";
/// Storage key for the local notification enable flag.
pub const KEY_ENABLE_LOCAL_NOTIF: &str = "enableLocalNotif";
/// Storage key for the overlay enable flag.
pub const KEY_ENABLE_OVERLAY: &str = "enableOverlay";
/// Storage key for the master tracking flag.
pub const KEY_TRACKING_ENABLED: &str = "trackingEnabled";
/// Storage key for the per-domain minute ledger (a JSON object).
pub const KEY_DOMAIN_TIMES: &str = "domainTimes";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A value could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value store wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens a store at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Opens an in-memory store.
    ///
    /// Useful for testing. The store is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Initializes the schema. Idempotent.
    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads the tracked options, merging persisted keys over defaults.
    ///
    /// Re-reads the table on every call: decision points must always see the
    /// latest save. Missing or unparsable keys fall back per-field; an
    /// unusable threshold falls back to the documented default.
    pub fn get_options(&self) -> Result<Options, StoreError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM kv")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut stored: HashMap<String, String> = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            stored.insert(key, value);
        }

        let defaults = Options::default();
        Ok(Options {
            domain: parse_field(&stored, KEY_DOMAIN, defaults.domain),
            threshold_minutes: sanitize_threshold(parse_field(
                &stored,
                KEY_THRESHOLD_MINUTES,
                defaults.threshold_minutes,
            )),
            discord_webhook_url: parse_field(
                &stored,
                KEY_DISCORD_WEBHOOK_URL,
                defaults.discord_webhook_url,
            ),
            enable_discord: parse_field(&stored, KEY_ENABLE_DISCORD, defaults.enable_discord),
            enable_local_notif: parse_field(
                &stored,
                KEY_ENABLE_LOCAL_NOTIF,
                defaults.enable_local_notif,
            ),
            enable_overlay: parse_field(&stored, KEY_ENABLE_OVERLAY, defaults.enable_overlay),
            tracking_enabled: parse_field(
                &stored,
                KEY_TRACKING_ENABLED,
                defaults.tracking_enabled,
            ),
        })
    }

    /// Persists the set fields of `patch` in one transaction.
    ///
    /// Unset fields keep whatever the store already holds; writes win over
    /// defaults on the next read.
    pub fn set_options(&mut self, patch: &OptionsPatch) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO kv (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                ",
            )?;
            let mut put = |key: &str, value: serde_json::Value| -> Result<(), StoreError> {
                stmt.execute(params![key, value.to_string()])?;
                Ok(())
            };

            if let Some(domain) = &patch.domain {
                put(KEY_DOMAIN, serde_json::Value::from(domain.as_str()))?;
            }
            if let Some(threshold) = patch.threshold_minutes {
                put(
                    KEY_THRESHOLD_MINUTES,
                    serde_json::Value::from(sanitize_threshold(threshold)),
                )?;
            }
            if let Some(url) = &patch.discord_webhook_url {
                put(KEY_DISCORD_WEBHOOK_URL, serde_json::Value::from(url.as_str()))?;
            }
            if let Some(enabled) = patch.enable_discord {
                put(KEY_ENABLE_DISCORD, serde_json::Value::from(enabled))?;
            }
            if let Some(enabled) = patch.enable_local_notif {
                put(KEY_ENABLE_LOCAL_NOTIF, serde_json::Value::from(enabled))?;
            }
            if let Some(enabled) = patch.enable_overlay {
                put(KEY_ENABLE_OVERLAY, serde_json::Value::from(enabled))?;
            }
            if let Some(enabled) = patch.tracking_enabled {
                put(KEY_TRACKING_ENABLED, serde_json::Value::from(enabled))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads the per-domain minute ledger. Missing or unparsable → empty.
    pub fn load_domain_times(&self) -> Result<DomainLedger, StoreError> {
        let Some(raw) = self.get_raw(KEY_DOMAIN_TIMES)? else {
            return Ok(DomainLedger::new());
        };
        match serde_json::from_str(&raw) {
            Ok(ledger) => Ok(ledger),
            Err(error) => {
                tracing::warn!(%error, "unparsable domain times, starting empty");
                Ok(DomainLedger::new())
            }
        }
    }

    /// Writes the full ledger. Called on every mutation (write-through).
    pub fn save_domain_times(&self, ledger: &DomainLedger) -> Result<(), StoreError> {
        let value = serde_json::to_string(ledger)?;
        self.conn.execute(
            "
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
            params![KEY_DOMAIN_TIMES, value],
        )?;
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }
}

/// Decodes a stored JSON value, falling back to `default` when the key is
/// missing or the value does not parse.
fn parse_field<T: DeserializeOwned>(stored: &HashMap<String, String>, key: &str, default: T) -> T {
    let Some(raw) = stored.get(key) else {
        return default;
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(key, %error, "unparsable stored value, using default");
            default
        }
    }
}
