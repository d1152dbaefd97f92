// 💾 Local Store - key → JSON value persistence on SQLite
//
// One table, one row per key. Values are serialized JSON and capped at
// MAX_VALUE_BYTES. Unreadable rows fall back to the caller's default.

use crate::entities::{ClientRecord, PropertyPhoto, VersionHistory, VersionSnapshot};
use crate::error::StorageError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// 5 MB per stored value.
pub const MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

pub const KEY_CLIENTS: &str = "clients";
pub const KEY_VERSIONS: &str = "versions";
pub const KEY_PHOTOS: &str = "propertyPhotos";
pub const KEY_AUTH: &str = "auth";
pub const KEY_USER_EMAIL: &str = "userEmail";

pub type StorageResult<T> = Result<T, StorageError>;

pub fn setup_database(conn: &Connection) -> StorageResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS local_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        setup_database(&conn)?;
        debug!(path = %path.display(), "local store opened");
        Ok(LocalStore { conn })
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(LocalStore { conn })
    }

    // ========================================================================
    // GENERIC KEY/VALUE
    // ========================================================================

    /// Serialize and upsert. Refuses values above MAX_VALUE_BYTES.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value)?;
        if json.len() > MAX_VALUE_BYTES {
            warn!(key, size = json.len(), "refusing oversized value");
            return Err(StorageError::TooLarge {
                key: key.to_string(),
                size: json.len(),
            });
        }

        self.conn.execute(
            "INSERT INTO local_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_raw(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Read `key`, returning `default` when it is missing or malformed.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> StorageResult<T> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(default);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(key, error = %err, "discarding malformed stored value");
                Ok(default)
            }
        }
    }

    pub fn remove(&self, key: &str) -> StorageResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM local_store WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM local_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    // ========================================================================
    // TYPED ACCESSORS
    // ========================================================================

    pub fn load_clients(&self) -> StorageResult<Vec<ClientRecord>> {
        self.get_or(KEY_CLIENTS, Vec::new())
    }

    pub fn save_clients(&self, clients: &[ClientRecord]) -> StorageResult<()> {
        self.set(KEY_CLIENTS, clients)
    }

    pub fn load_versions(&self) -> StorageResult<VersionHistory> {
        let entries: Vec<VersionSnapshot> = self.get_or(KEY_VERSIONS, Vec::new())?;
        Ok(VersionHistory::from_entries(entries))
    }

    pub fn save_versions(&self, history: &VersionHistory) -> StorageResult<()> {
        self.set(KEY_VERSIONS, history.entries())
    }

    pub fn load_photos(&self) -> StorageResult<Vec<PropertyPhoto>> {
        self.get_or(KEY_PHOTOS, Vec::new())
    }

    pub fn save_photos(&self, photos: &[PropertyPhoto]) -> StorageResult<()> {
        self.set(KEY_PHOTOS, photos)
    }

    /// Authentication flag and the signed-in email, if any.
    pub fn load_session(&self) -> StorageResult<(bool, Option<String>)> {
        let authenticated = self.get_or(KEY_AUTH, false)?;
        let email = self.get_or(KEY_USER_EMAIL, None::<String>)?;
        Ok((authenticated, email))
    }

    pub fn save_session(&self, email: &str) -> StorageResult<()> {
        self.set(KEY_AUTH, &true)?;
        self.set(KEY_USER_EMAIL, email)
    }

    pub fn clear_session(&self) -> StorageResult<()> {
        self.set(KEY_AUTH, &false)?;
        self.remove(KEY_USER_EMAIL)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ClientIntake, PropertyRecord, RepairBudgetMap, RepairCategoryTable};

    #[test]
    fn test_set_get_roundtrip_and_overwrite() {
        let store = LocalStore::open_in_memory().unwrap();

        store.set("count", &1).unwrap();
        store.set("count", &2).unwrap();

        assert_eq!(store.get_or("count", 0).unwrap(), 2);
        assert_eq!(store.keys().unwrap(), vec!["count".to_string()]);
        assert_eq!(store.get_or("missing", 7).unwrap(), 7);

        println!("✅ Local store roundtrip test PASSED");
    }

    #[test]
    fn test_malformed_value_falls_back_to_default() {
        let store = LocalStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO local_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![KEY_CLIENTS, "{not json", "2025-01-01T00:00:00Z"],
            )
            .unwrap();

        let clients = store.load_clients().unwrap();
        assert!(clients.is_empty(), "corrupt clients should load as empty");
    }

    #[test]
    fn test_oversized_value_is_refused() {
        let store = LocalStore::open_in_memory().unwrap();
        let big = "x".repeat(MAX_VALUE_BYTES);

        let err = store.set("big", &big).unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
        assert!(store.get_raw("big").unwrap().is_none(), "nothing written");
    }

    #[test]
    fn test_session_lifecycle() {
        let store = LocalStore::open_in_memory().unwrap();
        assert_eq!(store.load_session().unwrap(), (false, None));

        store.save_session("demo@example.com").unwrap();
        assert_eq!(
            store.load_session().unwrap(),
            (true, Some("demo@example.com".to_string()))
        );

        store.clear_session().unwrap();
        assert_eq!(store.load_session().unwrap(), (false, None));
    }

    #[test]
    fn test_typed_collections_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cma.db");

        {
            let store = LocalStore::open(&path).unwrap();
            let intake = ClientIntake {
                client_name: "Jane Seller".to_string(),
                client_email: "jane@example.com".to_string(),
                client_phone: "727-555-0100".to_string(),
                address: "2015 Hillwood Dr".to_string(),
                city: "Clearwater".to_string(),
                zip: "33763".to_string(),
                list_price: Some(305_000.0),
                sqft: Some(1148.0),
                ..ClientIntake::default()
            };
            let client = ClientRecord::from_intake(intake).unwrap();
            store.save_clients(&[client]).unwrap();

            let mut history = VersionHistory::new();
            history.push(VersionSnapshot::capture(
                &PropertyRecord::sample(),
                &RepairBudgetMap::zeroed(&RepairCategoryTable::standard()),
                None,
            ));
            store.save_versions(&history).unwrap();
        }

        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.load_clients().unwrap()[0].name(), "Jane Seller");
        assert_eq!(store.load_versions().unwrap().len(), 1);
        assert!(store.load_photos().unwrap().is_empty());
    }
}
