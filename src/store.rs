use crate::errors::{AppError, AppResult};
use crate::models::{AppState, Session};
use crate::seed::default_app_state;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

pub const STATE_KEY: &str = "gridblock-state";
pub const SESSION_KEY: &str = "gridblock-user";
pub const LAUNCHED_KEY: &str = "gridblock-launched";

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Result of loading the persisted snapshot. `recovered` is true when a stored
/// blob existed but could not be parsed and the default tree was substituted.
#[derive(Debug, Clone)]
pub struct StateLoad {
    pub state: AppState,
    pub recovered: bool,
}

/// Key/value blob store standing in for browser-local storage: whole-tree
/// writes, no partial updates, last write wins.
#[derive(Debug)]
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Storage(err.to_string()))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> AppResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    pub fn save_state(&self, state: &AppState) -> AppResult<()> {
        let blob = serde_json::to_string(state)?;
        self.put(STATE_KEY, &blob)
    }

    /// Loads the snapshot, substituting the default tree when the key is
    /// missing or the blob is corrupt. Corruption is logged and surfaced via
    /// `recovered`, never thrown.
    pub fn load_state(&self) -> AppResult<StateLoad> {
        match self.get(STATE_KEY)? {
            None => Ok(StateLoad {
                state: default_app_state(),
                recovered: false,
            }),
            Some(blob) => match serde_json::from_str::<AppState>(&blob) {
                Ok(state) => Ok(StateLoad {
                    state,
                    recovered: false,
                }),
                Err(error) => {
                    tracing::warn!(%error, key = STATE_KEY, "discarding corrupt snapshot, falling back to default state");
                    Ok(StateLoad {
                        state: default_app_state(),
                        recovered: true,
                    })
                }
            },
        }
    }

    pub fn save_session(&self, session: &Session) -> AppResult<()> {
        let blob = serde_json::to_string(session)?;
        self.put(SESSION_KEY, &blob)
    }

    pub fn load_session(&self) -> AppResult<Option<Session>> {
        match self.get(SESSION_KEY)? {
            None => Ok(None),
            Some(blob) => match serde_json::from_str::<Session>(&blob) {
                Ok(session) => Ok(Some(session)),
                Err(error) => {
                    tracing::warn!(%error, key = SESSION_KEY, "discarding corrupt session blob");
                    Ok(None)
                }
            },
        }
    }

    pub fn clear_session(&self) -> AppResult<()> {
        self.delete(SESSION_KEY)
    }

    pub fn mark_launched(&self) -> AppResult<()> {
        self.put(LAUNCHED_KEY, "true")
    }

    pub fn has_launched(&self) -> AppResult<bool> {
        Ok(self.get(LAUNCHED_KEY)?.as_deref() == Some("true"))
    }

    // test hook: write an arbitrary blob under a key
    #[cfg(test)]
    pub fn put_raw(&self, key: &str, value: &str) -> AppResult<()> {
        self.put(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_app_state;

    fn open_store(dir: &tempfile::TempDir) -> LocalStore {
        LocalStore::open(&dir.path().join("gridblock.db")).expect("open store")
    }

    #[test]
    fn state_round_trips_field_for_field() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        let state = default_app_state();
        store.save_state(&state).expect("save");
        let loaded = store.load_state().expect("load");
        assert!(!loaded.recovered);
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn missing_snapshot_yields_default_without_recovery_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        let loaded = store.load_state().expect("load");
        assert!(!loaded.recovered);
        assert_eq!(loaded.state, default_app_state());
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_default_and_reports_recovery() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        store.put_raw(STATE_KEY, "{not json").expect("write corrupt blob");
        let loaded = store.load_state().expect("load");
        assert!(loaded.recovered);
        assert_eq!(loaded.state, default_app_state());
    }

    #[test]
    fn session_follows_the_same_pattern_in_its_own_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        assert!(store.load_session().expect("load").is_none());

        let session = Session {
            id: "user-1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar: None,
            bio: None,
            company: None,
            location: None,
            created_at: "2025-12-24T00:00:00Z".to_string(),
        };
        store.save_session(&session).expect("save");
        assert_eq!(store.load_session().expect("load"), Some(session));

        store.clear_session().expect("clear");
        assert!(store.load_session().expect("load").is_none());
    }

    #[test]
    fn corrupt_session_blob_reads_as_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        store.put_raw(SESSION_KEY, "][").expect("write corrupt blob");
        assert!(store.load_session().expect("load").is_none());
    }

    #[test]
    fn launched_flag_defaults_to_false() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        assert!(!store.has_launched().expect("read"));
        store.mark_launched().expect("mark");
        assert!(store.has_launched().expect("read"));
    }
}
