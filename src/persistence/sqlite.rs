use super::{PersistenceError, PersistenceResult, SessionSnapshot, SessionStore};
use crate::calendar::CalendarConfig;
use crate::session::SessionRecord;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

pub struct SqliteSessionStore {
    connection: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS snapshot_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                config_json TEXT
            );
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY,
                session_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::Sqlite("connection mutex poisoned".into()))
    }

    fn save_metadata(
        &self,
        tx: &rusqlite::Transaction,
        config: Option<&CalendarConfig>,
    ) -> PersistenceResult<()> {
        let json = config.map(serde_json::to_string).transpose()?;
        tx.execute("DELETE FROM snapshot_metadata", [])?;
        tx.execute(
            "INSERT INTO snapshot_metadata (id, config_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_sessions(
        &self,
        tx: &rusqlite::Transaction,
        sessions: &[SessionRecord],
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM sessions", [])?;
        let mut stmt = tx.prepare("INSERT INTO sessions (id, session_json) VALUES (?1, ?2)")?;
        for session in sessions {
            let json = serde_json::to_string(session)?;
            stmt.execute(params![session.id, json])?;
        }
        Ok(())
    }
}

impl SessionStore for SqliteSessionStore {
    fn save_snapshot(&self, snapshot: &SessionSnapshot) -> PersistenceResult<()> {
        super::validate_sessions(&snapshot.sessions)?;
        if let Some(config) = &snapshot.config {
            super::validate_config(config)?;
        }
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_metadata(&tx, snapshot.config.as_ref())?;
        self.save_sessions(&tx, &snapshot.sessions)?;
        tx.commit()?;
        info!(sessions = snapshot.sessions.len(), "saved sessions to sqlite");
        Ok(())
    }

    fn load_snapshot(&self) -> PersistenceResult<Option<SessionSnapshot>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT config_json FROM snapshot_metadata WHERE id = 1")?;
        let metadata_row: Option<Option<String>> =
            stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(config_json) = metadata_row else {
            return Ok(None);
        };
        let config: Option<CalendarConfig> = config_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        let mut stmt = conn.prepare("SELECT session_json FROM sessions ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut sessions = Vec::new();
        for json in rows {
            let json = json?;
            let session: SessionRecord = serde_json::from_str(&json)?;
            sessions.push(session);
        }

        super::validate_loaded_sessions(&sessions)?;
        Ok(Some(SessionSnapshot { config, sessions }))
    }
}
