//! # SQLite Store
//!
//! Alternative persistence backend for service deployments: the session
//! document is kept as a single JSON blob row, replaced wholesale on every
//! save so the durable snapshot is always complete.

use super::store::StateStore;
use super::types::BusState;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// rusqlite-backed [`StateStore`].
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open database: {:?}", path.as_ref()))?;
        Self::init(conn)
    }

    /// Purely in-memory database, for tests.
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS bus_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL
            )
            "#,
            [],
        )
        .context("Failed to initialize bus_state table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl StateStore for SqliteStore {
    fn load(&self) -> Result<Option<BusState>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let result: Option<String> = conn
            .query_row("SELECT data FROM bus_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .ok();

        match result {
            Some(data) => Ok(Some(
                serde_json::from_str(&data).context("Failed to parse stored bus state")?,
            )),
            None => Ok(None),
        }
    }

    fn save(&self, state: &BusState) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let data = serde_json::to_string(state)?;
        conn.execute(
            "INSERT OR REPLACE INTO bus_state (id, data) VALUES (1, ?1)",
            params![data],
        )
        .context("Failed to save bus state")?;

        Ok(())
    }
}
