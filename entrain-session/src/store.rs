//! Statistics persistence
//!
//! SQLite-backed store for production, in-memory fallback for tests and
//! environments without a writable data directory. Statistics live under
//! a single well-known key and are written back after every session stop.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use thiserror::Error;

use crate::stats::SessionStatistics;

/// The single row key statistics are stored under
const STATS_KEY: &str = "session_stats";

/// Errors from statistics persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable statistics capability injected into the session controller
pub trait StatisticsStore: Send {
    /// Load persisted statistics; defaults when nothing is stored yet
    fn load(&mut self) -> Result<SessionStatistics, StoreError>;
    /// Write statistics back, replacing the stored snapshot
    fn save(&mut self, stats: &SessionStatistics) -> Result<(), StoreError>;
}

/// Volatile store; statistics last for the process lifetime only
#[derive(Default)]
pub struct MemoryStore {
    stats: SessionStatistics,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatisticsStore for MemoryStore {
    fn load(&mut self) -> Result<SessionStatistics, StoreError> {
        Ok(self.stats.clone())
    }

    fn save(&mut self, stats: &SessionStatistics) -> Result<(), StoreError> {
        self.stats = stats.clone();
        Ok(())
    }
}

/// Statistics store backed by SQLite
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// SQL schema for the statistics tables
    const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS session_stats (
            key TEXT PRIMARY KEY,
            total_sessions INTEGER NOT NULL,
            total_minutes INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS favorite_frequencies (
            carrier TEXT PRIMARY KEY,
            play_count INTEGER NOT NULL
        );
    "#;

    /// Open or create a statistics database at the given path
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(Self::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(Self::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Default database location under the platform data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("entrain")
            .join("stats.db")
    }
}

impl StatisticsStore for SqliteStore {
    fn load(&mut self) -> Result<SessionStatistics, StoreError> {
        let mut stats = SessionStatistics::default();

        let totals = self
            .conn
            .query_row(
                "SELECT total_sessions, total_minutes FROM session_stats WHERE key = ?1",
                params![STATS_KEY],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        if let Some((sessions, minutes)) = totals {
            stats.total_sessions = sessions;
            stats.total_minutes = minutes;
        }

        let mut stmt = self
            .conn
            .prepare("SELECT carrier, play_count FROM favorite_frequencies")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        for row in rows {
            let (carrier, count) = row?;
            stats.favorite_frequencies.insert(carrier, count);
        }

        Ok(stats)
    }

    fn save(&mut self, stats: &SessionStatistics) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO session_stats (key, total_sessions, total_minutes)
             VALUES (?1, ?2, ?3)",
            params![STATS_KEY, stats.total_sessions, stats.total_minutes],
        )?;
        for (carrier, count) in &stats.favorite_frequencies {
            tx.execute(
                "INSERT OR REPLACE INTO favorite_frequencies (carrier, play_count)
                 VALUES (?1, ?2)",
                params![carrier, count],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> SessionStatistics {
        let mut stats = SessionStatistics::default();
        stats.record_session(528.0, 180_000);
        stats.record_session(528.0, 60_000);
        stats.record_session(963.0, 0);
        stats
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), SessionStatistics::default());

        let stats = sample_stats();
        store.save(&stats).unwrap();
        assert_eq!(store.load().unwrap(), stats);
    }

    #[test]
    fn test_sqlite_store_round_trip() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.load().unwrap(), SessionStatistics::default());

        let stats = sample_stats();
        store.save(&stats).unwrap();
        assert_eq!(store.load().unwrap(), stats);
    }

    #[test]
    fn test_sqlite_save_replaces_snapshot() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut stats = sample_stats();
        store.save(&stats).unwrap();

        stats.record_session(528.0, 120_000);
        store.save(&stats).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.total_sessions, 4);
        assert_eq!(loaded.favorite_frequencies.get("528"), Some(&3));
    }
}
