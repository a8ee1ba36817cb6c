#[cfg(test)]
mod tests;

use std::sync::{Mutex, MutexGuard};

use arcade_core::LeaderboardEntry;
use rusqlite::{params, Connection};

const IN_MEMORY_URLS: [&str; 2] = ["sqlite::memory:", ":memory:"];

/// SQLite-backed leaderboard table.
///
/// One connection behind a mutex; every public method holds the lock for a single
/// read or a single insert-then-read, never across requests.
pub struct ScoreStore {
    conn: Mutex<Connection>,
}

impl ScoreStore {
    /// Opens the database named by `database_url` and creates the table if needed.
    ///
    /// Accepts a plain file path, a `sqlite://` or `sqlite:` prefixed path, or
    /// `sqlite::memory:` for a throwaway in-memory database.
    pub fn open(database_url: &str) -> Result<Self, String> {
        let conn = if IN_MEMORY_URLS.contains(&database_url) {
            Connection::open_in_memory()
                .map_err(|e| format!("failed to open in-memory SQLite: {e}"))?
        } else {
            let path = database_url
                .strip_prefix("sqlite://")
                .or_else(|| database_url.strip_prefix("sqlite:"))
                .unwrap_or(database_url);
            let conn = Connection::open(path)
                .map_err(|e| format!("failed to open SQLite at {path}: {e}"))?;
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA busy_timeout=5000;
                 PRAGMA synchronous=NORMAL;",
            )
            .map_err(|e| format!("failed to set pragmas: {e}"))?;
            conn
        };

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS leaderboard (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        VARCHAR(50) NOT NULL,
                score       INTEGER NOT NULL,
                created_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP
             );
             CREATE INDEX IF NOT EXISTS idx_score ON leaderboard(score DESC);",
        )
        .map_err(|e| format!("failed to create schema: {e}"))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|_| "score store lock poisoned".to_string())
    }

    /// Best `limit` records, highest score first. Ties keep insertion order.
    pub fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, String> {
        let conn = self.lock()?;
        Self::select_top(&conn, limit)
    }

    #[cfg(test)]
    pub(crate) fn insert(&self, name: &str, score: u32) -> Result<i64, String> {
        let conn = self.lock()?;
        Self::insert_row(&conn, name, score)
    }

    /// Stores one score and returns the refreshed top list under the same lock.
    pub fn submit(
        &self,
        name: &str,
        score: u32,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, String> {
        let conn = self.lock()?;
        Self::insert_row(&conn, name, score)?;
        Self::select_top(&conn, limit)
    }

    pub fn count(&self) -> Result<usize, String> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM leaderboard", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as usize)
        .map_err(|e| format!("count failed: {e}"))
    }

    fn insert_row(conn: &Connection, name: &str, score: u32) -> Result<i64, String> {
        conn.execute(
            "INSERT INTO leaderboard (name, score) VALUES (?1, ?2)",
            params![name, i64::from(score)],
        )
        .map_err(|e| format!("insert failed: {e}"))?;
        Ok(conn.last_insert_rowid())
    }

    fn select_top(conn: &Connection, limit: usize) -> Result<Vec<LeaderboardEntry>, String> {
        let mut stmt = conn
            .prepare_cached(
                "SELECT name, score, strftime('%d/%m/%Y', created_at) AS date
                 FROM leaderboard
                 ORDER BY score DESC, id ASC
                 LIMIT ?1",
            )
            .map_err(|e| format!("failed to prepare leaderboard query: {e}"))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(LeaderboardEntry {
                    name: row.get(0)?,
                    score: row.get::<_, i64>(1)?.clamp(0, i64::from(i32::MAX)) as u32,
                    date: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })
            .map_err(|e| format!("leaderboard query failed: {e}"))?;

        let entries = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("failed to read leaderboard row: {e}"))?;
        Ok(entries)
    }
}
