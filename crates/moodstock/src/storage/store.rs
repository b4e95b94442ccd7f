use super::schema::{self, TABLE};
use crate::dimension::{Dimension, Levels};
use crate::error::Result;
use rusqlite::{Connection, ToSql};
use std::path::Path;

/// Timestamp format for persisted rows (local time, lexically sortable)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One persisted row: a timestamp plus one value per dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: String,
    pub levels: Levels,
}

impl Sample {
    pub fn new(timestamp: impl Into<String>, levels: Levels) -> Self {
        Sample {
            timestamp: timestamp.into(),
            levels,
        }
    }

    /// Stamp `levels` with the current wall-clock time
    pub fn now(levels: Levels) -> Self {
        Sample::new(timestamp_now(), levels)
    }
}

/// Append-only log of samples backed by SQLite
pub struct SampleStore {
    conn: Connection,
}

impl SampleStore {
    /// Open (or create) the store at `path`. The schema is created when missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL lets `history`/`export` read while the overlay is writing
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::create_tables(&conn)?;
        Ok(SampleStore { conn })
    }

    /// Write one immutable row
    pub fn append(&self, sample: &Sample) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&schema::insert_sql())?;
        stmt.execute(sample_params(sample).as_slice())?;
        Ok(())
    }

    /// The most recent `n` samples, oldest first
    pub fn recent(&self, n: usize) -> Result<Vec<Sample>> {
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM {TABLE} ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
            schema::column_list()
        ))?;

        let rows = stmt.query_map([limit], sample_from_row)?;
        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?);
        }
        samples.reverse();
        Ok(samples)
    }

    /// Every persisted row in insertion order
    pub fn all(&self) -> Result<Vec<Sample>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {TABLE} ORDER BY rowid ASC",
            schema::column_list()
        ))?;

        let rows = stmt.query_map([], sample_from_row)?;
        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?);
        }
        Ok(samples)
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Replace the whole table with `samples` in one transaction.
    /// Only the bulk import uses this; the live cycle only appends.
    pub fn replace_all(&mut self, samples: &[Sample]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute(&format!("DELETE FROM {TABLE}"), [])?;
        {
            let mut stmt = tx.prepare_cached(&schema::insert_sql())?;
            for sample in samples {
                stmt.execute(sample_params(sample).as_slice())?;
            }
        }
        tx.commit()?;
        Ok(samples.len())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn sample_params(sample: &Sample) -> Vec<&dyn ToSql> {
    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(Dimension::COUNT + 1);
    params.push(&sample.timestamp);
    for value in sample.levels.as_slice() {
        params.push(value);
    }
    params
}

fn sample_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Sample> {
    let timestamp: String = row.get(0)?;
    let mut levels = Levels::neutral();
    for dim in Dimension::ALL {
        levels[dim] = row.get(dim.index() + 1)?;
    }
    Ok(Sample { timestamp, levels })
}
