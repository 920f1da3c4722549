//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The lifecycle controller, accrual engine, and query service call
//! store methods — they never execute SQL directly.

use crate::{error::DeskResult, event::AuditEntry};
use rusqlite::{params, Connection};
use std::time::Duration;

mod customer;
mod investment;

/// How long a store call may wait on a busy writer before it errors.
/// A stuck database surfaces as a typed failure, never a hang.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DeskStore {
    conn: Connection,
}

impl DeskStore {
    /// Open (or create) the desk database at `path`.
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Audit log ──────────────────────────────────────────────

    pub fn append_audit(&self, entry: &AuditEntry) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO audit_log (at, event_type, payload) VALUES (?1, ?2, ?3)",
            params![entry.at, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    pub fn audit_entries(&self, event_type: &str) -> DeskResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, at, event_type, payload
             FROM audit_log WHERE event_type = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![event_type], |row| {
                Ok(AuditEntry {
                    id: Some(row.get(0)?),
                    at: row.get(1)?,
                    event_type: row.get(2)?,
                    payload: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Accrual run marker ─────────────────────────────────────

    /// Record (or overwrite) the sweep outcome for a local calendar date.
    /// A re-run after partial failure replaces the marker with the
    /// latest counts.
    pub fn record_accrual_run(
        &self,
        run_date: &str,
        started_at: &str,
        credited: u64,
        skipped: u64,
        failed: u64,
    ) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO accrual_run (run_date, started_at, credited, skipped, failed)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(run_date) DO UPDATE SET
                started_at = excluded.started_at,
                credited   = excluded.credited,
                skipped    = excluded.skipped,
                failed     = excluded.failed",
            params![
                run_date,
                started_at,
                credited as i64,
                skipped as i64,
                failed as i64
            ],
        )?;
        Ok(())
    }

    pub fn accrual_run_exists(&self, run_date: &str) -> DeskResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM accrual_run WHERE run_date = ?1",
            params![run_date],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
