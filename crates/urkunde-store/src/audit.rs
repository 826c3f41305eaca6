// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Audit trail — append-only SQLite log of issuance, verification and
// revocation events.
//
// Schema:
//   audit_log(
//     id        INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp TEXT    NOT NULL,   -- RFC 3339
//     action    TEXT    NOT NULL,   -- "issue", "verify", "revoke"
//     subject   TEXT    NOT NULL,   -- document id or masked verification code
//     success   INTEGER NOT NULL,   -- 0 = failure, 1 = success
//     details   TEXT                -- optional free-form context
//   )

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use urkunde_core::error::{GenerationError, Result};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS audit_log (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT    NOT NULL,
    action    TEXT    NOT NULL,
    subject   TEXT    NOT NULL,
    success   INTEGER NOT NULL,
    details   TEXT
);
CREATE INDEX IF NOT EXISTS idx_audit_subject ON audit_log(subject);";

/// Convert a `rusqlite::Error` into a `GenerationError::PersistenceFailure`.
fn db_err(e: rusqlite::Error) -> GenerationError {
    GenerationError::PersistenceFailure(format!("audit: {e}"))
}

/// A single entry in the audit log, used for queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub action: String,
    pub subject: String,
    pub success: bool,
    pub details: Option<String>,
}

/// Append-only audit log backed by a SQLite database.
pub struct AuditLog {
    conn: Mutex<Connection>,
}

impl AuditLog {
    /// Open (or create) the audit database at `path` in WAL mode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("audit log opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory audit database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory audit log opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| GenerationError::PersistenceFailure("audit lock poisoned".into()))
    }

    /// Record a new audit entry.
    #[instrument(skip(self, details), fields(%action, %subject, success))]
    pub fn record(
        &self,
        action: &str,
        subject: &str,
        success: bool,
        details: Option<&str>,
    ) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339();

        self.lock()?
            .execute(
                "INSERT INTO audit_log (timestamp, action, subject, success, details)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![timestamp, action, subject, success, details],
            )
            .map_err(db_err)?;

        debug!("audit entry recorded");
        Ok(())
    }

    /// All entries for `subject`, oldest first.
    pub fn entries_for_subject(&self, subject: &str) -> Result<Vec<AuditEntry>> {
        self.query(
            "SELECT id, timestamp, action, subject, success, details
             FROM audit_log
             WHERE subject = ?1
             ORDER BY id ASC",
            params![subject],
        )
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent_entries(&self, limit: u32) -> Result<Vec<AuditEntry>> {
        self.query(
            "SELECT id, timestamp, action, subject, success, details
             FROM audit_log
             ORDER BY id DESC
             LIMIT ?1",
            params![limit],
        )
    }

    /// Total number of entries in the audit log.
    pub fn count(&self) -> Result<u64> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .map_err(db_err)
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<AuditEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let entries = stmt
            .query_map(params, |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    action: row.get(2)?,
                    subject: row.get(3)?,
                    success: row.get(4)?,
                    details: row.get(5)?,
                })
            })
            .map_err(db_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_log() -> AuditLog {
        AuditLog::open_in_memory().expect("open in-memory audit log")
    }

    #[test]
    fn record_and_count() {
        let log = make_log();
        assert_eq!(log.count().unwrap(), 0);

        log.record("issue", "doc-1", true, None).unwrap();
        log.record("verify", "doc-1", true, Some("valid")).unwrap();

        assert_eq!(log.count().unwrap(), 2);
    }

    #[test]
    fn entries_for_subject() {
        let log = make_log();
        log.record("issue", "aaa", true, None).unwrap();
        log.record("issue", "bbb", true, None).unwrap();
        log.record("revoke", "aaa", false, Some("already revoked"))
            .unwrap();

        let entries = log.entries_for_subject("aaa").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "issue");
        assert!(entries[0].success);
        assert_eq!(entries[1].action, "revoke");
        assert!(!entries[1].success);
        assert_eq!(entries[1].details.as_deref(), Some("already revoked"));
    }

    #[test]
    fn recent_entries_ordering() {
        let log = make_log();
        for i in 0..5 {
            log.record("verify", &format!("code_{i}"), true, None).unwrap();
        }

        let recent = log.recent_entries(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent[0].id > recent[1].id);
        assert!(recent[1].id > recent[2].id);
        assert_eq!(recent[0].subject, "code_4");
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.db");
        AuditLog::open(&path)
            .unwrap()
            .record("issue", "doc-9", true, None)
            .unwrap();
        assert_eq!(AuditLog::open(&path).unwrap().count().unwrap(), 1);
    }
}
