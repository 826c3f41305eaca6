// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SQLite document store — one table per document type.
//
// Maps (payload, secondary identifiers, security features) are stored as
// JSON text; timestamps as RFC 3339 with millisecond precision so that the
// signed `issued_at` survives a round trip unchanged.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::types::{DocumentId, DocumentRecord, DocumentStatus, DocumentType, NewDocument};

use super::{DocumentStore, apply_status};

/// Column list shared by every SELECT; `row_to_record` depends on the order.
const COLUMNS: &str = "id, identifier, secondary_identifiers, verification_code, user_id, \
     payload, security_features, digital_signature, document_hash, document_url, qr_code_url, \
     status, issued_at, expires_at, revoked_at, revocation_reason";

fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> GenerationError + '_ {
    move |e| GenerationError::PersistenceFailure(format!("{context}: {e}"))
}

fn table(doc_type: DocumentType) -> String {
    format!("{}_documents", doc_type.tag())
}

fn create_table_sql(doc_type: DocumentType) -> String {
    let table = table(doc_type);
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            identifier TEXT NOT NULL UNIQUE,
            secondary_identifiers TEXT NOT NULL DEFAULT '{{}}',
            verification_code TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL,
            payload TEXT NOT NULL,
            security_features TEXT NOT NULL,
            digital_signature TEXT NOT NULL,
            document_hash TEXT NOT NULL,
            document_url TEXT,
            qr_code_url TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            issued_at TEXT NOT NULL,
            expires_at TEXT,
            revoked_at TEXT,
            revocation_reason TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_user ON {table}(user_id);
        "#
    )
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Document store backed by a single SQLite database.
///
/// `rusqlite::Connection` is not `Sync`, so it sits behind a mutex; calls
/// are short and never held across other I/O.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (or create) the database at `path` in WAL mode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db_err("open"))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err("WAL pragma"))?;
        Self::init(&conn)?;

        info!("document store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err("open in-memory"))?;
        Self::init(&conn)?;

        debug!("in-memory document store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init(conn: &Connection) -> Result<()> {
        for doc_type in DocumentType::ALL {
            conn.execute_batch(&create_table_sql(doc_type))
                .map_err(db_err("create table"))?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| GenerationError::PersistenceFailure("connection lock poisoned".into()))
    }

    fn find_in(
        conn: &Connection,
        doc_type: DocumentType,
        column: &str,
        value: &str,
    ) -> Result<Option<DocumentRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE {column} = ?1",
            table(doc_type)
        );
        conn.query_row(&sql, params![value], |row| row_to_record(row, doc_type))
            .optional()
            .map_err(db_err("select document"))
    }

    fn find_by_id(conn: &Connection, id: &DocumentId) -> Result<Option<DocumentRecord>> {
        let id = id.to_string();
        for doc_type in DocumentType::ALL {
            if let Some(record) = Self::find_in(conn, doc_type, "id", &id)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Identifier lookup across every table sharing `doc_type`'s scheme.
    fn identifier_taken(
        conn: &Connection,
        doc_type: DocumentType,
        identifier: &str,
    ) -> Result<bool> {
        for peer in doc_type.identifier_peers() {
            let sql = format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE identifier = ?1)",
                table(peer)
            );
            let found: bool = conn
                .query_row(&sql, params![identifier], |row| row.get(0))
                .map_err(db_err("identifier lookup"))?;
            if found {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn code_exists(conn: &Connection, code: &str) -> Result<bool> {
        for doc_type in DocumentType::ALL {
            let sql = format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE verification_code = ?1)",
                table(doc_type)
            );
            let found: bool = conn
                .query_row(&sql, params![code], |row| row.get(0))
                .map_err(db_err("code lookup"))?;
            if found {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl DocumentStore for SqliteDocumentStore {
    #[instrument(skip_all, fields(document_type = %doc.document_type, identifier = %doc.identifier))]
    fn create(&self, doc: NewDocument) -> Result<DocumentRecord> {
        let conn = self.lock()?;

        // Codes are unique across partitions and identifiers across peer
        // partitions; SQLite only enforces either per table.
        if Self::code_exists(&conn, &doc.verification_code)? {
            return Err(GenerationError::PersistenceFailure(
                "verification code already in use".into(),
            ));
        }
        if Self::identifier_taken(&conn, doc.document_type, &doc.identifier)? {
            return Err(GenerationError::PersistenceFailure(
                "identifier already in use".into(),
            ));
        }

        let record = DocumentRecord::from_new(DocumentId::new(), doc);
        let sql = format!(
            "INSERT INTO {} ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            table(record.document_type)
        );

        conn.execute(
            &sql,
            params![
                record.id.to_string(),
                record.identifier,
                serde_json::to_string(&record.secondary_identifiers)?,
                record.verification_code,
                record.user_id,
                serde_json::to_string(&record.payload)?,
                serde_json::to_string(&record.security_features)?,
                record.digital_signature,
                record.document_hash,
                record.document_url,
                record.qr_code_url,
                record.status.as_str(),
                timestamp(record.issued_at),
                record.expires_at.map(timestamp),
                record.revoked_at.map(timestamp),
                record.revocation_reason,
            ],
        )
        .map_err(db_err("insert document"))?;

        info!(document_id = %record.id, "document persisted");
        Ok(record)
    }

    fn get_by_id(&self, id: &DocumentId) -> Result<Option<DocumentRecord>> {
        let conn = self.lock()?;
        Self::find_by_id(&conn, id)
    }

    fn get_by_verification_code(
        &self,
        doc_type: DocumentType,
        code: &str,
    ) -> Result<Option<DocumentRecord>> {
        let conn = self.lock()?;
        Self::find_in(&conn, doc_type, "verification_code", code)
    }

    #[instrument(skip_all, fields(document_id = %id, %status))]
    fn set_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
        reason: Option<&str>,
    ) -> Result<DocumentRecord> {
        let conn = self.lock()?;
        let mut record = Self::find_by_id(&conn, id)?
            .ok_or_else(|| GenerationError::NotFound(id.to_string()))?;

        if !apply_status(&mut record, status, reason, Utc::now())? {
            debug!("status unchanged");
            return Ok(record);
        }

        let sql = format!(
            "UPDATE {} SET status = ?1, revoked_at = ?2, revocation_reason = ?3 WHERE id = ?4",
            table(record.document_type)
        );
        conn.execute(
            &sql,
            params![
                record.status.as_str(),
                record.revoked_at.map(timestamp),
                record.revocation_reason,
                record.id.to_string(),
            ],
        )
        .map_err(db_err("update status"))?;

        info!("document status updated");
        Ok(record)
    }

    fn identifier_exists(&self, doc_type: DocumentType, identifier: &str) -> Result<bool> {
        let conn = self.lock()?;
        Self::identifier_taken(&conn, doc_type, identifier)
    }

    fn verification_code_exists(&self, code: &str) -> Result<bool> {
        let conn = self.lock()?;
        Self::code_exists(&conn, code)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn conversion_err<E>(column: usize) -> impl FnOnce(E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    }
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    column: usize,
) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(conversion_err(column))
}

fn time_column(
    row: &rusqlite::Row<'_>,
    column: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(column)?;
    text.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(conversion_err(column))
    })
    .transpose()
}

/// Map a row selected with [`COLUMNS`] to a record.
fn row_to_record(
    row: &rusqlite::Row<'_>,
    document_type: DocumentType,
) -> rusqlite::Result<DocumentRecord> {
    let id_str: String = row.get(0)?;
    let id = uuid::Uuid::parse_str(&id_str)
        .map(DocumentId)
        .map_err(conversion_err(0))?;

    let status_str: String = row.get(11)?;
    let status: DocumentStatus = status_str.parse().map_err(conversion_err(11))?;

    let issued_at = time_column(row, 12)?.ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            12,
            rusqlite::types::Type::Null,
            "issued_at is null".into(),
        )
    })?;

    Ok(DocumentRecord {
        id,
        document_type,
        identifier: row.get(1)?,
        secondary_identifiers: json_column(row, 2)?,
        verification_code: row.get(3)?,
        user_id: row.get(4)?,
        payload: json_column(row, 5)?,
        security_features: json_column(row, 6)?,
        digital_signature: row.get(7)?,
        document_hash: row.get(8)?,
        document_url: row.get(9)?,
        qr_code_url: row.get(10)?,
        status,
        issued_at,
        expires_at: time_column(row, 13)?,
        revoked_at: time_column(row, 14)?,
        revocation_reason: row.get(15)?,
    })
}
