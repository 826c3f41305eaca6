// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Urkunde — official document issuing engine.
//
// Entry point. Initialises logging, opens storage under the data directory
// and runs one command. Results are JSON on stdout; failures are reported as
// a generic public failure on stderr with exit status 1.

mod services;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::failure::public_failure;
use urkunde_core::types::{DocumentId, DocumentType, IssueRequest, Payload};

use services::app_services::AppServices;

#[derive(Debug, Parser)]
#[command(name = "urkunde", version)]
#[command(about = "Issue, verify and revoke official documents", long_about = None)]
struct Cli {
    /// Engine config file (JSON). Defaults to `<data-dir>/config.json`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the databases and rendered documents.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Issue a document from a JSON payload file
    Issue {
        /// Document type tag, e.g. `birth_certificate`
        #[arg(long = "type")]
        doc_type: DocumentType,
        /// Owner reference of the applicant
        #[arg(long)]
        owner: String,
        /// JSON object with the type-specific fields
        #[arg(long)]
        payload: Option<PathBuf>,
        /// Explicit expiry (RFC 3339)
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,
        /// Also copy the rendered PDF here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Look up a verification code
    Verify { code: String },
    /// Revoke a document by id
    Revoke {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Print the full stored record
    Show { id: String },
    /// Check that a PDF file is the one issued for a document
    Check { id: String, pdf: PathBuf },
    /// List audit entries, newest first
    Audit {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Only entries for this document id or subject
        #[arg(long)]
        subject: Option<String>,
    },
}

/// What `issue` prints.
#[derive(Debug, Serialize)]
struct IssueSummary {
    id: DocumentId,
    document_type: DocumentType,
    identifier: String,
    verification_code: String,
    verification_url: String,
    document_url: Option<String>,
    qr_code_url: Option<String>,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), error = %e, "command failed");
            let failure = public_failure(&e);
            match serde_json::to_string_pretty(&failure) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{}", failure.message),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let services = AppServices::init(cli.data_dir.as_deref(), cli.config.as_deref())?;
    tracing::debug!(data_dir = %services.data_dir().display(), "services ready");

    match cli.command {
        Command::Issue {
            doc_type,
            owner,
            payload,
            expires_at,
            out,
        } => {
            let mut request = IssueRequest::new(doc_type, owner);
            if let Some(path) = payload {
                request.payload = read_payload(&path)?;
            }
            request.expires_at = expires_at;

            let issued = services.engine.issue(request)?;
            if let Some(out) = out {
                std::fs::write(&out, &issued.pdf)?;
            }
            let record = issued.record;
            print_json(&IssueSummary {
                id: record.id,
                document_type: record.document_type,
                identifier: record.identifier,
                verification_code: record.verification_code,
                verification_url: issued.verification_url,
                document_url: record.document_url,
                qr_code_url: record.qr_code_url,
                issued_at: record.issued_at,
                expires_at: record.expires_at,
            })
        }
        Command::Verify { code } => print_json(&services.engine.verify(&code)?),
        Command::Revoke { id, reason } => {
            let record = services
                .engine
                .revoke(&parse_id(&id)?, reason.as_deref())?;
            print_json(&record)
        }
        Command::Show { id } => print_json(&services.engine.document(&parse_id(&id)?)?),
        Command::Check { id, pdf } => {
            let bytes = std::fs::read(&pdf)?;
            let record = services.engine.verify_artifact(&parse_id(&id)?, &bytes)?;
            print_json(&serde_json::json!({
                "matches": true,
                "id": record.id,
                "identifier": record.identifier,
            }))
        }
        Command::Audit { limit, subject } => {
            let entries = match subject {
                Some(subject) => services.audit_entries_for_subject(&subject)?,
                None => services.recent_audit_entries(limit)?,
            };
            print_json(&entries)
        }
    }
}

fn parse_id(raw: &str) -> Result<DocumentId> {
    DocumentId::parse(raw).ok_or_else(|| GenerationError::NotFound(raw.to_owned()))
}

/// Payload files hold one JSON object.
fn read_payload(path: &Path) -> Result<Payload> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn issue_arguments_parse() {
        let cli = Cli::try_parse_from([
            "urkunde",
            "--data-dir",
            "/tmp/urkunde",
            "issue",
            "--type",
            "work-permit",
            "--owner",
            "applicant-1",
            "--expires-at",
            "2027-01-01T00:00:00Z",
        ])
        .unwrap();

        assert_eq!(cli.data_dir.as_deref(), Some(Path::new("/tmp/urkunde")));
        match cli.command {
            Command::Issue {
                doc_type,
                owner,
                expires_at,
                payload,
                ..
            } => {
                assert_eq!(doc_type, DocumentType::WorkPermit);
                assert_eq!(owner, "applicant-1");
                assert!(expires_at.is_some());
                assert!(payload.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let parsed = Cli::try_parse_from([
            "urkunde", "issue", "--type", "library_card", "--owner", "x",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn payload_must_be_an_object() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good.json");
        std::fs::write(&good, r#"{ "fullName": "Jane Doe", "tags": ["a"] }"#).unwrap();
        let payload = read_payload(&good).unwrap();
        assert_eq!(payload["fullName"], "Jane Doe");

        let bad = tmp.path().join("bad.json");
        std::fs::write(&bad, "[1, 2, 3]").unwrap();
        assert!(matches!(
            read_payload(&bad),
            Err(GenerationError::Serialization(_))
        ));
    }

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_id("nope"), Err(GenerationError::NotFound(_))));
        let id = DocumentId::new();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
