//! Upload ingestion: multipart reading and transactional persistence.
//!
//! Each upload carries exactly one XML document. The repo and branch named in
//! the URL are resolved (created on first sight) inside the same transaction
//! that writes the report tree, so a failed parse or insert leaves nothing
//! behind.

use actix_multipart::Multipart;
use futures_util::StreamExt;
use sea_orm::TransactionTrait;
use tracing::info;
use uuid::Uuid;

use crate::db::{self, DbPool};
use crate::entity::{coverage_report, test_report};
use crate::error::{AppError, AppResult};
use crate::services::parser;

/// One uploaded report document, buffered in memory.
pub struct UploadedFile {
    pub data: Vec<u8>,
    /// MIME type declared on the multipart field.
    pub content_type: Option<String>,
}

/// Read the first file field out of a multipart payload.
///
/// Report documents are small enough to buffer; the configured size limit
/// bounds the buffer. Fields without a filename are skipped, and a payload
/// with no file at all is a client error.
pub async fn read_single_file(
    payload: &mut Multipart,
    max_upload_size: usize,
) -> AppResult<UploadedFile> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let has_filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();
        if !has_filename {
            continue;
        }

        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() + chunk.len() > max_upload_size {
                return Err(AppError::InvalidInput(format!(
                    "File exceeds upload size limit of {} bytes",
                    max_upload_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(AppError::NoFileUploaded);
        }

        return Ok(UploadedFile { data, content_type });
    }

    Err(AppError::NoFileUploaded)
}

/// Parse and persist a JUnit-style test report for the named repo and branch.
pub async fn ingest_test_report(
    pool: &DbPool,
    organization_id: Uuid,
    repo_name: &str,
    branch_name: &str,
    file: &UploadedFile,
) -> AppResult<test_report::Model> {
    let parsed = parser::parse_test_report(&file.data, file.content_type.as_deref())?;

    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let repo = db::find_or_create_repo(&txn, organization_id, repo_name).await?;
    let branch = db::find_or_create_branch(&txn, repo.id, branch_name).await?;
    let report = db::insert_test_report_tree(&txn, branch.id, &parsed).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit test report: {}", e)))?;

    info!(
        report_id = %report.id,
        repo = repo_name,
        branch = branch_name,
        suites = parsed.suites.len(),
        "Ingested test report"
    );

    Ok(report)
}

/// Parse and persist a Cobertura-style coverage report for the named repo
/// and branch.
pub async fn ingest_coverage_report(
    pool: &DbPool,
    organization_id: Uuid,
    repo_name: &str,
    branch_name: &str,
    file: &UploadedFile,
) -> AppResult<coverage_report::Model> {
    let parsed = parser::parse_coverage_report(&file.data, file.content_type.as_deref())?;

    let txn = pool
        .connection()
        .begin()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    let repo = db::find_or_create_repo(&txn, organization_id, repo_name).await?;
    let branch = db::find_or_create_branch(&txn, repo.id, branch_name).await?;
    let report = db::insert_coverage_report_tree(&txn, branch.id, &parsed).await?;

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit coverage report: {}", e)))?;

    info!(
        report_id = %report.id,
        repo = repo_name,
        branch = branch_name,
        files = parsed.files.len(),
        "Ingested coverage report"
    );

    Ok(report)
}
