//! Multipart upload handling and the intake gate that sits in front of
//! both analysis endpoints.

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::intake::extract::{self, ExtractedText};
use crate::intake::validate::{validate, ValidationProfile, ValidationVerdict};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Decoded multipart form for the analysis endpoints.
pub struct UploadForm {
    pub file_bytes: Bytes,
    pub mime: String,
    pub file_name: String,
    pub role_name: String,
    pub categorized: bool,
    pub include_role_description: bool,
}

/// Reads the multipart body into an `UploadForm`. The `file` and `role`
/// parts are required; boolean flags default to false when absent.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file_bytes: Option<Bytes> = None;
    let mut mime = FALLBACK_MIME.to_string();
    let mut file_name = String::new();
    let mut role_name: Option<String> = None;
    let mut categorized = false;
    let mut include_role_description = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if let Some(content_type) = field.content_type() {
                    mime = content_type.to_string();
                }
                if let Some(original) = field.file_name() {
                    file_name = original.to_string();
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file part: {e}")))?;
                file_bytes = Some(bytes);
            }
            "role" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read role part: {e}")))?;
                role_name = Some(value);
            }
            "categorized" => {
                categorized = bool_field(field).await?;
            }
            "include_role_description" => {
                include_role_description = bool_field(field).await?;
            }
            // Unknown parts are skipped so clients can evolve ahead of us.
            _ => {}
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| AppError::Validation("Missing 'file' part".to_string()))?;
    if file_bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    let role_name =
        role_name.ok_or_else(|| AppError::Validation("Missing 'role' part".to_string()))?;

    Ok(UploadForm {
        file_bytes,
        mime,
        file_name,
        role_name,
        categorized,
        include_role_description,
    })
}

async fn bool_field(field: axum::extract::multipart::Field<'_>) -> Result<bool, AppError> {
    let value = field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))?;
    Ok(matches!(value.trim(), "true" | "1" | "yes"))
}

/// Extracts text from the upload and runs the résumé gate. Returns the
/// extracted text on acceptance. The failed rule is logged here only; the
/// client sees a generic rejection.
pub fn gate(
    bytes: &[u8],
    mime: &str,
    file_name: &str,
    profile: ValidationProfile,
) -> Result<ExtractedText, AppError> {
    let extracted = extract::extract(bytes, mime)?;

    info!(
        "Extracted {} chars over {} page(s) from '{file_name}'",
        extracted.text.len(),
        extracted.page_count
    );

    match validate(&extracted.text, extracted.page_count, profile) {
        ValidationVerdict::Accept => Ok(extracted),
        ValidationVerdict::Reject(reason) => {
            debug!("Intake gate rejected '{file_name}': {reason:?}");
            Err(AppError::NotAResume)
        }
    }
}
