//! Axum route handlers for the analysis API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::alignment::AlignmentReport;
use crate::analysis::insight::{build_insight, InterviewerInsight};
use crate::analysis::overview::{generate_overview, summarize_transcript};
use crate::documents::{extract_text, DocumentKind};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub kind: DocumentKind,
    pub text: String,
    pub char_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct AlignmentRequest {
    pub jd_text: String,
    pub cv_text: String,
}

#[derive(Debug, Serialize)]
pub struct AlignmentResponse {
    pub report: AlignmentReport,
    pub insight: InterviewerInsight,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub cv_kind: DocumentKind,
    pub report: AlignmentReport,
    pub insight: InterviewerInsight,
    /// `None` when not requested or when no LLM is configured.
    pub overview: Option<String>,
    pub transcript_summary: Option<String>,
}

/// A file part pulled out of a multipart form.
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

impl Upload {
    /// PDF and DOCX parsing is CPU-bound, so it runs on the blocking pool.
    async fn extract(self) -> Result<(DocumentKind, String), AppError> {
        let kind =
            DocumentKind::detect(self.file_name.as_deref(), self.content_type.as_deref())?;
        let bytes = self.bytes;
        let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "spawn_blocking failed in document extraction: {e}"
                ))
            })??;
        Ok((kind, text))
    }
}

#[derive(Default)]
struct AnalyzeForm {
    job_description: Option<String>,
    cv: Option<Upload>,
    transcript: Option<Upload>,
    include_overview: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/extract
///
/// Multipart field `file`. Returns the lowercase text the scorer would see.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            upload = Some(read_upload(field, state.config.max_upload_bytes).await?);
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::Validation("multipart field 'file' is required".into()))?;
    let (kind, text) = upload.extract().await?;

    Ok(Json(ExtractResponse {
        kind,
        char_count: text.chars().count(),
        text,
    }))
}

/// POST /api/v1/alignment
///
/// Scores already-extracted text. Never calls the LLM.
pub async fn handle_alignment(
    State(state): State<AppState>,
    Json(request): Json<AlignmentRequest>,
) -> Result<Json<AlignmentResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }
    if request.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cv_text cannot be empty".to_string()));
    }

    let report = state
        .scorer
        .score(&request.jd_text, &request.cv_text)
        .await?;
    let insight = build_insight(&report);

    Ok(Json(AlignmentResponse { report, insight }))
}

/// POST /api/v1/analyze
///
/// Multipart fields: `job_description` (text), `cv` (file), optional
/// `transcript` (file) and `include_overview` (bool, default true).
/// Full pipeline: extract → score → insight → LLM overview / transcript summary.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = read_analyze_form(multipart, state.config.max_upload_bytes).await?;

    let jd_text = form
        .job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;
    let cv = form
        .cv
        .ok_or_else(|| AppError::Validation("multipart field 'cv' is required".to_string()))?;

    let (cv_kind, cv_text) = cv.extract().await?;
    let transcript_text = match form.transcript {
        Some(upload) => Some(upload.extract().await?.1),
        None => None,
    };

    let report = state.scorer.score(&jd_text, &cv_text).await?;
    let insight = build_insight(&report);

    let include_overview = form.include_overview.unwrap_or(true);
    let (overview, transcript_summary) = match state.llm.as_deref() {
        Some(llm) => {
            let overview_fut = async {
                if include_overview {
                    generate_overview(llm, &state.overview_cache, &jd_text, &cv_text)
                        .await
                        .map(Some)
                } else {
                    Ok(None)
                }
            };
            let transcript_fut = async {
                match &transcript_text {
                    Some(t) => summarize_transcript(llm, &jd_text, t).await.map(Some),
                    None => Ok(None),
                }
            };
            tokio::try_join!(overview_fut, transcript_fut)?
        }
        None => {
            if include_overview || transcript_text.is_some() {
                warn!("No LLM configured (GEMINI_API_KEY unset); skipping overview and transcript summary");
            }
            (None, None)
        }
    };

    let analysis_id = Uuid::new_v4();
    info!(
        %analysis_id,
        overall_score = report.overall_score,
        with_overview = overview.is_some(),
        with_transcript = transcript_summary.is_some(),
        "Analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        analysis_id,
        generated_at: Utc::now(),
        cv_kind,
        report,
        insight,
        overview,
        transcript_summary,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_analyze_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("job_description") => {
                form.job_description = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("cv") => form.cv = Some(read_upload(field, max_upload_bytes).await?),
            Some("transcript") => {
                form.transcript = Some(read_upload(field, max_upload_bytes).await?)
            }
            Some("include_overview") => {
                let raw = field.text().await.map_err(multipart_error)?;
                form.include_overview = Some(parse_flag(&raw)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_upload(
    field: axum::extract::multipart::Field<'_>,
    max_upload_bytes: usize,
) -> Result<Upload, AppError> {
    let file_name = field.file_name().map(String::from);
    let content_type = field.content_type().map(String::from);
    let bytes = field.bytes().await.map_err(multipart_error)?;

    if bytes.len() > max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "upload is {} bytes, limit is {max_upload_bytes}",
            bytes.len()
        )));
    }

    Ok(Upload {
        file_name,
        content_type,
        bytes,
    })
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(AppError::Validation(format!(
            "include_overview must be a boolean, got '{other}'"
        ))),
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("invalid multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(parse_flag(" on ").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(!parse_flag("no").unwrap());
    }

    #[test]
    fn test_parse_flag_rejects_garbage() {
        assert!(matches!(parse_flag("maybe"), Err(AppError::Validation(_))));
    }
}
