//! Route handlers for the analysis API.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::heuristic::{self, HeuristicAnalysis};
use crate::analysis::report_parser::{self, StructuredAnalysis};
use crate::analysis::store;
use crate::errors::AppError;
use crate::intake::handlers::{gate, read_upload_form};
use crate::intake::validate::ValidationProfile;
use crate::llm_client::prompts;
use crate::models::analysis::AnalysisStats;
use crate::models::role::RoleRequirement;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub submission_id: Uuid,
    pub role_name: String,
    pub page_count: usize,
    pub analysis: HeuristicAnalysis,
}

#[derive(Debug, Serialize)]
pub struct AiAnalyzeResponse {
    pub submission_id: Uuid,
    pub role_name: String,
    pub model_used: String,
    pub analysis: StructuredAnalysis,
}

/// POST /api/v1/analyses
/// Heuristic analysis behind the strict intake profile.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = read_upload_form(multipart).await?;

    let role = lookup_role(&state, &form.role_name)?.clone();

    let extracted = gate(
        &form.file_bytes,
        &form.mime,
        &form.file_name,
        ValidationProfile::Strict,
    )?;

    let analysis = heuristic::analyze(&extracted.text, &role, form.categorized);

    let submission_id = Uuid::new_v4();
    store::save_heuristic_analysis(&state.db, submission_id, &role.name, &analysis).await?;

    info!(
        "Heuristic analysis stored (submission {submission_id}, role '{}', ats {})",
        role.name, analysis.ats_score
    );

    Ok(Json(AnalyzeResponse {
        submission_id,
        role_name: role.name,
        page_count: extracted.page_count,
        analysis,
    }))
}

/// POST /api/v1/analyses/ai
/// Model-backed analysis behind the relaxed intake profile. A provider
/// failure degrades to a placeholder result instead of a 5xx.
pub async fn handle_analyze_ai(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AiAnalyzeResponse>, AppError> {
    let form = read_upload_form(multipart).await?;

    let role = lookup_role(&state, &form.role_name)?.clone();

    let extracted = gate(
        &form.file_bytes,
        &form.mime,
        &form.file_name,
        ValidationProfile::Relaxed,
    )?;

    let role_detail = form.include_role_description.then_some(&role);
    let prompt = prompts::analysis_prompt(&extracted.text, Some(role.name.as_str()), role_detail);

    let analysis = match state.provider.generate(&prompt).await {
        Ok(report) => report_parser::parse(&report),
        Err(e) => {
            warn!("Model call failed, returning degraded analysis: {e}");
            StructuredAnalysis::degraded(e.to_string())
        }
    };

    let model_used = state.provider.model_name().to_string();
    let submission_id = Uuid::new_v4();
    store::save_ai_analysis(&state.db, submission_id, &role.name, &model_used, &analysis).await?;

    info!(
        "AI analysis stored (submission {submission_id}, role '{}', model {model_used}, score {})",
        role.name, analysis.score
    );

    Ok(Json(AiAnalyzeResponse {
        submission_id,
        role_name: role.name,
        model_used,
        analysis,
    }))
}

/// GET /api/v1/roles
pub async fn handle_list_roles(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleRequirement>>, AppError> {
    Ok(Json(state.roles.all().to_vec()))
}

/// GET /api/v1/stats
pub async fn handle_stats(
    State(state): State<AppState>,
) -> Result<Json<AnalysisStats>, AppError> {
    let stats = store::fetch_analysis_stats(&state.db).await?;
    Ok(Json(stats))
}

fn lookup_role<'a>(state: &'a AppState, name: &str) -> Result<&'a RoleRequirement, AppError> {
    state
        .roles
        .get(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown role '{name}'")))
}
