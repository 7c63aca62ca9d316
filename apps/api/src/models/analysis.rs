use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored result of a heuristic (non-AI) résumé analysis.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HeuristicAnalysisRow {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub role_name: String,
    pub keyword_score: i32,
    pub section_score: i32,
    pub format_score: i32,
    pub ats_score: i32,
    pub found_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored result of an AI-backed résumé analysis.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiAnalysisRow {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub role_name: String,
    pub model_used: String,
    pub resume_score: i32,
    pub ats_score: i32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One band of the score distribution reported by the stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub label: String,
    pub count: i64,
}

/// Aggregate statistics over stored AI analyses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total_analyses: i64,
    pub average_resume_score: f64,
    pub average_ats_score: f64,
    pub score_distribution: Vec<ScoreBucket>,
}
