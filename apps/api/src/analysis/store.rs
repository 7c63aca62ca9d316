//! Persistence for analysis results and the aggregate stats query.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::heuristic::HeuristicAnalysis;
use crate::analysis::report_parser::StructuredAnalysis;
use crate::errors::AppError;
use crate::models::analysis::{AiAnalysisRow, AnalysisStats, HeuristicAnalysisRow, ScoreBucket};

const BUCKET_LABELS: &[&str] = &["0-19", "20-39", "40-59", "60-79", "80-100"];

pub async fn save_heuristic_analysis(
    pool: &PgPool,
    submission_id: Uuid,
    role_name: &str,
    analysis: &HeuristicAnalysis,
) -> Result<HeuristicAnalysisRow, AppError> {
    let row = HeuristicAnalysisRow {
        id: Uuid::new_v4(),
        submission_id,
        role_name: role_name.to_string(),
        keyword_score: analysis.keyword_match.score as i32,
        section_score: analysis.section_score as i32,
        format_score: analysis.format_score as i32,
        ats_score: analysis.ats_score as i32,
        found_skills: analysis.keyword_match.found_skills.clone(),
        missing_skills: analysis.keyword_match.missing_skills.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO heuristic_analyses
            (id, submission_id, role_name, keyword_score, section_score,
             format_score, ats_score, found_skills, missing_skills, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(row.id)
    .bind(row.submission_id)
    .bind(&row.role_name)
    .bind(row.keyword_score)
    .bind(row.section_score)
    .bind(row.format_score)
    .bind(row.ats_score)
    .bind(&row.found_skills)
    .bind(&row.missing_skills)
    .bind(row.created_at)
    .execute(pool)
    .await?;

    Ok(row)
}

pub async fn save_ai_analysis(
    pool: &PgPool,
    submission_id: Uuid,
    role_name: &str,
    model_used: &str,
    analysis: &StructuredAnalysis,
) -> Result<AiAnalysisRow, AppError> {
    let row = AiAnalysisRow {
        id: Uuid::new_v4(),
        submission_id,
        role_name: role_name.to_string(),
        model_used: model_used.to_string(),
        resume_score: analysis.score as i32,
        ats_score: analysis.ats_score as i32,
        strengths: analysis.strengths.clone(),
        weaknesses: analysis.weaknesses.clone(),
        suggestions: analysis.suggestions.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO ai_analyses
            (id, submission_id, role_name, model_used, resume_score,
             ats_score, strengths, weaknesses, suggestions, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(row.id)
    .bind(row.submission_id)
    .bind(&row.role_name)
    .bind(&row.model_used)
    .bind(row.resume_score)
    .bind(row.ats_score)
    .bind(&row.strengths)
    .bind(&row.weaknesses)
    .bind(&row.suggestions)
    .bind(row.created_at)
    .execute(pool)
    .await?;

    Ok(row)
}

/// Fetches every stored AI score pair and aggregates in process. The table
/// stays small enough that a single scan beats five filtered COUNT queries.
pub async fn fetch_analysis_stats(pool: &PgPool) -> Result<AnalysisStats, AppError> {
    let scores: Vec<(i32, i32)> =
        sqlx::query_as("SELECT resume_score, ats_score FROM ai_analyses")
            .fetch_all(pool)
            .await?;

    Ok(compute_stats(&scores))
}

fn compute_stats(scores: &[(i32, i32)]) -> AnalysisStats {
    let mut buckets = [0i64; 5];
    for &(resume_score, _) in scores {
        let idx = match resume_score {
            0..=19 => 0,
            20..=39 => 1,
            40..=59 => 2,
            60..=79 => 3,
            _ => 4,
        };
        buckets[idx] += 1;
    }

    let total = scores.len() as i64;
    let (avg_resume, avg_ats) = if scores.is_empty() {
        (0.0, 0.0)
    } else {
        let sum_resume: i64 = scores.iter().map(|&(r, _)| r as i64).sum();
        let sum_ats: i64 = scores.iter().map(|&(_, a)| a as i64).sum();
        (sum_resume as f64 / total as f64, sum_ats as f64 / total as f64)
    };

    AnalysisStats {
        total_analyses: total,
        average_resume_score: avg_resume,
        average_ats_score: avg_ats,
        score_distribution: BUCKET_LABELS
            .iter()
            .zip(buckets)
            .map(|(label, count)| ScoreBucket {
                label: label.to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_for_empty_table() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_analyses, 0);
        assert_eq!(stats.average_resume_score, 0.0);
        assert_eq!(stats.average_ats_score, 0.0);
        assert_eq!(stats.score_distribution.len(), 5);
        assert!(stats.score_distribution.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_scores_land_in_their_buckets() {
        let stats = compute_stats(&[(0, 50), (19, 50), (20, 50), (59, 50), (60, 50), (80, 50), (100, 50)]);
        let counts: Vec<i64> = stats.score_distribution.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 1, 2]);
    }

    #[test]
    fn test_averages_over_both_score_kinds() {
        let stats = compute_stats(&[(80, 60), (60, 80)]);
        assert_eq!(stats.total_analyses, 2);
        assert_eq!(stats.average_resume_score, 70.0);
        assert_eq!(stats.average_ats_score, 70.0);
    }

    #[test]
    fn test_bucket_labels_cover_the_full_range() {
        let stats = compute_stats(&[(90, 90)]);
        let labels: Vec<&str> = stats
            .score_distribution
            .iter()
            .map(|b| b.label.as_str())
            .collect();
        assert_eq!(labels, vec!["0-19", "20-39", "40-59", "60-79", "80-100"]);
    }
}
