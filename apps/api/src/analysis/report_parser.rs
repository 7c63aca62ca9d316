//! Converts the free-text markdown report produced by a model into typed
//! fields. Pure: no I/O, no model calls, deterministic for a given report.
//!
//! The scan is two-pass: first every `## Title` heading is located, then
//! section bodies are sliced between consecutive headings (or EOF). Unknown
//! headings are ignored so a chatty model cannot break the parse.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref RESUME_SCORE_RE: Regex = Regex::new(r"Resume Score:\s*(\d{1,3})/100").unwrap();
    static ref ATS_SCORE_RE: Regex = Regex::new(r"ATS Score:\s*(\d{1,3})/100").unwrap();
    static ref INT_RE: Regex = Regex::new(r"\b(\d{1,3})\b").unwrap();
    static ref BOLD_RE: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC_RE: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref UNDERLINE_BOLD_RE: Regex = Regex::new(r"__(.*?)__").unwrap();
    static ref UNDERLINE_RE: Regex = Regex::new(r"_(.*?)_").unwrap();
    static ref HEADING_RE: Regex = Regex::new(r"(?m)^#{1,6}\s+").unwrap();
    static ref LINK_RE: Regex = Regex::new(r"\[(.*?)\]\(.*?\)").unwrap();
}

pub const ERROR_STRENGTH: &str = "Unable to analyze resume due to an error.";
pub const ERROR_SUGGESTION: &str =
    "Try again with a different model or check your resume format.";

/// Typed view of a model-written analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    pub score: u32,
    pub ats_score: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub sections: BTreeMap<String, String>,
    pub full_report: String,
    pub error: Option<String>,
}

impl StructuredAnalysis {
    /// Defined result for an upstream failure. The parser is bypassed; the
    /// caller gets placeholders instead of an exception.
    pub fn degraded(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            score: 0,
            ats_score: 0,
            strengths: vec![ERROR_STRENGTH.to_string()],
            weaknesses: vec![ERROR_STRENGTH.to_string()],
            suggestions: vec![ERROR_SUGGESTION.to_string()],
            sections: BTreeMap::new(),
            full_report: format!("Error: {message}"),
            error: Some(message),
        }
    }
}

struct Section<'a> {
    title: &'a str,
    body: String,
}

/// Parses a raw markdown report into a `StructuredAnalysis`.
pub fn parse(raw_report: &str) -> StructuredAnalysis {
    let sections = scan_sections(raw_report);

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut suggestions = Vec::new();
    let mut named_sections = BTreeMap::new();
    let mut score_body: Option<&str> = None;
    let mut ats_body: Option<&str> = None;

    for section in &sections {
        match section.title {
            "Key Strengths" => strengths = bullet_items(&section.body),
            "Areas for Improvement" => weaknesses = bullet_items(&section.body),
            "Resume Score" => score_body = Some(&section.body),
            "ATS Optimization Assessment" => {
                ats_body = Some(&section.body);
                named_sections
                    .insert("ats_optimization".to_string(), strip_markdown(&section.body));
            }
            "Overall Assessment" => {
                named_sections
                    .insert("overall_assessment".to_string(), strip_markdown(&section.body));
            }
            "Professional Profile Analysis" => {
                named_sections
                    .insert("professional_profile".to_string(), strip_markdown(&section.body));
            }
            "Skills Analysis" => {
                named_sections
                    .insert("skills_analysis".to_string(), strip_markdown(&section.body));
            }
            "Experience Analysis" => {
                named_sections
                    .insert("experience_analysis".to_string(), strip_markdown(&section.body));
            }
            "Education Analysis" => {
                named_sections
                    .insert("education_analysis".to_string(), strip_markdown(&section.body));
            }
            "Role Alignment Analysis" => {
                named_sections
                    .insert("role_alignment".to_string(), strip_markdown(&section.body));
            }
            "Job Match Analysis" => {
                named_sections.insert("job_match".to_string(), strip_markdown(&section.body));
            }
            "Key Job Requirements Not Met" => {
                named_sections
                    .insert("unmet_requirements".to_string(), strip_markdown(&section.body));
            }
            title if title.starts_with("Recommended Courses") => {
                suggestions = bullet_items(&section.body);
            }
            _ => {}
        }
    }

    let score = extract_resume_score(score_body, raw_report);
    let ats_score = extract_ats_score(ats_body);

    StructuredAnalysis {
        score,
        ats_score,
        strengths,
        weaknesses,
        suggestions,
        sections: named_sections,
        full_report: raw_report.trim().to_string(),
        error: None,
    }
}

/// Pass 1 records every level-2 heading; pass 2 slices bodies between
/// consecutive headings.
fn scan_sections(report: &str) -> Vec<Section<'_>> {
    let lines: Vec<&str> = report.lines().collect();

    let mut headings: Vec<(usize, &str)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(title) = heading_title(line) {
            headings.push((i, title));
        }
    }

    let mut sections = Vec::with_capacity(headings.len());
    for (idx, &(line_no, title)) in headings.iter().enumerate() {
        let body_end = headings
            .get(idx + 1)
            .map(|&(next, _)| next)
            .unwrap_or(lines.len());
        let body = lines[line_no + 1..body_end].join("\n").trim().to_string();
        sections.push(Section { title, body });
    }
    sections
}

fn heading_title(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix("##")?;
    // "###" and deeper are not section headings.
    if rest.starts_with('#') {
        return None;
    }
    let title = rest.trim();
    (!title.is_empty()).then_some(title)
}

/// Resume score chain: labeled pattern in the Resume Score section, then any
/// standalone 1-3 digit integer there, then the labeled pattern over the
/// whole report, else 0.
fn extract_resume_score(score_body: Option<&str>, raw_report: &str) -> u32 {
    if let Some(body) = score_body {
        if let Some(score) = first_capture(&RESUME_SCORE_RE, body) {
            return score.min(100);
        }
        if let Some(score) = first_capture(&INT_RE, body) {
            return score.min(100);
        }
    }
    first_capture(&RESUME_SCORE_RE, raw_report)
        .map(|s| s.min(100))
        .unwrap_or(0)
}

/// ATS score is only trusted inside its own section; no fallback.
fn extract_ats_score(ats_body: Option<&str>) -> u32 {
    ats_body
        .and_then(|body| first_capture(&ATS_SCORE_RE, body))
        .map(|s| s.min(100))
        .unwrap_or(0)
}

fn first_capture(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Keeps only bullet lines, strips the marker, and cleans markdown.
/// Non-bullet prose inside a list section is dropped.
fn bullet_items(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let rest = trimmed
                .strip_prefix('-')
                .or_else(|| trimmed.strip_prefix('*'))
                .or_else(|| trimmed.strip_prefix('•'))?;
            let cleaned = strip_markdown(rest.trim_start());
            (!cleaned.is_empty()).then_some(cleaned)
        })
        .collect()
}

/// Removes bold/italic/underline emphasis, heading markers, and link syntax
/// (keeping the label), then trims.
pub fn strip_markdown(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = UNDERLINE_BOLD_RE.replace_all(&text, "$1");
    let text = UNDERLINE_RE.replace_all(&text, "$1");
    let text = HEADING_RE.replace_all(&text, "");
    let text = LINK_RE.replace_all(&text, "$1");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL_REPORT: &str = "\
## Overall Assessment
A **well structured** resume with a clear narrative.

## Professional Profile Analysis
Career progression is consistent with a backend focus.

## Skills Analysis
- **Current Skills**: Rust, SQL, Docker
- **Missing Skills**: Kubernetes

## Experience Analysis
Strong action verbs and quantified outcomes throughout.

## Education Analysis
Relevant degree; certifications would strengthen the profile.

## Key Strengths
- Strong *quantified* achievements
- Clear section structure
- Relevant keywords for the role

## Areas for Improvement
- Add a summary section
Some prose the model added that is not a bullet.
- Tighten long bullets

## ATS Optimization Assessment
The resume parses cleanly. ATS Score: 78/100. Add more role keywords.

## Recommended Courses/Certifications
- [CKA](https://example.com/cka) for Kubernetes
- **Advanced SQL** certification

## Resume Score
Resume Score: 82/100
";

    #[test]
    fn test_full_report_scores() {
        let parsed = parse(FULL_REPORT);
        assert_eq!(parsed.score, 82);
        assert_eq!(parsed.ats_score, 78);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_strengths_keep_order_and_lose_markdown() {
        let parsed = parse(FULL_REPORT);
        assert_eq!(
            parsed.strengths,
            vec![
                "Strong quantified achievements".to_string(),
                "Clear section structure".to_string(),
                "Relevant keywords for the role".to_string(),
            ]
        );
    }

    #[test]
    fn test_non_bullet_lines_are_dropped_from_lists() {
        let parsed = parse(FULL_REPORT);
        assert_eq!(
            parsed.weaknesses,
            vec![
                "Add a summary section".to_string(),
                "Tighten long bullets".to_string(),
            ]
        );
    }

    #[test]
    fn test_recommended_courses_matches_by_prefix_and_strips_links() {
        let parsed = parse(FULL_REPORT);
        assert_eq!(
            parsed.suggestions,
            vec![
                "CKA for Kubernetes".to_string(),
                "Advanced SQL certification".to_string(),
            ]
        );
    }

    #[test]
    fn test_free_text_sections_land_in_named_map() {
        let parsed = parse(FULL_REPORT);
        assert_eq!(
            parsed.sections.get("overall_assessment").map(String::as_str),
            Some("A well structured resume with a clear narrative.")
        );
        for key in [
            "professional_profile",
            "skills_analysis",
            "experience_analysis",
            "education_analysis",
            "ats_optimization",
        ] {
            assert!(parsed.sections.contains_key(key), "missing section {key}");
        }
        assert!(!parsed.sections.contains_key("role_alignment"));
    }

    #[test]
    fn test_role_and_job_sections_are_recognized() {
        let report = "\
## Role Alignment Analysis
Good alignment with the target role.

## Job Match Analysis
Roughly 70% match.

## Key Job Requirements Not Met
Kubernetes production experience.
";
        let parsed = parse(report);
        assert!(parsed.sections.contains_key("role_alignment"));
        assert!(parsed.sections.contains_key("job_match"));
        assert!(parsed.sections.contains_key("unmet_requirements"));
    }

    #[test]
    fn test_score_is_clamped_to_100() {
        let parsed = parse("## Resume Score\nResume Score: 130/100\n");
        assert_eq!(parsed.score, 100);
    }

    #[test]
    fn test_score_falls_back_to_bare_integer_in_section() {
        let parsed = parse("## Resume Score\nI would rate this resume 85 overall.\n");
        assert_eq!(parsed.score, 85);
    }

    #[test]
    fn test_score_labeled_pattern_found_outside_section() {
        let parsed = parse("The final verdict: Resume Score: 64/100. Good luck!");
        assert_eq!(parsed.score, 64);
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let parsed = parse("## Overall Assessment\nFine resume.\n");
        assert_eq!(parsed.score, 0);
    }

    #[test]
    fn test_ats_score_has_no_fallback() {
        let parsed = parse("## ATS Optimization Assessment\nScores around 92 usually.\n");
        assert_eq!(parsed.ats_score, 0);
    }

    #[test]
    fn test_ats_score_outside_its_section_is_ignored() {
        let parsed = parse("## Overall Assessment\nATS Score: 88/100\n");
        assert_eq!(parsed.ats_score, 0);
    }

    #[test]
    fn test_bullet_markers_dash_star_and_dot() {
        let parsed = parse("## Key Strengths\n- dash\n* star\n• dot\n");
        assert_eq!(parsed.strengths, vec!["dash", "star", "dot"]);
    }

    #[test]
    fn test_unknown_headings_are_ignored() {
        let parsed = parse("## Weather Forecast\nSunny.\n\n## Resume Score\nResume Score: 50/100\n");
        assert_eq!(parsed.score, 50);
        assert!(parsed.sections.is_empty());
    }

    #[test]
    fn test_deeper_headings_do_not_terminate_a_section() {
        let parsed = parse(
            "## Key Strengths\n- first\n### sub note\n- second\n\n## Resume Score\nResume Score: 70/100\n",
        );
        assert_eq!(parsed.strengths, vec!["first", "second"]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse(FULL_REPORT), parse(FULL_REPORT));
    }

    #[test]
    fn test_degraded_result_contract() {
        let degraded = StructuredAnalysis::degraded("connection reset");
        assert_eq!(degraded.score, 0);
        assert_eq!(degraded.ats_score, 0);
        assert_eq!(degraded.strengths, vec![ERROR_STRENGTH.to_string()]);
        assert_eq!(degraded.weaknesses, vec![ERROR_STRENGTH.to_string()]);
        assert_eq!(degraded.suggestions, vec![ERROR_SUGGESTION.to_string()]);
        assert_eq!(degraded.full_report, "Error: connection reset");
        assert_eq!(degraded.error.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_strip_markdown_variants() {
        assert_eq!(strip_markdown("**bold** and *italic*"), "bold and italic");
        assert_eq!(strip_markdown("__strong__ and _em_"), "strong and em");
        assert_eq!(strip_markdown("### Heading line"), "Heading line");
        assert_eq!(strip_markdown("[label](https://example.com)"), "label");
        assert_eq!(strip_markdown("  plain  "), "plain");
    }
}
