//! Deterministic résumé scorer. No LLM call; every score is a pure function
//! of the extracted text and the target role's required skills.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::role::RoleRequirement;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").unwrap();
}

const SECTION_HEADERS: &[&str] = &["experience", "education", "skills", "summary", "projects"];
const LONG_LINE_CHARS: usize = 120;

/// How required skills split against the résumé text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub score: u32,
    pub found_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizedSuggestions {
    pub contact: Vec<String>,
    pub skills: Vec<String>,
    pub formatting: Vec<String>,
}

/// Advisory output. Callers pick the shape; both serialize naturally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Suggestions {
    Flat(Vec<String>),
    Categorized(CategorizedSuggestions),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicAnalysis {
    pub keyword_match: KeywordMatch,
    pub section_score: u32,
    pub format_score: u32,
    pub ats_score: u32,
    pub suggestions: Suggestions,
}

/// Scores a résumé against a role. `categorized` selects the bucketed
/// suggestion shape instead of the flat list.
pub fn analyze(text: &str, role: &RoleRequirement, categorized: bool) -> HeuristicAnalysis {
    let lowered = text.to_lowercase();

    let keyword_match = match_keywords(&lowered, &role.required_skills);
    let section_score = score_sections(&lowered);
    let format_score = score_format(text);
    let ats_score = blend_ats(keyword_match.score, format_score);

    let suggestions = build_suggestions(text, &lowered, &keyword_match, categorized);

    HeuristicAnalysis {
        keyword_match,
        section_score,
        format_score,
        ats_score,
        suggestions,
    }
}

/// Case-insensitive substring match of each required skill.
/// An empty requirement list scores 0 with empty partitions.
fn match_keywords(lowered: &str, required_skills: &[String]) -> KeywordMatch {
    if required_skills.is_empty() {
        return KeywordMatch {
            score: 0,
            found_skills: vec![],
            missing_skills: vec![],
        };
    }

    let mut found_skills = Vec::new();
    let mut missing_skills = Vec::new();
    for skill in required_skills {
        if lowered.contains(&skill.to_lowercase()) {
            found_skills.push(skill.clone());
        } else {
            missing_skills.push(skill.clone());
        }
    }

    let score = ((found_skills.len() as f64 / required_skills.len() as f64) * 100.0).round() as u32;

    KeywordMatch {
        score,
        found_skills,
        missing_skills,
    }
}

/// Presence of the expected résumé structure: a contact block plus the three
/// core sections, 25 points each.
fn score_sections(lowered: &str) -> u32 {
    let mut score = 0;
    if EMAIL_RE.is_match(lowered) {
        score += 25;
    }
    for section in ["experience", "education", "skills"] {
        if lowered.contains(section) {
            score += 25;
        }
    }
    score
}

/// Formatting signals: bullets, quantified lines, section headers, and
/// line lengths an ATS can digest.
fn score_format(text: &str) -> u32 {
    if text.trim().is_empty() {
        return 0;
    }

    let lines: Vec<&str> = text.lines().collect();

    let bullet_lines = lines.iter().filter(|l| is_bullet_line(l)).count();
    let bullet_points = match bullet_lines {
        0 => 0,
        1 | 2 => 15,
        _ => 30,
    };

    let quantified_lines = lines
        .iter()
        .filter(|l| l.chars().any(|c| c.is_ascii_digit()))
        .count();
    let quantified_points = match quantified_lines {
        0 => 0,
        1 | 2 => 12,
        _ => 25,
    };

    let header_lines = lines
        .iter()
        .filter(|l| {
            let trimmed = l.trim().to_lowercase();
            !trimmed.is_empty()
                && trimmed.chars().count() < 40
                && SECTION_HEADERS.iter().any(|h| trimmed.starts_with(h))
        })
        .count();
    let header_points = match header_lines {
        0 => 0,
        1 => 12,
        _ => 25,
    };

    let nonempty = lines.iter().filter(|l| !l.trim().is_empty()).count();
    let short_enough = lines
        .iter()
        .filter(|l| !l.trim().is_empty() && l.chars().count() <= LONG_LINE_CHARS)
        .count();
    let line_points = if nonempty == 0 {
        0
    } else {
        let ratio = short_enough as f64 / nonempty as f64;
        if ratio >= 0.9 {
            20
        } else if ratio >= 0.7 {
            10
        } else {
            0
        }
    };

    bullet_points + quantified_points + header_points + line_points
}

fn is_bullet_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('-') || trimmed.starts_with('*') || trimmed.starts_with('•')
}

/// ATS composite: 60% keyword match, 40% format. Non-decreasing in both.
fn blend_ats(keyword_score: u32, format_score: u32) -> u32 {
    (keyword_score as f64 * 0.6 + format_score as f64 * 0.4).round() as u32
}

fn build_suggestions(
    text: &str,
    lowered: &str,
    keyword_match: &KeywordMatch,
    categorized: bool,
) -> Suggestions {
    let mut contact = Vec::new();
    let mut skills = Vec::new();
    let mut formatting = Vec::new();

    if !EMAIL_RE.is_match(lowered) {
        contact.push("Add a professional email address near the top of your resume.".to_string());
    }

    if !keyword_match.missing_skills.is_empty() {
        skills.push(format!(
            "Add evidence of these skills the role expects: {}.",
            keyword_match.missing_skills.join(", ")
        ));
    }

    let bullet_lines = text.lines().filter(|l| is_bullet_line(l)).count();
    if bullet_lines < 3 {
        formatting.push("Use bullet points to present achievements and responsibilities.".to_string());
    }
    if !text.chars().any(|c| c.is_ascii_digit()) {
        formatting
            .push("Quantify achievements with numbers, percentages, or timeframes.".to_string());
    }
    if !["experience", "education", "skills"]
        .iter()
        .all(|s| lowered.contains(s))
    {
        formatting.push(
            "Add clear section headers: Experience, Education, and Skills.".to_string(),
        );
    }

    if categorized {
        Suggestions::Categorized(CategorizedSuggestions {
            contact,
            skills,
            formatting,
        })
    } else {
        let mut flat = contact;
        flat.extend(skills);
        flat.extend(formatting);
        Suggestions::Flat(flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(skills: &[&str]) -> RoleRequirement {
        RoleRequirement {
            name: "Backend Developer".to_string(),
            category: "Software Development".to_string(),
            description: "Server-side work".to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn well_formed_resume() -> &'static str {
        "Jane Doe\n\
         jane.doe@example.com\n\n\
         Experience\n\
         - Built Rust services handling 10k requests per second\n\
         - Reduced deploy time by 40% with Docker pipelines\n\
         - Led migration of 3 services to Postgres\n\n\
         Education\n\
         BS Computer Science, 2019\n\n\
         Skills\n\
         Rust, Python, SQL, Docker\n"
    }

    #[test]
    fn test_empty_required_skills_scores_zero_without_error() {
        let analysis = analyze(well_formed_resume(), &role(&[]), false);
        assert_eq!(analysis.keyword_match.score, 0);
        assert!(analysis.keyword_match.found_skills.is_empty());
        assert!(analysis.keyword_match.missing_skills.is_empty());
    }

    #[test]
    fn test_keyword_partition_covers_required_skills() {
        let r = role(&["rust", "python", "kafka", "go"]);
        let analysis = analyze(well_formed_resume(), &r, false);
        let km = &analysis.keyword_match;

        assert_eq!(km.found_skills.len() + km.missing_skills.len(), 4);
        for skill in &r.required_skills {
            let in_found = km.found_skills.contains(skill);
            let in_missing = km.missing_skills.contains(skill);
            assert!(in_found ^ in_missing, "skill {skill} must be in exactly one partition");
        }
    }

    #[test]
    fn test_keyword_score_is_found_over_required() {
        let analysis = analyze(well_formed_resume(), &role(&["rust", "kafka"]), false);
        assert_eq!(analysis.keyword_match.score, 50);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let analysis = analyze(well_formed_resume(), &role(&["RUST", "PostgreS"]), false);
        assert_eq!(analysis.keyword_match.score, 100);
    }

    #[test]
    fn test_section_score_full_structure() {
        let analysis = analyze(well_formed_resume(), &role(&["rust"]), false);
        assert_eq!(analysis.section_score, 100);
    }

    #[test]
    fn test_section_score_drops_with_missing_structure() {
        let no_skills = "jane@example.com\nExperience\nEducation\n";
        let analysis = analyze(no_skills, &role(&["rust"]), false);
        assert_eq!(analysis.section_score, 75);
    }

    #[test]
    fn test_format_score_rewards_structure() {
        let rich = analyze(well_formed_resume(), &role(&["rust"]), false);
        let poor = analyze("one long paragraph about my career with no shape", &role(&["rust"]), false);
        assert!(rich.format_score > poor.format_score);
    }

    #[test]
    fn test_format_score_empty_text_is_zero() {
        let analysis = analyze("", &role(&["rust"]), false);
        assert_eq!(analysis.format_score, 0);
    }

    #[test]
    fn test_ats_blend_is_monotonic_in_keyword_score() {
        assert!(blend_ats(80, 50) >= blend_ats(40, 50));
        assert!(blend_ats(80, 50) >= blend_ats(80, 20));
        assert_eq!(blend_ats(100, 100), 100);
        assert_eq!(blend_ats(0, 0), 0);
    }

    #[test]
    fn test_flat_suggestions_mention_missing_skills() {
        let analysis = analyze(well_formed_resume(), &role(&["rust", "kafka"]), false);
        match &analysis.suggestions {
            Suggestions::Flat(items) => {
                assert!(items.iter().any(|s| s.contains("kafka")));
            }
            Suggestions::Categorized(_) => panic!("expected flat suggestions"),
        }
    }

    #[test]
    fn test_categorized_suggestions_use_three_buckets() {
        let bare = "no contact info here and no structure at all";
        let analysis = analyze(bare, &role(&["rust"]), true);
        match &analysis.suggestions {
            Suggestions::Categorized(buckets) => {
                assert!(!buckets.contact.is_empty());
                assert!(!buckets.skills.is_empty());
                assert!(!buckets.formatting.is_empty());
            }
            Suggestions::Flat(_) => panic!("expected categorized suggestions"),
        }
    }

    #[test]
    fn test_clean_resume_gets_few_suggestions() {
        let analysis = analyze(well_formed_resume(), &role(&["rust", "sql"]), false);
        match &analysis.suggestions {
            Suggestions::Flat(items) => assert!(items.is_empty(), "unexpected: {items:?}"),
            Suggestions::Categorized(_) => panic!("expected flat suggestions"),
        }
    }
}
