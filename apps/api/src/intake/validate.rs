//! Intake gate: decides whether extracted text looks like a résumé at all.
//!
//! Pure and deterministic. All checks run case-insensitively over a
//! lower-cased copy of the text. The heuristic route and the AI route run
//! different profiles; the two rule sets are intentionally kept separate.

use lazy_static::lazy_static;
use regex::Regex;

const RESUME_KEYWORDS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "summary",
    "projects",
    "certification",
    "profile",
    "objective",
];

const MAIN_SECTIONS: &[&str] = &["experience", "education", "skills"];

const REPORT_WORDS_STRICT: &[&str] = &["project report", "assignment", "main project"];

const REPORT_WORDS_RELAXED: &[&str] = &[
    "project report",
    "assignment",
    "semester",
    "main project",
    "lab manual",
];

const MAX_PAGES: usize = 3;
const MIN_TEXT_CHARS: usize = 600;
const MIN_KEYWORDS: usize = 3;
const CONTACT_WINDOW_CHARS: usize = 500;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"name|full name|candidate").unwrap();
}

/// Which route's rule set to apply.
///
/// `Strict` is the heuristic analysis route: contact means an email near the
/// top, and report markers are only scanned in the head of the document.
/// `Relaxed` is the AI route: a name-like label also counts as contact, and
/// report markers anywhere combine with keyword poverty instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationProfile {
    Strict,
    Relaxed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooManyPages,
    InsufficientKeywordDiversity,
    TooShort,
    NoContactSignal,
    NoPrimarySection,
    LooksLikeReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationVerdict {
    Accept,
    Reject(RejectReason),
}

impl ValidationVerdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, ValidationVerdict::Accept)
    }
}

/// Runs the intake gate over extracted text.
pub fn validate(text: &str, page_count: usize, profile: ValidationProfile) -> ValidationVerdict {
    if page_count > MAX_PAGES {
        return ValidationVerdict::Reject(RejectReason::TooManyPages);
    }

    let lowered = text.to_lowercase();
    let char_len = lowered.chars().count();

    let found_keywords = RESUME_KEYWORDS
        .iter()
        .filter(|kw| lowered.contains(*kw))
        .count();
    if found_keywords < MIN_KEYWORDS {
        return ValidationVerdict::Reject(RejectReason::InsufficientKeywordDiversity);
    }

    if char_len < MIN_TEXT_CHARS {
        return ValidationVerdict::Reject(RejectReason::TooShort);
    }

    let head = char_prefix(&lowered, CONTACT_WINDOW_CHARS);
    let email_like = EMAIL_RE.is_match(head);
    let has_contact = match profile {
        ValidationProfile::Strict => email_like,
        ValidationProfile::Relaxed => email_like || NAME_RE.is_match(head),
    };
    if !has_contact {
        return ValidationVerdict::Reject(RejectReason::NoContactSignal);
    }

    // First 20% of the text by char offset, never an empty window.
    let first_fifth = char_prefix(&lowered, ((char_len as f64) * 0.2) as usize);
    if !MAIN_SECTIONS.iter().any(|s| first_fifth.contains(s)) {
        return ValidationVerdict::Reject(RejectReason::NoPrimarySection);
    }

    let looks_like_report = match profile {
        ValidationProfile::Strict => {
            let is_report = REPORT_WORDS_STRICT.iter().any(|w| first_fifth.contains(w));
            is_report && !email_like
        }
        ValidationProfile::Relaxed => {
            let is_report = REPORT_WORDS_RELAXED.iter().any(|w| lowered.contains(w));
            is_report && found_keywords < MIN_KEYWORDS + 1
        }
    };
    if looks_like_report {
        return ValidationVerdict::Reject(RejectReason::LooksLikeReport);
    }

    ValidationVerdict::Accept
}

/// Prefix of `s` holding at most `n` chars, with a minimum window of 1.
fn char_prefix(s: &str, n: usize) -> &str {
    let n = n.max(1);
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
