//! Line classification: decides the visual role of one line of a resume or letter.
//!
//! `classify_line` is a pure function of the trimmed text, its position, and the
//! template's thresholds. It never looks at neighbouring lines and never draws.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Visual role of a line. Every wrapped fragment of a line inherits the line's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Name,
    SectionHeading,
    Bullet,
    DateLine,
    CompanyOrRole,
    Body,
}

/// Per-template length limits. Lengths count chars, bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    pub name_max_len: usize,
    pub heading_min_len: usize,
    pub heading_max_len: usize,
}

/// Where a line sits in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePosition {
    /// 0-based index in the source text, blank lines included.
    pub index: usize,
    pub first_non_empty: bool,
}

impl LinePosition {
    /// Position for a line inside a routed section, where a Name is impossible.
    pub fn in_section() -> Self {
        Self {
            index: usize::MAX,
            first_non_empty: false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

const BULLET_GLYPHS: [char; 4] = ['•', '●', '▪', '-'];

const COMPANY_MIN_LEN: usize = 5;
const COMPANY_MAX_LEN: usize = 60;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("valid year regex"));

static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(Jan(uary)?|Feb(ruary)?|Mar(ch)?|Apr(il)?|May|June?|July?|Aug(ust)?|Sep(t(ember)?)?|Oct(ober)?|Nov(ember)?|Dec(ember)?)\b",
    )
    .expect("valid month regex")
});

static COMPANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z\s]+$").expect("valid company regex"));

// ────────────────────────────────────────────────────────────────────────────
// Classifier
// ────────────────────────────────────────────────────────────────────────────

/// True when upper-casing the text changes nothing.
pub fn is_all_caps(text: &str) -> bool {
    text.to_uppercase() == text
}

pub fn is_bullet(text: &str) -> bool {
    text.starts_with(BULLET_GLYPHS)
}

pub fn is_date_line(text: &str) -> bool {
    YEAR_RE.is_match(text)
        || MONTH_RE.is_match(text)
        || text.contains("Present")
        || text.contains("Current")
}

/// Classifies one trimmed line. First matching rule wins:
/// bullet, name, heading, date, company/role, body.
pub fn classify_line(text: &str, position: LinePosition, limits: &ClassifierThresholds) -> Role {
    let len = text.chars().count();

    if is_bullet(text) {
        return Role::Bullet;
    }

    if (position.index == 0 || position.first_non_empty) && len < limits.name_max_len {
        return Role::Name;
    }

    let all_caps = is_all_caps(text);
    if all_caps && len > limits.heading_min_len && len < limits.heading_max_len {
        return Role::SectionHeading;
    }

    if is_date_line(text) {
        return Role::DateLine;
    }

    if !all_caps
        && (COMPANY_MIN_LEN..=COMPANY_MAX_LEN).contains(&len)
        && COMPANY_RE.is_match(text)
    {
        return Role::CompanyOrRole;
    }

    Role::Body
}
