//! Deterministic heuristics shown next to a tailoring result: a match score read off the
//! model's reasoning, and a quick profile of the job description itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const MAX_SKILLS: usize = 8;

static YEARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\+?\s*years?").expect("valid years regex"));
static SKILL_RES: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)(?:skills?|expertise|proficient|experience with)[\s:]+([^.]+)")
            .expect("valid skills regex"),
        Regex::new(r"(?i)(?:required|must have)[\s:]+([^.]+)").expect("valid requirements regex"),
    ]
});
static SKILL_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;]").expect("valid split regex"));
static REQUIREMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)required|must|should|nice to have").expect("valid requirement regex")
});

// ────────────────────────────────────────────────────────────────────────────
// Match score
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLabel {
    Excellent,
    Good,
    Fair,
    Partial,
}

impl MatchLabel {
    fn for_score(score: u8) -> Self {
        match score {
            85.. => MatchLabel::Excellent,
            70..=84 => MatchLabel::Good,
            50..=69 => MatchLabel::Fair,
            _ => MatchLabel::Partial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchScore {
    pub score: u8,
    pub label: MatchLabel,
}

/// Scores 0..=100 from wording in the model's reasoning, starting at 50.
pub fn match_score(reasoning: &str) -> MatchScore {
    let text = reasoning.to_lowercase();
    let has = |word: &str| text.contains(word);

    let mut score: i32 = 50;
    if has("perfect") || has("ideal") {
        score += 20;
    }
    if has("strong") || has("excellent") {
        score += 15;
    }
    if has("align") {
        score += 10;
    }
    if has("match") {
        score += 10;
    }
    if has("experience") {
        score += 5;
    }
    if has("limited") || has("some") {
        score -= 10;
    }
    if has("partial") {
        score -= 15;
    }

    let score = score.clamp(0, 100) as u8;
    MatchScore {
        score,
        label: MatchLabel::for_score(score),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job description profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Entry,
    Mid,
    Senior,
    Executive,
}

/// Checked in order; the first level with a keyword in the text wins.
const SENIORITY_KEYWORDS: [(Seniority, &[&str]); 4] = [
    (Seniority::Entry, &["junior", "entry-level", "entry level", "graduate", "fresh"]),
    (Seniority::Mid, &["mid-level", "mid level", "experienced", "professional"]),
    (
        Seniority::Senior,
        &["senior", "lead", "principal", "staff", "architect", "manager"],
    ),
    (Seniority::Executive, &["director", "vp", "c-level", "cto", "cfo", "ceo"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Remote,
    Hybrid,
    Onsite,
    NotSpecified,
}

const JOB_TYPE_KEYWORDS: [(JobType, &[&str]); 3] = [
    (JobType::Remote, &["remote", "work from home", "distributed", "anywhere"]),
    (JobType::Hybrid, &["hybrid", "flexible", "office"]),
    (JobType::Onsite, &["on-site", "on site", "office-based", "location"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

impl Complexity {
    fn for_score(score: u8) -> Self {
        match score {
            0..=29 => Complexity::Simple,
            30..=59 => Complexity::Moderate,
            60..=79 => Complexity::Complex,
            _ => Complexity::VeryComplex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAnalysis {
    pub years_required: Option<u32>,
    pub skills: Vec<String>,
    pub seniority: Seniority,
    pub job_type: JobType,
    pub complexity: u8,
    pub complexity_label: Complexity,
    pub word_count: usize,
    pub requirement_count: usize,
}

fn first_keyword_hit<T: Copy>(text: &str, table: &[(T, &[&str])]) -> Option<T> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(value, _)| *value)
}

/// Comma or semicolon separated phrases after "skills", "required" and similar cues,
/// deduplicated in order of appearance, at most eight.
fn extract_skills(text: &str) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    for re in SKILL_RES.iter() {
        for caps in re.captures_iter(text) {
            for phrase in SKILL_SPLIT_RE.split(&caps[1]) {
                let phrase = phrase.trim();
                let len = phrase.chars().count();
                if len > 2 && len < 50 && !skills.iter().any(|s| s == phrase) {
                    skills.push(phrase.to_string());
                }
            }
        }
    }
    skills.truncate(MAX_SKILLS);
    skills
}

pub fn analyze_job_description(text: &str) -> JobAnalysis {
    let lower = text.to_lowercase();
    let word_count = text.split_whitespace().count();
    let requirement_count = REQUIREMENT_RE.find_iter(text).count();
    let complexity = ((word_count as f64 / 10.0 + requirement_count as f64 * 5.0) / 2.0)
        .round()
        .min(100.0) as u8;

    JobAnalysis {
        years_required: YEARS_RE
            .captures(text)
            .and_then(|caps| caps[1].parse().ok()),
        skills: extract_skills(text),
        seniority: first_keyword_hit(&lower, &SENIORITY_KEYWORDS).unwrap_or(Seniority::Mid),
        job_type: first_keyword_hit(&lower, &JOB_TYPE_KEYWORDS).unwrap_or(JobType::NotSpecified),
        complexity,
        complexity_label: Complexity::for_score(complexity),
        word_count,
        requirement_count,
    }
}
