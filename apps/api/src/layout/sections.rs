//! Section router for the two-column template.
//!
//! Splits a resume into a header (name, subtitle, up to three contact items) and named
//! sections, then assigns each known section to a column. Nothing here measures or
//! draws; malformed input just produces fewer sections.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Sections drawn in the left column, top to bottom.
pub const LEFT_SECTIONS: [&str; 4] = ["SUMMARY", "PROJECTS", "KEY ACHIEVEMENTS", "SKILLS"];
/// Sections drawn in the right column, top to bottom.
pub const RIGHT_SECTIONS: [&str; 2] = ["EXPERIENCE", "EDUCATION"];

/// Section that collects lines seen before the first header.
const DEFAULT_SECTION: &str = "SUMMARY";
const MAX_CONTACTS: usize = 3;
const HEADER_MAX_LEN: usize = 30;

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{3,}").expect("valid digit regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContactKind {
    Email,
    LinkedIn,
    Phone,
    Location,
}

impl ContactKind {
    pub fn detect(text: &str) -> Self {
        if text.contains('@') {
            ContactKind::Email
        } else if text.to_lowercase().contains("linkedin") {
            ContactKind::LinkedIn
        } else if DIGIT_RUN_RE.is_match(text) {
            ContactKind::Phone
        } else {
            ContactKind::Location
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactItem {
    pub kind: ContactKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Uppercased header text without the trailing colon.
    pub name: String,
    /// Trimmed lines, blank lines kept; leading and trailing blanks removed.
    pub lines: Vec<String>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutedResume {
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub contacts: Vec<ContactItem>,
    /// In order of first appearance.
    pub sections: Vec<Section>,
}

impl RoutedResume {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Non-empty sections for one column, in the column's static order.
    pub fn column_sections(&self, side: ColumnSide) -> Vec<&Section> {
        let order: &[&str] = match side {
            ColumnSide::Left => &LEFT_SECTIONS,
            ColumnSide::Right => &RIGHT_SECTIONS,
        };
        order
            .iter()
            .filter_map(|name| self.section(name))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Sections that have no column and are not drawn.
    pub fn unmapped_sections(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| column_for(&s.name).is_none())
            .map(|s| s.name.as_str())
            .collect()
    }
}

pub fn column_for(section: &str) -> Option<ColumnSide> {
    if LEFT_SECTIONS.contains(&section) {
        Some(ColumnSide::Left)
    } else if RIGHT_SECTIONS.contains(&section) {
        Some(ColumnSide::Right)
    } else {
        None
    }
}

/// `Experience:` style header: ends with a colon and is shorter than 30 chars.
pub fn is_section_header(line: &str) -> bool {
    line.ends_with(':') && line.chars().count() < HEADER_MAX_LEN
}

fn header_name(line: &str) -> String {
    line.trim_end_matches(':').trim().to_uppercase()
}

pub fn route_sections(text: &str) -> RoutedResume {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut idx = 0;

    let next_non_empty = |idx: &mut usize| -> Option<String> {
        while *idx < lines.len() {
            let line = lines[*idx];
            *idx += 1;
            if !line.is_empty() {
                return Some(line.to_string());
            }
        }
        None
    };
    let name = next_non_empty(&mut idx);
    let subtitle = next_non_empty(&mut idx);

    let mut contacts = Vec::new();
    while contacts.len() < MAX_CONTACTS && idx < lines.len() {
        let line = lines[idx];
        if line.is_empty() || is_section_header(line) {
            break;
        }
        contacts.push(ContactItem {
            kind: ContactKind::detect(line),
            text: line.to_string(),
        });
        idx += 1;
    }

    let mut sections: Vec<Section> = Vec::new();
    let mut current = DEFAULT_SECTION.to_string();
    for line in &lines[idx..] {
        if is_section_header(line) {
            current = header_name(line);
            if !sections.iter().any(|s| s.name == current) {
                sections.push(Section {
                    name: current.clone(),
                    lines: Vec::new(),
                });
            }
            continue;
        }
        match sections.iter_mut().find(|s| s.name == current) {
            Some(section) => section.lines.push(line.to_string()),
            None => sections.push(Section {
                name: current.clone(),
                lines: vec![line.to_string()],
            }),
        }
    }

    for section in &mut sections {
        while section.lines.last().is_some_and(|l| l.is_empty()) {
            section.lines.pop();
        }
        let leading = section.lines.iter().take_while(|l| l.is_empty()).count();
        section.lines.drain(..leading);
    }
    sections.retain(|s| !(s.name == DEFAULT_SECTION && s.lines.is_empty()));

    let routed = RoutedResume {
        name,
        subtitle,
        contacts,
        sections,
    };
    for dropped in routed.unmapped_sections() {
        debug!("Section {dropped:?} has no column; dropped");
    }
    routed
}

#[cfg(test)]
mod tests {
    use super::*;

    const JANE: &str = "JANE DOE\nSoftware Engineer\njane@x.com\n\nSUMMARY:\nExperienced engineer.\n\nEXPERIENCE:\nActed as lead dev.";

    #[test]
    fn test_jane_doe_header_and_sections() {
        let r = route_sections(JANE);
        assert_eq!(r.name.as_deref(), Some("JANE DOE"));
        assert_eq!(r.subtitle.as_deref(), Some("Software Engineer"));
        assert_eq!(
            r.contacts,
            vec![ContactItem {
                kind: ContactKind::Email,
                text: "jane@x.com".into()
            }]
        );
        assert_eq!(r.section("SUMMARY").unwrap().lines, vec!["Experienced engineer."]);
        assert_eq!(r.section("EXPERIENCE").unwrap().lines, vec!["Acted as lead dev."]);
    }

    #[test]
    fn test_column_routing() {
        let r = route_sections(JANE);
        let left: Vec<_> = r.column_sections(ColumnSide::Left).iter().map(|s| s.name.clone()).collect();
        let right: Vec<_> = r.column_sections(ColumnSide::Right).iter().map(|s| s.name.clone()).collect();
        assert_eq!(left, vec!["SUMMARY"]);
        assert_eq!(right, vec!["EXPERIENCE"]);
    }

    #[test]
    fn test_contact_kinds() {
        assert_eq!(ContactKind::detect("a@b.io"), ContactKind::Email);
        assert_eq!(ContactKind::detect("LinkedIn.com/in/jane"), ContactKind::LinkedIn);
        assert_eq!(ContactKind::detect("+49 151 2345678"), ContactKind::Phone);
        assert_eq!(ContactKind::detect("Berlin, Germany"), ContactKind::Location);
    }

    #[test]
    fn test_contacts_capped_at_three() {
        let text = "A\nB\nx@y.z\n555 1234\nBerlin\nlinkedin.com/in/a\nSkills:\nRust";
        let r = route_sections(text);
        assert_eq!(r.contacts.len(), 3);
        // the fourth candidate falls into the default section
        assert_eq!(r.section("SUMMARY").unwrap().lines, vec!["linkedin.com/in/a"]);
        assert_eq!(r.section("SKILLS").unwrap().lines, vec!["Rust"]);
    }

    #[test]
    fn test_header_ends_contact_block() {
        let r = route_sections("A\nB\nBerlin\nEducation:\nMSc");
        assert_eq!(r.contacts.len(), 1);
        assert_eq!(r.section("EDUCATION").unwrap().lines, vec!["MSc"]);
    }

    #[test]
    fn test_repeated_section_appends() {
        let r = route_sections("A\nB\n\nSkills:\nRust\nExperience:\nAcme\nSkills:\nGo");
        assert_eq!(r.section("SKILLS").unwrap().lines, vec!["Rust", "Go"]);
        assert_eq!(r.sections.iter().filter(|s| s.name == "SKILLS").count(), 1);
    }

    #[test]
    fn test_unmapped_sections_are_not_in_columns() {
        let r = route_sections("A\nB\n\nHobbies:\nChess\nSkills:\nRust");
        assert_eq!(r.unmapped_sections(), vec!["HOBBIES"]);
        let all: Vec<_> = [ColumnSide::Left, ColumnSide::Right]
            .into_iter()
            .flat_map(|side| r.column_sections(side))
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(all, vec!["SKILLS"]);
    }

    #[test]
    fn test_long_colon_line_is_not_a_header() {
        assert!(is_section_header("Key Achievements:"));
        assert!(!is_section_header("Responsible for the following components:"));
    }

    #[test]
    fn test_empty_input() {
        let r = route_sections("");
        assert_eq!(r, RoutedResume::default());
    }
}
