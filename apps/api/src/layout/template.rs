//! Template presets: immutable style bundles fed into the flow engine.
//!
//! A template never changes how lines are classified or flowed; it only supplies the
//! role → style table, page margins, classifier thresholds and decorative extras.
//! `TemplateId::style` builds a fresh value on every call, so concurrent renders with
//! different templates share nothing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::classify::{ClassifierThresholds, Role};
use crate::layout::font_metrics::{FontFace, FontFamily};

/// A4 portrait.
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

// ────────────────────────────────────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    /// Plain single-column renderer used for quick ATS-safe downloads.
    Ats,
    Classic,
    Modern,
    Executive,
    /// Two-column layout with section routing. Default for tailored resumes.
    #[default]
    Professional,
}

#[derive(Debug, Error, PartialEq)]
#[error("Template \"{0}\" not found")]
pub struct UnknownTemplate(pub String);

impl FromStr for TemplateId {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ats" => Ok(TemplateId::Ats),
            "classic" => Ok(TemplateId::Classic),
            "modern" => Ok(TemplateId::Modern),
            "executive" => Ok(TemplateId::Executive),
            "professional" => Ok(TemplateId::Professional),
            _ => Err(UnknownTemplate(s.to_string())),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemplateId::Ats => "ats",
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Executive => "executive",
            TemplateId::Professional => "professional",
        };
        f.write_str(s)
    }
}

impl TemplateId {
    /// Label inserted into suggested filenames, for the presets that carry one.
    pub fn filename_label(self) -> Option<&'static str> {
        match self {
            TemplateId::Classic => Some("Classic"),
            TemplateId::Modern => Some("Modern"),
            TemplateId::Executive => Some("Executive"),
            TemplateId::Ats | TemplateId::Professional => None,
        }
    }

    pub fn style(self) -> TemplateStyle {
        match self {
            TemplateId::Ats => ats(),
            TemplateId::Classic => classic(),
            TemplateId::Modern => modern(),
            TemplateId::Executive => executive(),
            TemplateId::Professional => professional(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Style values
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// How one role is set on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoleStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub color: Rgb,
    pub indent_mm: f32,
    /// Cursor advance after each wrapped fragment.
    pub advance_mm: f32,
    /// Extra cursor advance once the whole line (and its decoration) is drawn.
    pub space_after_mm: f32,
}

impl RoleStyle {
    fn new(face: FontFace, size_pt: f32, color: Rgb, advance_mm: f32) -> Self {
        Self {
            face,
            size_pt,
            color,
            indent_mm: 0.0,
            advance_mm,
            space_after_mm: 0.0,
        }
    }

    fn indent(mut self, mm: f32) -> Self {
        self.indent_mm = mm;
        self
    }

    fn after(mut self, mm: f32) -> Self {
        self.space_after_mm = mm;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub top: f32,
    /// Distance from the page bottom below which no baseline is placed.
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Extra drawn after a section heading's text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum HeadingDecoration {
    None,
    /// Rule under the heading spanning its rendered width.
    Underline { color: Rgb, line_width_mm: f32, offset_mm: f32 },
    /// Short fixed-length accent rule.
    AccentRule { color: Rgb, length_mm: f32, line_width_mm: f32, offset_mm: f32 },
    /// Filled band behind the heading text.
    Band { fill: Rgb, pad_left_mm: f32, extra_width_mm: f32, above_mm: f32, height_mm: f32 },
    /// Rule spanning the whole column.
    ColumnRule { color: Rgb, line_width_mm: f32, offset_mm: f32 },
}

/// Extra drawn around the name line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NameDecoration {
    None,
    /// Rule across the content width below the name.
    FullWidthRule { color: Rgb, line_width_mm: f32, offset_mm: f32 },
    /// Filled bar across the full page width behind the name.
    Banner { fill: Rgb, above_mm: f32, height_mm: f32 },
}

/// Geometry and extra roles of the two-column professional layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoColumnGrid {
    pub left_width_mm: f32,
    pub gutter_mm: f32,
    pub subtitle: RoleStyle,
    pub contact: RoleStyle,
    pub header_rule_width_mm: f32,
    pub icon_size_mm: f32,
    pub icon_gap_mm: f32,
    pub contact_gutter_mm: f32,
    /// Space between the contact row and the top of both columns.
    pub header_gap_mm: f32,
    /// Space after the last line of each section.
    pub section_gap_mm: f32,
}

/// Full style bundle for one template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateStyle {
    pub id: TemplateId,
    pub family: FontFamily,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margins: Margins,
    /// Cursor advance for a blank line.
    pub paragraph_gap_mm: f32,
    pub limits: ClassifierThresholds,
    pub accent: Rgb,
    pub name: RoleStyle,
    pub heading: RoleStyle,
    pub company: RoleStyle,
    pub date: RoleStyle,
    pub bullet: RoleStyle,
    pub body: RoleStyle,
    pub heading_decoration: HeadingDecoration,
    pub name_decoration: NameDecoration,
    pub columns: Option<TwoColumnGrid>,
}

impl TemplateStyle {
    pub fn role(&self, role: Role) -> &RoleStyle {
        match role {
            Role::Name => &self.name,
            Role::SectionHeading => &self.heading,
            Role::CompanyOrRole => &self.company,
            Role::DateLine => &self.date,
            Role::Bullet => &self.bullet,
            Role::Body => &self.body,
        }
    }

    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - self.margins.left - self.margins.right
    }

    /// Lowest baseline allowed before a page break.
    pub fn bottom_limit_mm(&self) -> f32 {
        self.page_height_mm - self.margins.bottom
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Presets
// ────────────────────────────────────────────────────────────────────────────

const STANDARD_LIMITS: ClassifierThresholds = ClassifierThresholds {
    name_max_len: 50,
    heading_min_len: 2,
    heading_max_len: 50,
};

fn ats() -> TemplateStyle {
    let lh = 5.5;
    let black = Rgb::BLACK;
    TemplateStyle {
        id: TemplateId::Ats,
        family: FontFamily::Helvetica,
        page_width_mm: A4_WIDTH_MM,
        page_height_mm: A4_HEIGHT_MM,
        margins: Margins { top: 15.0, bottom: 20.0, left: 15.0, right: 15.0 },
        paragraph_gap_mm: 3.0,
        limits: ClassifierThresholds {
            name_max_len: 50,
            heading_min_len: 0,
            heading_max_len: 60,
        },
        accent: black,
        name: RoleStyle::new(FontFace::Bold, 14.0, black, lh),
        heading: RoleStyle::new(FontFace::Bold, 12.0, black, lh).after(2.0),
        company: RoleStyle::new(FontFace::Bold, 11.0, black, lh),
        date: RoleStyle::new(FontFace::Italic, 10.5, black, lh),
        bullet: RoleStyle::new(FontFace::Regular, 11.0, black, lh).indent(4.0),
        body: RoleStyle::new(FontFace::Regular, 11.0, black, lh),
        heading_decoration: HeadingDecoration::None,
        name_decoration: NameDecoration::None,
        columns: None,
    }
}

fn classic() -> TemplateStyle {
    let lh = 6.0;
    let ink = Rgb(20, 20, 20);
    TemplateStyle {
        id: TemplateId::Classic,
        family: FontFamily::Times,
        page_width_mm: A4_WIDTH_MM,
        page_height_mm: A4_HEIGHT_MM,
        margins: Margins { top: 20.0, bottom: 30.0, left: 20.0, right: 20.0 },
        paragraph_gap_mm: 4.0,
        limits: STANDARD_LIMITS,
        accent: Rgb::BLACK,
        name: RoleStyle::new(FontFace::Bold, 16.0, Rgb::BLACK, lh).after(2.0),
        heading: RoleStyle::new(FontFace::Bold, 12.0, Rgb::BLACK, lh).after(4.0),
        company: RoleStyle::new(FontFace::Bold, 11.0, ink, lh),
        date: RoleStyle::new(FontFace::Italic, 10.5, ink, lh),
        bullet: RoleStyle::new(FontFace::Regular, 11.0, ink, lh).indent(4.0),
        body: RoleStyle::new(FontFace::Regular, 11.0, ink, lh),
        heading_decoration: HeadingDecoration::Underline {
            color: Rgb::BLACK,
            line_width_mm: 0.5,
            offset_mm: 2.0,
        },
        name_decoration: NameDecoration::None,
        columns: None,
    }
}

fn modern() -> TemplateStyle {
    let lh = 5.5;
    let primary = Rgb(0, 102, 204);
    let ink = Rgb(51, 51, 51);
    TemplateStyle {
        id: TemplateId::Modern,
        family: FontFamily::Helvetica,
        page_width_mm: A4_WIDTH_MM,
        page_height_mm: A4_HEIGHT_MM,
        margins: Margins { top: 18.0, bottom: 28.0, left: 18.0, right: 18.0 },
        paragraph_gap_mm: 3.0,
        limits: STANDARD_LIMITS,
        accent: primary,
        name: RoleStyle::new(FontFace::Bold, 18.0, primary, lh).after(4.0),
        heading: RoleStyle::new(FontFace::Bold, 11.0, primary, lh).after(2.0),
        company: RoleStyle::new(FontFace::Bold, 10.0, ink, lh),
        date: RoleStyle::new(FontFace::Italic, 9.5, ink, lh),
        bullet: RoleStyle::new(FontFace::Regular, 10.0, ink, lh).indent(4.0),
        body: RoleStyle::new(FontFace::Regular, 10.0, ink, lh),
        heading_decoration: HeadingDecoration::AccentRule {
            color: primary,
            length_mm: 30.0,
            line_width_mm: 0.8,
            offset_mm: 2.0,
        },
        name_decoration: NameDecoration::FullWidthRule {
            color: primary,
            line_width_mm: 0.3,
            offset_mm: lh - 2.0,
        },
        columns: None,
    }
}

fn executive() -> TemplateStyle {
    let lh = 5.8;
    let section = Rgb(41, 128, 185);
    let ink = Rgb(44, 44, 44);
    TemplateStyle {
        id: TemplateId::Executive,
        family: FontFamily::Helvetica,
        page_width_mm: A4_WIDTH_MM,
        page_height_mm: A4_HEIGHT_MM,
        margins: Margins { top: 20.0, bottom: 30.0, left: 20.0, right: 20.0 },
        paragraph_gap_mm: 3.5,
        limits: STANDARD_LIMITS,
        accent: section,
        name: RoleStyle::new(FontFace::Bold, 20.0, Rgb::WHITE, 12.0),
        heading: RoleStyle::new(FontFace::Bold, 12.0, section, lh).after(2.0),
        company: RoleStyle::new(FontFace::Bold, 10.5, ink, lh),
        date: RoleStyle::new(FontFace::Italic, 10.0, ink, lh),
        bullet: RoleStyle::new(FontFace::Regular, 10.5, ink, lh).indent(4.0),
        body: RoleStyle::new(FontFace::Regular, 10.5, ink, lh),
        heading_decoration: HeadingDecoration::Band {
            fill: Rgb(240, 240, 240),
            pad_left_mm: 2.0,
            extra_width_mm: 8.0,
            above_mm: 5.0,
            height_mm: 7.0,
        },
        name_decoration: NameDecoration::Banner {
            fill: Rgb(44, 62, 80),
            above_mm: 6.0,
            height_mm: 14.0,
        },
        columns: None,
    }
}

fn professional() -> TemplateStyle {
    let lh = 4.8;
    let accent = Rgb(37, 99, 235);
    let dark = Rgb(33, 37, 41);
    let muted = Rgb(108, 117, 125);
    TemplateStyle {
        id: TemplateId::Professional,
        family: FontFamily::Helvetica,
        page_width_mm: A4_WIDTH_MM,
        page_height_mm: A4_HEIGHT_MM,
        margins: Margins { top: 18.0, bottom: 15.0, left: 15.0, right: 15.0 },
        paragraph_gap_mm: 2.5,
        limits: ClassifierThresholds {
            name_max_len: 50,
            heading_min_len: 2,
            heading_max_len: 40,
        },
        accent,
        name: RoleStyle::new(FontFace::Bold, 24.0, dark, 9.0),
        heading: RoleStyle::new(FontFace::Bold, 11.0, accent, 5.5).after(3.0),
        company: RoleStyle::new(FontFace::Bold, 10.0, dark, lh),
        date: RoleStyle::new(FontFace::Italic, 9.5, muted, lh),
        bullet: RoleStyle::new(FontFace::Regular, 9.5, dark, lh).indent(3.0),
        body: RoleStyle::new(FontFace::Regular, 9.5, dark, lh),
        heading_decoration: HeadingDecoration::ColumnRule {
            color: accent,
            line_width_mm: 0.4,
            offset_mm: 1.5,
        },
        name_decoration: NameDecoration::None,
        columns: Some(TwoColumnGrid {
            left_width_mm: 68.0,
            gutter_mm: 8.0,
            subtitle: RoleStyle::new(FontFace::Regular, 12.0, accent, 6.0),
            contact: RoleStyle::new(FontFace::Regular, 8.5, Rgb(73, 80, 87), 5.0),
            header_rule_width_mm: 0.6,
            icon_size_mm: 2.2,
            icon_gap_mm: 1.2,
            contact_gutter_mm: 6.0,
            header_gap_mm: 6.0,
            section_gap_mm: 4.0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TemplateId; 5] = [
        TemplateId::Ats,
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Executive,
        TemplateId::Professional,
    ];

    #[test]
    fn test_parse_known_ids() {
        for id in ALL {
            assert_eq!(id.to_string().parse::<TemplateId>(), Ok(id));
        }
        assert_eq!("  Modern ".parse::<TemplateId>(), Ok(TemplateId::Modern));
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let err = "fancy".parse::<TemplateId>().unwrap_err();
        assert_eq!(err.to_string(), "Template \"fancy\" not found");
    }

    #[test]
    fn test_serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&TemplateId::Executive).unwrap();
        assert_eq!(json, "\"executive\"");
        let parsed: TemplateId = serde_json::from_str("\"professional\"").unwrap();
        assert_eq!(parsed, TemplateId::Professional);
    }

    #[test]
    fn test_name_is_largest_and_heading_beats_body() {
        for id in ALL {
            let style = id.style();
            for role in [Role::SectionHeading, Role::CompanyOrRole, Role::DateLine, Role::Bullet, Role::Body] {
                assert!(
                    style.name.size_pt > style.role(role).size_pt,
                    "{id}: name must outsize {role:?}"
                );
            }
            assert!(style.heading.size_pt > style.body.size_pt, "{id}");
        }
    }

    #[test]
    fn test_only_professional_has_columns() {
        for id in ALL {
            assert_eq!(id.style().columns.is_some(), id == TemplateId::Professional);
        }
    }

    #[test]
    fn test_column_geometry_fits_page() {
        let style = TemplateId::Professional.style();
        let cols = style.columns.unwrap();
        let right_width = style.content_width_mm() - cols.left_width_mm - cols.gutter_mm;
        assert!(right_width > cols.left_width_mm);
    }

    #[test]
    fn test_heading_thresholds_differ_between_variants() {
        assert_eq!(TemplateId::Classic.style().limits.heading_max_len, 50);
        assert_eq!(TemplateId::Professional.style().limits.heading_max_len, 40);
        assert_eq!(TemplateId::Ats.style().limits.heading_max_len, 60);
    }

    #[test]
    fn test_filename_labels() {
        assert_eq!(TemplateId::Classic.filename_label(), Some("Classic"));
        assert_eq!(TemplateId::Professional.filename_label(), None);
    }
}
