//! Document layout: text + template → pages of draw operations.
//!
//! Single-column templates flow every line through one `Flow`. The two-column template
//! draws a header across the content width, then flows the routed sections of each
//! column with independent cursors. No balancing between columns is attempted.

use serde::Serialize;
use tracing::debug;

use crate::layout::cancel::{CancelToken, LayoutError};
use crate::layout::classify::{classify_line, LinePosition, Role};
use crate::layout::flow::{Column, DrawOp, Flow, Frame, TextRun};
use crate::layout::font_metrics::{get_metrics, FontFamily};
use crate::layout::sections::{route_sections, ColumnSide};
use crate::layout::template::{TemplateId, TemplateStyle, TwoColumnGrid};

/// Gap between the subtitle baseline advance and the header rule.
const HEADER_RULE_LIFT_MM: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub template: TemplateId,
    pub family: FontFamily,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Always at least 1.
    pub page_count: usize,
    /// In painting order.
    pub ops: Vec<DrawOp>,
}

impl Layout {
    fn new(style: &TemplateStyle, page_count: usize, ops: Vec<DrawOp>) -> Self {
        Self {
            template: style.id,
            family: style.family,
            page_width_mm: style.page_width_mm,
            page_height_mm: style.page_height_mm,
            page_count: page_count.max(1),
            ops,
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(DrawOp::as_text)
    }

    pub fn page_ops(&self, page: usize) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(move |op| op.page() == page)
    }
}

/// Lays out `text` with `style`. Fails only when `cancel` fires.
pub fn layout_document(text: &str, style: &TemplateStyle, cancel: &CancelToken) -> Result<Layout, LayoutError> {
    cancel.check()?;
    let layout = match &style.columns {
        Some(columns) => layout_two_column(text, style, columns, cancel)?,
        None => layout_single_column(text, style, cancel)?,
    };
    debug!(
        template = %style.id,
        pages = layout.page_count,
        runs = layout.texts().count(),
        ops = layout.ops.len(),
        "Layout complete"
    );
    Ok(layout)
}

fn layout_single_column(text: &str, style: &TemplateStyle, cancel: &CancelToken) -> Result<Layout, LayoutError> {
    let frame = Frame {
        column: Column::Full,
        x_mm: style.margins.left,
        width_mm: style.content_width_mm(),
    };
    let mut flow = Flow::new(style, frame, style.margins.top, cancel);
    let mut seen_content = false;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            flow.gap(style.paragraph_gap_mm);
            continue;
        }
        let position = LinePosition {
            index,
            first_non_empty: !seen_content,
        };
        seen_content = true;
        flow.line(line, classify_line(line, position, &style.limits))?;
    }

    let pages = flow.pages_used();
    Ok(Layout::new(style, pages, flow.into_ops()))
}

fn layout_two_column(
    text: &str,
    style: &TemplateStyle,
    columns: &TwoColumnGrid,
    cancel: &CancelToken,
) -> Result<Layout, LayoutError> {
    let routed = route_sections(text);
    let left = style.margins.left;
    let content_width = style.content_width_mm();

    // Header: name, subtitle, rule, contact row.
    let header = Frame {
        column: Column::Header,
        x_mm: left,
        width_mm: content_width,
    };
    let mut flow = Flow::new(style, header, style.margins.top, cancel);
    if let Some(name) = &routed.name {
        flow.line(name, Role::Name)?;
    }
    if let Some(subtitle) = &routed.subtitle {
        flow.styled(subtitle, &columns.subtitle)?;
    }
    if routed.name.is_some() || routed.subtitle.is_some() {
        flow.push(DrawOp::Rule {
            page: flow.page(),
            column: Column::Header,
            x1_mm: left,
            x2_mm: left + content_width,
            y_mm: flow.y() - HEADER_RULE_LIFT_MM,
            line_width_mm: columns.header_rule_width_mm,
            color: style.accent,
        });
    }
    if !routed.contacts.is_empty() {
        flow.gap(columns.contact.advance_mm);
        let metrics = get_metrics(style.family, columns.contact.face);
        let (page, y) = (flow.page(), flow.y());
        let mut x = left;
        for contact in &routed.contacts {
            flow.push(DrawOp::Fill {
                page,
                column: Column::Header,
                x_mm: x,
                y_mm: y - columns.icon_size_mm,
                width_mm: columns.icon_size_mm,
                height_mm: columns.icon_size_mm,
                color: style.accent,
            });
            let text_x = x + columns.icon_size_mm + columns.icon_gap_mm;
            flow.push(DrawOp::Text(TextRun {
                page,
                column: Column::Header,
                x_mm: text_x,
                y_mm: y,
                text: contact.text.clone(),
                role: None,
                face: columns.contact.face,
                size_pt: columns.contact.size_pt,
                color: columns.contact.color,
            }));
            x = text_x + metrics.width_mm(&contact.text, columns.contact.size_pt) + columns.contact_gutter_mm;
        }
    }
    flow.gap(columns.header_gap_mm);

    let top = flow.y();
    let mut pages = flow.pages_used();
    let mut ops = flow.into_ops();

    let right_x = left + columns.left_width_mm + columns.gutter_mm;
    let tracks = [
        (
            ColumnSide::Left,
            Frame {
                column: Column::Left,
                x_mm: left,
                width_mm: columns.left_width_mm,
            },
        ),
        (
            ColumnSide::Right,
            Frame {
                column: Column::Right,
                x_mm: right_x,
                width_mm: content_width - columns.left_width_mm - columns.gutter_mm,
            },
        ),
    ];

    for (side, frame) in tracks {
        let mut track = Flow::new(style, frame, top, cancel);
        for section in routed.column_sections(side) {
            track.line(&section.name, Role::SectionHeading)?;
            for line in &section.lines {
                if line.is_empty() {
                    track.gap(style.paragraph_gap_mm);
                } else {
                    let role = classify_line(line, LinePosition::in_section(), &style.limits);
                    track.line(line, role)?;
                }
            }
            track.gap(columns.section_gap_mm);
        }
        pages = pages.max(track.pages_used());
        ops.extend(track.into_ops());
    }

    Ok(Layout::new(style, pages, ops))
}
