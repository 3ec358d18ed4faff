//! Flow / pagination engine: turns classified lines into positioned draw operations.
//!
//! Coordinates are millimetres from the top-left corner of the page; `y` is the text
//! baseline. A `Flow` owns one cursor for one column frame. Before each wrapped
//! fragment it checks the cursor against the bottom limit and, if past it, moves to the
//! top of the next page. The cancellation token is polled at exactly those page breaks.

use serde::Serialize;

use crate::layout::cancel::{CancelToken, LayoutError};
use crate::layout::classify::Role;
use crate::layout::font_metrics::{get_metrics, FontFace};
use crate::layout::template::{HeadingDecoration, NameDecoration, Rgb, RoleStyle, TemplateStyle};
use crate::layout::wrap::wrap_text;

// ────────────────────────────────────────────────────────────────────────────
// Draw operations
// ────────────────────────────────────────────────────────────────────────────

/// Which track an operation was laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    /// Single-column templates.
    Full,
    /// Name, subtitle and contact row of the two-column template.
    Header,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub page: usize,
    pub column: Column,
    pub x_mm: f32,
    pub y_mm: f32,
    pub text: String,
    /// `None` for header items that are not classified lines (subtitle, contacts).
    pub role: Option<Role>,
    pub face: FontFace,
    pub size_pt: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text(TextRun),
    Rule {
        page: usize,
        column: Column,
        x1_mm: f32,
        x2_mm: f32,
        y_mm: f32,
        line_width_mm: f32,
        color: Rgb,
    },
    Fill {
        page: usize,
        column: Column,
        x_mm: f32,
        /// Top edge.
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
        color: Rgb,
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            DrawOp::Text(run) => run.page,
            DrawOp::Rule { page, .. } | DrawOp::Fill { page, .. } => *page,
        }
    }

    pub fn column(&self) -> Column {
        match self {
            DrawOp::Text(run) => run.column,
            DrawOp::Rule { column, .. } | DrawOp::Fill { column, .. } => *column,
        }
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            DrawOp::Text(run) => Some(run),
            _ => None,
        }
    }
}

/// The frame a flow writes into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub column: Column,
    pub x_mm: f32,
    pub width_mm: f32,
}

/// Where the fragments of one line landed.
struct Placed {
    runs: Vec<DrawOp>,
    first: (usize, f32),
    last: (usize, f32),
    max_width_mm: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Flow
// ────────────────────────────────────────────────────────────────────────────

pub struct Flow<'a> {
    style: &'a TemplateStyle,
    frame: Frame,
    cancel: &'a CancelToken,
    page: usize,
    y: f32,
    ops: Vec<DrawOp>,
}

impl<'a> Flow<'a> {
    pub fn new(style: &'a TemplateStyle, frame: Frame, start_y_mm: f32, cancel: &'a CancelToken) -> Self {
        Self {
            style,
            frame,
            cancel,
            page: 0,
            y: start_y_mm,
            ops: Vec::new(),
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Advances the cursor without drawing (blank lines, section gaps).
    pub fn gap(&mut self, mm: f32) {
        self.y += mm;
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Number of pages this flow touched.
    pub fn pages_used(&self) -> usize {
        self.page + 1
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    fn ensure_room(&mut self) -> Result<(), LayoutError> {
        if self.y > self.style.bottom_limit_mm() {
            self.cancel.check()?;
            self.page += 1;
            self.y = self.style.margins.top;
        }
        Ok(())
    }

    fn place(&mut self, text: &str, rs: &RoleStyle, role: Option<Role>) -> Result<Option<Placed>, LayoutError> {
        let metrics = get_metrics(self.style.family, rs.face);
        let x = self.frame.x_mm + rs.indent_mm;
        let available = self.frame.width_mm - rs.indent_mm;
        let fragments = wrap_text(text, available, |s| metrics.width_mm(s, rs.size_pt));

        let mut placed: Option<Placed> = None;
        for fragment in fragments {
            self.ensure_room()?;
            let width = metrics.width_mm(&fragment, rs.size_pt);
            let at = (self.page, self.y);
            let run = DrawOp::Text(TextRun {
                page: self.page,
                column: self.frame.column,
                x_mm: x,
                y_mm: self.y,
                text: fragment,
                role,
                face: rs.face,
                size_pt: rs.size_pt,
                color: rs.color,
            });
            match placed.as_mut() {
                Some(p) => {
                    p.runs.push(run);
                    p.last = at;
                    p.max_width_mm = p.max_width_mm.max(width);
                }
                None => {
                    placed = Some(Placed {
                        runs: vec![run],
                        first: at,
                        last: at,
                        max_width_mm: width,
                    })
                }
            }
            self.y += rs.advance_mm;
        }
        Ok(placed)
    }

    /// Draws one classified, trimmed, non-blank line with its role's style and the
    /// template's decoration for that role.
    pub fn line(&mut self, text: &str, role: Role) -> Result<(), LayoutError> {
        let rs = *self.style.role(role);
        let Some(placed) = self.place(text, &rs, Some(role))? else {
            return Ok(());
        };

        match role {
            Role::SectionHeading => self.decorate_heading(placed, &rs),
            Role::Name => self.decorate_name(placed),
            _ => self.ops.extend(placed.runs),
        }

        self.y += rs.space_after_mm;
        Ok(())
    }

    /// Draws a line with an explicit style and no decoration.
    pub fn styled(&mut self, text: &str, rs: &RoleStyle) -> Result<(), LayoutError> {
        if let Some(placed) = self.place(text, rs, None)? {
            self.ops.extend(placed.runs);
        }
        Ok(())
    }

    fn decorate_heading(&mut self, placed: Placed, rs: &RoleStyle) {
        let column = self.frame.column;
        let x = self.frame.x_mm + rs.indent_mm;
        let (last_page, last_y) = placed.last;
        match self.style.heading_decoration {
            HeadingDecoration::None => self.ops.extend(placed.runs),
            HeadingDecoration::Underline { color, line_width_mm, offset_mm } => {
                self.ops.extend(placed.runs);
                self.ops.push(DrawOp::Rule {
                    page: last_page,
                    column,
                    x1_mm: x,
                    x2_mm: x + placed.max_width_mm,
                    y_mm: last_y + offset_mm,
                    line_width_mm,
                    color,
                });
            }
            HeadingDecoration::AccentRule { color, length_mm, line_width_mm, offset_mm } => {
                self.ops.extend(placed.runs);
                self.ops.push(DrawOp::Rule {
                    page: last_page,
                    column,
                    x1_mm: x,
                    x2_mm: x + length_mm,
                    y_mm: last_y + offset_mm,
                    line_width_mm,
                    color,
                });
            }
            HeadingDecoration::Band { fill, pad_left_mm, extra_width_mm, above_mm, height_mm } => {
                let (first_page, first_y) = placed.first;
                self.ops.push(DrawOp::Fill {
                    page: first_page,
                    column,
                    x_mm: x - pad_left_mm,
                    y_mm: first_y - above_mm,
                    width_mm: placed.max_width_mm + extra_width_mm,
                    height_mm,
                    color: fill,
                });
                self.ops.extend(placed.runs);
            }
            HeadingDecoration::ColumnRule { color, line_width_mm, offset_mm } => {
                self.ops.extend(placed.runs);
                self.ops.push(DrawOp::Rule {
                    page: last_page,
                    column,
                    x1_mm: self.frame.x_mm,
                    x2_mm: self.frame.x_mm + self.frame.width_mm,
                    y_mm: last_y + offset_mm,
                    line_width_mm,
                    color,
                });
            }
        }
    }

    fn decorate_name(&mut self, placed: Placed) {
        let column = self.frame.column;
        match self.style.name_decoration {
            NameDecoration::None => self.ops.extend(placed.runs),
            NameDecoration::FullWidthRule { color, line_width_mm, offset_mm } => {
                let (page, y) = placed.last;
                self.ops.extend(placed.runs);
                self.ops.push(DrawOp::Rule {
                    page,
                    column,
                    x1_mm: self.style.margins.left,
                    x2_mm: self.style.page_width_mm - self.style.margins.right,
                    y_mm: y + offset_mm,
                    line_width_mm,
                    color,
                });
            }
            NameDecoration::Banner { fill, above_mm, height_mm } => {
                let (page, y) = placed.first;
                let lines = placed.runs.len() as f32;
                self.ops.push(DrawOp::Fill {
                    page,
                    column,
                    x_mm: 0.0,
                    y_mm: y - above_mm,
                    width_mm: self.style.page_width_mm,
                    height_mm: height_mm + (lines - 1.0) * self.style.name.advance_mm,
                    color: fill,
                });
                self.ops.extend(placed.runs);
            }
        }
    }
}
