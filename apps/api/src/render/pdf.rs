//! PDF serialisation of a finished `Layout` with lopdf.
//!
//! Output is byte-stable for a given layout: standard Type1 fonts (nothing embedded),
//! uncompressed content streams, no Info dictionary, no creation date, no file ID.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use crate::layout::flow::{DrawOp, TextRun};
use crate::layout::font_metrics::FontFace;
use crate::layout::template::Rgb;
use crate::layout::Layout;
use crate::render::RenderError;

const MM_TO_PT: f32 = 72.0 / 25.4;

fn pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// Two decimals are plenty at 72 dpi and keep streams short.
fn num(v: f32) -> Object {
    ((v * 100.0).round() / 100.0).into()
}

fn color(op: &str, c: Rgb) -> Operation {
    let channel = |v: u8| num(v as f32 / 255.0);
    Operation::new(op, vec![channel(c.0), channel(c.1), channel(c.2)])
}

/// Encodes text for a WinAnsiEncoding font. Unmappable chars become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\t' => b' ',
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '•' | '●' | '▪' => 0x95,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

fn text_ops(run: &TextRun, page_h: f32, out: &mut Vec<Operation>) {
    if run.text.is_empty() {
        return;
    }
    out.push(Operation::new("BT", vec![]));
    out.push(Operation::new(
        "Tf",
        vec![run.face.resource_name().into(), num(run.size_pt)],
    ));
    out.push(color("rg", run.color));
    out.push(Operation::new(
        "Td",
        vec![num(pt(run.x_mm)), num(page_h - pt(run.y_mm))],
    ));
    out.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(&run.text), StringFormat::Literal)],
    ));
    out.push(Operation::new("ET", vec![]));
}

fn page_operations(layout: &Layout, page: usize, page_h: f32) -> Vec<Operation> {
    let mut out = Vec::new();
    for op in layout.page_ops(page) {
        match op {
            DrawOp::Text(run) => text_ops(run, page_h, &mut out),
            DrawOp::Rule {
                x1_mm,
                x2_mm,
                y_mm,
                line_width_mm,
                color: c,
                ..
            } => {
                let y = page_h - pt(*y_mm);
                out.push(color("RG", *c));
                out.push(Operation::new("w", vec![num(pt(*line_width_mm))]));
                out.push(Operation::new("m", vec![num(pt(*x1_mm)), num(y)]));
                out.push(Operation::new("l", vec![num(pt(*x2_mm)), num(y)]));
                out.push(Operation::new("S", vec![]));
            }
            DrawOp::Fill {
                x_mm,
                y_mm,
                width_mm,
                height_mm,
                color: c,
                ..
            } => {
                out.push(color("rg", *c));
                out.push(Operation::new(
                    "re",
                    vec![
                        num(pt(*x_mm)),
                        num(page_h - pt(*y_mm + *height_mm)),
                        num(pt(*width_mm)),
                        num(pt(*height_mm)),
                    ],
                ));
                out.push(Operation::new("f", vec![]));
            }
        }
    }
    out
}

/// Serialises `layout` into a complete PDF file.
pub fn write_pdf(layout: &Layout) -> Result<Vec<u8>, RenderError> {
    let page_w = pt(layout.page_width_mm);
    let page_h = pt(layout.page_height_mm);

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => layout.family.base_font(face),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.page_count);
    for page in 0..layout.page_count {
        let content = Content {
            operations: page_operations(layout, page, page_h),
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => layout.page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![num(0.0), num(0.0), num(page_w), num(page_h)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_document, CancelToken, TemplateId};

    fn pdf_for(text: &str, id: TemplateId) -> Vec<u8> {
        let layout = layout_document(text, &id.style(), &CancelToken::new()).unwrap();
        write_pdf(&layout).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(encode_win_ansi("Rust"), b"Rust".to_vec());
        assert_eq!(encode_win_ansi("• é"), vec![0x95, b' ', 0xe9]);
        assert_eq!(encode_win_ansi("🚀 漢"), b"? ?".to_vec());
    }

    #[test]
    fn test_blank_document_is_valid_one_page_pdf() {
        let bytes = pdf_for("", TemplateId::Ats);
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_page_count_matches_layout() {
        let mut text = String::from("Sam Lee\n");
        for i in 0..150 {
            text.push_str(&format!("Line {i} of body text\n"));
        }
        let layout = layout_document(&text, &TemplateId::Classic.style(), &CancelToken::new()).unwrap();
        let doc = Document::load_mem(&write_pdf(&layout).unwrap()).unwrap();
        assert!(layout.page_count > 1);
        assert_eq!(doc.get_pages().len(), layout.page_count);
    }

    #[test]
    fn test_output_is_byte_identical_and_undated() {
        let text = "JANE DOE\nSoftware Engineer\njane@x.com\n\nSUMMARY:\nExperienced engineer.";
        for id in [TemplateId::Modern, TemplateId::Professional] {
            let a = pdf_for(text, id);
            let b = pdf_for(text, id);
            assert_eq!(a, b);
            assert!(!contains(&a, b"CreationDate"));
            assert!(!contains(&a, b"/ID"));
        }
    }

    #[test]
    fn test_text_is_written_uncompressed() {
        let bytes = pdf_for("Jane Doe\n• Café owner", TemplateId::Ats);
        assert!(contains(&bytes, b"(Jane Doe)"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
    }

    #[test]
    fn test_times_family_for_classic() {
        let bytes = pdf_for("Jane Doe", TemplateId::Classic);
        assert!(contains(&bytes, b"/Times-Roman"));
        assert!(!contains(&bytes, b"/Helvetica"));
    }
}
