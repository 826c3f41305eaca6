// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF composer — draws a `DocumentLayout` onto pages using `printpdf` 0.8.
//
// printpdf 0.8 is data-oriented: each page is a `Vec<Op>`. Pages are drawn
// back to front: security border and watermark, header band, body rows,
// then the footer once the total page count is known.

use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Polygon, PolygonRing, Pt, Rgb, TextItem, TextMatrix, WindingOrder,
};
use tracing::{debug, instrument};
use urkunde_core::error::{GenerationError, Result};

use crate::layout::{Accent, DocumentLayout, PageGeometry, Row};

/// Average Helvetica glyph width as a fraction of the font size.
const HELVETICA_EM: f32 = 0.50;
/// Courier is monospaced at 0.6 em.
const COURIER_EM: f32 = 0.60;

/// Size-dependent drawing metrics, in points.
#[derive(Debug, Clone, Copy)]
struct Metrics {
    width: f32,
    height: f32,
    margin: f32,
    band_height: f32,
    authority_size: f32,
    title_size: f32,
    subtitle_size: f32,
    heading_size: f32,
    body_size: f32,
    line_height: f32,
    label_width: f32,
    footer_size: f32,
    footer_line_height: f32,
    mrz_size: f32,
    microtext_size: f32,
    watermark_size: f32,
    border_inset: f32,
    border_gap: f32,
}

impl Metrics {
    fn for_geometry(geometry: PageGeometry) -> Self {
        let (width, height) = geometry.size_pt();
        match geometry {
            PageGeometry::Card => Self {
                width,
                height,
                margin: 9.0,
                band_height: 20.0,
                authority_size: 4.5,
                title_size: 8.5,
                subtitle_size: 5.0,
                heading_size: 5.0,
                body_size: 4.6,
                line_height: 5.4,
                label_width: 62.0,
                footer_size: 3.8,
                footer_line_height: 4.2,
                mrz_size: 5.2,
                microtext_size: 2.2,
                watermark_size: 30.0,
                border_inset: 3.0,
                border_gap: 1.5,
            },
            PageGeometry::A4Portrait | PageGeometry::A4Landscape => Self {
                width,
                height,
                margin: 48.0,
                band_height: 80.0,
                authority_size: 9.0,
                title_size: 20.0,
                subtitle_size: 11.0,
                heading_size: 12.0,
                body_size: 10.0,
                line_height: 14.0,
                label_width: 170.0,
                footer_size: 8.0,
                footer_line_height: 11.0,
                mrz_size: 10.0,
                microtext_size: 4.0,
                watermark_size: 96.0,
                border_inset: 18.0,
                border_gap: 4.0,
            },
        }
    }

    /// First baseline below the header band.
    fn body_top(&self) -> f32 {
        self.height - self.margin - self.band_height - self.heading_size * 1.5
    }

    /// Lowest baseline the body may use, leaving room for `footer_lines`
    /// plus the page-number line.
    fn body_bottom(&self, footer_lines: usize) -> f32 {
        self.margin + (footer_lines as f32 + 1.0) * self.footer_line_height + self.line_height
    }

    fn value_x(&self) -> f32 {
        self.margin + self.label_width
    }

    /// Characters of body text that fit in the value column.
    fn value_chars(&self) -> usize {
        let width = self.width - self.margin - self.value_x();
        ((width / (HELVETICA_EM * self.body_size)) as usize).max(8)
    }
}

/// Turns layouts into PDF bytes. Stateless; performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfComposer;

impl PdfComposer {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all, fields(title = %layout.title, sections = layout.sections.len()))]
    pub fn compose(&self, layout: &DocumentLayout) -> Result<Vec<u8>> {
        let metrics = Metrics::for_geometry(layout.geometry);
        let mut pages = PageSet::new(layout, metrics);

        for section in &layout.sections {
            pages.write_heading(&section.heading, false);
            for row in &section.rows {
                pages.write_row(row, &section.heading);
            }
        }
        if let Some(mrz) = &layout.mrz {
            pages.write_mrz(&mrz.line1, &mrz.line2);
        }

        let bodies = pages.finish();
        let total = bodies.len();
        let page_w = mm(metrics.width);
        let page_h = mm(metrics.height);

        let pdf_pages: Vec<PdfPage> = bodies
            .into_iter()
            .enumerate()
            .map(|(index, mut ops)| {
                draw_footer(&mut ops, layout, &metrics, index + 1, total);
                PdfPage::new(page_w, page_h, ops)
            })
            .collect();

        let mut doc = PdfDocument::new(&layout.title);
        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        if !output.starts_with(b"%PDF") {
            return Err(GenerationError::RenderFailure(
                "composer produced no PDF header".into(),
            ));
        }

        debug!(
            pages = total,
            bytes = output.len(),
            warnings = warnings.len(),
            "document composed"
        );
        Ok(output)
    }
}

// -- Page flow ----------------------------------------------------------------

/// Accumulates body ops, breaking to a new page when the cursor would run
/// into the footer.
struct PageSet<'a> {
    layout: &'a DocumentLayout,
    metrics: Metrics,
    finished: Vec<Vec<Op>>,
    ops: Vec<Op>,
    y: f32,
}

impl<'a> PageSet<'a> {
    fn new(layout: &'a DocumentLayout, metrics: Metrics) -> Self {
        let mut set = Self {
            layout,
            metrics,
            finished: Vec::new(),
            ops: Vec::new(),
            y: 0.0,
        };
        set.begin_page();
        set
    }

    fn bottom(&self) -> f32 {
        self.metrics.body_bottom(self.layout.footer.len())
    }

    fn begin_page(&mut self) {
        let m = self.metrics;
        draw_security_border(&mut self.ops, self.layout.accent, &m);
        draw_watermark(&mut self.ops, &self.layout.watermark, &m);
        draw_header(&mut self.ops, self.layout, &m, !self.finished.is_empty());
        self.y = m.body_top();
    }

    fn break_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.ops));
        self.begin_page();
    }

    /// Start a new page unless `needed` points still fit above the footer.
    fn ensure_room(&mut self, needed: f32) -> bool {
        if self.y - needed < self.bottom() {
            self.break_page();
            true
        } else {
            false
        }
    }

    fn write_heading(&mut self, heading: &str, continued: bool) {
        let m = self.metrics;
        if !continued {
            // Keep a heading together with its first row.
            self.ensure_room(m.heading_size + m.line_height * 1.5);
            self.y -= m.heading_size * 0.5;
        }

        let text = if continued {
            format!("{heading} (continued)")
        } else {
            heading.to_owned()
        };
        write_text(
            &mut self.ops,
            m.margin,
            self.y,
            m.heading_size,
            BuiltinFont::HelveticaBold,
            accent_color(self.layout.accent),
            &text,
        );

        let rule_y = self.y - m.heading_size * 0.35;
        stroke_line(
            &mut self.ops,
            (m.margin, rule_y),
            (m.width - m.margin, rule_y),
            accent_color(self.layout.accent),
            m.body_size * 0.05,
        );
        self.y -= m.heading_size + m.line_height * 0.4;
    }

    fn write_row(&mut self, row: &Row, heading: &str) {
        let m = self.metrics;
        let lines = wrap_text(&row.value, m.value_chars());
        let needed = lines.len().max(1) as f32 * m.line_height;

        if self.ensure_room(needed) {
            self.write_heading(heading, true);
        }

        write_text(
            &mut self.ops,
            m.margin,
            self.y,
            m.body_size,
            BuiltinFont::HelveticaBold,
            gray(0.35),
            &row.label,
        );
        for line in &lines {
            write_text(
                &mut self.ops,
                m.value_x(),
                self.y,
                m.body_size,
                BuiltinFont::Helvetica,
                gray(0.08),
                line,
            );
            self.y -= m.line_height;
        }
        if lines.is_empty() {
            self.y -= m.line_height;
        }
    }

    fn write_mrz(&mut self, line1: &str, line2: &str) {
        let m = self.metrics;
        let size = mrz_font_size(&m, line1.chars().count().max(line2.chars().count()));
        let line_height = size * 1.25;
        self.ensure_room(line_height * 2.0 + m.line_height * 0.5);
        self.y -= m.line_height * 0.5;

        for line in [line1, line2] {
            write_text(
                &mut self.ops,
                m.margin,
                self.y,
                size,
                BuiltinFont::Courier,
                gray(0.0),
                line,
            );
            self.y -= line_height;
        }
    }

    fn finish(mut self) -> Vec<Vec<Op>> {
        self.finished.push(self.ops);
        self.finished
    }
}

// -- Fixed page furniture -----------------------------------------------------

fn draw_header(ops: &mut Vec<Op>, layout: &DocumentLayout, m: &Metrics, continued: bool) {
    let band_y = m.height - m.margin - m.band_height;
    fill_rect(
        ops,
        m.margin,
        band_y,
        m.width - 2.0 * m.margin,
        m.band_height,
        accent_color(layout.accent),
    );

    let pad = m.band_height * 0.14;
    let x = m.margin + pad;
    let mut y = m.height - m.margin - pad - m.authority_size;

    write_text(
        ops,
        x,
        y,
        m.authority_size,
        BuiltinFont::Helvetica,
        gray(1.0),
        &layout.authority.to_uppercase(),
    );
    y -= m.title_size * 1.15;

    let title = if continued {
        format!("{} (continued)", layout.title)
    } else {
        layout.title.clone()
    };
    write_text(ops, x, y, m.title_size, BuiltinFont::HelveticaBold, gray(1.0), &title);

    if let Some(subtitle) = &layout.subtitle {
        y -= m.subtitle_size * 1.3;
        write_text(ops, x, y, m.subtitle_size, BuiltinFont::Helvetica, gray(1.0), subtitle);
    }
}

/// Double border in the accent colour.
fn draw_security_border(ops: &mut Vec<Op>, accent: Accent, m: &Metrics) {
    let outer = m.border_inset;
    let inner = m.border_inset + m.border_gap;
    stroke_rect(
        ops,
        outer,
        outer,
        m.width - 2.0 * outer,
        m.height - 2.0 * outer,
        accent_color(accent),
        m.body_size * 0.12,
    );
    stroke_rect(
        ops,
        inner,
        inner,
        m.width - 2.0 * inner,
        m.height - 2.0 * inner,
        accent_color(accent),
        m.body_size * 0.04,
    );
}

/// Large light text rotated 45 degrees through the page centre.
fn draw_watermark(ops: &mut Vec<Op>, text: &str, m: &Metrics) {
    let text_width = text.chars().count() as f32 * m.watermark_size * 0.66;
    let half_diag = text_width / 2.0 * std::f32::consts::FRAC_1_SQRT_2;
    let x = m.width / 2.0 - half_diag;
    let y = m.height / 2.0 - half_diag;

    ops.push(Op::StartTextSection);
    ops.push(Op::SetFillColor { col: gray(0.92) });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(m.watermark_size),
        font: BuiltinFont::HelveticaBold,
    });
    ops.push(Op::SetTextMatrix {
        matrix: TextMatrix::TranslateRotate(Pt(x), Pt(y), 45.0),
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_owned())],
        font: BuiltinFont::HelveticaBold,
    });
    ops.push(Op::EndTextSection);
}

fn draw_footer(ops: &mut Vec<Op>, layout: &DocumentLayout, m: &Metrics, page: usize, total: usize) {
    let mut y = m.margin + layout.footer.len() as f32 * m.footer_line_height;
    for line in &layout.footer {
        write_text(ops, m.margin, y, m.footer_size, BuiltinFont::Helvetica, gray(0.3), line);
        y -= m.footer_line_height;
    }
    write_text(
        ops,
        m.margin,
        y,
        m.footer_size,
        BuiltinFont::Helvetica,
        gray(0.45),
        &format!("Page {page} of {total}"),
    );

    // Microtext runs along the inside of the bottom border.
    if !layout.microtext.is_empty() {
        let inner = m.border_inset + m.border_gap;
        let usable = m.width - 2.0 * inner - m.microtext_size;
        let unit = format!("{} ", layout.microtext);
        let unit_width = unit.chars().count() as f32 * HELVETICA_EM * m.microtext_size;
        let repeats = ((usable / unit_width) as usize).max(1);
        write_text(
            ops,
            inner + m.microtext_size * 0.5,
            inner + m.microtext_size * 0.6,
            m.microtext_size,
            BuiltinFont::Helvetica,
            accent_color(layout.accent),
            &unit.repeat(repeats),
        );
    }
}

// -- Op helpers ---------------------------------------------------------------

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn gray(level: f32) -> Color {
    rgb(level, level, level)
}

fn accent_color(accent: Accent) -> Color {
    let Accent(r, g, b) = accent;
    rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn rect_points(x: f32, y: f32, w: f32, h: f32) -> Vec<LinePoint> {
    vec![
        point(x, y),
        point(x + w, y),
        point(x + w, y + h),
        point(x, y + h),
    ]
}

fn write_text(
    ops: &mut Vec<Op>,
    x: f32,
    y: f32,
    size: f32,
    font: BuiltinFont,
    color: Color,
    text: &str,
) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetFillColor { col: color });
    ops.push(Op::SetTextCursor {
        pos: Point { x: Pt(x), y: Pt(y) },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_owned())],
        font,
    });
    ops.push(Op::EndTextSection);
}

fn fill_rect(ops: &mut Vec<Op>, x: f32, y: f32, w: f32, h: f32, color: Color) {
    ops.push(Op::SetFillColor { col: color });
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![PolygonRing {
                points: rect_points(x, y, w, h),
            }],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        },
    });
}

fn stroke_rect(ops: &mut Vec<Op>, x: f32, y: f32, w: f32, h: f32, color: Color, thickness: f32) {
    ops.push(Op::SetOutlineColor { col: color });
    ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
    ops.push(Op::DrawLine {
        line: Line {
            points: rect_points(x, y, w, h),
            is_closed: true,
        },
    });
}

fn stroke_line(ops: &mut Vec<Op>, from: (f32, f32), to: (f32, f32), color: Color, thickness: f32) {
    ops.push(Op::SetOutlineColor { col: color });
    ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![point(from.0, from.1), point(to.0, to.1)],
            is_closed: false,
        },
    });
}

// -- Text wrapping ------------------------------------------------------------

/// Word-wrap `text` to at most `max_chars` characters per line.
///
/// Existing newlines are kept; words longer than a line are force-broken on
/// character boundaries.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > max_chars {
                if !current.is_empty() {
                    result.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_chars).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        result.push(chunk.iter().collect());
                    } else {
                        current = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::replace(&mut current, word.to_owned()));
                current_len = word_len;
            }
        }

        if !current.is_empty() {
            result.push(current);
        }
    }

    result
}

/// MRZ point size, shrunk when a line would overflow the text column.
fn mrz_font_size(m: &Metrics, chars: usize) -> f32 {
    let column = m.width - 2.0 * m.margin;
    m.mrz_size.min(column / (chars.max(1) as f32 * COURIER_EM))
}
