//! Report composition: lays out a [`ReportDocument`] onto paginated US Letter
//! pages and serializes the result to PDF bytes.
//!
//! The composer is a pure function of its input document. Layout walks a
//! cursor down the page, breaking to a fresh page when a block does not fit,
//! and re-drawing table headers after each break. Cell text is word-wrapped
//! against computed column widths rather than truncated.

#[allow(unused_imports)]
use image::GenericImageView;
use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, IndirectFontRef, Line, Mm, PdfConformance,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Polygon, Rgb,
};
use std::fmt;
use std::io::BufWriter;

use crate::report::document::{ReportDocument, ReportSection, SubjectDetails};

#[derive(Debug)]
pub enum LayoutError {
    /// A section row does not match its column set - a bug in document
    /// construction, not a user-facing condition.
    ColumnMismatch {
        heading: String,
        expected: usize,
        actual: usize,
    },
    NoColumns {
        heading: String,
    },
    Pdf(String),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnMismatch {
                heading,
                expected,
                actual,
            } => write!(
                f,
                "section '{heading}': row has {actual} cells, expected {expected}"
            ),
            Self::NoColumns { heading } => {
                write!(f, "section '{heading}': no columns defined")
            }
            Self::Pdf(msg) => write!(f, "pdf serialization: {msg}"),
        }
    }
}

impl std::error::Error for LayoutError {}

// US Letter in millimetres.
const LETTER_PORTRAIT: (f64, f64) = (215.9, 279.4);
const MARGIN: f64 = 15.0;

const PT_TO_MM: f64 = 0.352_778;

const TITLE_SIZE: f64 = 18.0;
const HEADING_SIZE: f64 = 14.0;
const BODY_SIZE: f64 = 10.0;
const TABLE_HEADER_SIZE: f64 = 9.0;
const TABLE_CELL_SIZE: f64 = 8.0;

/// Max column width for dense summary tables (80pt).
const SUMMARY_COLUMN_CAP: f64 = 80.0 * PT_TO_MM;

const CELL_PAD_H: f64 = 1.6;
const CELL_PAD_V: f64 = 1.2;

/// Charts are embedded at 300 dpi.
const IMAGE_DPI: f64 = 300.0;

fn mm(value: f64) -> Mm {
    Mm(value as _)
}

fn pdf_err<E: fmt::Display>(e: E) -> LayoutError {
    LayoutError::Pdf(e.to_string())
}

/// Approximate advance width of one Helvetica glyph, in em units. Exact
/// metrics are not needed: wrapping errs on the generous side.
fn char_width_em(c: char) -> f64 {
    match c {
        'i' | 'j' | 'l' | '!' | '|' | '\'' | '.' | ',' | ':' | ';' => 0.28,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | ' ' => 0.38,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.92,
        'A'..='Z' | '_' | '~' => 0.70,
        '0'..='9' => 0.56,
        _ => 0.54,
    }
}

/// Estimated rendered width of `text` at `size_pt`, in millimetres.
fn text_width_mm(text: &str, size_pt: f64) -> f64 {
    text.chars().map(char_width_em).sum::<f64>() * size_pt * PT_TO_MM
}

fn line_height_mm(size_pt: f64) -> f64 {
    size_pt * 1.35 * PT_TO_MM
}

/// Greedy word wrap against a width budget. Words longer than a full line
/// are split mid-word so no text is ever dropped.
fn wrap_text(text: &str, max_width_mm: f64, size_pt: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    let mut push_word = |word: &str, lines: &mut Vec<String>, current: &mut String| {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, size_pt) <= max_width_mm {
            *current = candidate;
            return;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(current));
        }
        if text_width_mm(word, size_pt) <= max_width_mm {
            *current = word.to_string();
            return;
        }
        // Overlong word: hard-split by characters.
        let mut piece = String::new();
        for c in word.chars() {
            piece.push(c);
            if text_width_mm(&piece, size_pt) > max_width_mm && piece.chars().count() > 1 {
                piece.pop();
                lines.push(std::mem::take(&mut piece));
                piece.push(c);
            }
        }
        *current = piece;
    };

    for word in text.split_whitespace() {
        push_word(word, &mut lines, &mut current);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Column widths for a section table. Summary tables cap each column and
/// leave the remaining width blank; detail tables split evenly.
fn column_widths(section: &ReportSection, available_mm: f64) -> Vec<f64> {
    let count = section.columns.len().max(1);
    let width = if section.is_summary() {
        (available_mm / count as f64).min(SUMMARY_COLUMN_CAP)
    } else {
        available_mm / count as f64
    };
    vec![width; count]
}

fn validate(document: &ReportDocument) -> Result<(), LayoutError> {
    for section in &document.sections {
        if section.columns.is_empty() {
            return Err(LayoutError::NoColumns {
                heading: section.heading.clone(),
            });
        }
        for row in &section.rows {
            if row.len() != section.columns.len() {
                return Err(LayoutError::ColumnMismatch {
                    heading: section.heading.clone(),
                    expected: section.columns.len(),
                    actual: row.len(),
                });
            }
        }
    }
    Ok(())
}

struct Composer<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page_width: f64,
    page_height: f64,
    /// Distance from the top of the current page, in millimetres.
    cursor: f64,
}

impl Composer<'_> {
    fn content_width(&self) -> f64 {
        self.page_width - 2.0 * MARGIN
    }

    fn fits(&self, height_mm: f64) -> bool {
        self.cursor + height_mm <= self.page_height - MARGIN
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(mm(self.page_width), mm(self.page_height), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = MARGIN;
    }

    fn ensure_space(&mut self, height_mm: f64) {
        if !self.fits(height_mm) {
            self.new_page();
        }
    }

    fn set_color(&self, r: f64, g: f64, b: f64) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(r as _, g as _, b as _, None)));
    }

    fn set_outline(&self, r: f64, g: f64, b: f64, thickness: f64) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(r as _, g as _, b as _, None)));
        self.layer.set_outline_thickness(thickness as _);
    }

    /// Draw one line of text with its top edge at the cursor, without
    /// advancing it.
    fn draw_text_at(&self, text: &str, size_pt: f64, x_mm: f64, top_offset_mm: f64, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        // use_text takes the baseline; approximate ascent as 0.8 em.
        let baseline_from_top =
            self.cursor + top_offset_mm + size_pt * 0.8 * PT_TO_MM;
        self.layer.use_text(
            text,
            size_pt as _,
            mm(x_mm),
            mm(self.page_height - baseline_from_top),
            font,
        );
    }

    fn text_line(&mut self, text: &str, size_pt: f64, x_mm: f64, bold: bool) {
        let height = line_height_mm(size_pt);
        self.ensure_space(height);
        self.draw_text_at(text, size_pt, x_mm, 0.0, bold);
        self.cursor += height;
    }

    fn spacer(&mut self, height_mm: f64) {
        // Trailing space at a page end just disappears.
        if self.fits(height_mm) {
            self.cursor += height_mm;
        }
    }

    fn title(&mut self, text: &str) {
        self.set_color(0.0, 0.0, 0.0);
        let x = MARGIN + (self.content_width() - text_width_mm(text, TITLE_SIZE)).max(0.0) / 2.0;
        self.text_line(text, TITLE_SIZE, x, true);
        self.spacer(6.0);
    }

    fn heading(&mut self, text: &str) {
        // Keep the heading attached to at least one following line.
        self.ensure_space(line_height_mm(HEADING_SIZE) + line_height_mm(BODY_SIZE) + 3.0);
        self.set_color(0.0, 0.0, 0.55);
        self.text_line(text, HEADING_SIZE, MARGIN, true);
        self.set_color(0.0, 0.0, 0.0);
        self.spacer(1.5);
    }

    fn paragraph(&mut self, text: &str) {
        self.set_color(0.0, 0.0, 0.0);
        for line in wrap_text(text, self.content_width(), BODY_SIZE) {
            self.text_line(&line, BODY_SIZE, MARGIN, false);
        }
        self.spacer(4.0);
    }

    fn horizontal_line(&self, x1: f64, x2: f64, y_from_top: f64) {
        let y = self.page_height - y_from_top;
        let line = Line {
            points: vec![
                (Point::new(mm(x1), mm(y)), false),
                (Point::new(mm(x2), mm(y)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    fn vertical_line(&self, x: f64, y1_from_top: f64, y2_from_top: f64) {
        let line = Line {
            points: vec![
                (Point::new(mm(x), mm(self.page_height - y1_from_top)), false),
                (Point::new(mm(x), mm(self.page_height - y2_from_top)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    fn fill_rect(&self, x1: f64, y1_from_top: f64, x2: f64, y2_from_top: f64) {
        let lly = self.page_height - y2_from_top;
        let ury = self.page_height - y1_from_top;
        let poly: Polygon = vec![
            (Point::new(mm(x1), mm(lly)), false),
            (Point::new(mm(x2), mm(lly)), false),
            (Point::new(mm(x2), mm(ury)), false),
            (Point::new(mm(x1), mm(ury)), false),
        ]
        .into_iter()
        .collect();
        self.layer.add_polygon(poly);
    }

    /// Height one row would occupy, given per-column widths.
    fn measure_row(&self, cells: &[String], widths: &[f64], size_pt: f64) -> f64 {
        let lines = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                wrap_text(cell, (width - 2.0 * CELL_PAD_H).max(2.0), size_pt).len()
            })
            .max()
            .unwrap_or(1)
            .max(1);
        lines as f64 * line_height_mm(size_pt) + 2.0 * CELL_PAD_V
    }

    /// Draw one table row (grid, optional shading, wrapped cell text) and
    /// advance the cursor. The caller has already guaranteed it fits.
    fn draw_row(&mut self, cells: &[String], widths: &[f64], size_pt: f64, header: bool) {
        let top = self.cursor;
        let row_height = self.measure_row(cells, widths, size_pt);
        let table_width: f64 = widths.iter().sum();

        if header {
            self.set_color(0.68, 0.85, 0.90);
            self.fill_rect(MARGIN, top, MARGIN + table_width, top + row_height);
        }

        self.set_outline(0.0, 0.0, 0.0, 0.6);
        self.horizontal_line(MARGIN, MARGIN + table_width, top);
        self.horizontal_line(MARGIN, MARGIN + table_width, top + row_height);
        let mut x = MARGIN;
        self.vertical_line(x, top, top + row_height);
        for width in widths {
            x += width;
            self.vertical_line(x, top, top + row_height);
        }

        self.set_color(0.0, 0.0, 0.0);
        let mut x = MARGIN;
        for (cell, width) in cells.iter().zip(widths) {
            let lines = wrap_text(cell, (width - 2.0 * CELL_PAD_H).max(2.0), size_pt);
            for (i, line) in lines.iter().enumerate() {
                self.draw_text_at(
                    line,
                    size_pt,
                    x + CELL_PAD_H,
                    CELL_PAD_V + i as f64 * line_height_mm(size_pt),
                    header,
                );
            }
            x += width;
        }

        self.cursor = top + row_height;
    }

    /// Draw a full section table, repeating the header row after page breaks.
    fn table(&mut self, section: &ReportSection) {
        let widths = column_widths(section, self.content_width());
        let header_height = self.measure_row(&section.columns, &widths, TABLE_HEADER_SIZE);

        self.ensure_space(header_height + line_height_mm(TABLE_CELL_SIZE) + 2.0 * CELL_PAD_V);
        self.draw_row(&section.columns, &widths, TABLE_HEADER_SIZE, true);

        for row in &section.rows {
            let row_height = self.measure_row(row, &widths, TABLE_CELL_SIZE);
            if !self.fits(row_height) {
                self.new_page();
                self.draw_row(&section.columns, &widths, TABLE_HEADER_SIZE, true);
            }
            self.draw_row(row, &widths, TABLE_CELL_SIZE, false);
        }
        self.spacer(6.0);
    }

    fn subject_table(&mut self, subject: &SubjectDetails) {
        let label_width = 45.0;
        let value_width = (self.content_width() - label_width).min(110.0);
        let widths = [label_width, value_width];

        let rows: [(&str, &str); 5] = [
            ("Name", &subject.name),
            ("Department", &subject.department),
            ("Designation", &subject.designation),
            ("Email", &subject.email),
            ("Phone", &subject.phone),
        ];

        for (label, value) in rows {
            let cells = [label.to_string(), value.to_string()];
            let row_height = self.measure_row(&cells, &widths, BODY_SIZE);
            self.ensure_space(row_height);
            self.draw_row(&cells, &widths, BODY_SIZE, false);
        }
        self.spacer(6.0);
    }

    fn chart(&mut self, caption: &str, png_bytes: &[u8], fleet_wide: bool) -> Result<(), LayoutError> {
        let decoded = image::load_from_memory(png_bytes)
            .map_err(|e| LayoutError::Pdf(format!("chart image decode: {e}")))?;
        let (px_width, px_height) = (decoded.width() as f64, decoded.height() as f64);

        let natural_width_mm = px_width * 25.4 / IMAGE_DPI;
        let natural_height_mm = px_height * 25.4 / IMAGE_DPI;
        let target_width_mm = if fleet_wide { 170.0 } else { 130.0 };
        let scale = target_width_mm / natural_width_mm;
        let height_mm = natural_height_mm * scale;

        let caption_height = line_height_mm(BODY_SIZE);
        self.ensure_space(caption_height + height_mm + 4.0);

        self.set_color(0.0, 0.0, 0.0);
        self.text_line(caption, BODY_SIZE, MARGIN, false);
        self.spacer(1.0);

        let top = self.cursor;
        let pdf_image = printpdf::Image::from_dynamic_image(&decoded);
        pdf_image.add_to_layer(
            self.layer.clone(),
            printpdf::ImageTransform {
                translate_x: Some(mm(MARGIN)),
                translate_y: Some(mm(self.page_height - top - height_mm)),
                scale_x: Some(scale as _),
                scale_y: Some(scale as _),
                ..Default::default()
            },
        );
        self.cursor = top + height_mm;
        self.spacer(4.0);
        Ok(())
    }
}

/// Compose `document` into a complete PDF byte stream.
///
/// Pure over its input: identical documents produce identical bytes, modulo
/// the creation timestamp the PDF container itself embeds.
pub fn compose(document: &ReportDocument) -> Result<Vec<u8>, LayoutError> {
    validate(document)?;

    let (page_width, page_height) = if document.is_fleet_wide() {
        (LETTER_PORTRAIT.1, LETTER_PORTRAIT.0)
    } else {
        LETTER_PORTRAIT
    };

    let (doc, page, layer) = PdfDocument::new(
        document.title.as_str(),
        mm(page_width),
        mm(page_height),
        "Layer 1",
    );
    let doc = doc.with_conformance(PdfConformance::Custom(CustomPdfConformance {
        requires_icc_profile: false,
        requires_xmp_metadata: false,
        ..Default::default()
    }));

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut composer = Composer {
        layer: doc.get_page(page).get_layer(layer),
        doc: &doc,
        regular,
        bold,
        page_width,
        page_height,
        cursor: MARGIN,
    };

    composer.title(&document.title);

    let subject_label = if document.is_fleet_wide() {
        "Administrator Details"
    } else {
        "User Details"
    };
    composer.heading(subject_label);
    composer.subject_table(&document.subject);

    composer.heading("Progress Overview");
    composer.paragraph(&document.narrative_intro);

    // Charts with no image are skipped outright - caption included.
    let rendered_charts: Vec<_> = document
        .charts
        .iter()
        .filter_map(|chart| chart.image.as_deref().map(|image| (&chart.caption, image)))
        .collect();
    if !rendered_charts.is_empty() {
        composer.heading("Visual Analytics");
        for (caption, image) in rendered_charts {
            composer.chart(caption, image, document.is_fleet_wide())?;
        }
        composer.spacer(4.0);
    }

    for section in &document.sections {
        composer.heading(&section.heading);
        if section.is_empty() {
            composer.paragraph("No data available.");
        } else {
            composer.table(section);
        }
    }

    composer.heading("Final Summary");
    composer.paragraph(&document.narrative_summary);
    composer.spacer(14.0);

    composer.paragraph("Authorized Signature: ___________________________");
    composer.paragraph(&format!("Date: {}", document.signature_date));

    drop(composer);

    let mut buffer = Vec::new();
    doc.save(&mut BufWriter::new(&mut buffer)).map_err(pdf_err)?;
    Ok(buffer)
}
