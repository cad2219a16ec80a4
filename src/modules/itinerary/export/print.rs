//! A4 PDF export.
//!
//! Text is drawn with the built-in Helvetica faces, so every field goes
//! through [`sanitize_for_print`] first. Long text is wrapped against the
//! printable width using the Helvetica advance widths.

use anyhow::{Result, anyhow};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::{detail_line, display_title};
use crate::{modules::itinerary::accumulator::DayEntry, utils::sanitize::sanitize_for_print};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_X_MM: f32 = 18.0;
const TEXT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_X_MM;
const CONTENT_TOP_MM: f32 = 272.0;
const CONTENT_BOTTOM_MM: f32 = 20.0;
const HEADER_Y_MM: f32 = 284.0;
const FOOTER_Y_MM: f32 = 10.0;
const CHROME_FONT_SIZE: f32 = 9.0;
const PT_TO_MM: f32 = 0.3528;
const LEADING: f32 = 1.4;

/// Advance widths in 1/1000 em for `' '..='~'`, from the standard Helvetica metrics.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Upper bound for the Latin-1 glyphs above ASCII in both faces.
const WIDEST_LATIN1_GLYPH: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineStyle {
    Title,
    Heading,
    Detail,
    Body,
}

impl LineStyle {
    fn font_size(self) -> f32 {
        match self {
            LineStyle::Title => 18.0,
            LineStyle::Heading => 13.0,
            LineStyle::Detail | LineStyle::Body => 10.0,
        }
    }

    fn space_before(self) -> f32 {
        match self {
            LineStyle::Heading => 6.0,
            LineStyle::Title | LineStyle::Detail | LineStyle::Body => 0.0,
        }
    }

    fn bold(self) -> bool {
        matches!(self, LineStyle::Title | LineStyle::Heading)
    }

    /// Vertical space in millimetres taken by one line of this style.
    fn height(self) -> f32 {
        self.space_before() + self.font_size() * PT_TO_MM * LEADING
    }

    /// Horizontal space in millimetres taken by `text` in this style.
    fn text_width(self, text: &str) -> f32 {
        let widths = if self.bold() {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        let units: u32 = text
            .chars()
            .map(|ch| match ch {
                ' '..='~' => u32::from(widths[ch as usize - 32]),
                _ => WIDEST_LATIN1_GLYPH,
            })
            .sum();
        units as f32 / 1000.0 * self.font_size() * PT_TO_MM
    }
}

#[derive(Clone, Debug, PartialEq)]
struct PrintLine {
    style: LineStyle,
    text: String,
}

pub fn to_pdf(title: &str, entries: &[DayEntry], company_name: &str) -> Result<Vec<u8>> {
    let company = sanitize_for_print(company_name);
    let pages = paginate(layout_lines(title, entries));

    let (doc, first_page, first_layer) = PdfDocument::new(
        sanitize_for_print(display_title(title)),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| anyhow!("failed to load Helvetica: {err:?}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| anyhow!("failed to load Helvetica Bold: {err:?}"))?;

    for (idx, lines) in pages.iter().enumerate() {
        let layer = if idx == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        draw_chrome(&layer, &company, idx + 1, &bold, &regular);

        let mut cursor_y = CONTENT_TOP_MM;
        for line in lines {
            cursor_y -= line.style.height();
            let font = if line.style.bold() { &bold } else { &regular };
            layer.use_text(
                line.text.clone(),
                line.style.font_size(),
                Mm(MARGIN_X_MM),
                Mm(cursor_y),
                font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|err| anyhow!("failed to serialize itinerary PDF: {err:?}"))
}

fn draw_chrome(
    layer: &PdfLayerReference,
    company: &str,
    page_number: usize,
    bold: &IndirectFontRef,
    regular: &IndirectFontRef,
) {
    if !company.is_empty() {
        layer.use_text(
            company,
            CHROME_FONT_SIZE,
            Mm(MARGIN_X_MM),
            Mm(HEADER_Y_MM),
            bold,
        );
    }
    layer.use_text(
        format!("Page {page_number}"),
        CHROME_FONT_SIZE,
        Mm(PAGE_WIDTH_MM - MARGIN_X_MM - 15.0),
        Mm(FOOTER_Y_MM),
        regular,
    );
}

/// Flattens the document into sanitized, wrapped lines.
fn layout_lines(title: &str, entries: &[DayEntry]) -> Vec<PrintLine> {
    let mut lines = Vec::new();
    push_wrapped(&mut lines, LineStyle::Title, display_title(title));

    for (idx, entry) in entries.iter().enumerate() {
        let heading = format!("Day {}: {}", idx + 1, entry.route);
        push_wrapped(&mut lines, LineStyle::Heading, &heading);

        if let Some(details) = detail_line(entry) {
            push_wrapped(&mut lines, LineStyle::Detail, &details);
        }
        if !entry.description.trim().is_empty() {
            push_wrapped(&mut lines, LineStyle::Body, &entry.description);
        }
    }

    lines
}

fn push_wrapped(lines: &mut Vec<PrintLine>, style: LineStyle, text: &str) {
    let cleaned = sanitize_for_print(text);
    lines.extend(
        wrap_text(&cleaned, TEXT_WIDTH_MM, |line| style.text_width(line))
            .into_iter()
            .map(|text| PrintLine { style, text }),
    );
}

/// Splits lines into pages, never leaving a day heading as the last line of a page.
fn paginate(lines: Vec<PrintLine>) -> Vec<Vec<PrintLine>> {
    let available = CONTENT_TOP_MM - CONTENT_BOTTOM_MM;
    let mut pages = Vec::new();
    let mut current: Vec<PrintLine> = Vec::new();
    let mut used = 0.0;

    for line in lines {
        let mut needed = line.style.height();
        if line.style == LineStyle::Heading {
            needed += LineStyle::Body.height();
        }
        if !current.is_empty() && used + needed > available {
            pages.push(std::mem::take(&mut current));
            used = 0.0;
        }
        used += line.style.height();
        current.push(line);
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// Greedy word wrap: no line measures wider than `max_width`. Words wider
/// than a line are split; explicit line breaks are kept.
fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut current = String::new();

        for word in raw_line.split_whitespace() {
            let mut word = word;
            while measure(word) > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split = longest_fitting_prefix(word, max_width, &measure);
                lines.push(word[..split].to_string());
                word = &word[split..];
            }

            if word.is_empty() {
                continue;
            }
            if !current.is_empty() {
                let joined = format!("{current} {word}");
                if measure(&joined) <= max_width {
                    current = joined;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }

        lines.push(current);
    }

    lines
}

/// Byte length of the longest prefix of `word` that fits, never less than one char.
fn longest_fitting_prefix(word: &str, max_width: f32, measure: &impl Fn(&str) -> f32) -> usize {
    let mut end = 0;
    for (idx, ch) in word.char_indices() {
        let next = idx + ch.len_utf8();
        if end > 0 && measure(&word[..next]) > max_width {
            break;
        }
        end = next;
    }
    end
}
