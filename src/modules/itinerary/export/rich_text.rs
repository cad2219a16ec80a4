use std::io::Cursor;

use anyhow::{Context, Result};
use docx_rs::{BreakType, Docx, Paragraph, Run};

use super::{detail_line, display_title};
use crate::modules::itinerary::accumulator::DayEntry;

// Run sizes are in half-points.
const TITLE_SIZE: usize = 36;
const HEADING_SIZE: usize = 28;

pub fn to_docx(title: &str, entries: &[DayEntry]) -> Result<Vec<u8>> {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new().add_run(
            Run::new()
                .add_text(display_title(title))
                .bold()
                .size(TITLE_SIZE),
        ),
    );

    for (idx, entry) in entries.iter().enumerate() {
        docx = docx.add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(format!("Day {}: {}", idx + 1, entry.route))
                    .bold()
                    .size(HEADING_SIZE),
            ),
        );

        if let Some(details) = detail_line(entry) {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(details).italic()));
        }

        if !entry.description.is_empty() {
            docx = docx.add_paragraph(multiline_paragraph(&entry.description));
        }
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .context("failed to pack itinerary DOCX")?;

    Ok(buffer.into_inner())
}

fn multiline_paragraph(text: &str) -> Paragraph {
    let mut paragraph = Paragraph::new();
    for (idx, segment) in text.split('\n').enumerate() {
        if idx > 0 {
            paragraph = paragraph.add_run(Run::new().add_break(BreakType::TextWrapping));
        }
        paragraph = paragraph.add_run(Run::new().add_text(segment));
    }
    paragraph
}
