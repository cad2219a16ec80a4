//! Document exporters. Each takes a detached snapshot of the itinerary and
//! produces a complete file in memory.

mod print;
mod rich_text;
mod tabular;

use std::str::FromStr;

use anyhow::Result;

use super::accumulator::DayEntry;

pub use print::to_pdf;
pub use rich_text::to_docx;
pub use tabular::{COLUMNS, to_csv, to_xlsx};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const FALLBACK_FILE_STEM: &str = "itinerary";
const FALLBACK_TITLE: &str = "Travel Itinerary";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Docx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Xlsx,
        ExportFormat::Docx,
        ExportFormat::Pdf,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
            ExportFormat::Docx => "Word",
            ExportFormat::Pdf => "PDF",
        }
    }

    pub fn content_type(&self) -> String {
        match self {
            ExportFormat::Csv => mime::TEXT_CSV_UTF_8.to_string(),
            ExportFormat::Xlsx => XLSX_CONTENT_TYPE.to_string(),
            ExportFormat::Docx => DOCX_CONTENT_TYPE.to_string(),
            ExportFormat::Pdf => mime::APPLICATION_PDF.to_string(),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(raw.trim()))
            .ok_or(())
    }
}

pub struct ExportedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Renders `entries` in the requested format. `company_name` feeds the PDF
/// running header.
pub fn export(
    format: ExportFormat,
    title: &str,
    entries: &[DayEntry],
    company_name: &str,
) -> Result<ExportedFile> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(entries)?,
        ExportFormat::Xlsx => to_xlsx(entries)?,
        ExportFormat::Docx => to_docx(title, entries)?,
        ExportFormat::Pdf => to_pdf(title, entries, company_name)?,
    };

    Ok(ExportedFile {
        file_name: export_file_name(title, format),
        content_type: format.content_type(),
        bytes,
    })
}

/// Download name built from the tour title; anything but ASCII letters and
/// digits becomes `_`.
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let trimmed = title.trim();
    let stem: String = if trimmed.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        trimmed
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    };
    format!("{stem}.{}", format.extension())
}

/// Heading shown at the top of rendered documents.
pub(crate) fn display_title(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.is_empty() { FALLBACK_TITLE } else { trimmed }
}

/// `Distance: .. | Duration: ..`, or `None` when both are blank.
pub(crate) fn detail_line(entry: &DayEntry) -> Option<String> {
    let parts: Vec<String> = [("Distance", &entry.distance), ("Duration", &entry.duration)]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("{label}: {}", value.trim()))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(route: &str, distance: &str, duration: &str) -> DayEntry {
        DayEntry {
            route: route.to_string(),
            distance: distance.to_string(),
            duration: duration.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn file_name_replaces_non_alphanumerics() {
        assert_eq!(
            export_file_name("Sri Lanka: 7 Days!", ExportFormat::Pdf),
            "Sri_Lanka__7_Days_.pdf"
        );
        assert_eq!(export_file_name("Ella ☀ trip", ExportFormat::Csv), "Ella___trip.csv");
        assert_eq!(export_file_name("   ", ExportFormat::Docx), "itinerary.docx");
    }

    #[test]
    fn format_parses_from_extension() {
        assert_eq!("XLSX".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert_eq!("pdf".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert!("txt".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn detail_line_skips_blank_fields() {
        assert_eq!(
            detail_line(&entry("A", "35 KM", "45 Mins")).as_deref(),
            Some("Distance: 35 KM | Duration: 45 Mins")
        );
        assert_eq!(
            detail_line(&entry("A", "", "2 Hrs")).as_deref(),
            Some("Duration: 2 Hrs")
        );
        assert_eq!(detail_line(&entry("A", " ", "")), None);
    }

    #[test]
    fn every_format_accepts_an_empty_itinerary() {
        for format in ExportFormat::ALL {
            let file = export(format, "", &[], "Exclusive Holidays SL").unwrap();
            assert!(!file.bytes.is_empty(), "{format:?}");
            assert!(file.file_name.starts_with("itinerary."));
        }
    }
}
