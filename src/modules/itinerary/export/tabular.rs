use std::borrow::Cow;

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use crate::modules::itinerary::accumulator::DayEntry;

pub const COLUMNS: [&str; 5] = ["Day", "Route", "Distance", "Duration", "Description"];
const SHEET_NAME: &str = "Itinerary";
const COLUMN_WIDTHS: [f64; 5] = [6.0, 32.0, 12.0, 12.0, 70.0];
/// Excel rejects longer cell strings.
const MAX_CELL_CHARS: usize = 32_767;
const TRUNCATION_MARKER: &str = " [...]";

pub fn to_csv(entries: &[DayEntry]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS).context("failed to write CSV header")?;

    for (idx, entry) in entries.iter().enumerate() {
        let day = (idx + 1).to_string();
        writer
            .write_record([
                day.as_str(),
                entry.route.as_str(),
                entry.distance.as_str(),
                entry.duration.as_str(),
                entry.description.as_str(),
            ])
            .with_context(|| format!("failed to write CSV row for day {day}"))?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush CSV export: {err}"))
}

pub fn to_xlsx(entries: &[DayEntry]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let text_format = Format::new().set_text_wrap().set_align(FormatAlign::Top);

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .context("failed to name itinerary worksheet")?;

    for (col, (title, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *title, &header_format)
            .context("failed to write worksheet header")?;
        worksheet
            .set_column_width(col, width)
            .context("failed to size worksheet column")?;
    }

    for (idx, entry) in entries.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet
            .write_number_with_format(row, 0, (idx + 1) as f64, &text_format)
            .context("failed to write day number")?;
        for (col, value) in [
            &entry.route,
            &entry.distance,
            &entry.duration,
            &entry.description,
        ]
        .into_iter()
        .enumerate()
        {
            worksheet
                .write_string_with_format(row, (col + 1) as u16, fit_cell(value), &text_format)
                .with_context(|| format!("failed to write worksheet row {row}"))?;
        }
    }

    workbook
        .save_to_buffer()
        .context("failed to serialize itinerary workbook")
}

/// Clips text to the cell limit, marking the cut. CSV keeps the full text.
fn fit_cell(value: &str) -> Cow<'_, str> {
    if value.chars().count() <= MAX_CELL_CHARS {
        return Cow::Borrowed(value);
    }
    let keep = MAX_CELL_CHARS - TRUNCATION_MARKER.chars().count();
    let mut clipped: String = value.chars().take(keep).collect();
    clipped.push_str(TRUNCATION_MARKER);
    Cow::Owned(clipped)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{DataType, Reader, Xlsx};

    use super::*;
    use crate::modules::itinerary::accumulator::{DayInput, Itinerary};

    fn sample() -> Vec<DayEntry> {
        let mut itinerary = Itinerary::default();
        itinerary.add_day(DayInput::new(
            "Airport -> Negombo",
            "35 KM",
            "45 Mins",
            "Transfer and check-in",
        ));
        itinerary.add_day(
            DayInput::new("City Tour", "10 KM", "2 Hrs", "Museum visit")
                .with_activities(["Fort walk", "Lunch"]),
        );
        itinerary.snapshot()
    }

    #[test]
    fn csv_has_header_and_one_row_per_day() {
        let bytes = to_csv(&sample()).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[1][0], "2");
        assert_eq!(&rows[1][1], "City Tour");
        assert!(rows[1][4].contains("Fort walk"));
        assert!(rows[1][4].contains("Museum visit"));
    }

    #[test]
    fn csv_for_empty_itinerary_is_header_only() {
        let bytes = to_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.trim_end(), "Day,Route,Distance,Duration,Description");
    }

    #[test]
    fn xlsx_round_trips_day_numbers_and_unicode() {
        let mut entries = sample();
        entries[0].description = "Sunset ✓ 🏖".to_string();
        let bytes = to_xlsx(&entries).unwrap();

        let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Itinerary").unwrap().unwrap();
        assert_eq!(range.height(), 3);

        let days: Vec<f64> = range
            .rows()
            .skip(1)
            .map(|row| match &row[0] {
                DataType::Float(f) => *f,
                DataType::Int(i) => *i as f64,
                other => panic!("unexpected day cell {other:?}"),
            })
            .collect();
        assert_eq!(days, vec![1.0, 2.0]);
        assert_eq!(
            range.get((1, 4)),
            Some(&DataType::String("Sunset ✓ 🏖".to_string()))
        );
    }

    #[test]
    fn oversized_description_is_clipped_in_xlsx_only() {
        let mut entries = sample();
        entries[0].description = "é".repeat(40_000);

        let csv_bytes = to_csv(&entries).unwrap();
        assert!(String::from_utf8(csv_bytes).unwrap().contains(&"é".repeat(40_000)));

        let bytes = to_xlsx(&entries).unwrap();
        let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Itinerary").unwrap().unwrap();
        let Some(DataType::String(cell)) = range.get((1, 4)) else {
            panic!("description cell missing");
        };
        assert_eq!(cell.chars().count(), MAX_CELL_CHARS);
        assert!(cell.ends_with(TRUNCATION_MARKER));
        assert_eq!(range.get((2, 1)), Some(&DataType::String("City Tour".to_string())));
    }

    #[test]
    fn xlsx_for_empty_itinerary_is_header_only() {
        let bytes = to_xlsx(&[]).unwrap();
        let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.height(), 1);
        assert_eq!(range.get((0, 0)), Some(&DataType::String("Day".to_string())));
    }
}
