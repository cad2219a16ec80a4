use std::{
    fs,
    io::{Cursor, ErrorKind, Write},
    path::{Path, PathBuf},
};

use calamine::{DataType, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use tempfile::NamedTempFile;

use super::{AccountStatus, CredentialRecord, DirectoryError, UserDirectory};

const SHEET_NAME: &str = "users";
const HEADER_USERNAME: &str = "username";
const HEADER_PASSWORD: &str = "password";
const HEADER_STATUS: &str = "status";

/// Directory stored as a single `.xlsx` sheet with a
/// `username | password | status` header row.
#[derive(Clone, Debug)]
pub struct SpreadsheetDirectory {
    path: PathBuf,
}

impl SpreadsheetDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserDirectory for SpreadsheetDirectory {
    fn read(&self) -> Result<Vec<CredentialRecord>, DirectoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(unavailable(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        parse_records(&bytes)
    }

    fn write(&self, records: &[CredentialRecord]) -> Result<(), DirectoryError> {
        let bytes = build_workbook(records)?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .map_err(|err| unavailable(format!("failed to create {}: {err}", parent.display())))?;

        // Each writer stages into its own file beside the target, then renames
        // it over the target, so readers only ever see a complete workbook.
        let mut staging = NamedTempFile::new_in(parent).map_err(|err| {
            unavailable(format!("failed to stage in {}: {err}", parent.display()))
        })?;
        let written = staging
            .write_all(&bytes)
            .and_then(|()| staging.as_file().sync_all());
        if let Err(err) = written {
            return Err(unavailable(format!(
                "failed to write {}: {err}",
                staging.path().display()
            )));
        }
        staging.persist(&self.path).map_err(|err| {
            unavailable(format!("failed to replace {}: {err}", self.path.display()))
        })?;

        Ok(())
    }
}

fn parse_records(bytes: &[u8]) -> Result<Vec<CredentialRecord>, DirectoryError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|err| unavailable(format!("failed to open user workbook: {err}")))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => {
            range.map_err(|err| unavailable(format!("failed to read user sheet: {err}")))?
        }
        None => return Ok(Vec::new()),
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let column = |name: &str| {
        header.iter().position(|cell| {
            cell_to_string(Some(cell))
                .map(|value| value.trim().eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
    };
    let username_col = column(HEADER_USERNAME)
        .ok_or_else(|| unavailable("user sheet has no username column".to_string()))?;
    let password_col = column(HEADER_PASSWORD)
        .ok_or_else(|| unavailable("user sheet has no password column".to_string()))?;
    let status_col = column(HEADER_STATUS);

    let records = rows
        .filter_map(|row| {
            let username = cell_to_string(row.get(username_col))?.trim().to_string();
            if username.is_empty() {
                return None;
            }
            let password = cell_to_string(row.get(password_col)).unwrap_or_default();
            // Sheets that predate the status column only hold active accounts.
            let status = status_col
                .and_then(|col| cell_to_string(row.get(col)))
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(AccountStatus::Active);
            Some(CredentialRecord {
                username,
                password,
                status,
            })
        })
        .collect();

    Ok(records)
}

fn build_workbook(records: &[CredentialRecord]) -> Result<Vec<u8>, DirectoryError> {
    let write_failed = |err: rust_xlsxwriter::XlsxError| {
        unavailable(format!("failed to build user workbook: {err}"))
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(write_failed)?;

    for (col, title) in [HEADER_USERNAME, HEADER_PASSWORD, HEADER_STATUS]
        .into_iter()
        .enumerate()
    {
        worksheet
            .write_string_with_format(0, col as u16, title, &header_format)
            .map_err(write_failed)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet
            .write_string(row, 0, &record.username)
            .map_err(write_failed)?;
        worksheet
            .write_string(row, 1, &record.password)
            .map_err(write_failed)?;
        worksheet
            .write_string(row, 2, record.status.as_str())
            .map_err(write_failed)?;
    }

    workbook.save_to_buffer().map_err(write_failed)
}

/// Numeric cells come back in their plain string form so a password typed
/// as `1234` in the sheet compares equal to the string `"1234"`.
fn cell_to_string(cell: Option<&DataType>) -> Option<String> {
    let value = cell?;
    let text = match value {
        DataType::String(s) => s.clone(),
        DataType::Float(f) => {
            let mut s = format!("{f}");
            if s.ends_with(".0") {
                s.truncate(s.len() - 2);
            }
            s
        }
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => return None,
        other => other.to_string(),
    };
    Some(text)
}

fn unavailable(message: String) -> DirectoryError {
    DirectoryError::Unavailable(message)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_reads_as_empty_directory() {
        let dir = tempdir().unwrap();
        let store = SpreadsheetDirectory::new(dir.path().join("users.xlsx"));
        assert!(store.read().unwrap().is_empty());
    }

    #[test]
    fn write_then_read_preserves_order_and_status() {
        let dir = tempdir().unwrap();
        let store = SpreadsheetDirectory::new(dir.path().join("nested").join("users.xlsx"));
        let records = vec![
            CredentialRecord::active("admin01", "root"),
            CredentialRecord::new("staff_amal", "temp123"),
            CredentialRecord::active("numeric", "1234"),
        ];

        store.write(&records).unwrap();
        assert_eq!(store.read().unwrap(), records);

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("users.xlsx")]);
    }

    #[test]
    fn legacy_sheet_with_numeric_password_and_no_status() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "username").unwrap();
        worksheet.write_string(0, 1, "password").unwrap();
        worksheet.write_string(1, 0, "staff_kamal").unwrap();
        worksheet.write_number(1, 1, 4321.0).unwrap();
        worksheet.write_string(2, 0, "").unwrap();
        worksheet.write_string(2, 1, "orphan").unwrap();
        workbook.save(&path).unwrap();

        let records = SpreadsheetDirectory::new(&path).read().unwrap();
        assert_eq!(records, vec![CredentialRecord::active("staff_kamal", "4321")]);
    }

    #[test]
    fn concurrent_writers_never_fail_or_tear_the_file() {
        let dir = tempdir().unwrap();
        let store = SpreadsheetDirectory::new(dir.path().join("users.xlsx"));

        let large: Vec<CredentialRecord> = (0..500)
            .map(|n| CredentialRecord::active(format!("user{n}"), "pw"))
            .collect();
        let small = vec![CredentialRecord::new("solo", "pw")];
        store.write(&small).unwrap();

        std::thread::scope(|scope| {
            let writers: Vec<_> = (0..4)
                .map(|n| {
                    let (store, records) = (&store, if n % 2 == 0 { &large } else { &small });
                    scope.spawn(move || {
                        for _ in 0..15 {
                            store.write(records).unwrap();
                        }
                    })
                })
                .collect();
            let readers: Vec<_> = (0..2)
                .map(|_| {
                    let (store, large, small) = (&store, &large, &small);
                    scope.spawn(move || {
                        for _ in 0..30 {
                            let seen = store.read().unwrap();
                            assert!(seen == *large || seen == *small);
                        }
                    })
                })
                .collect();
            for handle in writers.into_iter().chain(readers) {
                handle.join().unwrap();
            }
        });

        let last = store.read().unwrap();
        assert!(last == large || last == small);
    }

    #[test]
    fn corrupt_file_is_reported_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.xlsx");
        fs::write(&path, b"not a workbook").unwrap();

        let err = SpreadsheetDirectory::new(&path).read().unwrap_err();
        assert!(matches!(err, DirectoryError::Unavailable(_)));
    }

    #[test]
    fn sheet_without_username_column_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "name").unwrap();
        worksheet.write_string(0, 1, "password").unwrap();
        workbook.save(&path).unwrap();

        assert!(SpreadsheetDirectory::new(&path).read().is_err());
    }
}
