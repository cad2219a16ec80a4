//! Flat user list backing the login gate and the admin panel.
//!
//! Every mutation reads the full set, applies one change, and writes the full
//! set back. Two admins mutating at the same time can therefore lose an update
//! (last writer wins); the tool is low traffic and accepts that.

mod memory;
mod spreadsheet;

use std::{fmt, str::FromStr};

use tracing::{info, warn};

use crate::config::AdminNames;

pub use memory::MemoryDirectory;
pub use spreadsheet::SpreadsheetDirectory;

pub const MIN_PASSWORD_LEN: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccountStatus {
    /// Must change the password on next login.
    New,
    #[default]
    Active,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::New => "New",
            AccountStatus::Active => "Active",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(AccountStatus::New),
            "active" => Ok(AccountStatus::Active),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    pub password: String,
    pub status: AccountStatus,
}

impl CredentialRecord {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            status: AccountStatus::New,
        }
    }

    pub fn active(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            status: AccountStatus::Active,
            ..Self::new(username, password)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("user directory is unavailable: {0}")]
    Unavailable(String),
    #[error("username {0:?} already exists")]
    DuplicateUsername(String),
    #[error("username {0:?} does not exist")]
    UnknownUser(String),
    #[error("username {0:?} cannot be removed")]
    ProtectedUser(String),
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

impl DirectoryError {
    /// Flash code rendered by the dashboard and password pages.
    pub fn code(&self) -> &'static str {
        match self {
            DirectoryError::Unavailable(_) => "store_unavailable",
            DirectoryError::DuplicateUsername(_) => "duplicate",
            DirectoryError::UnknownUser(_) => "user_missing",
            DirectoryError::ProtectedUser(_) => "protected_user",
            DirectoryError::MissingField("username") => "missing_username",
            DirectoryError::MissingField(_) => "missing_password",
            DirectoryError::PasswordMismatch => "password_mismatch",
            DirectoryError::PasswordTooShort { .. } => "password_too_short",
        }
    }
}

/// Row store keyed by username with full-replace writes.
pub trait UserDirectory: Send + Sync {
    fn read(&self) -> Result<Vec<CredentialRecord>, DirectoryError>;

    fn write(&self, records: &[CredentialRecord]) -> Result<(), DirectoryError>;
}

/// Reads the directory, degrading to an empty list when the store cannot be reached.
pub fn read_or_empty(directory: &dyn UserDirectory) -> Vec<CredentialRecord> {
    match directory.read() {
        Ok(records) => records,
        Err(err) => {
            warn!(%err, "user directory read failed, treating as empty");
            Vec::new()
        }
    }
}

pub fn find<'a>(records: &'a [CredentialRecord], username: &str) -> Option<&'a CredentialRecord> {
    records.iter().find(|record| record.username == username)
}

pub fn add_user(
    directory: &dyn UserDirectory,
    username: &str,
    password: &str,
) -> Result<(), DirectoryError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DirectoryError::MissingField("username"));
    }
    // Stored exactly as typed; login compares byte for byte.
    if password.trim().is_empty() {
        return Err(DirectoryError::MissingField("password"));
    }

    let mut records = directory.read()?;
    if find(&records, username).is_some() {
        return Err(DirectoryError::DuplicateUsername(username.to_string()));
    }

    records.push(CredentialRecord::new(username, password));
    directory.write(&records)?;
    info!(username, "added user");
    Ok(())
}

/// Removes a user. Reserved admin accounts and the acting admin are protected.
pub fn remove_user(
    directory: &dyn UserDirectory,
    admin_names: &AdminNames,
    acting_user: &str,
    username: &str,
) -> Result<(), DirectoryError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DirectoryError::MissingField("username"));
    }
    if admin_names.contains(username) || username == acting_user {
        return Err(DirectoryError::ProtectedUser(username.to_string()));
    }

    let mut records = directory.read()?;
    let before = records.len();
    records.retain(|record| record.username != username);
    if records.len() == before {
        return Err(DirectoryError::UnknownUser(username.to_string()));
    }

    directory.write(&records)?;
    info!(username, "removed user");
    Ok(())
}

/// Admin reset: installs a temporary password and forces a change on next login.
pub fn reset_password(
    directory: &dyn UserDirectory,
    username: &str,
    password: &str,
) -> Result<(), DirectoryError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DirectoryError::MissingField("username"));
    }
    // Stored exactly as typed; login compares byte for byte.
    if password.trim().is_empty() {
        return Err(DirectoryError::MissingField("password"));
    }

    update_record(directory, username, |record| {
        record.password = password.to_string();
        record.status = AccountStatus::New;
    })?;
    info!(username, "reset user password");
    Ok(())
}

/// The user's own password change; completes the forced-change step.
pub fn change_password(
    directory: &dyn UserDirectory,
    username: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), DirectoryError> {
    validate_new_password(new_password, confirm_password)?;

    update_record(directory, username, |record| {
        record.password = new_password.to_string();
        record.status = AccountStatus::Active;
    })?;
    info!(username, "user changed password");
    Ok(())
}

pub fn validate_new_password(new_password: &str, confirm_password: &str) -> Result<(), DirectoryError> {
    if new_password != confirm_password {
        return Err(DirectoryError::PasswordMismatch);
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DirectoryError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Appends the primary reserved admin when no reserved admin row exists.
/// Returns the seeded username, if any.
pub fn ensure_seed_admin(
    directory: &dyn UserDirectory,
    admin_names: &AdminNames,
    seed_password: &str,
) -> Result<Option<String>, DirectoryError> {
    let mut records = directory.read()?;
    if records
        .iter()
        .any(|record| admin_names.contains(&record.username))
    {
        return Ok(None);
    }

    let Some(username) = admin_names.primary() else {
        return Ok(None);
    };

    records.push(CredentialRecord::new(username, seed_password));
    directory.write(&records)?;
    Ok(Some(username.to_string()))
}

fn update_record<F>(directory: &dyn UserDirectory, username: &str, apply: F) -> Result<(), DirectoryError>
where
    F: FnOnce(&mut CredentialRecord),
{
    let mut records = directory.read()?;
    let record = records
        .iter_mut()
        .find(|record| record.username == username)
        .ok_or_else(|| DirectoryError::UnknownUser(username.to_string()))?;
    apply(record);
    directory.write(&records)
}
