use std::{collections::BTreeSet, env, path::PathBuf};

use anyhow::{Context, Result, anyhow};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_USER_STORE: &str = "users.xlsx";
const DEFAULT_ADMIN_USERNAMES: &str = "admin,admin01";
const DEFAULT_COMPANY_NAME: &str = "Exclusive Holidays SL";
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const DEFAULT_SEED_ADMIN_PASSWORD: &str = "change-me";

/// Selects the backing store for the user directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserStoreLocation {
    Spreadsheet(PathBuf),
    Memory,
}

/// Reserved usernames that are granted the admin role.
///
/// Matching is case-insensitive; names are stored lowercased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminNames(BTreeSet<String>);

impl AdminNames {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|name| name.trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, username: &str) -> bool {
        self.0.contains(&username.trim().to_lowercase())
    }

    /// First reserved name in sorted order, used when seeding an admin account.
    pub fn primary(&self) -> Option<&str> {
        self.0.iter().next().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for AdminNames {
    fn default() -> Self {
        Self::parse(DEFAULT_ADMIN_USERNAMES)
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub user_store: UserStoreLocation,
    pub admin_names: AdminNames,
    pub company_name: String,
    pub require_password_change: bool,
    pub session_ttl_hours: i64,
    pub seed_admin_password: String,
    /// Email address or web link shown as "Unable to sign in?" on the login page.
    pub support_contact: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            user_store: UserStoreLocation::Spreadsheet(PathBuf::from(DEFAULT_USER_STORE)),
            admin_names: AdminNames::default(),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            require_password_change: true,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            seed_admin_password: DEFAULT_SEED_ADMIN_PASSWORD.to_string(),
            support_contact: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests do not
    /// have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(port) = value("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {port:?}"))?;
        }

        if let Some(store) = value("USER_STORE_PATH") {
            config.user_store = if store.eq_ignore_ascii_case("memory") {
                UserStoreLocation::Memory
            } else {
                UserStoreLocation::Spreadsheet(PathBuf::from(store))
            };
        }

        if let Some(raw) = value("ADMIN_USERNAMES") {
            let names = AdminNames::parse(&raw);
            if names.is_empty() {
                return Err(anyhow!("ADMIN_USERNAMES must name at least one account"));
            }
            config.admin_names = names;
        }

        if let Some(company) = value("COMPANY_NAME") {
            config.company_name = company;
        }

        if let Some(flag) = value("REQUIRE_PASSWORD_CHANGE") {
            config.require_password_change = parse_flag(&flag).ok_or_else(|| {
                anyhow!("REQUIRE_PASSWORD_CHANGE must be true or false, got {flag:?}")
            })?;
        }

        if let Some(ttl) = value("SESSION_TTL_HOURS") {
            let hours: i64 = ttl
                .parse()
                .with_context(|| format!("SESSION_TTL_HOURS must be an integer, got {ttl:?}"))?;
            if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
                return Err(anyhow!(
                    "SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}"
                ));
            }
            config.session_ttl_hours = hours;
        }

        if let Some(password) = value("SEED_ADMIN_PASSWORD") {
            config.seed_admin_password = password;
        }

        config.support_contact = value("SUPPORT_CONTACT");

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.user_store,
            UserStoreLocation::Spreadsheet(PathBuf::from("users.xlsx"))
        );
        assert!(config.admin_names.contains("admin01"));
        assert!(config.admin_names.contains("Admin"));
        assert!(config.require_password_change);
        assert!(config.support_contact.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("USER_STORE_PATH", "memory"),
            ("ADMIN_USERNAMES", " Boss , root "),
            ("REQUIRE_PASSWORD_CHANGE", "off"),
            ("SESSION_TTL_HOURS", "2"),
            ("SUPPORT_CONTACT", " it-help@example.lk "),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.user_store, UserStoreLocation::Memory);
        assert!(config.admin_names.contains("BOSS"));
        assert!(!config.admin_names.contains("admin01"));
        assert_eq!(config.admin_names.primary(), Some("boss"));
        assert!(!config.require_password_change);
        assert_eq!(config.session_ttl_hours, 2);
        assert_eq!(config.support_contact.as_deref(), Some("it-help@example.lk"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ADMIN_USERNAMES", " , ")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SESSION_TTL_HOURS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SESSION_TTL_HOURS", "8761")])).is_err());
        assert!(
            AppConfig::from_lookup(lookup(&[("SESSION_TTL_HOURS", "9223372036854775807")])).is_err()
        );
        let longest = AppConfig::from_lookup(lookup(&[("SESSION_TTL_HOURS", "8760")])).unwrap();
        assert_eq!(longest.session_ttl_hours, 8760);
        assert!(AppConfig::from_lookup(lookup(&[("REQUIRE_PASSWORD_CHANGE", "maybe")])).is_err());
    }
}
