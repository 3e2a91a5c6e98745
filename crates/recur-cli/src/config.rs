use std::path::Path;

use chrono::Weekday;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use recur_core::models::AdvanceFrom;
use serde::Deserialize;
use tracing::warn;

use crate::parser::parse_weekday;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// First day of the week, as a weekday name
    pub week_start: String,
    /// Whether series advance from their due date or from completion
    pub advance_from: AdvanceFrom,
    /// Dates shown by `recur preview` when `-n` is not given
    pub preview_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_start: "monday".to_string(),
            advance_from: AdvanceFrom::Due,
            preview_count: 5,
        }
    }
}

impl Config {
    /// Reads `config.toml` from the working directory, then `RECUR_*`
    /// environment variables on top.
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_file("config.toml")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("RECUR_"))
            .extract()
    }

    /// Like [`Config::new`], but an unreadable configuration yields the
    /// defaults.
    pub fn load_or_default() -> Self {
        Self::new().unwrap_or_else(|e| {
            warn!(error = %e, "invalid configuration, using defaults");
            Self::default()
        })
    }

    /// Configured week start; an unknown name falls back to Monday.
    pub fn week_start(&self) -> Weekday {
        parse_weekday(&self.week_start).unwrap_or_else(|e| {
            warn!(error = %e, "invalid week_start in configuration, using monday");
            Weekday::Mon
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(dir.path().join("config.toml")).unwrap();
        assert_eq!(config.preview_count, 5);
        assert_eq!(config.advance_from, AdvanceFrom::Due);
    }

    #[test]
    fn test_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "week_start = \"sunday\"\nadvance_from = \"completion\"\npreview_count = 3\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.week_start(), Weekday::Sun);
        assert_eq!(config.advance_from, AdvanceFrom::Completion);
        assert_eq!(config.preview_count, 3);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "preview_count = \"lots\"\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_bad_week_start_falls_back() {
        let config = Config { week_start: "caturday".to_string(), ..Config::default() };
        assert_eq!(config.week_start(), Weekday::Mon);
    }
}
