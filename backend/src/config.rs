//! Engine configuration loaded via OrthoConfig.
//!
//! Values layer as defaults, then configuration files, then `BAG_*`
//! environment variables.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_STORE_FILE: &str = "bag.json";

/// Configuration values for the bag change engine.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BAG")]
pub struct BagSettings {
    /// Days a change stays undoable after it is committed.
    #[ortho_config(default = 7)]
    pub undo_window_days: i64,
    /// JSON snapshot backing the document store.
    pub store_path: Option<PathBuf>,
    /// Grading service endpoint. The fixture grader is used when unset.
    pub grader_url: Option<String>,
    /// Grading request timeout in seconds.
    #[ortho_config(default = 10)]
    pub grader_timeout_secs: u64,
}

/// Errors raised when interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum BagSettingsError {
    /// Undo window must be at least one day.
    #[error("undo window must be positive, got {days} days")]
    UndoWindow {
        /// Rejected value.
        days: i64,
    },
    /// Grader endpoint is not a URL.
    #[error("invalid grader url {url}: {source}")]
    GraderUrl {
        /// Rejected value.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
}

impl BagSettings {
    /// Configured undo window.
    ///
    /// # Errors
    ///
    /// Returns [`BagSettingsError::UndoWindow`] for zero or negative values.
    pub fn undo_window(&self) -> Result<chrono::Duration, BagSettingsError> {
        let days = self.undo_window_days;
        if days <= 0 {
            return Err(BagSettingsError::UndoWindow { days });
        }
        Ok(chrono::Duration::days(days))
    }

    /// Snapshot path, falling back to `bag.json` in the working directory.
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }

    /// Parsed grader endpoint, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`BagSettingsError::GraderUrl`] when the value does not parse.
    pub fn grader_url(&self) -> Result<Option<Url>, BagSettingsError> {
        self.grader_url
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                Url::parse(raw).map_err(|source| BagSettingsError::GraderUrl {
                    url: raw.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Grader request timeout, never shorter than one second.
    pub fn grader_timeout(&self) -> Duration {
        Duration::from_secs(self.grader_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for engine configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use crate::domain::DEFAULT_UNDO_WINDOW_DAYS;

    const DEFAULT_GRADER_TIMEOUT_SECS: u64 = 10;

    const VARS: [&str; 4] = [
        "BAG_UNDO_WINDOW_DAYS",
        "BAG_STORE_PATH",
        "BAG_GRADER_URL",
        "BAG_GRADER_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> BagSettings {
        BagSettings::load_from_iter([OsString::from("bagctl")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.undo_window().expect("window"),
            chrono::Duration::days(DEFAULT_UNDO_WINDOW_DAYS)
        );
        assert_eq!(settings.store_path(), PathBuf::from(DEFAULT_STORE_FILE));
        assert!(settings.grader_url().expect("url").is_none());
        assert_eq!(settings.grader_timeout(), Duration::from_secs(10));
    }

    #[rstest]
    fn partial_environment_keeps_remaining_defaults() {
        let _guard = lock_env([
            ("BAG_UNDO_WINDOW_DAYS", None::<String>),
            ("BAG_STORE_PATH", Some("/tmp/fitting/partial.json".to_owned())),
            ("BAG_GRADER_URL", None::<String>),
            ("BAG_GRADER_TIMEOUT_SECS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.undo_window_days, DEFAULT_UNDO_WINDOW_DAYS);
        assert_eq!(settings.grader_timeout_secs, DEFAULT_GRADER_TIMEOUT_SECS);
        assert_eq!(settings.store_path(), PathBuf::from("/tmp/fitting/partial.json"));
    }

    #[rstest]
    fn zero_timeout_is_raised_to_one_second() {
        let settings = BagSettings {
            undo_window_days: DEFAULT_UNDO_WINDOW_DAYS,
            store_path: None,
            grader_url: None,
            grader_timeout_secs: 0,
        };
        assert_eq!(settings.grader_timeout(), Duration::from_secs(1));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("BAG_UNDO_WINDOW_DAYS", Some("3".to_owned())),
            ("BAG_STORE_PATH", Some("/tmp/fitting/bag.json".to_owned())),
            ("BAG_GRADER_URL", Some("http://grader.invalid/v1/grade".to_owned())),
            ("BAG_GRADER_TIMEOUT_SECS", Some("2".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.undo_window().expect("window"),
            chrono::Duration::days(3)
        );
        assert_eq!(settings.store_path(), PathBuf::from("/tmp/fitting/bag.json"));
        assert_eq!(
            settings.grader_url().expect("url").map(String::from),
            Some("http://grader.invalid/v1/grade".to_owned())
        );
        assert_eq!(settings.grader_timeout(), Duration::from_secs(2));
    }

    #[rstest]
    #[case::zero(0)]
    #[case::negative(-2)]
    fn non_positive_undo_window_is_rejected(#[case] days: i64) {
        let settings = BagSettings {
            undo_window_days: days,
            store_path: None,
            grader_url: None,
            grader_timeout_secs: DEFAULT_GRADER_TIMEOUT_SECS,
        };
        assert!(matches!(
            settings.undo_window(),
            Err(BagSettingsError::UndoWindow { .. })
        ));
    }

    #[rstest]
    fn malformed_grader_url_is_rejected() {
        let settings = BagSettings {
            undo_window_days: DEFAULT_UNDO_WINDOW_DAYS,
            store_path: None,
            grader_url: Some("not a url".to_owned()),
            grader_timeout_secs: DEFAULT_GRADER_TIMEOUT_SECS,
        };
        assert!(matches!(
            settings.grader_url(),
            Err(BagSettingsError::GraderUrl { .. })
        ));
    }
}
