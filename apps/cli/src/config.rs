//! Settings of one run, read from `BF_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use bankfetch_connect::sync::DEFAULT_DOWNLOAD_TIMEOUT_SECS;
use bankfetch_core::errors::{Error, Result};
use bankfetch_core::TransactionPolicy;
use bankfetch_portal::client::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_DB_PATH: &str = "./db/bankfetch.db";
pub const DEFAULT_FILES_DIR: &str = "./statements";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone)]
pub struct Config {
    pub bank_id: String,
    pub login: String,
    pub password: String,
    pub db_path: String,
    pub files_dir: PathBuf,
    /// Replaces the embedded region table when set.
    pub regions_file: Option<PathBuf>,
    pub download_timeout: Duration,
    pub http_timeout: Duration,
    pub transaction_policy: TransactionPolicy,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bank_id", &self.bank_id)
            .field("login", &"***")
            .field("password", &"***")
            .field("db_path", &self.db_path)
            .field("files_dir", &self.files_dir)
            .field("regions_file", &self.regions_file)
            .field("download_timeout", &self.download_timeout)
            .field("http_timeout", &self.http_timeout)
            .field("transaction_policy", &self.transaction_policy)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Reads the process environment. A `.env` file is loaded by the binary
    /// before this is called.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| value(key).ok_or_else(|| Error::MissingConfigKey(key.to_string()));
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match value(key) {
                None => Ok(Duration::from_secs(default)),
                Some(raw) => raw
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| {
                        Error::InvalidConfigValue(format!(
                            "{} must be a positive number of seconds, got '{}'",
                            key, raw
                        ))
                    }),
            }
        };

        let transaction_policy = match value("BF_TRANSACTION_POLICY") {
            Some(raw) => raw.parse()?,
            None => TransactionPolicy::default(),
        };
        let log_format = match value("BF_LOG_FORMAT") {
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) if raw.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(raw) => {
                return Err(Error::InvalidConfigValue(format!(
                    "BF_LOG_FORMAT must be 'text' or 'json', got '{}'",
                    raw
                )))
            }
            None => LogFormat::Text,
        };

        Ok(Self {
            bank_id: required("BF_BANK_ID")?,
            login: required("BF_LOGIN")?,
            password: required("BF_PASSWORD")?,
            db_path: value("BF_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            files_dir: PathBuf::from(
                value("BF_FILES_DIR").unwrap_or_else(|| DEFAULT_FILES_DIR.to_string()),
            ),
            regions_file: value("BF_REGIONS_FILE").map(PathBuf::from),
            download_timeout: seconds("BF_DOWNLOAD_TIMEOUT_SECS", DEFAULT_DOWNLOAD_TIMEOUT_SECS)?,
            http_timeout: seconds("BF_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            transaction_policy,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("BF_BANK_ID", "paris"),
        ("BF_LOGIN", "12345678901"),
        ("BF_PASSWORD", "123456"),
    ];

    #[test]
    fn test_defaults() {
        let config = config(&REQUIRED).unwrap();
        assert_eq!(config.bank_id, "paris");
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.files_dir, PathBuf::from(DEFAULT_FILES_DIR));
        assert_eq!(config.download_timeout, Duration::from_secs(240));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.transaction_policy, TransactionPolicy::AppendAll);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.regions_file.is_none());
    }

    #[test]
    fn test_missing_required_key() {
        let err = config(&REQUIRED[..2]).unwrap_err();
        assert!(matches!(err, Error::MissingConfigKey(ref key) if key == "BF_PASSWORD"));

        let mut blank = REQUIRED.to_vec();
        blank[0] = ("BF_BANK_ID", "  ");
        assert!(matches!(config(&blank), Err(Error::MissingConfigKey(_))));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("BF_DOWNLOAD_TIMEOUT_SECS", "60"),
            ("BF_TRANSACTION_POLICY", "skip-duplicates"),
            ("BF_LOG_FORMAT", "JSON"),
            ("BF_REGIONS_FILE", "/etc/bankfetch/regions.json"),
        ]);
        let config = config(&pairs).unwrap();
        assert_eq!(config.download_timeout, Duration::from_secs(60));
        assert_eq!(config.transaction_policy, TransactionPolicy::SkipDuplicates);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.regions_file,
            Some(PathBuf::from("/etc/bankfetch/regions.json"))
        );
    }

    #[test]
    fn test_invalid_values() {
        for (key, raw) in [
            ("BF_DOWNLOAD_TIMEOUT_SECS", "soon"),
            ("BF_HTTP_TIMEOUT_SECS", "0"),
            ("BF_TRANSACTION_POLICY", "merge"),
            ("BF_LOG_FORMAT", "xml"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((key, raw));
            assert!(
                matches!(config(&pairs), Err(Error::InvalidConfigValue(_))),
                "{} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_debug_hides_credentials() {
        let config = config(&REQUIRED).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("12345678901"));
        assert!(!printed.contains("123456\""));
    }
}
