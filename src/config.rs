use std::collections::HashMap;
use std::ffi::OsString;
use std::net::SocketAddr;
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::pipeline::structuring::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

/// Application-level constants
pub const APP_NAME: &str = "report-simplifier";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TESSERACT_BINARY: &str = "tesseract";
pub const DEFAULT_OCR_LANG: &str = "eng";
/// 20 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!(
        "{}=info,tower_http=info",
        APP_NAME.replace('-', "_")
    )
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    pub bind_addr: SocketAddr,
    pub tesseract_binary: String,
    pub tessdata_prefix: Option<PathBuf>,
    pub ocr_lang: String,
    pub max_upload_bytes: usize,
}

/// Variables read by `AppConfig`.
const CONFIG_VARS: [&str; 9] = [
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_BASE_URL",
    "GEMINI_TIMEOUT_SECS",
    "REPORT_SIMPLIFIER_ADDR",
    "TESSERACT_BINARY",
    "TESSDATA_PREFIX",
    "OCR_LANG",
    "MAX_UPLOAD_BYTES",
];

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&collect_vars(std::env::vars_os())?)
    }

    /// Load from a provided map (useful for testing).
    ///
    /// Empty values count as unset. Numeric limits must be non-zero.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let gemini_api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let gemini_timeout_secs: NonZeroU64 = parse_var(
            "GEMINI_TIMEOUT_SECS",
            get("GEMINI_TIMEOUT_SECS"),
            DEFAULT_GEMINI_TIMEOUT_SECS,
        )?;
        let max_upload_bytes: NonZeroUsize = parse_var(
            "MAX_UPLOAD_BYTES",
            get("MAX_UPLOAD_BYTES"),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        Ok(Self {
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
            gemini_timeout_secs: gemini_timeout_secs.get(),
            bind_addr: parse_var(
                "REPORT_SIMPLIFIER_ADDR",
                get("REPORT_SIMPLIFIER_ADDR"),
                DEFAULT_BIND_ADDR,
            )?,
            tesseract_binary: get("TESSERACT_BINARY")
                .unwrap_or_else(|| DEFAULT_TESSERACT_BINARY.into()),
            tessdata_prefix: get("TESSDATA_PREFIX").map(PathBuf::from),
            ocr_lang: get("OCR_LANG").unwrap_or_else(|| DEFAULT_OCR_LANG.into()),
            max_upload_bytes: max_upload_bytes.get(),
        })
    }
}

/// Keep the UTF-8 entries of an environment listing.
///
/// Unrelated variables that are not UTF-8 are skipped; a non-UTF-8 value for
/// one of our own variables is an error.
fn collect_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> Result<HashMap<String, String>, ConfigError> {
    let mut collected = HashMap::new();
    for (key, value) in vars {
        let Ok(key) = key.into_string() else {
            continue;
        };
        match value.into_string() {
            Ok(value) => {
                collected.insert(key, value);
            }
            Err(raw) => {
                if let Some(var) = CONFIG_VARS.iter().copied().find(|v| *v == key) {
                    return Err(ConfigError::Invalid {
                        var,
                        value: raw.to_string_lossy().into_owned(),
                        reason: "not valid UTF-8".into(),
                    });
                }
            }
        }
    }
    Ok(collected)
}

/// Parse `raw`, or `default` when unset.
fn parse_var<T>(
    var: &'static str,
    raw: Option<String>,
    default: impl ToString,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = raw.unwrap_or_else(|| default.to_string());
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = AppConfig::from_vars(&vars(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.gemini_api_key, "k");
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.gemini_timeout_secs, 120);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.tesseract_binary, "tesseract");
        assert_eq!(config.tessdata_prefix, None);
        assert_eq!(config.ocr_lang, "eng");
        assert_eq!(config.max_upload_bytes, 20_971_520);
    }

    #[test]
    fn missing_api_key_is_fatal() {
        assert_eq!(
            AppConfig::from_vars(&vars(&[])).unwrap_err(),
            ConfigError::Missing("GEMINI_API_KEY")
        );
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert_eq!(
            AppConfig::from_vars(&vars(&[("GEMINI_API_KEY", "   ")])).unwrap_err(),
            ConfigError::Missing("GEMINI_API_KEY")
        );
    }

    #[test]
    fn overrides_are_read() {
        let config = AppConfig::from_vars(&vars(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_TIMEOUT_SECS", "30"),
            ("REPORT_SIMPLIFIER_ADDR", "127.0.0.1:9000"),
            ("TESSDATA_PREFIX", "/usr/share/tessdata"),
            ("OCR_LANG", "eng+fra"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.gemini_timeout_secs, 30);
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.tessdata_prefix, Some(PathBuf::from("/usr/share/tessdata")));
        assert_eq!(config.ocr_lang, "eng+fra");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn unparseable_number_is_rejected() {
        let err = AppConfig::from_vars(&vars(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "GEMINI_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn unparseable_address_is_rejected() {
        let err = AppConfig::from_vars(&vars(&[
            ("GEMINI_API_KEY", "k"),
            ("REPORT_SIMPLIFIER_ADDR", "localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "REPORT_SIMPLIFIER_ADDR", .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AppConfig::from_vars(&vars(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "GEMINI_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn zero_upload_limit_is_rejected() {
        let err = AppConfig::from_vars(&vars(&[
            ("GEMINI_API_KEY", "k"),
            ("MAX_UPLOAD_BYTES", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MAX_UPLOAD_BYTES", .. }));
    }

    #[cfg(unix)]
    fn non_utf8(bytes: &[u8]) -> OsString {
        use std::os::unix::ffi::OsStringExt;
        OsString::from_vec(bytes.to_vec())
    }

    #[cfg(unix)]
    #[test]
    fn unrelated_non_utf8_variable_is_skipped() {
        let collected = collect_vars(vec![
            (OsString::from("SOME_OTHER_TOOL"), non_utf8(&[0xff, 0xfe])),
            (OsString::from("GEMINI_API_KEY"), OsString::from("k")),
        ])
        .unwrap();
        assert_eq!(collected.len(), 1);
        assert_eq!(AppConfig::from_vars(&collected).unwrap().gemini_api_key, "k");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_config_value_is_invalid() {
        let err = collect_vars(vec![(OsString::from("OCR_LANG"), non_utf8(&[0x65, 0xff]))])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "OCR_LANG", .. }));
    }

    #[cfg(unix)]
    #[test]
    fn from_env_survives_non_utf8_environment() {
        std::env::set_var("REPORT_SIMPLIFIER_TEST_NON_UTF8", non_utf8(&[0xff, 0xfe]));
        // Either outcome is fine depending on the host environment; it must not panic.
        let result = AppConfig::from_env();
        std::env::remove_var("REPORT_SIMPLIFIER_TEST_NON_UTF8");
        assert!(matches!(
            result,
            Ok(_) | Err(ConfigError::Missing(_)) | Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().starts_with("report_simplifier=info"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
