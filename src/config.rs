//! Runtime configuration loaded from the environment (and an optional `.env` file).
//!
//! | Variable              | Default | Meaning                                       |
//! |-----------------------|---------|-----------------------------------------------|
//! | `DOCSHIFT_FONT_NAME`  | `Arial` | Font used by `create` when none is given       |
//! | `DOCSHIFT_FONT_SIZE`  | `12`    | Size in points used by `create`                |
//! | `DOCSHIFT_LOG_DIR`    | unset   | Directory for daily-rotated JSON log files     |
//! | `DOCSHIFT_PROGRESS`   | `1`     | `0`, `false` or `off` hides progress bars      |

use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_FONT_NAME: &str = "Arial";
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Largest size a DOCX run can carry: `w:sz` is limited to 3276 half-points.
pub const MAX_FONT_SIZE: f32 = 1638.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub font_name: String,
    pub font_size: f32,
    pub log_dir: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            log_dir: None,
            show_progress: true,
        }
    }
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("DOCSHIFT_FONT_NAME") {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::Config(
                    "DOCSHIFT_FONT_NAME must not be empty".to_string(),
                ));
            }
            config.font_name = name.to_string();
        }

        if let Some(size) = lookup("DOCSHIFT_FONT_SIZE") {
            config.font_size = parse_font_size(&size)
                .map_err(|msg| AppError::Config(format!("DOCSHIFT_FONT_SIZE: {msg}")))?;
        }

        config.log_dir = lookup("DOCSHIFT_LOG_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        if let Some(flag) = lookup("DOCSHIFT_PROGRESS") {
            config.show_progress = match flag.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "off" | "no" => false,
                "1" | "true" | "on" | "yes" | "" => true,
                other => {
                    return Err(AppError::Config(format!(
                        "DOCSHIFT_PROGRESS: expected a boolean, got '{other}'"
                    )))
                },
            };
        }

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

/// Parses a font size in points, rejecting values a DOCX run cannot hold.
pub fn parse_font_size(raw: &str) -> std::result::Result<f32, String> {
    let size: f32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw.trim()))?;
    if !size.is_finite() || size <= 0.0 {
        return Err(format!("font size must be positive, got {size}"));
    }
    if size > MAX_FONT_SIZE {
        return Err(format!(
            "font size must be at most {MAX_FONT_SIZE}, got {size}"
        ));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.font_name, "Arial");
        assert_eq!(config.font_size, 12.0);
        assert!(config.show_progress);
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DOCSHIFT_FONT_NAME", "Courier New"),
            ("DOCSHIFT_FONT_SIZE", "10.5"),
            ("DOCSHIFT_LOG_DIR", "/tmp/docshift-logs"),
            ("DOCSHIFT_PROGRESS", "off"),
        ]))
        .unwrap();
        assert_eq!(config.font_name, "Courier New");
        assert_eq!(config.font_size, 10.5);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/docshift-logs")));
        assert!(!config.show_progress);
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("abc")]
    #[case("NaN")]
    #[case("2000")]
    fn invalid_font_sizes_are_config_errors(#[case] raw: &str) {
        let result = Config::from_lookup(lookup_from(&[("DOCSHIFT_FONT_SIZE", raw)]));
        match result {
            Err(AppError::Config(msg)) => assert!(msg.starts_with("DOCSHIFT_FONT_SIZE")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_progress_flag_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("DOCSHIFT_PROGRESS", "maybe")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
