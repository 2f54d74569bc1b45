//! `stringsutil.toml` settings and their merge with command-line flags.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use stringsfile::scan::DEFAULT_FUNCTION;

/// Config file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "stringsutil.toml";

/// Environment variable consulted for the translation API key.
pub const API_KEY_ENV: &str = "STRINGSUTIL_API_KEY";

pub const DEFAULT_TRANSLATE_URL: &str = "http://localhost:5000";

/// Optional settings, from the config file or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub strings_file: Option<String>,
    pub scan_function: Option<String>,
    pub locale: Option<String>,
    pub api_key: Option<String>,
    pub translate_url: Option<String>,
}

/// Settings after flags, config file and defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub strings_file: String,
    pub scan_function: String,
    pub locale: Option<String>,
    pub api_key: Option<String>,
    pub translate_url: String,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Invalid config: {}", e))
    }

    /// Reads `explicit`, or `stringsutil.toml` in the current directory when
    /// it exists. An explicitly named file must exist.
    pub fn load(explicit: Option<&str>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => Path::new(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Config::default()),
        };

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Unable to read config '{}': {}", path.display(), e))?;
        Self::from_toml(&content).map_err(|e| format!("{} ({})", e, path.display()))
    }

    /// Values set in `flags` win over values from `self`.
    pub fn overridden_by(self, flags: Config) -> Config {
        Config {
            strings_file: flags.strings_file.or(self.strings_file),
            scan_function: flags.scan_function.or(self.scan_function),
            locale: flags.locale.or(self.locale),
            api_key: flags.api_key.or(self.api_key),
            translate_url: flags.translate_url.or(self.translate_url),
        }
    }

    /// Fills defaults. `env_api_key` is used when no API key is set.
    pub fn into_settings(self, env_api_key: Option<String>) -> Result<Settings, String> {
        let strings_file = self.strings_file.filter(|s| !s.is_empty()).ok_or_else(|| {
            format!(
                "No strings file given (use -f or set strings_file in {})",
                DEFAULT_CONFIG_FILE
            )
        })?;

        Ok(Settings {
            strings_file,
            scan_function: self
                .scan_function
                .unwrap_or_else(|| DEFAULT_FUNCTION.to_string()),
            locale: self.locale,
            api_key: self.api_key.or(env_api_key).filter(|k| !k.is_empty()),
            translate_url: self
                .translate_url
                .unwrap_or_else(|| DEFAULT_TRANSLATE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml(
            r#"
            strings_file = "po/de.strings"
            scan_function = "SFSTR"
            translate_url = "https://translate.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.strings_file.as_deref(), Some("po/de.strings"));
        assert_eq!(config.scan_function.as_deref(), Some("SFSTR"));
        assert_eq!(config.locale, None);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::from_toml("strings = \"de.strings\"").unwrap_err();
        assert!(err.starts_with("Invalid config:"));
    }

    #[test]
    fn test_flags_override_file_values() {
        let file = Config {
            strings_file: Some("file.strings".to_string()),
            locale: Some("fr".to_string()),
            ..Config::default()
        };
        let flags = Config {
            strings_file: Some("flag.strings".to_string()),
            ..Config::default()
        };

        let merged = file.overridden_by(flags);
        assert_eq!(merged.strings_file.as_deref(), Some("flag.strings"));
        assert_eq!(merged.locale.as_deref(), Some("fr"));
    }

    #[test]
    fn test_defaults_and_env_api_key() {
        let settings = Config {
            strings_file: Some("de.strings".to_string()),
            ..Config::default()
        }
        .into_settings(Some("from-env".to_string()))
        .unwrap();

        assert_eq!(settings.scan_function, "_");
        assert_eq!(settings.translate_url, DEFAULT_TRANSLATE_URL);
        assert_eq!(settings.api_key.as_deref(), Some("from-env"));

        let settings = Config {
            strings_file: Some("de.strings".to_string()),
            api_key: Some("from-flag".to_string()),
            ..Config::default()
        }
        .into_settings(Some("from-env".to_string()))
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_missing_strings_file_is_error() {
        let err = Config::default().into_settings(None).unwrap_err();
        assert!(err.contains("-f"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "locale = \"de\"\n").unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.locale.as_deref(), Some("de"));

        let missing = temp_dir.path().join("missing.toml");
        let err = Config::load(Some(missing.to_str().unwrap())).unwrap_err();
        assert!(err.starts_with("Unable to read config"));
    }
}
