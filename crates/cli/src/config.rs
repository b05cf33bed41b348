//! `hypergen.toml` loading.

use std::path::{Path, PathBuf};

use hypergen_core::RuleSet;
use serde::Deserialize;
use tracing::debug;

use crate::error::CliError;

pub const CONFIG_FILE: &str = "hypergen.toml";
pub const DEFAULT_OUT_DIR: &str = "generated";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Generator configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Hyperschema URL (`http://`, `https://`) or file path
    pub source: Option<String>,
    pub out_dir: PathBuf,
    /// Base URL of the per-endpoint reference docs
    pub docs_base_url: Option<String>,
    pub fetch_timeout_secs: u64,
    pub rules: RuleSet,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: None,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            docs_base_url: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            rules: RuleSet::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let contents = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        let config = toml::from_str(&contents).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config.");
        Ok(config)
    }

    /// Load `path` if given, else `hypergen.toml` in the working directory if
    /// present, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Config::load(path),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.is_file() {
                    Config::load(default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_with_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
source = "https://site-api.datocms.com/docs/site-api-hyperschema.json"
docs_base_url = "https://www.datocms.com/docs/content-management-api/resources"
fetch_timeout_secs = 5

[rules]
drop = ["Legacy"]
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.source.as_deref(),
            Some("https://site-api.datocms.com/docs/site-api-hyperschema.json")
        );
        assert_eq!(config.out_dir, PathBuf::from(DEFAULT_OUT_DIR));
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.rules.drop, vec!["Legacy".to_string()]);
        assert_eq!(config.rules.rename, RuleSet::default().rename);
    }

    #[test]
    fn test_unknown_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "sauce = \"typo\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(CliError::Config { .. })));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::resolve(Some(Path::new("/nonexistent/hypergen.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
