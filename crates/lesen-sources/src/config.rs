//! Configuration loading and source factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lesen_core::traits::ContentSource;
use lesen_core::Level;

use crate::file::FileSource;
use crate::http::{HttpSource, DEFAULT_PATH, DEFAULT_TIMEOUT_SECS};

/// Where the content document comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    File {
        #[serde(default = "default_content_path")]
        path: PathBuf,
    },
    Http {
        base_url: String,
        #[serde(default = "default_http_path")]
        path: String,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::File {
            path: default_content_path(),
        }
    }
}

fn default_content_path() -> PathBuf {
    PathBuf::from("content/lesen.json")
}
fn default_http_path() -> String {
    DEFAULT_PATH.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_level() -> Level {
    Level::B1
}
fn default_history_file() -> PathBuf {
    PathBuf::from("./lesen-results/history.json")
}

/// Top-level lesen configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LesenConfig {
    /// Content document location.
    #[serde(default)]
    pub source: SourceConfig,
    /// Level used when none is given on the command line.
    #[serde(default = "default_level")]
    pub default_level: Level,
    /// JSON file finished attempts are appended to.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    /// Identifier stored with each attempt.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Default for LesenConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            default_level: default_level(),
            history_file: default_history_file(),
            user_id: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as they are and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::File { path } => SourceConfig::File {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        SourceConfig::Http {
            base_url,
            path,
            timeout_secs,
        } => SourceConfig::Http {
            base_url: resolve_env_vars(base_url),
            path: resolve_env_vars(path),
            timeout_secs: *timeout_secs,
        },
    }
}

/// Apply `LESEN_CONTENT_URL`, `LESEN_CONTENT_PATH` and `LESEN_USER`.
///
/// A content URL wins over a content path when both are set.
fn apply_env_overrides(config: &mut LesenConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(path) = var("LESEN_CONTENT_PATH") {
        config.source = SourceConfig::File {
            path: PathBuf::from(path),
        };
    }
    if let Some(base_url) = var("LESEN_CONTENT_URL") {
        let (path, timeout_secs) = match &config.source {
            SourceConfig::Http {
                path, timeout_secs, ..
            } => (path.clone(), *timeout_secs),
            SourceConfig::File { .. } => (default_http_path(), default_timeout()),
        };
        config.source = SourceConfig::Http {
            base_url,
            path,
            timeout_secs,
        };
    }
    if let Some(user) = var("LESEN_USER") {
        config.user_id = Some(user);
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `lesen.toml` in the current directory
/// 2. `~/.config/lesen/config.toml`
///
/// Environment variable overrides: `LESEN_CONTENT_URL`, `LESEN_CONTENT_PATH`, `LESEN_USER`.
pub fn load_config() -> Result<LesenConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LesenConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lesen.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LesenConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LesenConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config.source = resolve_source_config(&config.source);
    config.user_id = config.user_id.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lesen"))
}

/// Create a content source from its configuration.
pub fn create_source(config: &SourceConfig) -> Result<Arc<dyn ContentSource>> {
    match config {
        SourceConfig::File { path } => Ok(Arc::new(FileSource::new(path))),
        SourceConfig::Http {
            base_url,
            path,
            timeout_secs,
        } => {
            if base_url.is_empty() {
                anyhow::bail!("http source needs a base_url");
            }
            Ok(Arc::new(HttpSource::new(base_url, path, *timeout_secs)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_LESEN_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_LESEN_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_LESEN_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_LESEN_UNSET_VAR}x"), "x");
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_LESEN_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_LESEN_TEST_SELF", "${_LESEN_TEST_SELF}");
        assert_eq!(
            resolve_env_vars("${_LESEN_TEST_SELF}/lesen.json"),
            "${_LESEN_TEST_SELF}/lesen.json"
        );
        std::env::set_var("_LESEN_TEST_DIR", "/srv");
        assert_eq!(
            resolve_env_vars("${_LESEN_TEST_DIR}/${_LESEN_TEST_DIR}"),
            "/srv//srv"
        );
    }

    #[test]
    fn default_config() {
        let config = LesenConfig::default();
        assert_eq!(config.default_level, Level::B1);
        assert_eq!(
            config.source,
            SourceConfig::File {
                path: PathBuf::from("content/lesen.json")
            }
        );
        assert_eq!(
            config.history_file,
            PathBuf::from("./lesen-results/history.json")
        );
    }

    #[test]
    fn parse_http_config() {
        let toml_str = r#"
default_level = "b2"
user_id = "anna"

[source]
type = "http"
base_url = "https://example.com"
"#;
        let config: LesenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_level, Level::B2);
        assert_eq!(config.user_id.as_deref(), Some("anna"));
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: "https://example.com".into(),
                path: "/data/lesen.json".into(),
                timeout_secs: 30,
            }
        );
    }

    #[test]
    fn parse_file_config() {
        let config: LesenConfig = toml::from_str(
            r#"
[source]
type = "file"
path = "/srv/lesen.json"
"#,
        )
        .unwrap();
        assert!(matches!(config.source, SourceConfig::File { ref path } if path == Path::new("/srv/lesen.json")));
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LESEN_CONTENT_PATH", "/tmp/a.json"),
            ("LESEN_CONTENT_URL", "http://localhost:3000"),
            ("LESEN_USER", "max"),
        ]
        .into_iter()
        .collect();

        let mut config = LesenConfig::default();
        apply_env_overrides(&mut config, |name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.user_id.as_deref(), Some("max"));
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: "http://localhost:3000".into(),
                path: "/data/lesen.json".into(),
                timeout_secs: 30,
            }
        );

        let mut config = LesenConfig::default();
        apply_env_overrides(&mut config, |name| {
            (name == "LESEN_CONTENT_PATH").then(|| "/tmp/b.json".to_string())
        });
        assert_eq!(
            config.source,
            SourceConfig::File {
                path: PathBuf::from("/tmp/b.json")
            }
        );
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_from(Some(&dir.path().join("nope.toml"))).is_err());

        let path = dir.path().join("lesen.toml");
        std::fs::write(&path, "default_level = \"b2\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_level, Level::B2);
    }

    #[test]
    fn http_source_needs_base_url() {
        let config = SourceConfig::Http {
            base_url: String::new(),
            path: default_http_path(),
            timeout_secs: 5,
        };
        assert!(create_source(&config).is_err());

        let source = create_source(&SourceConfig::default()).unwrap();
        assert_eq!(source.name(), "file");
    }
}
