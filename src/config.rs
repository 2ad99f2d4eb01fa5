use anyhow::{Context, Result};
use rmtemplate::Prefixes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("netrm"))
}

/// Expand `~` in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&text).as_ref())
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command prefixes (`set` for set-style platforms, `remove` for negation)
    pub prefix: Prefixes,
    /// Never push unless explicitly asked
    pub check_mode: bool,
    /// Command used to read the device configuration
    pub show_command: String,
    /// Shape of "have" when the device reports nothing
    pub empty_facts: EmptyFacts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyFacts {
    #[default]
    Map,
    List,
}

impl EmptyFacts {
    pub fn value(self) -> Value {
        match self {
            Self::Map => Value::Object(Map::new()),
            Self::List => Value::Array(Vec::new()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: Prefixes::default(),
            check_mode: false,
            show_command: "show running-config".to_string(),
            empty_facts: EmptyFacts::default(),
        }
    }
}

impl Config {
    /// Load the config from `path`, the default location, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_file(&expand_path(path));
        }
        let default_path = config_dir()?.join("config.toml");
        if default_path.exists() {
            return Self::load_file(&default_path);
        }
        log::debug!("no config file at {}, using defaults", default_path.display());
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prefix.remove, "no");
        assert_eq!(config.prefix.set, None);
        assert_eq!(config.show_command, "show running-config");
        assert_eq!(config.empty_facts.value(), serde_json::json!({}));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
check_mode = true
empty_facts = "list"

[prefix]
set = "set"
remove = "delete"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.check_mode);
        assert_eq!(config.empty_facts, EmptyFacts::List);
        assert_eq!(config.prefix.set.as_deref(), Some("set"));
        assert_eq!(config.prefix.remove, "delete");
        assert_eq!(config.show_command, "show running-config");
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Config::load(Some(Path::new("/nonexistent/netrm.toml"))).is_err());
    }
}
