pub mod parse;
pub mod render;
pub mod run;
pub mod validate;

use anyhow::{Context as _, Result};
use rmtemplate::{RuleTable, TemplateEngine};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::Context;
use crate::config::expand_path;

/// Load a rule table and apply the configured command prefixes
pub fn load_engine(ctx: &Context, rules: &Path) -> Result<TemplateEngine> {
    let table = RuleTable::from_path(&expand_path(rules))?;
    log::debug!("loaded {} rule(s) from {}", table.len(), rules.display());
    Ok(TemplateEngine::new(table).with_prefixes(ctx.config.prefix.clone()))
}

/// Read a file, or stdin when `path` is absent or `-`
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            let path = expand_path(path);
            fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Could not read stdin")?;
            Ok(text)
        }
    }
}

/// Load desired-state data from a JSON or TOML file
pub fn load_want(path: &Path) -> Result<Value> {
    let path = expand_path(path);
    let content =
        fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))?;
    parse_want(&content, &path)
}

/// Parse want data, unwrapping a top-level `config` key when it is the only one
fn parse_want(content: &str, path: &Path) -> Result<Value> {
    let value: Value = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))?
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("Invalid JSON format in {}", path.display()))?
    };

    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("config") => {
            Ok(map.remove("config").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}
