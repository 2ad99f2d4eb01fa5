//! Rules and rule tables
//!
//! A rule ties a line pattern to the facts it produces (`result`) and to the
//! command text that recreates those facts (`setval`, `remval`). A rule
//! table is an ordered set of rules; the first rule whose pattern matches a
//! line wins. Patterns are compiled once, when the rule is built.

use crate::error::{Error, Result};
use crate::types::{SetVal, Template};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// A single parse/render rule
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Regex,
    result: Template,
    shared: bool,
    setval: Option<SetVal>,
    remval: Option<SetVal>,
    compval: Option<String>,
}

impl Rule {
    /// Create a rule with an empty result and no command templates
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            rule: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            pattern,
            result: Template::empty(),
            shared: false,
            setval: None,
            remval: None,
            compval: None,
        })
    }

    pub fn with_result(mut self, result: impl Into<Template>) -> Self {
        self.result = result.into();
        self
    }

    /// Mark captures of this rule as context for the lines that follow
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    pub fn with_setval(mut self, setval: impl Into<SetVal>) -> Self {
        self.setval = Some(setval.into());
        self
    }

    pub fn with_remval(mut self, remval: impl Into<SetVal>) -> Self {
        self.remval = Some(remval.into());
        self
    }

    pub fn with_compval(mut self, path: impl Into<String>) -> Self {
        self.compval = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn result(&self) -> &Template {
        &self.result
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn setval(&self) -> Option<&SetVal> {
        self.setval.as_ref()
    }

    pub fn remval(&self) -> Option<&SetVal> {
        self.remval.as_ref()
    }

    /// Path of the compared field inside want/have, defaulting to the name
    pub fn compval(&self) -> &str {
        self.compval.as_deref().unwrap_or(&self.name)
    }

    /// Search `line` and return its named captures, dropping unmatched groups
    pub fn captures(&self, line: &str) -> Option<serde_json::Map<String, Value>> {
        let caps = self.pattern.captures(line)?;
        Some(
            self.pattern
                .capture_names()
                .flatten()
                .filter_map(|group| {
                    caps.name(group)
                        .map(|m| (group.to_string(), Value::String(m.as_str().to_string())))
                })
                .collect(),
        )
    }
}

/// Ordered rule collection with lookup by name
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleTable {
    /// Build a table, rejecting duplicate rule names
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rules.len());
        for (position, rule) in rules.iter().enumerate() {
            if index.insert(rule.name.clone(), position).is_some() {
                return Err(Error::DuplicateRule(rule.name.clone()));
            }
        }
        Ok(Self { rules, index })
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&position| &self.rules[position])
    }

    /// Look up a rule, failing when the name is unknown
    pub fn require(&self, name: &str) -> Result<&Rule> {
        self.get(name)
            .ok_or_else(|| Error::UnknownRule(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::name)
    }

    /// Names of the rules that can render commands, in table order
    pub fn command_rules(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.setval.is_some())
            .map(Rule::name)
            .collect()
    }

    /// First rule whose pattern matches `line`, with its captures
    pub fn first_match(&self, line: &str) -> Option<(&Rule, serde_json::Map<String, Value>)> {
        self.rules
            .iter()
            .find_map(|rule| rule.captures(line).map(|caps| (rule, caps)))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build a table from decoded rule records
    pub fn from_specs(specs: Vec<RuleSpec>) -> Result<Self> {
        let rules = specs
            .into_iter()
            .map(RuleSpec::into_rule)
            .collect::<Result<Vec<_>>>()?;
        Self::new(rules)
    }

    /// Parse a TOML rule document (`[[rules]]` entries)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let doc: RuleDocument =
            toml::from_str(content).map_err(|e| Error::RuleDocument(e.to_string()))?;
        Self::from_specs(doc.rules)
    }

    /// Parse a JSON rule document (`{"rules": [...]}`)
    pub fn from_json_str(content: &str) -> Result<Self> {
        let doc: RuleDocument =
            serde_json::from_str(content).map_err(|e| Error::RuleDocument(e.to_string()))?;
        Self::from_specs(doc.rules)
    }

    /// Load a rule document, choosing the format by file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        parsed.map_err(|e| match e {
            Error::RuleDocument(message) => Error::RuleFile {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }
}

/// Serialized form of a rule table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// Serialized form of a rule
///
/// Command templates given here are always literal template text; function
/// command builders can only be attached in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub shared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compval: Option<String>,
}

impl RuleSpec {
    pub fn into_rule(self) -> Result<Rule> {
        let result = match self.result {
            Value::Null => Template::empty(),
            other => Template::from(other),
        };
        let mut rule = Rule::new(self.name, &self.pattern)?
            .with_result(result)
            .with_shared(self.shared);
        rule.setval = self.setval.map(SetVal::Literal);
        rule.remval = self.remval.map(SetVal::Literal);
        rule.compval = self.compval;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const HOSTNAME_TOML: &str = r#"
[[rules]]
name = "hostname"
pattern = '^hostname (?P<name>\S+)$'
setval = "hostname {{ hostname }}"

[rules.result]
hostname = "{{ name }}"

[[rules]]
name = "interface"
pattern = '^interface (?P<name>\S+)'
shared = true
"#;

    #[test]
    fn test_rule_captures_drop_unmatched_groups() {
        let rule = Rule::new("mtu", r"^\s+mtu (?P<mtu>\d+)(?: (?P<unit>\w+))?").unwrap();
        let caps = rule.captures("  mtu 9000").unwrap();
        assert_eq!(caps.get("mtu"), Some(&json!("9000")));
        assert!(!caps.contains_key("unit"));
        assert!(rule.captures("mtu 9000").is_none());
    }

    #[test]
    fn test_rule_search_is_unanchored() {
        let rule = Rule::new("desc", r"description (?P<text>.+)").unwrap();
        assert!(rule.captures(" description uplink").is_some());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = Rule::new("broken", r"(?P<x>").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref rule, .. } if rule == "broken"));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let rules = vec![
            Rule::new("a", "x").unwrap(),
            Rule::new("a", "y").unwrap(),
        ];
        assert!(matches!(RuleTable::new(rules), Err(Error::DuplicateRule(name)) if name == "a"));
    }

    #[test]
    fn test_first_match_wins() {
        let table = RuleTable::new(vec![
            Rule::new("specific", r"^vlan (?P<id>\d+) name").unwrap(),
            Rule::new("generic", r"^vlan (?P<id>\d+)").unwrap(),
        ])
        .unwrap();
        let (rule, _) = table.first_match("vlan 10 name users").unwrap();
        assert_eq!(rule.name(), "specific");
        let (rule, _) = table.first_match("vlan 10").unwrap();
        assert_eq!(rule.name(), "generic");
        assert!(table.first_match("interface Gi1").is_none());
    }

    #[test]
    fn test_compval_defaults_to_name() {
        let rule = Rule::new("hostname", "x").unwrap();
        assert_eq!(rule.compval(), "hostname");
        let rule = rule.with_compval("system.hostname");
        assert_eq!(rule.compval(), "system.hostname");
    }

    #[test]
    fn test_from_toml_str() {
        let table = RuleTable::from_toml_str(HOSTNAME_TOML).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["hostname", "interface"]);
        assert_eq!(table.command_rules(), vec!["hostname"]);
        assert!(table.get("interface").unwrap().is_shared());
        assert_eq!(table.get("interface").unwrap().result(), &Template::empty());
    }

    #[test]
    fn test_from_json_str() {
        let doc = json!({"rules": [{
            "name": "hostname",
            "pattern": "^hostname (?P<name>\\S+)$",
            "result": {"hostname": "{{ name }}"},
            "setval": "hostname {{ hostname }}",
            "remval": "hostname"
        }]});
        let table = RuleTable::from_json_str(&doc.to_string()).unwrap();
        let rule = table.require("hostname").unwrap();
        assert!(rule.remval().is_some());
        assert!(matches!(table.require("missing"), Err(Error::UnknownRule(_))));
    }

    #[test]
    fn test_from_path_reports_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[[rules]]\nname = 1").unwrap();
        let err = RuleTable::from_path(file.path()).unwrap_err();
        assert!(matches!(err, Error::RuleFile { .. }));

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{HOSTNAME_TOML}").unwrap();
        assert_eq!(RuleTable::from_path(file.path()).unwrap().len(), 2);
    }
}
