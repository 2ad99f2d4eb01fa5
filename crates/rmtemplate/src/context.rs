//! Device collaborator traits
//!
//! These traits keep the controller independent of any transport: the
//! embedding application supplies the connection and the facts source.

use crate::engine::TemplateEngine;
use anyhow::Result;
use log::debug;
use serde_json::Value;

/// A connection to one device
///
/// Implementations own transport concerns (sessions, timeouts, retries);
/// their errors reach the controller's caller unchanged.
pub trait Connection {
    /// Run a read-only command and return its output
    fn get(&mut self, command: &str) -> Result<String>;

    /// Push configuration commands, in order
    fn edit_config(&mut self, commands: &[String]) -> Result<()>;
}

/// Where facts come from
pub enum FactSource<'a> {
    /// Query the device
    Live(&'a mut dyn Connection),
    /// Use previously captured device output
    Offline(&'a str),
}

/// Facts gathered for one resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gathered {
    pub facts: Value,
    pub warnings: Vec<String>,
}

/// Provider of current-state facts
pub trait Facts {
    /// Gather the facts of `resource`
    fn get_facts(&mut self, resource: &str, source: FactSource<'_>) -> Result<Gathered>;
}

/// Facts provider that parses device output with a rule table
///
/// Live queries run `command` on the device; offline text is parsed as-is.
pub struct TemplateFacts<'a> {
    engine: &'a TemplateEngine,
    command: String,
}

impl<'a> TemplateFacts<'a> {
    pub fn new(engine: &'a TemplateEngine, command: impl Into<String>) -> Self {
        Self {
            engine,
            command: command.into(),
        }
    }
}

impl Facts for TemplateFacts<'_> {
    fn get_facts(&mut self, resource: &str, source: FactSource<'_>) -> Result<Gathered> {
        let facts = match source {
            FactSource::Live(connection) => {
                debug!("gathering {resource} facts with '{}'", self.command);
                let output = connection.get(&self.command)?;
                self.engine.parse_text(&output)?
            }
            FactSource::Offline(text) => self.engine.parse_text(text)?,
        };

        let mut warnings = Vec::new();
        if crate::value::is_empty(&facts) {
            warnings.push(format!("no {resource} facts found in device output"));
        }
        Ok(Gathered { facts, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, RuleTable};
    use serde_json::json;

    struct Canned(&'static str);

    impl Connection for Canned {
        fn get(&mut self, command: &str) -> Result<String> {
            assert_eq!(command, "show running-config | include hostname");
            Ok(self.0.to_string())
        }

        fn edit_config(&mut self, _commands: &[String]) -> Result<()> {
            anyhow::bail!("read-only")
        }
    }

    fn engine() -> TemplateEngine {
        TemplateEngine::new(
            RuleTable::new(vec![
                Rule::new("hostname", r"^hostname (?P<name>\S+)$")
                    .unwrap()
                    .with_result(json!({"hostname": "{{ name }}"})),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_template_facts_live() {
        let engine = engine();
        let mut facts = TemplateFacts::new(&engine, "show running-config | include hostname");
        let mut device = Canned("hostname R1\n");
        let gathered = facts
            .get_facts("hostname", FactSource::Live(&mut device))
            .unwrap();
        assert_eq!(gathered.facts, json!({"hostname": "R1"}));
        assert!(gathered.warnings.is_empty());
    }

    #[test]
    fn test_template_facts_offline_warns_when_empty() {
        let engine = engine();
        let mut facts = TemplateFacts::new(&engine, "unused");
        let gathered = facts
            .get_facts("hostname", FactSource::Offline("version 15.2"))
            .unwrap();
        assert_eq!(gathered.facts, json!({}));
        assert_eq!(gathered.warnings.len(), 1);
    }
}
