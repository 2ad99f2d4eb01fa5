//! Turn desired-state data back into command lines

use crate::error::Result;
use crate::rules::{Rule, RuleTable};
use crate::template::Evaluator;
use crate::types::{Prefixes, Rendered};
use log::debug;
use serde_json::Value;

/// Renders rules against data
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    rules: &'a RuleTable,
    evaluator: &'a Evaluator,
    prefixes: &'a Prefixes,
}

impl<'a> Renderer<'a> {
    pub fn new(rules: &'a RuleTable, evaluator: &'a Evaluator, prefixes: &'a Prefixes) -> Self {
        Self {
            rules,
            evaluator,
            prefixes,
        }
    }

    pub fn rule(&self, name: &str) -> Result<&'a Rule> {
        self.rules.require(name)
    }

    /// Render the command text of rule `name` for `data`
    ///
    /// Negation uses the rule's `remval` when it has one and its `setval`
    /// otherwise, and prefixes every line with the removal prefix. Templates
    /// that fail to evaluate produce no command.
    pub fn render(&self, data: &Value, name: &str, negate: bool) -> Result<Rendered> {
        let rule = self.rule(name)?;
        let template = if negate {
            rule.remval().or(rule.setval())
        } else {
            rule.setval()
        };
        let Some(template) = template else {
            return Ok(Rendered::Empty);
        };

        let rendered = match self.evaluator.evaluate_setval(template, data) {
            Ok(value) => Rendered::from_value(value),
            Err(e) => {
                debug!("rule '{name}' rendered nothing: {e}");
                Rendered::Empty
            }
        };

        if rendered.is_empty() {
            return Ok(rendered);
        }
        if negate {
            return Ok(rendered.prefixed(&self.prefixes.remove));
        }
        match self.prefixes.set.as_deref() {
            Some(set) if !set.is_empty() => Ok(rendered.prefixed(set)),
            _ => Ok(rendered),
        }
    }
}
