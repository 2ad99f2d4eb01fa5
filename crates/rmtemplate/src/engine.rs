//! Rule table bundled with everything needed to evaluate it

use crate::diff::Differ;
use crate::error::Result;
use crate::parser::Parser;
use crate::render::Renderer;
use crate::rules::RuleTable;
use crate::template::Evaluator;
use crate::types::{Prefixes, Rendered};
use serde_json::Value;

/// A rule table together with its template evaluator and command prefixes
///
/// Build one per rule table and reuse it: patterns and template
/// environments are set up once. Parsing, rendering and diffing keep all of
/// their working state local to each call.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    rules: RuleTable,
    evaluator: Evaluator,
    prefixes: Prefixes,
}

impl TemplateEngine {
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            evaluator: Evaluator::new(),
            prefixes: Prefixes::default(),
        }
    }

    pub fn with_prefixes(mut self, prefixes: Prefixes) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn parser(&self) -> Parser<'_> {
        Parser::new(&self.rules, &self.evaluator)
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.rules, &self.evaluator, &self.prefixes)
    }

    /// Start a fresh comparison pass with an empty command sequence
    pub fn differ(&self) -> Differ<'_> {
        Differ::new(self.renderer())
    }

    pub fn parse<'l, I>(&self, lines: I) -> Result<Value>
    where
        I: IntoIterator<Item = &'l str>,
    {
        self.parser().parse(lines)
    }

    pub fn parse_text(&self, text: &str) -> Result<Value> {
        self.parser().parse_text(text)
    }

    pub fn render(&self, data: &Value, rule: &str, negate: bool) -> Result<Rendered> {
        self.renderer().render(data, rule, negate)
    }

    /// Compare `want` against `have` over `rules` and return the commands
    pub fn compare(&self, rules: &[&str], want: &Value, have: &Value) -> Result<Vec<String>> {
        let mut differ = self.differ();
        differ.compare(rules, want, have)?;
        Ok(differ.into_commands())
    }
}
