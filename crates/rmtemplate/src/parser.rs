//! Turn line-oriented device output into a structured fact tree

use crate::error::Result;
use crate::rules::RuleTable;
use crate::template::Evaluator;
use crate::types::Template;
use crate::value::deep_merge;
use log::{debug, trace};
use serde_json::{Map, Value};

/// Parses text lines against a rule table
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    rules: &'a RuleTable,
    evaluator: &'a Evaluator,
}

impl<'a> Parser<'a> {
    pub fn new(rules: &'a RuleTable, evaluator: &'a Evaluator) -> Self {
        Self { rules, evaluator }
    }

    /// Parse `lines` into a fact tree
    ///
    /// Each line is matched against the rules in table order and only the
    /// first matching rule contributes. Captures of a `shared` rule become
    /// the context for every later line until the next shared match; a
    /// line's own captures take precedence over that context.
    pub fn parse<'l, I>(&self, lines: I) -> Result<Value>
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut result = Value::Object(Map::new());
        let mut shared = Map::new();

        for line in lines {
            let Some((rule, captures)) = self.rules.first_match(line) else {
                trace!("no rule matched line: {line:?}");
                continue;
            };
            debug!("rule '{}' matched line: {line:?}", rule.name());

            let context = if rule.is_shared() {
                shared = captures;
                shared.clone()
            } else {
                let mut context = shared.clone();
                context.extend(captures);
                context
            };

            let fragment = deepformat(self.evaluator, rule.result(), &Value::Object(context))?;
            if let Some(fragment) = fragment {
                deep_merge(&mut result, fragment);
            }
        }

        Ok(result)
    }

    /// Parse a block of text, one line at a time
    pub fn parse_text(&self, text: &str) -> Result<Value> {
        self.parse(text.lines())
    }
}

/// Format a result template against a context
///
/// Template strings that evaluate to nothing are left out of their map, so a
/// partial match never clobbers a field a later line fills in. Map keys are
/// templates too: an entry whose key formats differently moves under the
/// formatted key, which groups facts by a captured name.
pub fn deepformat(
    evaluator: &Evaluator,
    template: &Template,
    context: &Value,
) -> Result<Option<Value>> {
    match template {
        Template::Scalar(value) => Ok(Some(value.clone())),
        Template::Text(text) => evaluator.evaluate(text, context, false),
        Template::Sequence(items) => {
            let items = items
                .iter()
                .map(|item| Ok(deepformat(evaluator, item, context)?.unwrap_or(Value::Null)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(Value::Array(items)))
        }
        Template::Map(entries) => {
            let mut formatted = Map::with_capacity(entries.len());
            for (key, value) in entries {
                let Some(value) = deepformat(evaluator, value, context)? else {
                    continue;
                };
                let Some(key) = format_key(evaluator, key, context)? else {
                    continue;
                };
                formatted.insert(key, value);
            }
            Ok(Some(Value::Object(formatted)))
        }
    }
}

/// Keys that format to nothing drop their entry
fn format_key(evaluator: &Evaluator, key: &str, context: &Value) -> Result<Option<String>> {
    Ok(evaluator
        .evaluate(key, context, false)?
        .map(|formatted| match formatted {
            Value::String(text) => text,
            other => other.to_string(),
        }))
}
