//! Field-by-field comparison of desired and current state
//!
//! For every rule, the value at the rule's comparison path is looked up in
//! both trees and one of three things happens: the wanted value is emitted,
//! the current value is negated, or nothing is emitted.
//!
//! | want            | have        | action                              |
//! |-----------------|-------------|-------------------------------------|
//! | absent          | absent      | none                                |
//! | equal to have   |             | none                                |
//! | `false`         | absent      | none                                |
//! | boolean `b`     | other       | render want, negated when `!b`      |
//! | other value     | other       | render want                         |
//! | absent          | boolean `b` | render have, negated when `b`       |
//! | absent          | other value | render have, negated                |
//!
//! An explicit `null` counts as absent on both sides. A current `false`
//! with nothing wanted still renders the flag un-negated; only the wanted
//! side suppresses a removal of an already-absent flag.

use crate::error::Result;
use crate::render::Renderer;
use crate::value::get_path;
use log::trace;
use serde_json::Value;

/// Accumulates the commands of one comparison pass
#[derive(Debug)]
pub struct Differ<'a> {
    renderer: Renderer<'a>,
    commands: Vec<String>,
}

impl<'a> Differ<'a> {
    pub fn new(renderer: Renderer<'a>) -> Self {
        Self {
            renderer,
            commands: Vec::new(),
        }
    }

    pub fn renderer(&self) -> &Renderer<'a> {
        &self.renderer
    }

    /// Compare `want` and `have` for each rule in `rules`, in order
    pub fn compare(&mut self, rules: &[&str], want: &Value, have: &Value) -> Result<()> {
        for &name in rules {
            let path = self.renderer.rule(name)?.compval();
            let inw = lookup(want, path);
            let inh = lookup(have, path);

            match (inw, inh) {
                (Some(w), h) if Some(w) != h => match w {
                    Value::Bool(false) if h.is_none() => {
                        trace!("rule '{name}': not negating a flag that is already absent");
                    }
                    Value::Bool(flag) => {
                        self.emit(want, name, !flag)?;
                    }
                    _ => {
                        self.emit(want, name, false)?;
                    }
                },
                (None, Some(Value::Bool(flag))) => {
                    self.emit(have, name, *flag)?;
                }
                (None, Some(_)) => {
                    self.emit(have, name, true)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Render `rule` for `data` and append whatever it produces
    ///
    /// Returns the number of lines appended.
    pub fn emit(&mut self, data: &Value, rule: &str, negate: bool) -> Result<usize> {
        let lines = self.renderer.render(data, rule, negate)?.into_lines();
        let count = lines.len();
        self.commands.extend(lines);
        Ok(count)
    }

    /// Try `candidates` in order, stopping at the first that emits anything
    ///
    /// Used when several mutually exclusive rules express the same field.
    pub fn emit_first_match(
        &mut self,
        data: &Value,
        candidates: &[&str],
        negate: bool,
    ) -> Result<bool> {
        for &rule in candidates {
            if self.emit(data, rule, negate)? > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append commands produced elsewhere, e.g. by a nested pass
    pub fn extend<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.commands.extend(commands);
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<String> {
        self.commands
    }
}

fn lookup<'v>(data: &'v Value, path: &str) -> Option<&'v Value> {
    get_path(data, path).filter(|value| !value.is_null())
}
