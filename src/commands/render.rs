use anyhow::{Result, bail};
use rmtemplate::TemplateEngine;
use serde_json::Value;

use super::{load_engine, load_want};
use crate::Context;
use crate::cli::RenderArgs;

pub fn run(ctx: &Context, args: &RenderArgs) -> Result<()> {
    let engine = load_engine(ctx, &args.rules)?;
    let want = load_want(&args.want)?;

    for line in render_lines(&engine, &want, &args.only, args.negate)? {
        println!("{line}");
    }
    Ok(())
}

/// Render each requested rule against `want`, in rule order
///
/// A list of entries is rendered entry by entry.
fn render_lines(
    engine: &TemplateEngine,
    want: &Value,
    only: &[String],
    negate: bool,
) -> Result<Vec<String>> {
    let rules: Vec<&str> = if only.is_empty() {
        engine.rules().command_rules()
    } else {
        only.iter().map(String::as_str).collect()
    };
    if rules.is_empty() {
        bail!("rule table has no rule with a command template");
    }

    let entries: Vec<&Value> = match want {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut lines = Vec::new();
    for entry in entries {
        for rule in &rules {
            lines.extend(engine.render(entry, rule, negate)?.into_lines());
        }
    }
    Ok(lines)
}
