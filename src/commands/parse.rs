use anyhow::Result;

use super::{load_engine, read_input};
use crate::Context;
use crate::cli::ParseArgs;

pub fn run(ctx: &Context, args: &ParseArgs) -> Result<()> {
    let engine = load_engine(ctx, &args.rules)?;
    let text = read_input(args.input.as_deref())?;

    let facts = engine.parse_text(&text)?;
    if rmtemplate::value::is_empty(&facts) && !ctx.quiet {
        log::warn!("no rule matched the input");
    }

    println!("{}", serde_json::to_string_pretty(&facts)?);
    Ok(())
}
