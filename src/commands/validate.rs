use anyhow::Result;
use colored::Colorize;

use super::load_engine;
use crate::Context;
use crate::cli::ValidateArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &ValidateArgs) -> Result<()> {
    let engine = load_engine(ctx, &args.rules)?;
    let rules = engine.rules();

    let shared = rules.iter().filter(|rule| rule.is_shared()).count();
    let commands = rules.command_rules().len();

    if !ctx.quiet {
        ui::header("Rule Table");
        ui::kv("File", &args.rules.display().to_string());
        ui::kv(
            "Rules",
            &format!(
                "{} total, {} shared, {} with commands",
                rules.len().to_string().bold(),
                shared,
                commands
            ),
        );
    }

    if args.list {
        ui::section("Rules");
        for rule in rules.iter() {
            let mut flags = Vec::new();
            if rule.is_shared() {
                flags.push("shared");
            }
            if rule.setval().is_some() {
                flags.push("setval");
            }
            if rule.remval().is_some() {
                flags.push("remval");
            }
            let compval = if rule.compval() == rule.name() {
                String::new()
            } else {
                format!(" -> {}", rule.compval())
            };
            println!(
                "  {}{} {}",
                rule.name().bold(),
                compval.dimmed(),
                format!("[{}]", flags.join(", ")).dimmed()
            );
            ui::dim(rule.pattern().as_str());
        }
    }

    if !ctx.quiet {
        println!();
        ui::success("Rule table is valid");
    }
    Ok(())
}
