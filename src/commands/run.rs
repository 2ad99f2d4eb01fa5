use anyhow::Result;
use colored::Colorize;
use rmtemplate::{
    Connection, Controller, Request, ResourceModule, RunOptions, RunResult, State, TemplateEngine,
    TemplateFacts,
};
use serde_json::Value;

use super::{load_engine, load_want, read_input};
use crate::Context;
use crate::cli::RunArgs;
use crate::config::expand_path;
use crate::device::FileDevice;
use crate::ui;

/// A resource described entirely by one rule table
///
/// Commands come from a whole-tree comparison over every rule that has a
/// command template, in table order.
pub struct RuleTableModule {
    resource: String,
    engine: TemplateEngine,
}

impl RuleTableModule {
    pub fn new(resource: impl Into<String>, engine: TemplateEngine) -> Self {
        Self {
            resource: resource.into(),
            engine,
        }
    }
}

impl ResourceModule for RuleTableModule {
    fn resource(&self) -> &str {
        &self.resource
    }

    fn engine(&self) -> &TemplateEngine {
        &self.engine
    }
}

pub fn run(ctx: &Context, args: &RunArgs) -> Result<()> {
    let state = State::from(args.state);
    let module = RuleTableModule::new(&args.resource, load_engine(ctx, &args.rules)?);

    let mut request = Request::new(state);
    if let Some(path) = &args.want {
        request.config = Some(load_want(path)?);
    }

    let mut device = None;
    match state {
        State::Parsed => {
            request.running_config = Some(read_input(args.running.as_deref())?);
        }
        _ if state.contacts_device() => {
            if let Some(path) = &args.running {
                let mut file_device = FileDevice::from_path(&expand_path(path))?;
                if let Some(push) = &args.push {
                    file_device = file_device.with_push_file(expand_path(push));
                }
                device = Some(file_device);
            }
        }
        _ => {}
    }

    let options = RunOptions {
        check_mode: args.check || ctx.config.check_mode,
        empty_facts: ctx.config.empty_facts.value(),
    };
    let check_mode = options.check_mode;
    let mut facts = TemplateFacts::new(module.engine(), ctx.config.show_command.clone());
    let connection = device.as_mut().map(|d| d as &mut dyn Connection);

    let result = Controller::new(options).run(&module, request, &mut facts, connection)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    show_result(ctx, &module, state, check_mode, &result)
}

fn show_result(
    ctx: &Context,
    module: &RuleTableModule,
    state: State,
    check_mode: bool,
    result: &RunResult,
) -> Result<()> {
    if !ctx.quiet {
        ui::header(&format!("{} ({state})", module.resource()));
    }

    for warning in &result.warnings {
        ui::warn(warning);
    }

    if let Some(parsed) = &result.parsed {
        println!("{}", serde_json::to_string_pretty(parsed)?);
    }
    if let Some(gathered) = &result.gathered {
        println!("{}", serde_json::to_string_pretty(gathered)?);
    }
    if let Some(rendered) = &result.rendered {
        for line in rendered {
            println!("{line}");
        }
    }

    if let Some(commands) = &result.commands {
        if commands.is_empty() {
            ui::success("Already in desired state");
        } else {
            ui::section("Commands");
            for line in commands {
                ui::command(line);
            }
            if check_mode {
                ui::info(&format!(
                    "check mode: {} command(s) not pushed",
                    commands.len().to_string().bold()
                ));
            }
        }
    }

    match (&result.before, &result.after) {
        (Some(before), Some(after)) => {
            ui::section("Facts");
            ui::fact_diff(&pretty(before)?, &pretty(after)?);
        }
        (Some(before), None) if ctx.verbose > 0 => {
            ui::section("Facts");
            ui::dim(&serde_json::to_string(before)?);
        }
        _ => {}
    }

    if !ctx.quiet && let Some(changed) = result.changed {
        ui::kv("changed", &changed.to_string());
    }
    Ok(())
}

fn pretty(value: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}
