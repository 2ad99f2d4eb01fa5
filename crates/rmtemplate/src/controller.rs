//! Controller - drives a resource module through one requested state

use crate::context::{Connection, FactSource, Facts};
use crate::diff::Differ;
use crate::engine::TemplateEngine;
use crate::error::{Error, Result};
use crate::types::State;
use crate::value::{is_empty, merged, remove_empties};
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};

/// A platform-specific resource built on a rule table
///
/// Modules only need to name their resource and supply their engine. The
/// default command generation compares every command-capable rule; modules
/// with list-shaped data override [`ResourceModule::generate_commands`].
pub trait ResourceModule {
    /// Name of the managed resource, e.g. "hostname" or "interfaces"
    fn resource(&self) -> &str;

    fn engine(&self) -> &TemplateEngine;

    /// Field-level rules compared for this resource, in emission order
    fn parsers(&self) -> Vec<&str> {
        self.engine().rules().command_rules()
    }

    /// Fill `differ` with the commands that move `have` towards `want`
    ///
    /// - merged: `want` is layered over `have`, so nothing is removed
    /// - replaced, overridden: `want` is compared as given
    /// - deleted, purged, or any state with nothing wanted: everything in
    ///   `have` is removed
    fn generate_commands(
        &self,
        differ: &mut Differ<'_>,
        state: State,
        want: &Value,
        have: &Value,
    ) -> Result<()> {
        let parsers = self.parsers();
        match state {
            State::Deleted | State::Purged => {
                differ.compare(&parsers, &Value::Object(Map::new()), have)
            }
            State::Merged => differ.compare(&parsers, &merged(have, want), have),
            _ => differ.compare(&parsers, want, have),
        }
    }
}

/// One controller invocation
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub state: State,
    /// Desired configuration ("want")
    pub config: Option<Value>,
    /// Captured device output for the parsed state
    pub running_config: Option<String>,
}

impl Request {
    pub fn new(state: State) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_running_config(mut self, running_config: impl Into<String>) -> Self {
        self.running_config = Some(running_config.into());
        self
    }
}

/// Options for running the controller
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Compute commands but never push them
    pub check_mode: bool,
    /// Facts used when the device reports nothing for the resource
    pub empty_facts: Value,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            check_mode: false,
            empty_facts: Value::Object(Map::new()),
        }
    }
}

/// Outcome of one controller invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gathered: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
    pub warnings: Vec<String>,
}

/// Runs resource modules
#[derive(Debug, Clone, Default)]
pub struct Controller {
    options: RunOptions,
}

impl Controller {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run `module` in the requested state
    ///
    /// Configuration errors are raised before `facts` or `connection` is
    /// touched. Errors from either collaborator are returned unchanged.
    pub fn run<M>(
        &self,
        module: &M,
        request: Request,
        facts: &mut dyn Facts,
        connection: Option<&mut dyn Connection>,
    ) -> Result<RunResult>
    where
        M: ResourceModule + ?Sized,
    {
        let state = request.state;
        let want = request
            .config
            .map(remove_empties)
            .unwrap_or(Value::Null);

        if state.requires_want() && is_empty(&want) {
            return Err(Error::EmptyWant(state));
        }
        let running_config = request.running_config.filter(|text| !text.trim().is_empty());
        if state == State::Parsed && running_config.is_none() {
            return Err(Error::MissingRunningConfig);
        }
        if state.contacts_device() && connection.is_none() {
            return Err(Error::MissingConnection(state));
        }

        let mut result = RunResult::default();

        match (state, connection) {
            (State::Parsed, _) => {
                let text = running_config.unwrap_or_default();
                let parsed = self.gather(module, FactSource::Offline(&text), facts, &mut result)?;
                result.parsed = Some(parsed);
            }
            (State::Rendered, _) => {
                let have = self.options.empty_facts.clone();
                result.rendered = Some(self.commands(module, state, &want, &have)?);
            }
            (State::Gathered, Some(connection)) => {
                let have = self.gather(module, FactSource::Live(connection), facts, &mut result)?;
                result.gathered = Some(have);
                result.changed = Some(false);
            }
            (_, Some(connection)) => {
                let before =
                    self.gather(module, FactSource::Live(&mut *connection), facts, &mut result)?;
                let commands = self.commands(module, state, &want, &before)?;
                let changed = !commands.is_empty();

                if changed {
                    if self.options.check_mode {
                        info!("check mode: not pushing {} command(s)", commands.len());
                        result.after = Some(before.clone());
                    } else {
                        info!("pushing {} command(s) to the device", commands.len());
                        connection.edit_config(&commands)?;
                        let after =
                            self.gather(module, FactSource::Live(connection), facts, &mut result)?;
                        result.after = Some(after);
                    }
                }

                result.commands = Some(commands);
                result.before = Some(before);
                result.changed = Some(changed);
            }
            (_, None) => return Err(Error::MissingConnection(state)),
        }

        Ok(result)
    }

    fn gather<M>(
        &self,
        module: &M,
        source: FactSource<'_>,
        facts: &mut dyn Facts,
        result: &mut RunResult,
    ) -> Result<Value>
    where
        M: ResourceModule + ?Sized,
    {
        let gathered = facts.get_facts(module.resource(), source)?;
        result.warnings.extend(gathered.warnings);
        if is_empty(&gathered.facts) {
            return Ok(self.options.empty_facts.clone());
        }
        Ok(gathered.facts)
    }

    fn commands<M>(
        &self,
        module: &M,
        state: State,
        want: &Value,
        have: &Value,
    ) -> Result<Vec<String>>
    where
        M: ResourceModule + ?Sized,
    {
        let mut differ = module.engine().differ();
        module.generate_commands(&mut differ, state, want, have)?;
        let commands = differ.into_commands();
        debug!(
            "{} {state}: {} command(s) generated",
            module.resource(),
            commands.len()
        );
        Ok(commands)
    }
}
