use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use rmtemplate::State;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "netrm")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Parse, render and converge device configuration from rule tables",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to ~/.config/netrm/config.toml when present)
    #[arg(short, long, global = true, env = "NETRM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse device output into structured facts
    Parse(ParseArgs),

    /// Render commands for desired-state data
    Render(RenderArgs),

    /// Run a resource in a given state against a captured device config
    Run(RunArgs),

    /// Check that a rule table compiles
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Parse
// ============================================================================

#[derive(Parser)]
pub struct ParseArgs {
    /// Rule table (TOML or JSON)
    #[arg(short, long)]
    pub rules: PathBuf,

    /// Device output to parse (reads stdin when omitted or "-")
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

// ============================================================================
// Render
// ============================================================================

#[derive(Parser)]
pub struct RenderArgs {
    /// Rule table (TOML or JSON)
    #[arg(short, long)]
    pub rules: PathBuf,

    /// Desired-state data (JSON or TOML)
    #[arg(short, long)]
    pub want: PathBuf,

    /// Only render these rules (defaults to every rule with a command template)
    #[arg(long = "rule", value_name = "NAME")]
    pub only: Vec<String>,

    /// Render removal commands instead
    #[arg(long)]
    pub negate: bool,
}

// ============================================================================
// Run
// ============================================================================

#[derive(Parser)]
pub struct RunArgs {
    /// Rule table (TOML or JSON)
    #[arg(short, long)]
    pub rules: PathBuf,

    /// State to converge to
    #[arg(short, long, value_enum)]
    pub state: StateArg,

    /// Desired-state data (JSON or TOML)
    #[arg(short, long)]
    pub want: Option<PathBuf>,

    /// Captured device configuration, used as the device's current state
    #[arg(long)]
    pub running: Option<PathBuf>,

    /// Append pushed commands to this file instead of printing them
    #[arg(long)]
    pub push: Option<PathBuf>,

    /// Compute commands without pushing them
    #[arg(long)]
    pub check: bool,

    /// Resource name used in messages and warnings
    #[arg(long, default_value = "config")]
    pub resource: String,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StateArg {
    Merged,
    Replaced,
    Overridden,
    Deleted,
    Purged,
    Gathered,
    Rendered,
    Parsed,
}

impl From<StateArg> for State {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Merged => State::Merged,
            StateArg::Replaced => State::Replaced,
            StateArg::Overridden => State::Overridden,
            StateArg::Deleted => State::Deleted,
            StateArg::Purged => State::Purged,
            StateArg::Gathered => State::Gathered,
            StateArg::Rendered => State::Rendered,
            StateArg::Parsed => State::Parsed,
        }
    }
}

// ============================================================================
// Validate
// ============================================================================

#[derive(Parser)]
pub struct ValidateArgs {
    /// Rule table (TOML or JSON)
    #[arg(short, long)]
    pub rules: PathBuf,

    /// List every rule
    #[arg(short, long)]
    pub list: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::parse_from([
            "netrm", "-vv", "run", "--rules", "r.toml", "--state", "overridden", "--want",
            "w.json", "--check",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(State::from(args.state), State::Overridden);
        assert!(args.check);
        assert_eq!(args.resource, "config");
    }
}
