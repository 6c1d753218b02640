pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::errors::EngineResult;

#[derive(Debug, Parser)]
#[command(
    name = "scenario_core_cli",
    version,
    about = "Project and compare startup cost/revenue scenarios"
)]
pub struct Cli {
    /// Directory holding config.json and saved scenarios.
    #[arg(long, global = true, env = "SCENARIO_CORE_HOME")]
    pub home: Option<PathBuf>,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Metrics and category breakdown for one scenario.
    Summary {
        /// Scenario JSON file, or the key of a saved scenario.
        scenario: String,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long)]
        json: bool,
        /// List every item with its share of the window.
        #[arg(long)]
        items: bool,
    },
    /// Side-by-side metrics for two scenarios.
    Compare {
        left: String,
        right: String,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long)]
        json: bool,
        /// Also print the comparison brief.
        #[arg(long)]
        narrate: bool,
    },
    /// Stage-by-stage burn with cumulative totals.
    Timeline {
        scenario: String,
        #[arg(long, conflicts_with = "monthly")]
        quarterly: bool,
        #[arg(long)]
        monthly: bool,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long)]
        json: bool,
    },
    /// Convert a drafted template reply into a scenario document.
    ImportTemplate {
        reply: PathBuf,
        /// Output file; saved under the scenario name when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Saved scenario keys.
    List,
    /// Build metadata.
    Version,
}

#[derive(Debug, Clone, Copy, Default, Args)]
pub struct WindowArgs {
    /// First month of the window (1-based).
    #[arg(long = "from")]
    pub from: Option<u32>,
    /// Last month of the window, inclusive.
    #[arg(long = "to")]
    pub to: Option<u32>,
}

/// Parses the process arguments and runs the selected command.
pub fn run_cli() -> EngineResult<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> EngineResult<()> {
    output::configure_colors(cli.no_color);
    let context = commands::CommandContext::load(cli.home)?;
    commands::dispatch(&context, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_compare_with_window() {
        let cli = Cli::try_parse_from([
            "scenario_core_cli",
            "compare",
            "a.json",
            "b.json",
            "--from",
            "1",
            "--to",
            "24",
            "--narrate",
        ])
        .unwrap();
        match cli.command {
            Command::Compare {
                window, narrate, ..
            } => {
                assert_eq!(window.from, Some(1));
                assert_eq!(window.to, Some(24));
                assert!(narrate);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn quarterly_and_monthly_conflict() {
        let parsed = Cli::try_parse_from([
            "scenario_core_cli",
            "timeline",
            "a.json",
            "--quarterly",
            "--monthly",
        ]);
        assert!(parsed.is_err());
    }
}
