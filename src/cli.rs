use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::commands::{self, analyze, journal, key, Reply};
use crate::config;
use crate::core_state::CoreState;
use crate::pipeline::RunMode;

#[derive(Parser, Debug)]
#[command(
    name = "horadric",
    version,
    about = "Read a Diablo IV loot screenshot and decide what to keep"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long = "class", global = true, help = "Class to evaluate for (default: Any)")]
    pub class: Option<String>,
    #[arg(long, global = true, help = "Build of the selected class (default: General)")]
    pub build: Option<String>,
    #[arg(long, global = true, help = "Stat to prioritize, e.g. \"Crit Damage\"")]
    pub focus: Option<String>,
    #[arg(
        long = "need",
        global = true,
        help = "Required stat (str, int, will, dex, res); repeatable"
    )]
    pub needs: Vec<String>,
    #[arg(long, global = true, help = "Override the data directory")]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verdict and affix breakdown for one item
    Analyze { image: PathBuf },
    /// Side-by-side duel of two items in one screenshot
    Compare { image: PathBuf },
    /// Canned result without an API key
    Demo {
        #[arg(long, default_value_t = false)]
        compare: bool,
    },
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
    Journal {
        #[command(subcommand)]
        command: JournalCommands,
    },
    /// List classes, builds and mechanics
    Classes,
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    Set { key: String },
    Clear,
    Status,
}

#[derive(Subcommand, Debug)]
pub enum JournalCommands {
    List,
    Show {
        id: String,
        #[arg(long, default_value_t = false, help = "Print the plain-text share export")]
        share: bool,
    },
    Remove { id: String },
    Clear,
}

/// Execute a parsed command line. Errors are already user-facing text.
pub fn dispatch(cli: Cli) -> Result<Reply, String> {
    if let Commands::Classes = cli.command {
        return Ok(commands::list_classes(cli.json));
    }

    let dir = cli
        .data_dir
        .clone()
        .map(|d| d.join("store"))
        .unwrap_or_else(config::store_dir);
    let observer: Arc<dyn crate::pipeline::RunObserver> = if cli.json {
        Arc::new(crate::pipeline::NoopObserver)
    } else {
        Arc::new(analyze::StderrObserver)
    };
    let state = CoreState::open(dir, observer).map_err(|e| e.to_string())?;
    execute(&state, cli)
}

fn execute(state: &CoreState, cli: Cli) -> Result<Reply, String> {
    let json = cli.json;
    let context = || {
        commands::build_context(
            cli.class.as_deref(),
            cli.build.as_deref(),
            cli.focus.as_deref(),
            &cli.needs,
        )
    };

    match &cli.command {
        Commands::Analyze { image } => {
            analyze::scan_image(state, image, RunMode::Analyze, &context()?, json)
        }
        Commands::Compare { image } => {
            analyze::scan_image(state, image, RunMode::Compare, &context()?, json)
        }
        Commands::Demo { compare } => {
            let mode = if *compare {
                RunMode::Compare
            } else {
                RunMode::Analyze
            };
            analyze::demo(state, mode, &context()?, json)
        }
        Commands::Key { command } => match command {
            KeyCommands::Set { key: value } => key::set_key(state, value, json),
            KeyCommands::Clear => key::clear_key(state, json),
            KeyCommands::Status => Ok(key::key_status(state, json)),
        },
        Commands::Journal { command } => match command {
            JournalCommands::List => Ok(journal::list_entries(state, json)),
            JournalCommands::Show { id, share } => journal::show_entry(state, id, *share, json),
            JournalCommands::Remove { id } => journal::remove_entry(state, id, json),
            JournalCommands::Clear => Ok(journal::clear_entries(state, json)),
        },
        Commands::Classes => Ok(commands::list_classes(json)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{MockInferenceClient, NoopObserver};
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("horadric").chain(args.iter().copied())).unwrap()
    }

    fn state() -> CoreState {
        CoreState::new(
            Arc::new(MockInferenceClient::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(NoopObserver),
        )
        .with_demo_delay(Duration::ZERO)
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&[
            "analyze", "shot.png", "--class", "Rogue", "--need", "dex", "--need", "res", "--json",
        ]);
        assert!(cli.json);
        assert_eq!(cli.class.as_deref(), Some("Rogue"));
        assert_eq!(cli.needs, vec!["dex", "res"]);
        assert!(matches!(cli.command, Commands::Analyze { .. }));
    }

    #[test]
    fn nested_subcommands_parse() {
        assert!(matches!(
            parse(&["key", "set", "abc"]).command,
            Commands::Key { command: KeyCommands::Set { .. } }
        ));
        assert!(matches!(
            parse(&["journal", "show", "1234", "--share"]).command,
            Commands::Journal { command: JournalCommands::Show { share: true, .. } }
        ));
        assert!(Cli::try_parse_from(["horadric", "journal"]).is_err());
    }

    #[test]
    fn demo_with_context_lands_in_journal() {
        let state = state();
        let cli = parse(&["demo", "--compare", "--class", "Barbarian", "--build", "HOTA"]);
        let reply = execute(&state, cli).unwrap();
        assert_eq!(reply.code, 0);

        let list = state.orchestrator().journal().list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].mode, RunMode::Compare);
        assert_eq!(list[0].context.category, "Barbarian");
        assert_eq!(list[0].context.sub_category, "HOTA");
    }

    #[test]
    fn bad_class_is_reported_before_running() {
        let state = state();
        let err = execute(&state, parse(&["demo", "--class", "Amazon"])).unwrap_err();
        assert!(err.contains("Unknown class"));
        assert!(state.orchestrator().journal().is_empty());
    }

    #[test]
    fn key_round_trip_through_cli() {
        let state = state();
        execute(&state, parse(&["key", "set", "abc"])).unwrap();
        let reply = execute(&state, parse(&["key", "status"])).unwrap();
        assert_eq!(reply.text, "API key: saved\n");
    }
}
