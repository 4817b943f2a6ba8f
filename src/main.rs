//! `input-everywhere` binary.
//!
//! Runs one coordinator against the storage file for the duration of a
//! single command. `replay` additionally attaches a page agent to a fixture
//! page and drives it from stdin.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use input_everywhere::assistant::{MistralClient, TextGenerator};
use input_everywhere::agent::PageAgent;
use input_everywhere::config::{default_config_path, load_config, Config};
use input_everywhere::coordinator::CoordinatorProcess;
use input_everywhere::dom::{MemoryDocument, PageFixture};
use input_everywhere::logging;
use input_everywhere::panel::ControlPanel;
use input_everywhere::shortcuts::ShortcutCommand;
use input_everywhere::stdin_commands::{start_stdin_listener, ReplaySession};
use input_everywhere::storage::{default_storage_path, JsonFileStore, StateStore};

#[derive(Parser, Debug)]
#[command(name = "input-everywhere")]
#[command(about = "Shared flags, focus capture and the assistant panel, from the command line")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.input-everywhere/config.json)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print the current flags as JSON
    State,
    /// Set one flag (extensionEnabled, habitModeEnabled, advancedModeEnabled)
    Set {
        flag: String,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Fire a global shortcut by name, e.g. toggle-habit-mode
    Shortcut { name: ShortcutCommand },
    /// Save the assistant API key and validate it
    SaveKey { key: String },
    /// Attach an agent to a fixture page and drive it with JSONL from stdin
    Replay {
        #[arg(value_name = "FIXTURE")]
        fixture: PathBuf,
    },
}

fn main() -> Result<()> {
    let _guard = logging::init();
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Arc::new(load_config(&config_path));
    let storage_path = config
        .get_storage_path()
        .unwrap_or_else(default_storage_path);
    // A corrupt file is replaced on the next write
    let store: Arc<dyn StateStore> = Arc::new(JsonFileStore::open_or_empty(storage_path));
    let generator: Arc<dyn TextGenerator> =
        Arc::new(MistralClient::new(config.assistant.clone()));

    let process = CoordinatorProcess::start(store.clone());

    match cli.command {
        CliCommand::State => print_json(&process.with(|c| c.state()))?,
        CliCommand::Set { flag, value } => {
            let state = process.with(|c| c.apply_raw(&flag, value)).map_err(|e| {
                warn!(severity = ?e.severity(), error = %e, "Flag change rejected");
                anyhow!(e.user_message())
            })?;
            print_json(&state)?;
        }
        CliCommand::Shortcut { name } => {
            process.with(|c| c.handle_shortcut(name));
            print_json(&process.with(|c| c.state()))?;
        }
        CliCommand::SaveKey { key } => {
            let mut panel = ControlPanel::open(process.handle(), store, generator);
            let status = panel.save_credential(&key).clone();
            panel.close();
            print_json(&status)?;
        }
        CliCommand::Replay { fixture } => replay(&process, store, generator, config, &fixture)?,
    }
    Ok(())
}

fn replay(
    process: &CoordinatorProcess,
    store: Arc<dyn StateStore>,
    generator: Arc<dyn TextGenerator>,
    config: Arc<Config>,
    fixture_path: &Path,
) -> Result<()> {
    let content = fs::read_to_string(fixture_path)
        .with_context(|| format!("Failed to read fixture {}", fixture_path.display()))?;
    let fixture: PageFixture = serde_json::from_str(&content)
        .with_context(|| format!("Fixture {} is not a page fixture", fixture_path.display()))?;

    let doc = MemoryDocument::from_fixture(&fixture);
    let agent = PageAgent::attach(process.handle(), store, generator, config, &fixture.hostname);
    let mut session = ReplaySession::new(doc, agent, process.handle());
    info!(hostname = %fixture.hostname, "Replay started");

    let commands = start_stdin_listener();
    while let Ok(command) = commands.recv_blocking() {
        let report = session.apply(command);
        print_json(&report)?;
    }

    let (_, agent) = session.into_parts();
    agent.detach();
    info!("Replay finished");
    Ok(())
}

/// One compact JSON document per line on stdout
fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
