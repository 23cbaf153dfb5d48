//! lnsdk CLI
//!
//! Connects to a hosted Lightning node and queries it. Any error is printed
//! and terminates the process with exit code 1.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

mod flow;
mod listener;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::CliConfig;
use sdk::binding::BlockingBreezServices;
use types::{
    CheckMessageRequest, EnvironmentType, NodeConfig, NodeState, SignMessageRequest,
};

use crate::flow::{BlockingSdk, FlowSettings};
use crate::listener::ConsoleListener;

const PHRASE_FILE_NAME: &str = "phrase";
const PHRASE_WORD_COUNT: usize = 12;

#[derive(Parser, Debug)]
#[command(name = "lnsdk", about = "Client for a hosted Lightning node", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
    /// Directory holding the seed phrase and the SDK storage
    #[arg(long, default_value = ".data", global = true)]
    data_dir: PathBuf,
    /// Settings file, defaults to the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store the API key sent to the scheduler
    SetApiKey { key: String },
    /// Select the provider deployment
    SetEnv { env: EnvironmentType },
    /// Connect to the node and print its id
    Connect {
        /// PEM partner certificate used to register a new node
        #[arg(long)]
        partner_cert: Option<PathBuf>,
        /// PEM partner key used to register a new node
        #[arg(long)]
        partner_key: Option<PathBuf>,
        /// Invite code used to register a new node
        #[arg(long)]
        invite_code: Option<String>,
    },
    /// Connect and print the node state as JSON
    NodeInfo,
    /// Connect, sync, and print the block height
    Sync,
    /// Print the seed phrase, creating it if needed
    Mnemonic,
    /// Sign a message with the node key
    SignMessage { message: String },
    /// Check that a message was signed by a node
    CheckMessage { message: String, pubkey: String, signature: String },
    /// Run a read-only node command such as listfunds and print its output
    ExecuteCommand { command: String },
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => CliConfig::default_path()?,
    };
    let mut settings = CliConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    match cli.cmd {
        Commands::SetApiKey { key } => {
            settings.api_key = Some(key);
            settings.save(&config_path)?;
            println!("API key saved to {}", config_path.display());
        }
        Commands::SetEnv { env } => {
            settings.environment = env;
            settings.save(&config_path)?;
            println!("Environment set to {}", env);
        }
        Commands::Mnemonic => {
            println!("{}", load_or_create_phrase(&cli.data_dir)?);
        }
        Commands::Connect { partner_cert, partner_key, invite_code } => {
            settings.partner_cert = partner_cert.or(settings.partner_cert);
            settings.partner_key = partner_key.or(settings.partner_key);
            settings.invite_code = invite_code.or(settings.invite_code);
            let (services, node_info) = connect(&cli.data_dir, &settings)?;
            println!("Node id: {}", node_info.id);
            services.disconnect()?;
        }
        Commands::NodeInfo => {
            let (services, node_info) = connect(&cli.data_dir, &settings)?;
            println!("{}", serde_json::to_string_pretty(&node_info)?);
            services.disconnect()?;
        }
        Commands::Sync => {
            let (services, _) = connect(&cli.data_dir, &settings)?;
            services.sync().context("failed to sync")?;
            let node_info = services.node_info()?;
            println!("Node id: {}, block height: {}", node_info.id, node_info.block_height);
            services.disconnect()?;
        }
        Commands::SignMessage { message } => {
            let (services, _) = connect(&cli.data_dir, &settings)?;
            let signed = services.sign_message(SignMessageRequest { message })?;
            println!("{}", signed.signature);
            services.disconnect()?;
        }
        Commands::CheckMessage { message, pubkey, signature } => {
            let (services, _) = connect(&cli.data_dir, &settings)?;
            let checked =
                services.check_message(CheckMessageRequest { message, pubkey, signature })?;
            println!("Valid: {}", checked.is_valid);
            services.disconnect()?;
        }
        Commands::ExecuteCommand { command } => {
            let (services, _) = connect(&cli.data_dir, &settings)?;
            let output = services
                .execute_command(command.clone())
                .with_context(|| format!("failed to run {}", command))?;
            println!("{}", output);
            services.disconnect()?;
        }
    }
    Ok(())
}

fn connect(
    data_dir: &Path,
    settings: &CliConfig,
) -> Result<(Arc<BlockingBreezServices>, NodeState)> {
    let phrase = load_or_create_phrase(data_dir)?;
    let node_config = settings.node_config().context("invalid registration settings")?;

    let listener = match &settings.logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            ConsoleListener::new(Box::new(file))
        }
        None => ConsoleListener::stderr(),
    };

    flow::run(
        &BlockingSdk,
        &phrase,
        FlowSettings {
            environment: settings.environment,
            api_key: settings.api_key.clone().unwrap_or_default(),
            node_config: NodeConfig::Greenlight { config: node_config },
            working_dir: data_dir.to_path_buf(),
            log_filter: settings.logging.level,
        },
        listener,
    )
}

/// Reads the phrase stored in `data_dir`, generating and storing one if absent.
fn load_or_create_phrase(data_dir: &Path) -> Result<String> {
    let path = data_dir.join(PHRASE_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(phrase) => Ok(phrase.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("failed to create {}", data_dir.display()))?;
            let phrase = sdk::generate_mnemonic(PHRASE_WORD_COUNT)?;
            std::fs::write(&path, &phrase)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(phrase)
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}
