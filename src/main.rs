//! scpctl CLI entrypoint.
//!
//! This is the main entrypoint for the scpctl command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scp_provider::cli::{Cli, Commands, OutputFormatter, StateCommands};
use scp_provider::config::{ConfigParser, ConfigValidator, Manifest, find_config_file};
use scp_provider::engine::{Engine, RunReport};
use scp_provider::error::Result;
use scp_provider::registry::Registry;
use scp_provider::resources::ProviderContext;
use scp_provider::state::{LocalStateStore, StateStore};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` wins over the verbosity flag when set.
fn init_logging(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Main async entry point. Returns whether every block succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let formatter = OutputFormatter::new(cli.output);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Validate { warnings } => cmd_validate(config, warnings, &formatter),
        Commands::Apply => {
            let workspace = Workspace::load(config)?;
            let report = workspace.engine().apply().await?;
            Ok(print_report(&formatter, "apply", &report))
        }
        Commands::Refresh => {
            let workspace = Workspace::load(config)?;
            let report = workspace.engine().refresh().await?;
            Ok(print_report(&formatter, "refresh", &report))
        }
        Commands::Destroy { yes } => cmd_destroy(config, yes, &formatter).await,
        Commands::Data => {
            let workspace = Workspace::load(config)?;
            let report = workspace.engine().read_data().await?;
            println!("{}", formatter.format_data(&report));
            Ok(report.success())
        }
        Commands::State { command } => cmd_state(config, command, &formatter).await,
    }
}

/// Validate the manifest.
fn cmd_validate(config_path: Option<&Path>, show_warnings: bool, formatter: &OutputFormatter) -> Result<bool> {
    let (manifest, _) = load_manifest(config_path)?;
    let registry = Registry::builtin();
    let result = ConfigValidator::new(&registry).validate(&manifest)?;

    println!("{}", formatter.format_validation(&manifest, &result, show_warnings));
    Ok(true)
}

/// Destroy every recorded resource.
async fn cmd_destroy(config_path: Option<&Path>, auto_approve: bool, formatter: &OutputFormatter) -> Result<bool> {
    let workspace = Workspace::load(config_path)?;

    let Some(state) = workspace.store.load().await? else {
        eprintln!("{}", formatter.success("No state found, nothing to destroy."));
        return Ok(true);
    };
    if state.resources.is_empty() {
        eprintln!("{}", formatter.success("No resources to destroy."));
        return Ok(true);
    }

    eprintln!("The following resources will be destroyed:");
    for record in state.resources.iter().rev() {
        eprintln!("  - {} ({})", record.address(), record.id);
    }

    if !auto_approve {
        eprint!("\nThis action is IRREVERSIBLE. Type 'destroy' to confirm: ");
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if input.trim() != "destroy" {
            eprintln!("{}", formatter.warning("Destruction cancelled."));
            return Ok(true);
        }
    }

    let report = workspace.engine().destroy().await?;
    Ok(print_report(formatter, "destroy", &report))
}

/// State management commands.
async fn cmd_state(config_path: Option<&Path>, command: StateCommands, formatter: &OutputFormatter) -> Result<bool> {
    let (_, config_file) = load_manifest(config_path)?;
    let store = LocalStateStore::beside(&config_file);

    match command {
        StateCommands::Show => {
            let lock = store.get_lock_info().await?;
            match store.load().await? {
                Some(state) => println!("{}", formatter.format_state(&state, lock.as_ref())),
                None => eprintln!("{}", formatter.warning("No state found.")),
            }
        }
        StateCommands::Unlock { lock_id, force } => {
            if force {
                match store.force_unlock().await? {
                    Some(lock) => eprintln!(
                        "{}",
                        formatter.success(&format!("Removed lock held by {}.", lock.holder))
                    ),
                    None => eprintln!("{}", formatter.warning("State is not locked.")),
                }
            } else if let Some(id) = lock_id {
                store.release_lock(&id).await?;
                if store.get_lock_info().await?.is_some_and(|l| l.lock_id != id) {
                    eprintln!("{}", formatter.warning("Lock is held under a different ID, left in place."));
                    return Ok(false);
                }
                eprintln!("{}", formatter.success("State unlocked."));
            } else {
                eprintln!("{}", formatter.error("Please provide --lock-id or use --force"));
                return Ok(false);
            }
        }
    }

    Ok(true)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Manifest, handlers, API context and state store of one invocation.
struct Workspace {
    manifest: Manifest,
    registry: Registry,
    ctx: ProviderContext,
    store: LocalStateStore,
}

impl Workspace {
    /// Loads and validates the manifest and builds the API context.
    fn load(config_path: Option<&Path>) -> Result<Self> {
        let (manifest, config_file) = load_manifest(config_path)?;
        let registry = Registry::builtin();

        let result = ConfigValidator::new(&registry).validate(&manifest)?;
        for warning in &result.warnings {
            tracing::warn!("{warning}");
        }

        let ctx = ProviderContext::new(&manifest.provider)?;
        let store = LocalStateStore::beside(&config_file);

        Ok(Self {
            manifest,
            registry,
            ctx,
            store,
        })
    }

    fn engine(&self) -> Engine<'_, LocalStateStore> {
        Engine::new(&self.manifest, &self.registry, &self.ctx, &self.store)
    }
}

/// Resolves the manifest path and loads it with environment overrides.
fn load_manifest(config_path: Option<&Path>) -> Result<(Manifest, PathBuf)> {
    let config_file = config_path.map_or_else(|| find_config_file("."), |path| Ok(path.to_path_buf()))?;
    debug!("Loading manifest from: {}", config_file.display());

    let base = config_file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let manifest = ConfigParser::new().with_base_path(base).load_with_env(&config_file)?;

    Ok((manifest, config_file))
}

/// Prints a run report and returns whether it succeeded.
fn print_report(formatter: &OutputFormatter, verb: &str, report: &RunReport) -> bool {
    println!("{}", formatter.format_report(verb, report));
    report.success()
}
