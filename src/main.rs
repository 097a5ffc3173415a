//! veld CLI entrypoint.
//!
//! This is the main entrypoint for the veld command-line tool.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use veld::cli::{Cli, Commands, DeleteCommand, output};
use veld::cluster::{ClusterClient, ClusterManager};
use veld::error::{EngineError, Result, VeldError};
use veld::instance::ClusterInstanceStore;
use veld::resource::load_manifest_file;

/// Main entrypoint.
fn main() -> ExitCode {
    // .env may provide VELD_SERVER/VELD_TOKEN, so load it before clap
    // resolves env fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system. Log lines go to stderr so stdout
/// stays reserved for rendered diff output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the selected command under the overall run deadline.
async fn run(cli: Cli) -> Result<()> {
    let deadline_secs = cli.timeout;
    match tokio::time::timeout(Duration::from_secs(deadline_secs), dispatch(cli)).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::DeadlineExceeded { secs: deadline_secs }.into()),
    }
}

/// Dispatches the selected command.
async fn dispatch(cli: Cli) -> Result<()> {
    let client = create_client(&cli)?;
    let store = ClusterInstanceStore::new(client.clone());
    let manager = ClusterManager::new(client);
    let namespace = cli.namespace.clone();
    let run_timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Delete { name, dry_run, wait } => {
            let cmd = DeleteCommand {
                dry_run,
                wait,
                wait_timeout: run_timeout,
            };
            veld::cli::delete_instance(&manager, &store, &name, &namespace, cmd).await
        }
        Commands::Diff { name, file, details } => {
            cmd_diff(&manager, &store, &name, &namespace, &file, details).await
        }
        Commands::Status { name } => {
            let (instance, presence) =
                veld::cli::instance_presence(&manager, &store, &name, &namespace).await?;
            eprintln!("{}", output::format_status(&instance, &presence));
            Ok(())
        }
    }
}

/// Creates the cluster API client from CLI configuration.
fn create_client(cli: &Cli) -> Result<ClusterClient> {
    let server = cli.server.as_deref().ok_or_else(|| VeldError::MissingConfig {
        name: String::from("server URL (--server or VELD_SERVER)"),
    })?;
    let token = cli.token.as_deref().ok_or_else(|| VeldError::MissingConfig {
        name: String::from("cluster token (--token or VELD_TOKEN)"),
    })?;
    Ok(ClusterClient::new(server, token)?)
}

/// Runs the diff command and prints the rendered report.
async fn cmd_diff(
    manager: &ClusterManager,
    store: &ClusterInstanceStore,
    name: &str,
    namespace: &str,
    file: &Path,
    details: bool,
) -> Result<()> {
    let desired = load_manifest_file(file, namespace)?;

    let mut rendered = Vec::new();
    let report =
        veld::cli::diff_instance(manager, store, name, namespace, &desired, details, &mut rendered)
            .await?;

    if !rendered.is_empty() {
        print!("{}", output::colorize_diff(&String::from_utf8_lossy(&rendered)));
    }
    eprintln!(
        "{}",
        output::format_summary(&report.changes, report.prospective_deletions.len())
    );

    Ok(())
}
