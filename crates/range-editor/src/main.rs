use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use range_sync::{ClientConfig, EditorController, HttpRangeBackend, RestoreOutcome, SyncError};
use range_topology::{NodeId, Role};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("range-editor")
        .version(range_sync::VERSION)
        .about("Inspect, deploy and delete the cyber-range topology")
        .subcommand_required(true)
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .default_value(range_sync::DEFAULT_BASE_URL)
                .help("Backend address"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .default_value("30")
                .value_parser(value_parser!(u64))
                .help("Request timeout in seconds"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log graph edits and requests"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the persisted topology and its preflight issues")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the deployment request instead"),
                ),
        )
        .subcommand(
            Command::new("deploy")
                .about("Redeploy the persisted topology, optionally adding nodes")
                .arg(
                    Arg::new("add-service")
                        .long("add-service")
                        .default_value("0")
                        .value_parser(value_parser!(usize))
                        .help("Service VMs to add, each linked to the main jumpbox"),
                )
                .arg(
                    Arg::new("add-jumpbox")
                        .long("add-jumpbox")
                        .default_value("0")
                        .value_parser(value_parser!(usize))
                        .help("Local jumpboxes to add, each linked to the main jumpbox"),
                ),
        )
        .subcommand(Command::new("delete").about("Delete the persisted range"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_from(matches: &ArgMatches) -> ClientConfig {
    let mut config = ClientConfig::new();
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config = config.with_timeout_secs(*timeout);
    }
    config
}

/// Attach the user-facing notice to a sync failure
fn noticed(err: SyncError) -> anyhow::Error {
    let notice = err.user_notice();
    anyhow::Error::new(err).context(notice)
}

async fn inspect(editor: &EditorController, json: bool) -> Result<()> {
    let outcome = editor.restore().await;

    if json {
        let request = editor.deployment_request();
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    println!("Restore: {outcome:?}");
    let snapshot = editor.snapshot();
    if snapshot.phase().is_pristine() {
        println!("(default graph)");
    }
    println!("Nodes ({}):", snapshot.nodes().len());
    for node in snapshot.nodes() {
        println!(
            "  {:<38} {:<14} {:<20} ({:.0}, {:.0})",
            node.id.as_str(),
            node.resolved_role().as_str(),
            node.label,
            node.position.x,
            node.position.y
        );
    }
    println!("Links ({}):", snapshot.edges().len());
    for edge in snapshot.edges() {
        println!("  {} -> {}", edge.source, edge.target);
    }

    let report = editor.preflight();
    if report.is_clean() {
        println!("Preflight: clean");
    } else {
        println!("Preflight:");
        for issue in &report.issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}

async fn deploy(editor: &EditorController, services: usize, jumpboxes: usize) -> Result<()> {
    let outcome = editor.restore().await;
    if outcome == RestoreOutcome::Failed {
        bail!("could not load the persisted range; refusing to overwrite it");
    }

    let master = NodeId::master();
    let additions = std::iter::repeat(Role::Service)
        .take(services)
        .chain(std::iter::repeat(Role::JumpboxLocal).take(jumpboxes));
    for role in additions {
        let id = editor.add_node(role);
        editor
            .connect(&master, &id)
            .with_context(|| format!("linking {id} to the main jumpbox"))?;
    }

    let response = editor.deploy().await.map_err(noticed)?;
    println!("{}: {} ({})", response.range_id, response.status, response.message);
    Ok(())
}

async fn delete(editor: &EditorController) -> Result<()> {
    match editor.delete_range().await {
        Ok(response) => println!("{}: {}", response.range_id, response.status),
        Err(SyncError::Backend(e)) if e.is_not_found() => {
            println!("{}: not found, nothing to delete", range_topology::MASTER_ID);
        }
        Err(e) => return Err(noticed(e)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let config = config_from(&matches);
    let backend = HttpRangeBackend::new(config.clone()).context("building HTTP client")?;
    let editor = EditorController::with_config(&config, Arc::new(backend));

    let result = match matches.subcommand() {
        Some(("inspect", args)) => inspect(&editor, args.get_flag("json")).await,
        Some(("deploy", args)) => {
            let services = args.get_one::<usize>("add-service").copied().unwrap_or(0);
            let jumpboxes = args.get_one::<usize>("add-jumpbox").copied().unwrap_or(0);
            deploy(&editor, services, jumpboxes).await
        }
        Some(("delete", _)) => delete(&editor).await,
        _ => Ok(()),
    };

    editor.shutdown();
    result
}
