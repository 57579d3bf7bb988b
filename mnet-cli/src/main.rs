//! Command-line tool for declaring and submitting workspace managed-network
//! configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mnet_client::{WorkspaceClient, WorkspaceResource};
use mnet_core::{
    Config, ConfigLoader, ConfigValidator, DestinationMatcher, IsolationMode, SweepJob,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mnet")]
#[command(about = "Declare, validate and submit managed-network configuration for ML workspaces")]
struct Args {
    /// Config file path (defaults to the user config location)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the desired-state document without contacting the API
    Validate,
    /// Create the workspace with its managed-network desired state
    Create,
    /// Show the workspace as the management API sees it
    Show,
    /// Update the workspace isolation mode
    SetIsolation {
        /// Target mode: disabled | allow_internet_outbound | allow_only_approved_outbound
        mode: String,
    },
    /// Add a single outbound rule declared in the config file
    AddRule {
        /// Rule name as declared under [[network.outbound_rules]]
        name: String,
    },
    /// List outbound rules materialized by the control plane
    Rules,
    /// Ask the control plane to provision the managed network
    Provision {
        /// Also provision Spark-capable endpoints
        #[arg(long)]
        include_spark: bool,
    },
    /// Preview whether a destination FQDN is covered by the declared rules
    Check {
        /// Destination FQDN, e.g. files.pypi.org
        destination: String,
    },
    /// Delete the workspace
    Delete {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Submit a sweep-job document verbatim to the job scheduler
    SubmitSweep {
        /// Path to the sweep-job document
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = if args.verbose {
        EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::DEBUG.into())
    } else {
        EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigLoader::load_or_default(args.config).context("Failed to load config")?;

    match args.command {
        Command::Validate => validate(&config),
        Command::Check { destination } => check(&config, &destination),
        Command::Create => create(&config).await,
        Command::Show => show(&config).await,
        Command::SetIsolation { mode } => set_isolation(&config, &mode).await,
        Command::AddRule { name } => add_rule(&config, &name).await,
        Command::Rules => rules(&config).await,
        Command::Provision { include_spark } => provision(&config, include_spark).await,
        Command::Delete { yes } => delete(&config, yes).await,
        Command::SubmitSweep { file } => submit_sweep(&config, &file).await,
    }
}

fn client(config: &Config) -> Result<WorkspaceClient<mnet_client::HttpTransport>> {
    WorkspaceClient::from_config(&config.client).context("Failed to create management API client")
}

fn validate(config: &Config) -> Result<()> {
    ConfigValidator::validate(&config.network)?;
    println!(
        "ok: {} with {} outbound rule(s)",
        config.network.isolation_mode,
        config.network.outbound_rules.len()
    );
    Ok(())
}

fn check(config: &Config, destination: &str) -> Result<()> {
    let matcher = DestinationMatcher::from_config(&config.network);
    println!("{}: {}", destination, matcher.coverage(destination));
    Ok(())
}

async fn create(config: &Config) -> Result<()> {
    let workspace = client(config)?
        .create_workspace(&config.workspace, &config.network)
        .await?;
    print_workspace(&workspace);
    Ok(())
}

async fn show(config: &Config) -> Result<()> {
    let workspace = client(config)?.get_workspace(&config.workspace.name).await?;
    print_workspace(&workspace);
    Ok(())
}

async fn set_isolation(config: &Config, mode: &str) -> Result<()> {
    let target = IsolationMode::parse(mode)?;
    let client = client(config)?;

    let current = client.get_workspace(&config.workspace.name).await?;
    let updated = client.update_isolation_mode(&current, target).await?;
    println!(
        "isolation mode: {} -> {}",
        current.isolation_mode(),
        updated.isolation_mode()
    );
    Ok(())
}

async fn add_rule(config: &Config, name: &str) -> Result<()> {
    let rule = config
        .network
        .rule(name)
        .with_context(|| format!("Rule {name} is not declared in the config file"))?;
    let client = client(config)?;

    let workspace = client.get_workspace(&config.workspace.name).await?;
    let created = client.add_outbound_rule(&workspace, rule).await?;
    println!(
        "rule {} ({}) created: status {}, category {}",
        created.name,
        created.kind.kind_name(),
        created.status,
        created.category
    );
    Ok(())
}

async fn rules(config: &Config) -> Result<()> {
    let rules = client(config)?
        .list_outbound_rules(&config.workspace.name)
        .await?;
    if rules.is_empty() {
        println!("no outbound rules");
        return Ok(());
    }
    for rule in rules {
        println!(
            "{:<24} {:<16} status {:<8} category {}",
            rule.name,
            rule.kind.kind_name(),
            rule.status,
            rule.category
        );
    }
    Ok(())
}

async fn provision(config: &Config, include_spark: bool) -> Result<()> {
    let network = client(config)?
        .provision_network(&config.workspace.name, include_spark)
        .await?;
    println!(
        "provisioning requested: isolation mode {}, status {}",
        network.isolation_mode,
        network.status.as_deref().unwrap_or("unknown")
    );
    Ok(())
}

async fn delete(config: &Config, yes: bool) -> Result<()> {
    let name = &config.workspace.name;
    if !yes {
        print!("Delete workspace {}? [y/N] ", name);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        if !matches!(line.trim(), "y" | "Y" | "yes") {
            println!("aborted");
            return Ok(());
        }
    }

    client(config)?.delete_workspace(name).await?;
    println!("workspace {} deleted", name);
    Ok(())
}

async fn submit_sweep(config: &Config, file: &PathBuf) -> Result<()> {
    let job = SweepJob::load_from_file(file)
        .with_context(|| format!("Failed to load sweep job from {}", file.display()))?;
    let submitted = client(config)?
        .submit_sweep_job(&config.workspace.name, &job)
        .await?;
    println!("job {} submitted: {}", submitted.name, submitted.status);
    Ok(())
}

fn print_workspace(workspace: &WorkspaceResource) {
    println!("workspace:    {}", workspace.name);
    println!("id:           {}", workspace.id);
    println!("location:     {}", workspace.location);
    println!("provisioning: {}", workspace.provisioning_state);
    if let Some(created) = workspace.created_at {
        println!("created:      {}", created.to_rfc3339());
    }
    match &workspace.managed_network {
        Some(network) => {
            println!(
                "network:      {} ({})",
                network.isolation_mode,
                network.status.as_deref().unwrap_or("unknown")
            );
            for rule in &network.outbound_rules {
                println!(
                    "  rule {:<24} {:<16} status {:<8} category {}",
                    rule.name,
                    rule.kind.kind_name(),
                    rule.status,
                    rule.category
                );
            }
        }
        None => println!("network:      not managed"),
    }
}
