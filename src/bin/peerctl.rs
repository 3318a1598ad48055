//! Peer relation CLI

use clap::{Parser, Subcommand};
use cluster_peers::common::{attribute_text, redact, Config};
use cluster_peers::peers::unit::CLUSTER_PASSWORD;
use cluster_peers::peers::{
    MembershipCoordinator, PeerEndpoint, PeerRuntime, PeerUnit, QuorumEvaluator, RelationMessage,
    UnitId,
};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "peerctl")]
#[command(about = "Inspect peer relation state for cluster bootstrap")]
#[command(version = cluster_peers::BUILD_INFO)]
struct Cli {
    /// Config file
    #[arg(long, global = true, default_value = "peers.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a JSON list of relation messages through the event loop
    Replay {
        /// Scenario file
        #[arg(long)]
        scenario: PathBuf,

        /// Endpoint name (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Address published to peers (overrides config)
        #[arg(long)]
        ingress_address: Option<IpAddr>,
    },
    /// Report available/clustered for a JSON map of unit -> attributes
    Evaluate {
        /// Snapshot file
        #[arg(long)]
        units: PathBuf,

        /// Minimum cluster size (overrides config)
        #[arg(long)]
        min_size: Option<usize>,
    },
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config from file, then override with CLI arguments
    let mut config = Config::load_from(&cli.config, cluster_peers::common::config::ENV_PREFIX)?;
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Replay {
            scenario,
            endpoint,
            ingress_address,
        } => {
            if let Some(name) = endpoint {
                config.endpoint_name = name;
            }
            if ingress_address.is_some() {
                config.ingress_address = ingress_address;
            }
            replay(&config, &scenario).await?;
        }
        Commands::Evaluate { units, min_size } => {
            if let Some(size) = min_size {
                config.minimum_cluster_size = size;
            }
            config.validate()?;
            evaluate(&config, &units).await?;
        }
    }

    Ok(())
}

async fn replay(config: &Config, scenario: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(scenario).await?;
    let messages: Vec<RelationMessage> = serde_json::from_str(&raw)?;
    tracing::info!("Replaying {} messages from {}", messages.len(), scenario.display());

    let endpoint = PeerEndpoint::from_config(config)?;
    let runtime = PeerRuntime::new(MembershipCoordinator::new(endpoint));

    let (tx, rx) = tokio::sync::mpsc::channel(messages.len().max(1));
    for message in messages {
        tx.send(message).await?;
    }
    drop(tx);

    let mut step = 0;
    let runtime = runtime
        .run_with(rx, |message, flags| {
            step += 1;
            println!(
                "{:>3} {:<60} {}",
                step,
                serde_json::to_string(message).unwrap_or_default(),
                serde_json::to_string(&flags).unwrap_or_default()
            );
        })
        .await?;

    let coordinator = runtime.into_coordinator();
    println!("relation ids: {:?}", coordinator.relation_ids());
    if let Some(relation) = coordinator.endpoint().peer_relation() {
        for (key, value) in relation.to_publish() {
            let shown = if key == CLUSTER_PASSWORD {
                redact(value)
            } else {
                value.clone()
            };
            println!("published {} = {}", key, shown);
        }
    }
    println!("{}", serde_json::to_string_pretty(&coordinator.snapshot())?);
    Ok(())
}

async fn evaluate(config: &Config, path: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path).await?;
    let snapshot: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
        serde_json::from_str(&raw)?;

    let units: Vec<PeerUnit> = snapshot
        .into_iter()
        .map(|(name, data)| {
            let attributes = data
                .into_iter()
                .map(|(k, v)| (k, attribute_text(v)))
                .collect();
            PeerUnit::with_attributes(UnitId::new(name), attributes)
        })
        .collect();
    let refs: Vec<&PeerUnit> = units.iter().collect();

    let evaluator = QuorumEvaluator::new(config.minimum_cluster_size);
    let report = serde_json::json!({
        "peers": refs.len(),
        "required_peers": evaluator.required_peers(),
        "available": evaluator.is_available(&refs),
        "clustered": evaluator.is_clustered(&refs),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
