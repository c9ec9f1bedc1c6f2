use clap::{Parser, Subcommand};
use learnflow::config::{self, parse_attachment, Config};
use learnflow::dataplane::{
    AttachmentPoint, Disposition, Edge, EdgeProperty, NodeId, Pipeline, Services,
    TopoEdgeUpdate, TopologyListener, TopologyMonitor, UpdateType,
};
use learnflow::platform::InMemoryFabric;
use learnflow::protocol::icmp::{echo_request_frame, EchoEndpoints};
use learnflow::telemetry::{init_logging, MetricsRegistry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "learnflow")]
#[command(about = "Host-learning flow controller for software-defined switches")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Replay configured traffic through an in-memory fabric
    Simulate {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate config.toml
    Validate {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

/// One frame injected into the fabric
struct Injection {
    ingress: AttachmentPoint,
    frame: Vec<u8>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Config {
            action: ConfigAction::Validate { config },
        }) => cmd_config_validate(&config),
        Some(Commands::Simulate { config }) => cmd_simulate(&config),
        None => cmd_simulate(Path::new("config.toml")),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

fn cmd_config_validate(config_path: &Path) -> Result<(), String> {
    println!("Validating {}...", config_path.display());

    let cfg = config::load(config_path).map_err(|e| format!("Failed to load config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();

    if validation.has_errors() {
        return Err(format!(
            "Validation failed with {} error(s)",
            validation.errors.len()
        ));
    }

    println!("Configuration is valid.");
    Ok(())
}

fn cmd_simulate(config_path: &Path) -> Result<(), String> {
    use tokio::runtime::Runtime;

    let cfg = config::load(config_path).map_err(|e| format!("Failed to load config: {}", e))?;

    // RUST_LOG takes priority over [logging]
    init_logging(Some(&cfg.logging));

    let validation = config::validate(&cfg);
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if validation.has_errors() {
        validation.print_diagnostics();
        return Err(format!(
            "Validation failed with {} error(s)",
            validation.errors.len()
        ));
    }

    let metrics = Arc::new(MetricsRegistry::new());
    let fabric = build_fabric(&cfg).map_err(|e| format!("Failed to build fabric: {}", e))?;

    let monitor = TopologyMonitor::new(metrics.clone());
    announce_links(&cfg, &monitor);

    let pipeline = Arc::new(Pipeline::new(
        Services::from_backend(fabric.clone()),
        cfg.pipeline(),
        metrics.clone(),
    ));

    let rounds = build_traffic(&cfg)?;
    info!(
        "Simulating {} frame(s) in {} round(s) across {} switch(es)",
        cfg.traffic.len(),
        rounds.len(),
        cfg.fabric.switches.len()
    );

    let rt = Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))?;

    rt.block_on(async {
        for (round, injections) in rounds {
            debug!("Round {}: {} frame(s)", round, injections.len());

            // Frames of one round race each other through the pipeline
            let mut tasks = Vec::with_capacity(injections.len());
            for injection in injections {
                let pipeline = pipeline.clone();
                tasks.push(tokio::spawn(async move {
                    let disposition = pipeline.process(&injection.frame, injection.ingress);
                    (injection.ingress, disposition)
                }));
            }

            for task in tasks {
                let (ingress, disposition) = task
                    .await
                    .map_err(|e| format!("Frame task failed: {}", e))?;
                report(round, ingress, &disposition);
            }
        }
        Ok::<(), String>(())
    })?;

    info!(
        "Simulation finished: {} host(s) learned, {} frame(s) transmitted, {} rule(s) programmed",
        pipeline.hosts().len(),
        fabric.transmitted().len(),
        fabric.programmed().len()
    );
    info!("  {} over-utilized edge(s)", monitor.over_utilized_count());
    for (key, host) in pipeline.hosts().hosts() {
        info!("  {} at {}", key, host);
    }
    for (name, value) in metrics.export() {
        info!("  {} = {}", name, value);
    }

    Ok(())
}

fn build_fabric(cfg: &Config) -> learnflow::Result<Arc<InMemoryFabric>> {
    let fabric = Arc::new(InMemoryFabric::new());

    for switch in &cfg.fabric.switches {
        let node = NodeId(switch.node);
        fabric.add_switch(node, switch.ports.iter().copied());
        for &port in &switch.down_ports {
            fabric.set_port_up(AttachmentPoint::new(node, port), false)?;
        }
        if switch.reject_rules {
            fabric.reject_rules(node);
        }
        debug!(
            "Switch {}: ports {:?}, down {:?}",
            node, switch.ports, switch.down_ports
        );
    }

    for link in &cfg.fabric.links {
        // Endpoints were checked by validation
        if let (Some(a), Some(b)) = (parse_attachment(&link.a), parse_attachment(&link.b)) {
            fabric.add_link(a, b, link_properties(link.bandwidth));
        }
    }

    Ok(fabric)
}

fn link_properties(bandwidth: Option<u64>) -> Vec<EdgeProperty> {
    let mut properties = vec![EdgeProperty::Up(true)];
    if let Some(bps) = bandwidth {
        properties.push(EdgeProperty::Bandwidth(bps));
    }
    properties
}

fn announce_links(cfg: &Config, monitor: &TopologyMonitor) {
    let updates: Vec<TopoEdgeUpdate> = cfg
        .fabric
        .links
        .iter()
        .filter_map(|link| Some((parse_attachment(&link.a)?, parse_attachment(&link.b)?, link)))
        .flat_map(|(a, b, link)| {
            [Edge::new(a, b), Edge::new(b, a)].map(|edge| TopoEdgeUpdate {
                edge,
                properties: link_properties(link.bandwidth),
                update_type: UpdateType::Added,
            })
        })
        .collect();

    if !updates.is_empty() {
        monitor.edge_update(&updates);
    }
}

fn build_traffic(cfg: &Config) -> Result<BTreeMap<u32, Vec<Injection>>, String> {
    let mut rounds: BTreeMap<u32, Vec<Injection>> = BTreeMap::new();

    for (i, traffic) in cfg.traffic.iter().enumerate() {
        let ingress = parse_attachment(&traffic.ingress)
            .ok_or_else(|| format!("traffic[{}]: invalid ingress '{}'", i, traffic.ingress))?;
        let endpoints = EchoEndpoints {
            src_mac: parse_field(i, &traffic.src_mac)?,
            src_ip: parse_field(i, &traffic.src_ip)?,
            dst_mac: parse_field(i, &traffic.dst_mac)?,
            dst_ip: parse_field(i, &traffic.dst_ip)?,
        };

        let sequence = u16::try_from(i).unwrap_or(u16::MAX);
        rounds.entry(traffic.round).or_default().push(Injection {
            ingress,
            frame: echo_request_frame(&endpoints, 1, sequence),
        });
    }

    Ok(rounds)
}

fn parse_field<T>(index: usize, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| format!("traffic[{}]: '{}': {}", index, value, e))
}

fn report(round: u32, ingress: AttachmentPoint, disposition: &Disposition) {
    match disposition {
        Disposition::NotApplicable(reason) => {
            info!("[{}] {}: ignored ({})", round, ingress, reason)
        }
        Disposition::Flooded(flood) => info!(
            "[{}] {}: flooded on {} ports {:?} (skipped {:?})",
            round, ingress, flood.node, flood.sent, flood.skipped
        ),
        Disposition::Forwarded { rule, egress } => {
            info!("[{}] {}: forwarded to {} via {}", round, ingress, egress, rule)
        }
        Disposition::InstallFailed { node, rule } => {
            warn!("[{}] {}: {} refused {}, dropped", round, ingress, node, rule)
        }
        Disposition::ForwardFailed { egress } => {
            warn!("[{}] {}: rule installed but send to {} failed", round, ingress, egress)
        }
    }
}
