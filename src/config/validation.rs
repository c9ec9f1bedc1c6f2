//! Configuration validation

use super::Config;
use crate::dataplane::{AttachmentPoint, NodeId};
use crate::protocol::MacAddr;
use crate::telemetry::{LOG_FORMATS, LOG_LEVELS};
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        for error in &self.errors {
            println!("[ERROR] {}", error);
        }
    }
}

/// Parse a "node/port" attachment point
pub fn parse_attachment(s: &str) -> Option<AttachmentPoint> {
    let (node, port) = s.split_once('/')?;
    Some(AttachmentPoint::new(
        NodeId(node.trim().parse().ok()?),
        port.trim().parse().ok()?,
    ))
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_logging(config, &mut result);
    validate_flow(config, &mut result);
    let ports = validate_fabric(config, &mut result);
    validate_traffic(config, &ports, &mut result);

    result
}

fn validate_logging(config: &Config, result: &mut ValidationResult) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        result.warn(format!(
            "logging.level: unknown level '{}', using info",
            config.logging.level
        ));
    }

    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        result.error(format!(
            "logging.format: '{}' is not one of {:?}",
            config.logging.format, LOG_FORMATS
        ));
    }
}

fn validate_flow(config: &Config, result: &mut ValidationResult) {
    let flow = &config.flow;

    if flow.idle_timeout == 0 && flow.hard_timeout == 0 {
        result.warn("flow: idle_timeout and hard_timeout are both 0, rules never expire");
    } else if flow.hard_timeout != 0 && flow.idle_timeout > flow.hard_timeout {
        result.warn(format!(
            "flow: idle_timeout {} exceeds hard_timeout {}, idle expiry never triggers",
            flow.idle_timeout, flow.hard_timeout
        ));
    }
}

/// Returns every configured port by node
fn validate_fabric(config: &Config, result: &mut ValidationResult) -> HashMap<u64, HashSet<u32>> {
    let mut ports: HashMap<u64, HashSet<u32>> = HashMap::new();

    for switch in &config.fabric.switches {
        if ports.contains_key(&switch.node) {
            result.error(format!("fabric.switches: node {} defined twice", switch.node));
            continue;
        }
        if switch.ports.is_empty() {
            result.warn(format!("fabric.switches: node {} has no ports", switch.node));
        }

        let switch_ports: HashSet<u32> = switch.ports.iter().copied().collect();
        for down in &switch.down_ports {
            if !switch_ports.contains(down) {
                result.error(format!(
                    "fabric.switches: node {} down port {} is not in ports",
                    switch.node, down
                ));
            }
        }
        ports.insert(switch.node, switch_ports);
    }

    for link in &config.fabric.links {
        for end in [&link.a, &link.b] {
            check_attachment("fabric.links", end, &ports, result);
        }
    }

    ports
}

fn validate_traffic(
    config: &Config,
    ports: &HashMap<u64, HashSet<u32>>,
    result: &mut ValidationResult,
) {
    for (i, frame) in config.traffic.iter().enumerate() {
        let section = format!("traffic[{}]", i);

        check_attachment(&section, &frame.ingress, ports, result);

        for ip in [&frame.src_ip, &frame.dst_ip] {
            if ip.parse::<Ipv4Addr>().is_err() {
                result.error(format!("{}: invalid IPv4 address '{}'", section, ip));
            }
        }
        for mac in [&frame.src_mac, &frame.dst_mac] {
            if let Err(e) = mac.parse::<MacAddr>() {
                result.error(format!("{}: '{}': {}", section, mac, e));
            }
        }
    }
}

fn check_attachment(
    section: &str,
    value: &str,
    ports: &HashMap<u64, HashSet<u32>>,
    result: &mut ValidationResult,
) {
    match parse_attachment(value) {
        None => result.error(format!(
            "{}: '{}' is not a node/port attachment point",
            section, value
        )),
        Some(point) => {
            let known = ports
                .get(&point.node.0)
                .is_some_and(|p| p.contains(&point.port));
            if !known {
                result.error(format!("{}: {} is not a configured port", section, value));
            }
        }
    }
}
