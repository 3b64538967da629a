//! Router configuration: structs, parsing, and validation.
//!
//! - `common`: shared helpers and `ConfigError`
//! - `firewall`: firewall rule text and chain building
//! - `routing`: route rule text and route table building

mod common;
mod firewall;
mod routing;

pub use common::{ConfigError, parse_cidr, warn_if_world_readable};
pub use firewall::{FirewallRuleSpec, parse_firewall_rule};
pub use routing::{RouteRuleSpec, parse_gateway, parse_route_rule};

use std::net::SocketAddrV4;
use std::path::Path;

use domain::common::entity::Direction;
use domain::firewall::engine::FirewallEngine;
use domain::routing::engine::RouteEngine;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FORWARD_BIND, MAX_RULES_PER_CHAIN};
use common::check_limit;

// ── Top-level config ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent: AgentInfo,

    #[serde(default)]
    pub tuntap: TuntapConfig,
}

impl AgentConfig {
    /// Load config from a YAML file.
    ///
    /// Runs before logging exists, so the permission check is left to the
    /// caller (`warn_if_world_readable`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config after deserialization.
    ///
    /// Every rule line is parsed here so that a bad rule aborts startup
    /// before any packet is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.forward_bind()?;

        check_limit(
            "tuntap.firewall_in",
            self.tuntap.firewall_in.len(),
            MAX_RULES_PER_CHAIN,
        )?;
        check_limit(
            "tuntap.firewall_out",
            self.tuntap.firewall_out.len(),
            MAX_RULES_PER_CHAIN,
        )?;
        check_limit("tuntap.routes", self.tuntap.routes.len(), MAX_RULES_PER_CHAIN)?;

        for (idx, line) in self.tuntap.firewall_in.iter().enumerate() {
            parse_firewall_rule(line).map_err(|e| e.at(format!("tuntap.firewall_in[{idx}]")))?;
        }
        for (idx, line) in self.tuntap.firewall_out.iter().enumerate() {
            parse_firewall_rule(line)
                .map_err(|e| e.at(format!("tuntap.firewall_out[{idx}]")))?;
        }
        for (idx, line) in self.tuntap.routes.iter().enumerate() {
            parse_route_rule(line).map_err(|e| e.at(format!("tuntap.routes[{idx}]")))?;
        }
        Ok(())
    }

    /// Build both firewall chains, preserving configured order.
    pub fn firewall_engine(&self) -> Result<FirewallEngine, ConfigError> {
        let mut engine = FirewallEngine::new();
        firewall::append_rules(
            &mut engine,
            Direction::Inbound,
            "tuntap.firewall_in",
            &self.tuntap.firewall_in,
        )?;
        firewall::append_rules(
            &mut engine,
            Direction::Outbound,
            "tuntap.firewall_out",
            &self.tuntap.firewall_out,
        )?;
        Ok(engine)
    }

    /// Build the route table, preserving configured order.
    pub fn route_engine(&self) -> Result<RouteEngine, ConfigError> {
        let mut engine = RouteEngine::new();
        routing::append_routes(&mut engine, "tuntap.routes", &self.tuntap.routes)?;
        Ok(engine)
    }

    /// Local address for the gateway forwarding socket.
    pub fn forward_bind(&self) -> Result<SocketAddrV4, ConfigError> {
        self.agent
            .forward_bind
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "agent.forward_bind".to_string(),
                value: self.agent.forward_bind.clone(),
                expected: "<ipv4>:<port>".to_string(),
            })
    }

    pub fn routing_enabled(&self) -> bool {
        !self.tuntap.routes.is_empty()
    }
}

// ── Agent info ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentInfo {
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Local `addr:port` the forwarding socket binds to.
    #[serde(default = "default_forward_bind")]
    pub forward_bind: String,
}

impl Default for AgentInfo {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            forward_bind: default_forward_bind(),
        }
    }
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}
fn default_log_format() -> LogFormat {
    LogFormat::Json
}
fn default_forward_bind() -> String {
    DEFAULT_FORWARD_BIND.to_string()
}

// ── Tuntap rules ───────────────────────────────────────────────────

/// Rule lines in textual form, applied in list order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuntapConfig {
    #[serde(default)]
    pub firewall_in: Vec<String>,

    #[serde(default)]
    pub firewall_out: Vec<String>,

    #[serde(default)]
    pub routes: Vec<String>,
}

// ── Log level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const ALL: [Self; 5] = [
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(ConfigError::InvalidValue {
                field: "agent.log_level".to_string(),
                value: s.to_string(),
                expected: "error|warn|info|debug|trace".to_string(),
            }),
        }
    }
}

// ── Log format ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            _ => Err(ConfigError::InvalidValue {
                field: "agent.log_format".to_string(),
                value: s.to_string(),
                expected: "json|text".to_string(),
            }),
        }
    }
}
