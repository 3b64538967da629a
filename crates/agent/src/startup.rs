use std::path::Path;
use std::sync::Arc;

use adapters::net::udp_sender::UdpGatewaySender;
use anyhow::Context;
use application::firewall_service_impl::FirewallAppService;
use application::packet_pipeline::PacketFilter;
use application::routing_service_impl::RoutingAppService;
use domain::common::entity::Direction;
use infrastructure::config::{AgentConfig, warn_if_world_readable};
use infrastructure::logging::init_logging;
use infrastructure::metrics::AgentMetrics;
use ports::secondary::datagram_sender::DatagramSender;
use ports::secondary::metrics_port::{ConfigMetrics, MetricsPort};
use tracing::info;

use crate::cli::Cli;

/// Everything a command needs once startup has finished.
pub struct Runtime {
    pub config: AgentConfig,
    pub metrics: Arc<AgentMetrics>,
    pub filter: PacketFilter,
    /// Route table service, present even when the table is empty.
    pub routing: Arc<RoutingAppService>,
}

/// Load config, initialize logging and build the firewall and route services.
pub fn bootstrap(cli: &Cli) -> anyhow::Result<Runtime> {
    let metrics = Arc::new(AgentMetrics::new());

    // ── 1. Load config ──────────────────────────────────────────────
    let config = match AgentConfig::load(Path::new(&cli.config)) {
        Ok(config) => {
            metrics.record_config_load("success");
            config
        }
        Err(e) => {
            metrics.record_config_load("failure");
            return Err(e).with_context(|| format!("loading config {}", cli.config));
        }
    };

    // ── 2. Initialize logging ───────────────────────────────────────
    // CLI flags take precedence over config file
    let log_level = cli.log_level.unwrap_or(config.agent.log_level);
    let log_format = cli.log_format.unwrap_or(config.agent.log_format);
    init_logging(log_level, log_format)?;
    warn_if_world_readable(Path::new(&cli.config), "config file");

    info!(
        config_path = %cli.config,
        log_level = log_level.as_str(),
        log_format = log_format.as_str(),
        "tuntap-router starting"
    );

    // ── 3. Build services ───────────────────────────────────────────
    let bind = config.forward_bind()?;
    let sender = UdpGatewaySender::bind(bind)
        .with_context(|| format!("binding forwarding socket on {bind}"))?;
    let (filter, routing) = build_services(
        &config,
        Arc::new(sender),
        Arc::clone(&metrics) as Arc<dyn MetricsPort>,
    )?;

    info!(
        inbound_rules = filter.firewall().engine().chain(Direction::Inbound).len(),
        outbound_rules = filter.firewall().engine().chain(Direction::Outbound).len(),
        routes = routing.route_count(),
        "tuntap-router ready"
    );

    Ok(Runtime {
        config,
        metrics,
        filter,
        routing,
    })
}

/// Build the per-packet filter and the route service from a validated config.
///
/// The route service always exists so a lookup against an empty table
/// reports "no route". The filter only consults it when routes are configured.
pub fn build_services(
    config: &AgentConfig,
    sender: Arc<dyn DatagramSender>,
    metrics: Arc<dyn MetricsPort>,
) -> anyhow::Result<(PacketFilter, Arc<RoutingAppService>)> {
    let firewall = Arc::new(FirewallAppService::new(
        config.firewall_engine()?,
        Arc::clone(&metrics),
    ));
    let routing = Arc::new(RoutingAppService::new(
        config.route_engine()?,
        sender,
        metrics,
    ));
    let filter = PacketFilter::new(
        firewall,
        config.routing_enabled().then(|| Arc::clone(&routing)),
    );
    Ok((filter, routing))
}
