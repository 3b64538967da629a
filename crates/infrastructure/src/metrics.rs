use ports::secondary::metrics_port::{ConfigMetrics, PacketMetrics, RouteMetrics, RuleMetrics};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

use crate::constants::METRICS_PREFIX;

// ── Label types ─────────────────────────────────────────────────────

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PacketLabels {
    pub direction: String,
    pub action: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PathLabels {
    pub path: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ResultLabels {
    pub result: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ChainLabels {
    pub chain: String,
}

// ── Agent metrics registry ──────────────────────────────────────────

/// Prometheus registry for the router.
///
/// Every family is atomic inside, so recording needs only `&self`. Share
/// through `Arc<AgentMetrics>`.
pub struct AgentMetrics {
    registry: Registry,
    pub packets_total: Family<PacketLabels, Counter>,
    pub malformed_total: Family<PathLabels, Counter>,
    pub routes_total: Family<ResultLabels, Counter>,
    pub route_send_errors_total: Counter,
    pub rules_loaded: Family<ChainLabels, Gauge>,
    pub config_loads_total: Family<ResultLabels, Counter>,
}

impl AgentMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix(METRICS_PREFIX);

        let packets_total = Family::<PacketLabels, Counter>::default();
        registry.register(
            "packets",
            "Firewall verdicts by direction and action",
            packets_total.clone(),
        );

        let malformed_total = Family::<PathLabels, Counter>::default();
        registry.register(
            "malformed_packets",
            "Packets too short to carry an IPv4 header",
            malformed_total.clone(),
        );

        let routes_total = Family::<ResultLabels, Counter>::default();
        registry.register(
            "routes",
            "Route lookups by result",
            routes_total.clone(),
        );

        let route_send_errors_total = Counter::default();
        registry.register(
            "route_send_errors",
            "Datagrams that could not be sent to their gateway",
            route_send_errors_total.clone(),
        );

        let rules_loaded = Family::<ChainLabels, Gauge>::default();
        registry.register(
            "rules_loaded",
            "Number of rules per chain",
            rules_loaded.clone(),
        );

        let config_loads_total = Family::<ResultLabels, Counter>::default();
        registry.register(
            "config_loads",
            "Configuration load attempts by result",
            config_loads_total.clone(),
        );

        Self {
            registry,
            packets_total,
            malformed_total,
            routes_total,
            route_send_errors_total,
            rules_loaded,
            config_loads_total,
        }
    }

    /// Encode all metrics in the OpenMetrics text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for AgentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ── Sub-trait implementations ──────────────────────────────────────

impl PacketMetrics for AgentMetrics {
    fn record_verdict(&self, direction: &str, action: &str) {
        self.packets_total
            .get_or_create(&PacketLabels {
                direction: direction.to_string(),
                action: action.to_string(),
            })
            .inc();
    }

    fn record_malformed(&self, path: &str) {
        self.malformed_total
            .get_or_create(&PathLabels {
                path: path.to_string(),
            })
            .inc();
    }
}

impl RouteMetrics for AgentMetrics {
    fn record_route(&self, result: &str) {
        self.routes_total
            .get_or_create(&ResultLabels {
                result: result.to_string(),
            })
            .inc();
    }

    fn record_route_send_error(&self) {
        self.route_send_errors_total.inc();
    }
}

impl RuleMetrics for AgentMetrics {
    fn set_rules_loaded(&self, chain: &str, count: u64) {
        self.rules_loaded
            .get_or_create(&ChainLabels {
                chain: chain.to_string(),
            })
            .set(count.try_into().unwrap_or(i64::MAX));
    }
}

impl ConfigMetrics for AgentMetrics {
    fn record_config_load(&self, result: &str) {
        self.config_loads_total
            .get_or_create(&ResultLabels {
                result: result.to_string(),
            })
            .inc();
    }
}
