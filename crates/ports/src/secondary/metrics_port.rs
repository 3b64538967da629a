// Focused sub-traits for recording Prometheus metrics, grouped by concern.
//
// All methods take `&self` because the underlying implementation uses
// atomic operations (interior mutability via `prometheus-client`).
//
// Default implementations are no-ops, allowing test mocks to implement
// only the sub-traits relevant to the service under test.

// ── Packet path metrics ────────────────────────────────────────────

pub trait PacketMetrics: Send + Sync {
    /// Record a firewall verdict for a direction (`inbound`/`outbound`).
    fn record_verdict(&self, _direction: &str, _action: &str) {}

    /// Record a packet rejected as malformed on a path (`firewall`/`route`).
    fn record_malformed(&self, _path: &str) {}
}

// ── Route metrics ──────────────────────────────────────────────────

pub trait RouteMetrics: Send + Sync {
    /// Record a route lookup outcome (`forwarded`/`no_route`).
    fn record_route(&self, _result: &str) {}

    /// Record a failed forward to a gateway.
    fn record_route_send_error(&self) {}
}

// ── Rule metrics ───────────────────────────────────────────────────

pub trait RuleMetrics: Send + Sync {
    /// Set the number of rules loaded in a chain (`inbound`/`outbound`/`routes`).
    fn set_rules_loaded(&self, _chain: &str, _count: u64) {}
}

// ── Configuration metrics ──────────────────────────────────────────

pub trait ConfigMetrics: Send + Sync {
    /// Record a configuration load attempt (success or failure).
    fn record_config_load(&self, _result: &str) {}
}

// ── Composite super-trait ──────────────────────────────────────────

/// Unified metrics port composing all sub-traits.
///
/// Services accept `Arc<dyn MetricsPort>`.
pub trait MetricsPort: PacketMetrics + RouteMetrics + RuleMetrics + ConfigMetrics {}

/// Blanket implementation: any type implementing all sub-traits automatically
/// implements `MetricsPort`.
impl<T> MetricsPort for T where T: PacketMetrics + RouteMetrics + RuleMetrics + ConfigMetrics {}
