// ── Paths ──────────────────────────────────────────────────────────

pub const DEFAULT_CONFIG_PATH: &str = "/etc/tuntap-router/config.yaml";

// ── Forwarding ─────────────────────────────────────────────────────

/// Local address the gateway forwarding socket binds to.
pub const DEFAULT_FORWARD_BIND: &str = "0.0.0.0:0";

// ── Limits ─────────────────────────────────────────────────────────

/// Maximum rules in a single firewall chain or in the route table.
pub const MAX_RULES_PER_CHAIN: usize = 4096;

// ── Metrics ────────────────────────────────────────────────────────

pub const METRICS_PREFIX: &str = "tuntap_router";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_forward_bind_parses() {
        assert!(
            DEFAULT_FORWARD_BIND
                .parse::<std::net::SocketAddrV4>()
                .is_ok()
        );
    }

    #[test]
    fn rule_limit_is_positive() {
        assert!(MAX_RULES_PER_CHAIN > 0);
    }

    #[test]
    fn config_path_is_absolute() {
        assert!(std::path::Path::new(DEFAULT_CONFIG_PATH).is_absolute());
    }
}
