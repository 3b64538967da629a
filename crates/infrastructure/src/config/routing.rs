//! Route rule text: `"<src>[/<prefix>] <dst>[/<prefix>] <gw_addr>:<gw_port>"`.

use std::net::SocketAddrV4;

use domain::routing::engine::RouteEngine;
use domain::rule::entity::Ipv4Cidr;
use tracing::debug;

use super::common::{ConfigError, parse_cidr};

/// A parsed route line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRuleSpec {
    pub src: Ipv4Cidr,
    pub dst: Ipv4Cidr,
    pub gateway: SocketAddrV4,
}

/// Parse an `addr:port` gateway. Port 0 is rejected.
pub fn parse_gateway(s: &str) -> Result<SocketAddrV4, ConfigError> {
    if !s.contains(':') {
        return Err(ConfigError::InvalidGateway {
            value: s.to_string(),
            reason: "expected <addr>:<port>".to_string(),
        });
    }
    let gateway: SocketAddrV4 = s.parse().map_err(|e| ConfigError::InvalidGateway {
        value: s.to_string(),
        reason: format!("{e}"),
    })?;
    if gateway.port() == 0 {
        return Err(ConfigError::InvalidGateway {
            value: s.to_string(),
            reason: "port must be non-zero".to_string(),
        });
    }
    Ok(gateway)
}

/// Parse one route line.
pub fn parse_route_rule(rule: &str) -> Result<RouteRuleSpec, ConfigError> {
    let tokens: Vec<&str> = rule.split_whitespace().collect();
    let [src, dst, gateway] = tokens.as_slice() else {
        return Err(ConfigError::InvalidRule {
            rule: rule.to_string(),
            reason: format!(
                "expected '<src> <dst> <addr>:<port>', got {} fields",
                tokens.len()
            ),
        });
    };
    Ok(RouteRuleSpec {
        src: parse_cidr(src)?,
        dst: parse_cidr(dst)?,
        gateway: parse_gateway(gateway)?,
    })
}

/// Parse `rules` in order and append them to the route table.
pub(super) fn append_routes(
    engine: &mut RouteEngine,
    field: &str,
    rules: &[String],
) -> Result<(), ConfigError> {
    for (idx, line) in rules.iter().enumerate() {
        let spec = parse_route_rule(line).map_err(|e| e.at(format!("{field}[{idx}]")))?;
        let route = engine.append_route(
            spec.src.network(),
            spec.src.mask(),
            spec.dst.network(),
            spec.dst.mask(),
            spec.gateway,
        );
        debug!(matcher = %route.matcher(), gateway = %route.gateway(), "route added");
    }
    Ok(())
}
