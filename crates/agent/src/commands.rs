use anyhow::{Context, Result};
use application::firewall_service_impl::FirewallAppService;
use application::routing_service_impl::RoutingAppService;
use domain::common::entity::Direction;
use infrastructure::metrics::AgentMetrics;

use crate::startup::Runtime;

// ── Packet input ────────────────────────────────────────────────────────

/// Decode a packet given as hex. Whitespace, `:` separators and a leading
/// `0x` are ignored.
pub fn decode_packet(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = body
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).context("packet must be hex encoded")
}

// ── Validate ────────────────────────────────────────────────────────────

pub fn cmd_validate(rt: &Runtime) -> Result<()> {
    let firewall = rt.filter.firewall();
    println!("Configuration OK");
    for direction in Direction::ALL {
        let chain = firewall.engine().chain(direction);
        println!("  firewall {direction}: {} rule(s)", chain.len());
        for rule in chain.rules() {
            println!("    {:<5} {}", rule.target(), rule.matcher());
        }
    }
    let routing = &rt.routing;
    if routing.route_count() == 0 {
        println!("  routes: disabled");
    } else {
        println!(
            "  routes: {} rule(s), forwarding from {}",
            routing.route_count(),
            rt.config.agent.forward_bind
        );
        for route in routing.engine().table().rules() {
            println!("    {} via {}", route.matcher(), route.gateway());
        }
    }
    Ok(())
}

// ── Check / Route ───────────────────────────────────────────────────────

pub fn cmd_check(firewall: &FirewallAppService, direction: Direction, packet: &str) -> Result<i32> {
    let bytes = decode_packet(packet)?;
    let code = firewall.check_code(direction, &bytes);
    println!("{code}");
    Ok(code)
}

/// An empty route table is not an error: the packet simply has no route.
pub fn cmd_route(routing: &RoutingAppService, packet: &str) -> Result<i32> {
    let bytes = decode_packet(packet)?;
    let code = routing.check_code(&bytes);
    println!("{code}");
    Ok(code)
}

// ── Metrics ─────────────────────────────────────────────────────────────

pub fn cmd_metrics(metrics: &AgentMetrics) -> Result<()> {
    let text = metrics.encode().context("encoding metrics")?;
    print!("{text}");
    Ok(())
}
