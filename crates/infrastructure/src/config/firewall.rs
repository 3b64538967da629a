//! Firewall rule text: `"<allow|deny> <src>[/<prefix>] <dst>[/<prefix>]"`,
//! or a bare `"allow"` / `"deny"` matching every packet.

use domain::common::entity::Direction;
use domain::firewall::engine::FirewallEngine;
use domain::firewall::entity::FirewallAction;
use domain::rule::entity::Ipv4Cidr;
use tracing::debug;

use super::common::{ConfigError, parse_cidr};

/// A parsed firewall rule line. `None` networks match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirewallRuleSpec {
    pub action: FirewallAction,
    pub src: Option<Ipv4Cidr>,
    pub dst: Option<Ipv4Cidr>,
}

fn parse_action(word: &str, rule: &str) -> Result<FirewallAction, ConfigError> {
    match word {
        "allow" => Ok(FirewallAction::Allow),
        "deny" => Ok(FirewallAction::Deny),
        other => Err(ConfigError::InvalidRule {
            rule: rule.to_string(),
            reason: format!("unknown action '{other}': expected allow|deny"),
        }),
    }
}

/// Parse one firewall rule line.
pub fn parse_firewall_rule(rule: &str) -> Result<FirewallRuleSpec, ConfigError> {
    let tokens: Vec<&str> = rule.split_whitespace().collect();
    match tokens.as_slice() {
        [action] => Ok(FirewallRuleSpec {
            action: parse_action(action, rule)?,
            src: None,
            dst: None,
        }),
        [action, src, dst] => Ok(FirewallRuleSpec {
            action: parse_action(action, rule)?,
            src: Some(parse_cidr(src)?),
            dst: Some(parse_cidr(dst)?),
        }),
        [] => Err(ConfigError::InvalidRule {
            rule: rule.to_string(),
            reason: "empty rule".to_string(),
        }),
        [_, _] => Err(ConfigError::InvalidRule {
            rule: rule.to_string(),
            reason: "missing destination network".to_string(),
        }),
        _ => Err(ConfigError::InvalidRule {
            rule: rule.to_string(),
            reason: format!("expected 1 or 3 fields, got {}", tokens.len()),
        }),
    }
}

/// Parse `rules` in order and append them to the `direction` chain.
///
/// `field` names the YAML list for error messages.
pub(super) fn append_rules(
    engine: &mut FirewallEngine,
    direction: Direction,
    field: &str,
    rules: &[String],
) -> Result<(), ConfigError> {
    for (idx, line) in rules.iter().enumerate() {
        let spec = parse_firewall_rule(line).map_err(|e| e.at(format!("{field}[{idx}]")))?;
        let rule = engine.append_cidr(direction, spec.action, spec.src, spec.dst);
        debug!(
            %direction,
            action = %rule.target(),
            matcher = %rule.matcher(),
            "firewall rule added"
        );
    }
    Ok(())
}
