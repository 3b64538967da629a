use serde::{Deserialize, Serialize};

use crate::rule::entity::{Rule, RuleChain};

// ── Actions ─────────────────────────────────────────────────────────

/// Firewall verdict. The discriminants are the codes reported to the
/// packet pump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FirewallAction {
    #[default]
    Allow = 0,
    Deny = 1,
}

impl FirewallAction {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

impl std::fmt::Display for FirewallAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Firewall rule / chain ───────────────────────────────────────────

pub type FirewallRule = Rule<FirewallAction>;

/// One direction's firewall chain.
pub type FirewallChain = RuleChain<FirewallAction>;
