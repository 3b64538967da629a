use std::sync::Arc;

use domain::common::entity::Direction;
use domain::firewall::engine::FirewallEngine;
use domain::firewall::entity::FirewallAction;
use domain::packet::error::PacketError;
use ports::secondary::metrics_port::MetricsPort;

/// Result code reported to the packet pump for a malformed packet.
pub const MALFORMED_CODE: i32 = -1;

/// Application-level firewall service.
///
/// Wraps the per-direction chains with metrics. The chains are frozen once
/// the service is built, so the service is shared as `Arc<FirewallAppService>`
/// across packet threads without locking.
pub struct FirewallAppService {
    engine: FirewallEngine,
    metrics: Arc<dyn MetricsPort>,
}

impl FirewallAppService {
    pub fn new(engine: FirewallEngine, metrics: Arc<dyn MetricsPort>) -> Self {
        let svc = Self { engine, metrics };
        svc.update_metrics();
        svc
    }

    /// Classify a packet for `direction`.
    ///
    /// A malformed packet (shorter than an IPv4 header) is an ordinary
    /// error value; callers drop it.
    pub fn check(
        &self,
        direction: Direction,
        packet: &[u8],
    ) -> Result<FirewallAction, PacketError> {
        match self.engine.evaluate(direction, packet) {
            Ok(action) => {
                self.metrics
                    .record_verdict(direction.as_str(), action.as_str());
                if action == FirewallAction::Deny {
                    tracing::trace!(%direction, len = packet.len(), "packet denied");
                }
                Ok(action)
            }
            Err(e) => {
                self.metrics.record_malformed("firewall");
                tracing::trace!(%direction, error = %e, "malformed packet");
                Err(e)
            }
        }
    }

    /// Same as `check`, folded into the integer codes of the packet pump:
    /// `0` allow, `1` deny, `-1` malformed.
    pub fn check_code(&self, direction: Direction, packet: &[u8]) -> i32 {
        self.check(direction, packet)
            .map_or(MALFORMED_CODE, |action| i32::from(action.code()))
    }

    pub fn engine(&self) -> &FirewallEngine {
        &self.engine
    }

    /// Return the number of rules across both directions.
    pub fn rule_count(&self) -> usize {
        self.engine.rule_count()
    }

    fn update_metrics(&self) {
        for direction in Direction::ALL {
            self.metrics.set_rules_loaded(
                direction.as_str(),
                self.engine.chain(direction).len() as u64,
            );
        }
    }
}
