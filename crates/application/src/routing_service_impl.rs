use std::net::SocketAddrV4;
use std::sync::Arc;

use domain::packet::error::PacketError;
use domain::routing::engine::RouteEngine;
use ports::secondary::datagram_sender::DatagramSender;
use ports::secondary::metrics_port::MetricsPort;

use crate::firewall_service_impl::MALFORMED_CODE;

/// Outcome of a route check on a well-formed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteVerdict {
    /// A route matched and the packet was handed to the sender.
    /// `sent` is false when the send itself failed.
    Forwarded { gateway: SocketAddrV4, sent: bool },
    /// No route matched; the caller delivers the packet normally.
    NoRoute,
}

impl RouteVerdict {
    /// `1` when a route matched (even if the send failed), `0` otherwise.
    pub fn code(self) -> i32 {
        match self {
            Self::Forwarded { .. } => 1,
            Self::NoRoute => 0,
        }
    }

    pub fn gateway(self) -> Option<SocketAddrV4> {
        match self {
            Self::Forwarded { gateway, .. } => Some(gateway),
            Self::NoRoute => None,
        }
    }
}

/// Application-level routing service.
///
/// Looks up the first matching route and forwards the whole packet as a
/// single datagram to its gateway through the `DatagramSender` port.
pub struct RoutingAppService {
    engine: RouteEngine,
    sender: Arc<dyn DatagramSender>,
    metrics: Arc<dyn MetricsPort>,
}

impl RoutingAppService {
    pub fn new(
        engine: RouteEngine,
        sender: Arc<dyn DatagramSender>,
        metrics: Arc<dyn MetricsPort>,
    ) -> Self {
        metrics.set_rules_loaded("routes", engine.route_count() as u64);
        Self {
            engine,
            sender,
            metrics,
        }
    }

    /// Route a packet.
    ///
    /// At most one datagram is sent per call. A send failure is logged and
    /// counted but does not change the verdict.
    pub fn check_route(&self, packet: &[u8]) -> Result<RouteVerdict, PacketError> {
        let route = match self.engine.lookup(packet) {
            Ok(route) => route,
            Err(e) => {
                self.metrics.record_malformed("route");
                return Err(e);
            }
        };

        let Some(route) = route else {
            self.metrics.record_route("no_route");
            return Ok(RouteVerdict::NoRoute);
        };

        let gateway = route.gateway();
        self.metrics.record_route("forwarded");
        let sent = match self.sender.send_to(packet, gateway) {
            Ok(_) => {
                tracing::trace!(%gateway, len = packet.len(), "packet forwarded");
                true
            }
            Err(e) => {
                self.metrics.record_route_send_error();
                tracing::warn!(%gateway, error = %e, "failed to forward packet to gateway");
                false
            }
        };
        Ok(RouteVerdict::Forwarded { gateway, sent })
    }

    /// `1` forwarded (or attempted), `0` no route, `-1` malformed.
    pub fn check_code(&self, packet: &[u8]) -> i32 {
        self.check_route(packet)
            .map_or(MALFORMED_CODE, RouteVerdict::code)
    }

    pub fn engine(&self) -> &RouteEngine {
        &self.engine
    }

    pub fn route_count(&self) -> usize {
        self.engine.route_count()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    use super::*;
    use ports::secondary::metrics_port::{ConfigMetrics, PacketMetrics, RouteMetrics, RuleMetrics};
    use ports::test_utils::{FailingSender, NoopMetrics, RecordingSender};

    // ── Test helpers ───────────────────────────────────────────────

    fn packet(src: [u8; 4], dst: [u8; 4], len: usize) -> Vec<u8> {
        let mut pkt = vec![0u8; len];
        pkt[0] = 0x45;
        pkt[12..16].copy_from_slice(&src);
        pkt[16..20].copy_from_slice(&dst);
        for (i, b) in pkt.iter_mut().enumerate().skip(20) {
            *b = i as u8;
        }
        pkt
    }

    fn gateway() -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 5), 9000)
    }

    /// Single route: src 10.0.0.0/24 -> any via 203.0.113.5:9000.
    fn engine() -> RouteEngine {
        let mut engine = RouteEngine::new();
        engine.append_route(0x0A00_0000, 0xFFFF_FF00, 0, 0, gateway());
        engine
    }

    #[derive(Default)]
    struct RouteCounter {
        results: Mutex<Vec<String>>,
        send_errors: Mutex<u32>,
    }

    impl PacketMetrics for RouteCounter {}
    impl RouteMetrics for RouteCounter {
        fn record_route(&self, result: &str) {
            self.results.lock().unwrap().push(result.to_string());
        }
        fn record_route_send_error(&self) {
            *self.send_errors.lock().unwrap() += 1;
        }
    }
    impl RuleMetrics for RouteCounter {}
    impl ConfigMetrics for RouteCounter {}

    // ── Verdicts ───────────────────────────────────────────────────

    #[test]
    fn matching_packet_is_forwarded_whole() {
        let sender = Arc::new(RecordingSender::new());
        let svc = RoutingAppService::new(
            engine(),
            Arc::clone(&sender) as Arc<dyn DatagramSender>,
            Arc::new(NoopMetrics),
        );
        let pkt = packet([10, 0, 0, 7], [8, 8, 8, 8], 84);

        assert_eq!(svc.check_code(&pkt), 1);

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, pkt);
        assert_eq!(sent[0].1, gateway());
    }

    #[test]
    fn non_matching_packet_is_not_sent() {
        let sender = Arc::new(RecordingSender::new());
        let svc = RoutingAppService::new(
            engine(),
            Arc::clone(&sender) as Arc<dyn DatagramSender>,
            Arc::new(NoopMetrics),
        );
        let verdict = svc.check_route(&packet([10, 0, 1, 7], [8, 8, 8, 8], 40));
        assert_eq!(verdict, Ok(RouteVerdict::NoRoute));
        assert!(sender.sent().is_empty());
    }

    #[test]
    fn malformed_packet_is_not_sent() {
        let sender = Arc::new(RecordingSender::new());
        let svc = RoutingAppService::new(
            engine(),
            Arc::clone(&sender) as Arc<dyn DatagramSender>,
            Arc::new(NoopMetrics),
        );
        assert_eq!(svc.check_code(&[0x45; 10]), -1);
        assert!(sender.sent().is_empty());
    }

    #[test]
    fn empty_table_never_sends() {
        let sender = Arc::new(RecordingSender::new());
        let svc = RoutingAppService::new(
            RouteEngine::new(),
            Arc::clone(&sender) as Arc<dyn DatagramSender>,
            Arc::new(NoopMetrics),
        );
        assert_eq!(svc.check_code(&packet([10, 0, 0, 7], [8, 8, 8, 8], 20)), 0);
        assert!(sender.sent().is_empty());
    }

    // ── Send failures ──────────────────────────────────────────────

    #[test]
    fn failed_send_still_reports_forwarded() {
        let sender = Arc::new(FailingSender::new());
        let metrics = Arc::new(RouteCounter::default());
        let svc = RoutingAppService::new(
            engine(),
            Arc::clone(&sender) as Arc<dyn DatagramSender>,
            Arc::clone(&metrics) as Arc<dyn MetricsPort>,
        );
        let pkt = packet([10, 0, 0, 7], [8, 8, 8, 8], 60);

        assert_eq!(
            svc.check_route(&pkt),
            Ok(RouteVerdict::Forwarded {
                gateway: gateway(),
                sent: false
            })
        );
        assert_eq!(svc.check_code(&pkt), 1);
        assert_eq!(sender.attempts(), 2);
        assert_eq!(*metrics.send_errors.lock().unwrap(), 2);
    }

    // ── Ordering ───────────────────────────────────────────────────

    #[test]
    fn first_route_wins_and_sends_once() {
        let other = SocketAddrV4::new(Ipv4Addr::new(198, 51, 100, 1), 53);
        let mut engine = RouteEngine::new();
        engine.append_route(0, 0, 0x0808_0808, 0xFFFF_FFFF, gateway());
        engine.append_route(0, 0, 0, 0, other);
        let sender = Arc::new(RecordingSender::new());
        let metrics = Arc::new(RouteCounter::default());
        let svc = RoutingAppService::new(
            engine,
            Arc::clone(&sender) as Arc<dyn DatagramSender>,
            Arc::clone(&metrics) as Arc<dyn MetricsPort>,
        );

        svc.check_route(&packet([1, 1, 1, 1], [8, 8, 8, 8], 20))
            .unwrap();
        svc.check_route(&packet([1, 1, 1, 1], [9, 9, 9, 9], 20))
            .unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, gateway());
        assert_eq!(sent[1].1, other);
        assert_eq!(
            *metrics.results.lock().unwrap(),
            vec!["forwarded".to_string(), "forwarded".to_string()]
        );
    }

    #[test]
    fn verdict_codes() {
        assert_eq!(RouteVerdict::NoRoute.code(), 0);
        assert_eq!(
            RouteVerdict::Forwarded {
                gateway: gateway(),
                sent: false
            }
            .code(),
            1
        );
        assert_eq!(RouteVerdict::NoRoute.gateway(), None);
    }

    #[test]
    fn service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RoutingAppService>();
    }
}
