use std::io;
use std::net::SocketAddrV4;
use std::sync::Mutex;

use crate::secondary::datagram_sender::DatagramSender;
use crate::secondary::metrics_port::{ConfigMetrics, PacketMetrics, RouteMetrics, RuleMetrics};

/// No-op implementation of all metrics sub-traits for use in tests.
///
/// All methods inherit the default no-op implementations from the sub-traits.
pub struct NoopMetrics;

impl PacketMetrics for NoopMetrics {}
impl RouteMetrics for NoopMetrics {}
impl RuleMetrics for NoopMetrics {}
impl ConfigMetrics for NoopMetrics {}

/// Sender that records every datagram instead of transmitting it.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(Vec<u8>, SocketAddrV4)>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `(datagram, gateway)` pairs in send order.
    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddrV4)> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl DatagramSender for RecordingSender {
    fn send_to(&self, datagram: &[u8], gateway: SocketAddrV4) -> io::Result<usize> {
        let mut guard = self
            .sent
            .lock()
            .map_err(|_| io::Error::other("recording sender poisoned"))?;
        guard.push((datagram.to_vec(), gateway));
        Ok(datagram.len())
    }
}

/// Sender whose every call fails, counting attempts.
#[derive(Default)]
pub struct FailingSender {
    attempts: Mutex<usize>,
}

impl FailingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().map(|n| *n).unwrap_or_default()
    }
}

impl DatagramSender for FailingSender {
    fn send_to(&self, _datagram: &[u8], _gateway: SocketAddrV4) -> io::Result<usize> {
        if let Ok(mut n) = self.attempts.lock() {
            *n += 1;
        }
        Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "simulated send failure",
        ))
    }
}
