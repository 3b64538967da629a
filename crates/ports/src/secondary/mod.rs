pub mod datagram_sender;
pub mod metrics_port;
