use std::io;
use std::net::SocketAddrV4;

/// Secondary port for the forwarding path: a connectionless datagram
/// socket that is already open and writable.
///
/// Implementations must tolerate concurrent `send_to` calls from several
/// packet threads; a single UDP `sendto` is atomic per datagram, so no
/// serialization is expected from callers.
pub trait DatagramSender: Send + Sync {
    /// Send `datagram` unmodified to `gateway`, returning bytes written.
    fn send_to(&self, datagram: &[u8], gateway: SocketAddrV4) -> io::Result<usize>;
}
