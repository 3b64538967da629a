use std::io;
use std::net::{SocketAddrV4, UdpSocket};

use ports::secondary::datagram_sender::DatagramSender;

/// Forwards routed packets to their gateway over a single UDP socket.
///
/// The socket is shared by every packet thread; `UdpSocket::send_to`
/// takes `&self` and each call emits one whole datagram.
pub struct UdpGatewaySender {
    socket: UdpSocket,
}

impl UdpGatewaySender {
    /// Bind a fresh socket on `local` (port 0 picks an ephemeral port).
    pub fn bind(local: SocketAddrV4) -> io::Result<Self> {
        let socket = UdpSocket::bind(local)?;
        tracing::debug!(local = %socket.local_addr()?, "gateway socket bound");
        Ok(Self { socket })
    }

    /// Wrap an already-open socket.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self { socket }
    }

    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }
}

impl DatagramSender for UdpGatewaySender {
    fn send_to(&self, datagram: &[u8], gateway: SocketAddrV4) -> io::Result<usize> {
        let written = self.socket.send_to(datagram, gateway)?;
        if written != datagram.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short datagram write: {written} of {} bytes", datagram.len()),
            ));
        }
        Ok(written)
    }
}
