//! Key-injection sink reached over a local datagram socket.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use padlink_hid_xbox_protocol::KeyDirective;

/// Receives key directives. Delivery is fire-and-forget; callers log
/// failures and keep decoding.
pub trait EventSink: Send {
    fn send(&mut self, directive: KeyDirective) -> io::Result<()>;
}

/// Connected non-blocking `SOCK_DGRAM` Unix socket, one datagram per
/// directive. A full receive queue surfaces as `WouldBlock` and the
/// directive is dropped.
#[derive(Debug)]
pub struct DatagramSink {
    socket: UnixDatagram,
    peer: PathBuf,
}

impl DatagramSink {
    /// Connect to the key server.
    pub fn connect(path: &Path) -> io::Result<Self> {
        let socket = UnixDatagram::unbound()?;
        socket.connect(path)?;
        Self::from_socket(socket, path)
    }

    pub fn from_socket(socket: UnixDatagram, peer: impl Into<PathBuf>) -> io::Result<Self> {
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            peer: peer.into(),
        })
    }

    pub fn peer(&self) -> &Path {
        &self.peer
    }
}

impl EventSink for DatagramSink {
    fn send(&mut self, directive: KeyDirective) -> io::Result<()> {
        let bytes = directive.encode();
        let sent = self.socket.send(&bytes)?;
        if sent < bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {sent} of {} bytes", bytes.len()),
            ));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use padlink_hid_xbox_protocol::Edge;
    use std::time::Duration;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn recv(socket: &UnixDatagram) -> io::Result<Vec<u8>> {
        let mut buf = [0u8; 16];
        let n = socket.recv(&mut buf)?;
        Ok(buf.get(..n).unwrap_or_default().to_vec())
    }

    #[test]
    fn datagram_carries_two_bytes() -> TestResult {
        let (local, remote) = UnixDatagram::pair()?;
        remote.set_read_timeout(Some(Duration::from_secs(1)))?;
        let mut sink = DatagramSink::from_socket(local, "pair")?;
        sink.send(KeyDirective {
            edge: Edge::Pressed,
            key: b'z',
        })?;
        sink.send(KeyDirective {
            edge: Edge::Released,
            key: b'z',
        })?;

        assert_eq!(recv(&remote)?, b"dz");
        assert_eq!(recv(&remote)?, b"uz");
        Ok(())
    }

    #[tokio::test]
    async fn send_right_after_connect_is_delivered() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("keys.sock");
        let server = UnixDatagram::bind(&path)?;
        server.set_read_timeout(Some(Duration::from_secs(1)))?;

        // No yield to the runtime between connect and send.
        let mut sink = DatagramSink::connect(&path)?;
        assert_eq!(sink.peer(), path.as_path());
        sink.send(KeyDirective {
            edge: Edge::Pressed,
            key: b' ',
        })?;

        assert_eq!(recv(&server)?, b"d ");
        Ok(())
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() -> TestResult {
        let (local, _remote) = UnixDatagram::pair()?;
        let mut sink = DatagramSink::from_socket(local, "pair")?;
        let directive = KeyDirective {
            edge: Edge::Pressed,
            key: b'a',
        };
        // Nobody reads, so the queue fills and sends start failing fast.
        let failure = (0..100_000).find_map(|_| sink.send(directive).err());
        assert_eq!(
            failure.map(|e| e.kind()),
            Some(io::ErrorKind::WouldBlock)
        );
        Ok(())
    }

    #[test]
    fn connect_without_server_fails() -> TestResult {
        let dir = tempfile::tempdir()?;
        let result = DatagramSink::connect(&dir.path().join("missing.sock"));
        assert!(result.is_err());
        Ok(())
    }
}
