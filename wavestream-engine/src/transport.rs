//! ## wavestream-engine::transport
//! **Two independent datagram channels**
//!
//! The control channel carries pipe-delimited commands to each node's command
//! port; the data channel carries one waveform frame per node per loop
//! iteration to its data port. Delivery is unacknowledged on both. A lost
//! frame is replaced by the next one a period later.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};
use wavestream_config::NetworkConfig;
use wavestream_core::node::NodeEntry;
use wavestream_protocol::ControlCommand;

/// An unreliable, connectionless datagram sender.
pub trait DatagramChannel {
    /// Sends one datagram. Never waits for the peer.
    fn send_to(&self, payload: &[u8], addr: SocketAddr) -> io::Result<usize>;

    /// Releases the channel.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

impl DatagramChannel for UdpSocket {
    fn send_to(&self, payload: &[u8], addr: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, payload, addr)
    }
}

/// Control and data channels, always used from the streaming thread only.
#[derive(Debug)]
pub struct Transport<C> {
    control: C,
    data: C,
}

impl Transport<UdpSocket> {
    /// Binds both sockets to ephemeral ports on the configured local address.
    pub fn bind(config: &NetworkConfig) -> io::Result<Self> {
        let control = UdpSocket::bind(SocketAddr::new(config.bind_address, 0))?;
        let data = UdpSocket::bind(SocketAddr::new(config.bind_address, 0))?;
        control.set_nonblocking(true)?;
        data.set_nonblocking(true)?;
        debug!(
            control = %control.local_addr()?,
            data = %data.local_addr()?,
            "Bound transport sockets"
        );
        Ok(Self::new(control, data))
    }
}

impl<C: DatagramChannel> Transport<C> {
    pub fn new(control: C, data: C) -> Self {
        Self { control, data }
    }

    /// Sends one command to one node's command port.
    pub fn send_command(&self, node: &NodeEntry, command: &ControlCommand) -> io::Result<()> {
        let payload = command.encode();
        self.control.send_to(&payload, node.command_addr())?;
        trace!(node = node.id(), %command, "Sent control command");
        Ok(())
    }

    /// Sends an encoded frame to one node's data port.
    pub fn send_frame(&self, node: &NodeEntry, payload: &[u8]) -> io::Result<()> {
        self.data.send_to(payload, node.data_addr()).map(|_| ())
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn data(&self) -> &C {
        &self.data
    }

    /// Closes both channels.
    pub fn close(self) {
        self.control.close();
        self.data.close();
    }
}

/// A datagram recorded by a [`MemoryChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDatagram {
    pub addr: SocketAddr,
    pub payload: Vec<u8>,
}

impl SentDatagram {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

#[derive(Debug, Default)]
struct ChannelLog {
    sent: VecDeque<SentDatagram>,
    total: u64,
    closed: bool,
    unreachable: HashSet<SocketAddr>,
}

/// In-memory channel for dry runs and tests. Clones share one log, so a
/// clone kept outside the transport still sees sends and the close.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    log: Arc<Mutex<ChannelLog>>,
    capacity: Option<usize>,
}

impl MemoryChannel {
    /// Keeps every datagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the most recent `capacity` datagrams.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            log: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Makes every send to `addr` fail.
    pub fn fail_sends_to(&self, addr: SocketAddr) {
        self.log.lock().unreachable.insert(addr);
    }

    pub fn restore(&self, addr: SocketAddr) {
        self.log.lock().unreachable.remove(&addr);
    }

    /// Retained datagrams, oldest first.
    pub fn sent(&self) -> Vec<SentDatagram> {
        self.log.lock().sent.iter().cloned().collect()
    }

    /// Retained payloads sent to `addr`, as text.
    pub fn sent_to(&self, addr: SocketAddr) -> Vec<String> {
        self.log
            .lock()
            .sent
            .iter()
            .filter(|datagram| datagram.addr == addr)
            .map(SentDatagram::text)
            .collect()
    }

    /// Datagrams accepted since creation, including ones no longer retained.
    pub fn total_sent(&self) -> u64 {
        self.log.lock().total
    }

    pub fn clear(&self) {
        self.log.lock().sent.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.log.lock().closed
    }
}

impl DatagramChannel for MemoryChannel {
    fn send_to(&self, payload: &[u8], addr: SocketAddr) -> io::Result<usize> {
        let mut log = self.log.lock();
        if log.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "channel closed"));
        }
        if log.unreachable.contains(&addr) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{addr} unreachable"),
            ));
        }
        if self.capacity.is_some_and(|cap| log.sent.len() >= cap) {
            log.sent.pop_front();
        }
        log.sent.push_back(SentDatagram {
            addr,
            payload: payload.to_vec(),
        });
        log.total += 1;
        Ok(payload.len())
    }

    fn close(self) {
        self.log.lock().closed = true;
    }
}
