//! UDP transport for DNS queries.
//!
//! [`UdpTransport`] is the listening side: every datagram is handed to the
//! [`Resolver`] on its own local task and the reply goes back to the source
//! address. [`UdpUpstream`] opens one connected socket per upstream exchange.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::rc::Rc;

use tokio::net::{UdpSocket, lookup_host};
use tracing::{debug, warn};

use super::{Session, UpstreamTransport};
use crate::dns::MAX_MESSAGE_SIZE;
use crate::dns::header::HEADER_LEN;
use crate::resolver::Resolver;

/// UDP listener for the relay.
pub struct UdpTransport {
    socket: Rc<UdpSocket>,
}

impl UdpTransport {
    /// Bind the listening socket.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = Rc::new(UdpSocket::bind(addr).await?);

        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Start the receive loop. Must be called from within a `LocalSet`.
    pub fn start<T>(self, resolver: Rc<Resolver<T>>)
    where
        T: UpstreamTransport + 'static,
    {
        tokio::task::spawn_local(run(self.socket, resolver));
    }
}

async fn run<T>(socket: Rc<UdpSocket>, resolver: Rc<Resolver<T>>)
where
    T: UpstreamTransport + 'static,
{
    let mut buf = [0u8; MAX_MESSAGE_SIZE];

    loop {
        let (len, src) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                warn!("UDP recv error: {}", e);
                continue;
            }
        };

        if len < HEADER_LEN {
            debug!(%src, len, "ignoring datagram shorter than a header");
            continue;
        }

        let query = buf[..len].to_vec();
        let socket = socket.clone();
        let resolver = resolver.clone();

        tokio::task::spawn_local(async move {
            let Some(reply) = resolver.handle(&query).await else {
                return;
            };
            if let Err(e) = socket.send_to(&reply, src).await {
                warn!(%src, "UDP response error: {}", e);
            }
        });
    }
}

/// Upstream resolver reached over UDP at a `host:port` address.
#[derive(Debug, Clone)]
pub struct UdpUpstream {
    addr: String,
}

impl UdpUpstream {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl UpstreamTransport for UdpUpstream {
    type Session = UdpSession;

    async fn open(&self) -> io::Result<UdpSession> {
        let remote = lookup_host(self.addr.as_str())
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("no address found for {}", self.addr),
                )
            })?;

        let local: SocketAddr = if remote.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;

        Ok(UdpSession { socket })
    }
}

/// A connected socket used for a single upstream exchange.
pub struct UdpSession {
    socket: UdpSocket,
}

impl Session for UdpSession {
    async fn send(&mut self, query: &[u8]) -> io::Result<()> {
        self.socket.send(query).await?;
        Ok(())
    }

    async fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; max_len];
        let len = self.socket.recv(&mut buf).await?;
        buf.truncate(len);
        Ok(buf)
    }
}
