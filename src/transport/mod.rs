//! Transport layer for the relay.
//!
//! The forwarder talks to its upstream resolver through [`UpstreamTransport`]
//! so the exchange logic does not depend on real sockets. [`udp`] holds the
//! production implementation together with the listening side.

pub mod udp;

use std::io;

/// One request/response exchange with the upstream resolver.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Send an encoded query.
    async fn send(&mut self, query: &[u8]) -> io::Result<()>;

    /// Receive one response of at most `max_len` bytes.
    async fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>>;
}

/// Opens sessions to a single upstream resolver.
#[allow(async_fn_in_trait)]
pub trait UpstreamTransport {
    type Session: Session;

    async fn open(&self) -> io::Result<Self::Session>;
}
