//! DNS relay orchestration.
//!
//! Binds the UDP listener and runs the relay.

use std::io;
use std::net::SocketAddr;
use std::rc::Rc;

use tracing::info;

use crate::resolver::{Resolver, ResolverConfig};
use crate::transport::udp::UdpTransport;

/// Configuration for the DNS relay.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Local address to bind (e.g., 127.0.0.1:2053)
    pub bind_addr: SocketAddr,
    /// How queries are answered
    pub resolver: ResolverConfig,
}

/// Bind the listener and start serving queries.
///
/// Returns the bound address once the receive loop is running. Must be
/// called from within a `LocalSet`.
pub async fn start(config: ProxyConfig) -> io::Result<SocketAddr> {
    let resolver = Rc::new(Resolver::from_config(&config.resolver));

    let udp = UdpTransport::bind(config.bind_addr).await?;
    let local_addr = udp.local_addr()?;

    info!("DNS relay listening on {}", local_addr);
    match config.resolver.resolver.as_deref() {
        Some(upstream) if resolver.is_forwarding() => {
            info!(
                "Forwarding to upstream: {} (timeout {:?})",
                upstream, config.resolver.timeout
            );
        }
        _ => info!(
            "No upstream configured, answering {} ttl={}",
            config.resolver.answer, config.resolver.ttl
        ),
    }

    udp.start(resolver);

    Ok(local_addr)
}

/// Run the relay with the given configuration. Runs indefinitely.
pub async fn run(config: ProxyConfig) -> io::Result<()> {
    start(config).await?;

    // Keep running forever
    std::future::pending::<()>().await;

    Ok(())
}
