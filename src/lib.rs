//! Fanout - a DNS relay that splits multi-question queries.
//!
//! The codec lives in [`dns`], the fan-out/merge algorithm in [`forwarder`],
//! and the per-datagram decision logic in [`resolver`]. The listener and the
//! upstream UDP sessions are in [`transport`].

pub mod dns;
pub mod error;
pub mod forwarder;
pub mod proxy;
pub mod resolver;
pub mod transport;

pub use error::{Error, Result};
