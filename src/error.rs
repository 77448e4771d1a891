//! Error types for the codec and the forwarder.

use std::io;

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding, encoding or forwarding DNS messages.
#[derive(Debug, Error)]
pub enum Error {
    /// The fixed header was not exactly 12 bytes.
    #[error("malformed header: expected 12 bytes, got {0}")]
    MalformedHeader(usize),

    /// The buffer ended inside a domain name.
    #[error("truncated domain name at offset {0}")]
    TruncatedName(usize),

    /// A label length byte used the reserved 0b01/0b10 prefixes.
    #[error("invalid label length {len:#04x} at offset {offset}")]
    InvalidLabel { offset: usize, len: u8 },

    /// A compression pointer did not move strictly backward.
    #[error("compression pointer at offset {offset} targets {target}, which does not precede it")]
    PointerLoop { offset: usize, target: usize },

    /// A label was built with no content.
    #[error("empty label")]
    EmptyLabel,

    /// A label built from text was longer than 63 bytes.
    #[error("label {0:?} exceeds 63 bytes")]
    LabelTooLong(String),

    /// The buffer ended inside the fixed part of a question or answer.
    #[error("truncated record at offset {0}")]
    TruncatedRecord(usize),

    /// An answer declared more RDATA than it carries.
    #[error("rdata holds {actual} bytes but rdlength is {declared}")]
    ShortRData { declared: u16, actual: usize },

    /// Sending to or receiving from the upstream resolver failed.
    #[error("upstream transport failure: {0}")]
    TransportFailure(#[from] io::Error),

    /// The upstream resolver returned something we could not decode.
    #[error("malformed upstream response: {0}")]
    UpstreamDecodeFailure(#[source] Box<Error>),
}

impl Error {
    /// Wrap a codec error raised while decoding an upstream response.
    pub fn upstream(err: Error) -> Self {
        Error::UpstreamDecodeFailure(Box::new(err))
    }
}
