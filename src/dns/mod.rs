//! DNS wire format: header, names, records and whole messages.

pub mod header;
pub mod message;
pub mod name;
pub mod record;

pub use header::Header;
pub use message::Message;
pub use name::{DomainLabel, Name};
pub use record::{Answer, Question};

/// Largest message this relay reads or writes, the classic UDP limit.
pub const MAX_MESSAGE_SIZE: usize = 512;
