//! Domain names as length-prefixed label sequences.
//!
//! Decoding follows compression pointers into the original message buffer.
//! Encoding never compresses.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Longest label content allowed on the wire.
pub const MAX_LABEL_LEN: usize = 63;

const POINTER_TAG: u8 = 0xC0;
const POINTER_MASK: u16 = 0x3FFF;

/// One label of a domain name, holding 1 to 63 bytes of content.
///
/// The wire length byte is derived from the content, so it always matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainLabel(Vec<u8>);

impl DomainLabel {
    pub fn new(content: impl Into<Vec<u8>>) -> Result<Self> {
        let content = content.into();
        if content.is_empty() {
            return Err(Error::EmptyLabel);
        }
        if content.len() > MAX_LABEL_LEN {
            return Err(Error::LabelTooLong(
                String::from_utf8_lossy(&content).into_owned(),
            ));
        }
        Ok(Self(content))
    }

    /// Value of the length byte that precedes the content.
    pub fn len(&self) -> u8 {
        self.0.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn content(&self) -> &[u8] {
        &self.0
    }
}

/// An uncompressed domain name. The root name has no labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name(Vec<DomainLabel>);

impl Name {
    pub fn labels(&self) -> &[DomainLabel] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of bytes [`Name::encode_into`] writes.
    pub fn encoded_len(&self) -> usize {
        self.0.iter().map(|l| 1 + l.0.len()).sum::<usize>() + 1
    }

    /// Decode a name starting at `start` within the whole message `buf`.
    ///
    /// Returns the name and the offset where the next field begins. When the
    /// name ends in a compression pointer, that offset is the byte after the
    /// pointer, not wherever the pointer led.
    ///
    /// Each pointer must target an offset strictly below the previous jump
    /// origin, so pointer chains always terminate.
    pub fn decode(buf: &[u8], start: usize) -> Result<(Self, usize)> {
        let mut labels = Vec::new();
        let mut cursor = start;
        let mut resume = None;
        let mut bound = usize::MAX;

        loop {
            let len = *buf.get(cursor).ok_or(Error::TruncatedName(cursor))?;

            match len {
                0 => {
                    cursor += 1;
                    break;
                }
                len if len & POINTER_TAG == POINTER_TAG => {
                    let low = *buf
                        .get(cursor + 1)
                        .ok_or(Error::TruncatedName(cursor + 1))?;
                    let target = usize::from(u16::from_be_bytes([len, low]) & POINTER_MASK);

                    if target >= bound.min(cursor) {
                        return Err(Error::PointerLoop {
                            offset: cursor,
                            target,
                        });
                    }

                    bound = target;
                    resume.get_or_insert(cursor + 2);
                    cursor = target;
                }
                len if len & POINTER_TAG != 0 => {
                    return Err(Error::InvalidLabel {
                        offset: cursor,
                        len,
                    });
                }
                len => {
                    let begin = cursor + 1;
                    let end = begin + usize::from(len);
                    let content = buf.get(begin..end).ok_or(Error::TruncatedName(buf.len()))?;
                    labels.push(DomainLabel(content.to_vec()));
                    cursor = end;
                }
            }
        }

        Ok((Self(labels), resume.unwrap_or(cursor)))
    }

    /// Append `[len][content]` for each label, then the zero terminator.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        for label in &self.0 {
            out.push(label.len());
            out.extend_from_slice(&label.0);
        }
        out.push(0);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }
}

impl FromStr for Name {
    type Err = Error;

    /// Parse dotted text such as `"codecrafters.io"`. Empty labels are
    /// skipped, so `""`, `"."` and a trailing dot are all accepted.
    fn from_str(s: &str) -> Result<Self> {
        s.split('.')
            .filter(|label| !label.is_empty())
            .map(|label| DomainLabel::new(label.as_bytes()))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&String::from_utf8_lossy(label.content()))?;
        }
        Ok(())
    }
}
