//! Question and answer records.
//!
//! Only address records in the internet class are supported. Decoding
//! discards the wire Type/Class and reconstructs them as A/IN, and answer
//! decoding always consumes exactly four bytes of RDATA.

use super::name::Name;
use crate::error::{Error, Result};

pub const TYPE_A: u16 = 1;
pub const CLASS_IN: u16 = 1;

/// Fixed RDATA width of the only record type we decode.
pub const A_RDATA_LEN: usize = 4;

/// A question section entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: Name,
    pub qtype: u16,
    pub qclass: u16,
}

impl Question {
    /// An A/IN question for `name`.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            qtype: TYPE_A,
            qclass: CLASS_IN,
        }
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        self.name.encode_into(out);
        out.extend_from_slice(&self.qtype.to_be_bytes());
        out.extend_from_slice(&self.qclass.to_be_bytes());
    }

    /// Decode `count` questions starting at `start`.
    ///
    /// Returns the questions and the offset following the last one.
    pub fn decode_all(buf: &[u8], count: u16, start: usize) -> Result<(Vec<Self>, usize)> {
        // A question needs at least a root name and type/class: 5 bytes.
        let mut questions = Vec::with_capacity(capacity(buf, count, start, 5));
        let mut pos = start;

        for _ in 0..count {
            let (name, next) = Name::decode(buf, pos)?;
            pos = take(buf, next, 4)?.1;
            questions.push(Self::new(name));
        }

        Ok((questions, pos))
    }
}

/// An answer section entry.
///
/// `rdata` may hold more than `rdlength` bytes; only the first `rdlength`
/// are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub name: Name,
    pub rtype: u16,
    pub class: u16,
    pub ttl: u32,
    pub rdlength: u16,
    pub rdata: Vec<u8>,
}

impl Answer {
    /// An A/IN answer carrying `address`.
    pub fn address(name: Name, ttl: u32, address: [u8; A_RDATA_LEN]) -> Self {
        Self {
            name,
            rtype: TYPE_A,
            class: CLASS_IN,
            ttl,
            rdlength: A_RDATA_LEN as u16,
            rdata: address.to_vec(),
        }
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let rdata = self
            .rdata
            .get(..usize::from(self.rdlength))
            .ok_or(Error::ShortRData {
                declared: self.rdlength,
                actual: self.rdata.len(),
            })?;

        self.name.encode_into(out);
        out.extend_from_slice(&self.rtype.to_be_bytes());
        out.extend_from_slice(&self.class.to_be_bytes());
        out.extend_from_slice(&self.ttl.to_be_bytes());
        out.extend_from_slice(&self.rdlength.to_be_bytes());
        out.extend_from_slice(rdata);

        Ok(())
    }

    /// Decode `count` answers starting at `start`.
    pub fn decode_all(buf: &[u8], count: u16, start: usize) -> Result<(Vec<Self>, usize)> {
        // Root name, type/class, TTL, RDLength and a 4-byte address: 15 bytes.
        let mut answers = Vec::with_capacity(capacity(buf, count, start, 15));
        let mut pos = start;

        for _ in 0..count {
            let (name, next) = Name::decode(buf, pos)?;
            // Type and class are not carried over.
            let (_, next) = take(buf, next, 4)?;
            let (ttl, next) = take(buf, next, 4)?;
            let (rdlength, next) = take(buf, next, 2)?;
            let (rdata, next) = take(buf, next, A_RDATA_LEN)?;
            pos = next;

            answers.push(Self {
                name,
                rtype: TYPE_A,
                class: CLASS_IN,
                ttl: u32::from_be_bytes([ttl[0], ttl[1], ttl[2], ttl[3]]),
                rdlength: u16::from_be_bytes([rdlength[0], rdlength[1]]),
                rdata: rdata.to_vec(),
            });
        }

        Ok((answers, pos))
    }
}

/// Records that could fit in what is left of `buf`, capped at `count`.
fn capacity(buf: &[u8], count: u16, start: usize, min_len: usize) -> usize {
    usize::from(count).min(buf.len().saturating_sub(start) / min_len)
}

/// Borrow `len` bytes at `pos`, returning them and the offset after them.
fn take(buf: &[u8], pos: usize, len: usize) -> Result<(&[u8], usize)> {
    buf.get(pos..pos + len)
        .map(|bytes| (bytes, pos + len))
        .ok_or(Error::TruncatedRecord(pos))
}
