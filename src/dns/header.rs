//! The 12-byte fixed DNS header.

use crate::error::{Error, Result};

/// Length of the fixed header on the wire.
pub const HEADER_LEN: usize = 12;

/// Standard query opcode.
pub const OPCODE_QUERY: u8 = 0;

/// Response codes this relay produces.
pub const RCODE_NO_ERROR: u8 = 0;
pub const RCODE_FORMAT_ERROR: u8 = 1;
pub const RCODE_SERVER_FAILURE: u8 = 2;
pub const RCODE_NOT_IMPLEMENTED: u8 = 4;

const QR: u16 = 1 << 15;
const AA: u16 = 1 << 10;
const TC: u16 = 1 << 9;
const RD: u16 = 1 << 8;
const RA: u16 = 1 << 7;

const OPCODE_SHIFT: u16 = 11;
const OPCODE_MASK: u16 = 0x0F;
const Z_SHIFT: u16 = 4;
const Z_MASK: u16 = 0x07;
const RCODE_MASK: u16 = 0x0F;

/// A decoded DNS header.
///
/// `opcode`, `z` and `rcode` occupy 4, 3 and 4 bits on the wire. Values
/// outside those widths are truncated by [`Header::encode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: u8,
    pub rcode: u8,
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,
}

impl Header {
    /// Parse a header from exactly [`HEADER_LEN`] bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; HEADER_LEN] = bytes
            .try_into()
            .map_err(|_| Error::MalformedHeader(bytes.len()))?;

        let word = |i: usize| u16::from_be_bytes([bytes[i], bytes[i + 1]]);

        let mut header = Self::from_flags(word(2));
        header.id = word(0);
        header.qd_count = word(4);
        header.an_count = word(6);
        header.ns_count = word(8);
        header.ar_count = word(10);

        Ok(header)
    }

    fn from_flags(flags: u16) -> Self {
        Self {
            qr: flags & QR != 0,
            opcode: ((flags >> OPCODE_SHIFT) & OPCODE_MASK) as u8,
            aa: flags & AA != 0,
            tc: flags & TC != 0,
            rd: flags & RD != 0,
            ra: flags & RA != 0,
            z: ((flags >> Z_SHIFT) & Z_MASK) as u8,
            rcode: (flags & RCODE_MASK) as u8,
            ..Self::default()
        }
    }

    /// Pack the flag fields into the second header word.
    pub fn flags(&self) -> u16 {
        let mut flags = 0;

        if self.qr {
            flags |= QR;
        }
        flags |= (u16::from(self.opcode) & OPCODE_MASK) << OPCODE_SHIFT;
        if self.aa {
            flags |= AA;
        }
        if self.tc {
            flags |= TC;
        }
        if self.rd {
            flags |= RD;
        }
        if self.ra {
            flags |= RA;
        }
        flags |= (u16::from(self.z) & Z_MASK) << Z_SHIFT;
        flags |= u16::from(self.rcode) & RCODE_MASK;

        flags
    }

    /// Encode the header to its 12-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let words = [
            self.id,
            self.flags(),
            self.qd_count,
            self.an_count,
            self.ns_count,
            self.ar_count,
        ];
        for (chunk, word) in out.chunks_exact_mut(2).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}
