//! Encoded payload framing.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "HUFP"
//!      4     1  version (1)
//!      5     1  bit format (0 = packed, 1 = ascii)
//!      6     8  symbol count, u64 little-endian
//!     14     8  bit count, u64 little-endian
//!     22     -  code bits
//! ```
//!
//! The explicit bit count makes the zero padding of the last packed byte
//! unambiguous, and the symbol count lets a single-leaf tree, whose code is
//! empty, be decoded from zero bits.

use std::io::{Read, Write};

use crate::error::{Error, Result};

/// Magic bytes at the start of every payload.
pub const MAGIC: [u8; 4] = *b"HUFP";

/// Current payload version.
pub const VERSION: u8 = 1;

/// Size of [`PayloadHeader`] on the wire.
pub const HEADER_LEN: usize = 22;

/// How code bits are stored after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitFormat {
    /// Eight bits per byte, MSB-first, zero-padded.
    #[default]
    Packed,
    /// One ASCII `'0'` / `'1'` byte per bit.
    Ascii,
}

impl BitFormat {
    fn tag(self) -> u8 {
        match self {
            BitFormat::Packed => 0,
            BitFormat::Ascii => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(BitFormat::Packed),
            1 => Ok(BitFormat::Ascii),
            other => Err(Error::UnknownBitFormat(other)),
        }
    }

    /// Number of bytes needed to store `bits` code bits.
    pub fn data_len(self, bits: u64) -> u64 {
        match self {
            BitFormat::Packed => bits.div_ceil(8),
            BitFormat::Ascii => bits,
        }
    }
}

/// Fixed-size header preceding the code bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    /// Storage of the code bits.
    pub format: BitFormat,
    /// Number of symbols that were encoded.
    pub symbol_count: u64,
    /// Exact number of code bits, excluding padding.
    pub bit_len: u64,
}

impl PayloadHeader {
    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(&MAGIC);
        out[4] = VERSION;
        out[5] = self.format.tag();
        out[6..14].copy_from_slice(&self.symbol_count.to_le_bytes());
        out[14..22].copy_from_slice(&self.bit_len.to_le_bytes());
        out
    }

    /// Parse a header.
    ///
    /// # Errors
    /// `BadMagic`, `UnsupportedVersion` or `UnknownBitFormat` for a header
    /// this version cannot read.
    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> Result<Self> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[..4]);
        if magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }
        if buf[4] != VERSION {
            return Err(Error::UnsupportedVersion(buf[4]));
        }
        let format = BitFormat::from_tag(buf[5])?;
        let mut word = [0u8; 8];
        word.copy_from_slice(&buf[6..14]);
        let symbol_count = u64::from_le_bytes(word);
        word.copy_from_slice(&buf[14..22]);
        let bit_len = u64::from_le_bytes(word);
        Ok(Self {
            format,
            symbol_count,
            bit_len,
        })
    }

    /// Write the header to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read a header from the front of `reader`.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut buf)?;
        Self::from_bytes(&buf)
    }

    /// Number of body bytes this header describes.
    pub fn data_len(&self) -> u64 {
        self.format.data_len(self.bit_len)
    }
}

/// A header together with its code bits, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Counts and format of `data`.
    pub header: PayloadHeader,
    /// Code bits in `header.format`.
    pub data: Vec<u8>,
}

impl EncodedPayload {
    /// Write header and data.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        self.header.write_to(&mut writer)?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Read a header and everything after it.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let header = PayloadHeader::read_from(&mut reader)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self { header, data })
    }

    /// Serialize into a single buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse a buffer produced by [`EncodedPayload::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read_from(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> PayloadHeader {
        PayloadHeader {
            format: BitFormat::Packed,
            symbol_count: 9,
            bit_len: 14,
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = header().to_bytes();
        assert_eq!(&bytes[..6], b"HUFP\x01\x00");
        assert_eq!(bytes[6], 9);
        assert_eq!(bytes[14], 14);
        assert_eq!(PayloadHeader::from_bytes(&bytes).unwrap(), header());
    }

    #[test]
    fn test_data_len() {
        assert_eq!(header().data_len(), 2);
        assert_eq!(BitFormat::Packed.data_len(16), 2);
        assert_eq!(BitFormat::Packed.data_len(0), 0);
        assert_eq!(BitFormat::Ascii.data_len(14), 14);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = header().to_bytes();
        bytes[0] = b'X';
        let err = PayloadHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::BadMagic(m) if &m == b"XUFP"));
    }

    #[test]
    fn test_bad_version_and_format() {
        let mut bytes = header().to_bytes();
        bytes[4] = 9;
        assert!(matches!(
            PayloadHeader::from_bytes(&bytes),
            Err(Error::UnsupportedVersion(9))
        ));

        let mut bytes = header().to_bytes();
        bytes[5] = 7;
        assert!(matches!(
            PayloadHeader::from_bytes(&bytes),
            Err(Error::UnknownBitFormat(7))
        ));
    }

    #[test]
    fn test_short_header() {
        let err = PayloadHeader::read_from(&b"HUFP"[..]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_payload_buffer() {
        let payload = EncodedPayload {
            header: header(),
            data: vec![0xAB, 0xC0],
        };
        let bytes = payload.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + 2);
        assert_eq!(EncodedPayload::from_bytes(&bytes).unwrap(), payload);
    }
}
