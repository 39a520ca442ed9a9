//! The decoding transducer.
//!
//! A cursor starts at the root and follows one child per bit (`0` left,
//! `1` right). Reaching a leaf emits its symbol and resets the cursor. A
//! stream that ends while the cursor is between root and leaf is corrupt.

use std::io::{Read, Write};

use crate::bitio::{AsciiBitReader, BitReader, BitSource};
use crate::container::{BitFormat, EncodedPayload, PayloadHeader};
use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, Node};

const CHUNK: usize = 8 * 1024;

/// Tree cursor shared by the decoding entry points.
struct Walker<'a> {
    root: &'a Node,
    cursor: &'a Node,
}

impl<'a> Walker<'a> {
    fn new(root: &'a Node) -> Self {
        Self { root, cursor: root }
    }

    /// Follow one bit; returns the symbol when a leaf is reached.
    ///
    /// Must not be called on a single-leaf tree.
    fn step(&mut self, bit: bool) -> Option<u8> {
        if let Node::Internal { left, right, .. } = self.cursor {
            self.cursor = if bit { right } else { left };
        }
        if let Node::Leaf { symbol, .. } = self.cursor {
            self.cursor = self.root;
            return Some(*symbol);
        }
        None
    }

    fn at_root(&self) -> bool {
        std::ptr::eq(self.cursor, self.root)
    }
}

/// Decode every bit of `bits` against `tree`.
///
/// A single-leaf tree has an empty code, so no bit sequence other than the
/// empty one is valid for it; use [`Decoder::decode`] with a symbol count to
/// recover its symbols.
///
/// # Errors
/// Returns `Error::IncompleteCode` if the bits end mid-path, or if any bit is
/// supplied for a single-leaf tree.
pub fn decode_bits<I: IntoIterator<Item = bool>>(tree: &HuffmanTree, bits: I) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut bits = bits.into_iter();
    if tree.is_single_leaf() {
        return match bits.next() {
            Some(_) => Err(Error::IncompleteCode { bit_offset: 0 }),
            None => Ok(out),
        };
    }

    let mut walker = Walker::new(tree.root());
    let mut consumed = 0u64;
    for bit in bits {
        consumed += 1;
        if let Some(symbol) = walker.step(bit) {
            out.push(symbol);
        }
    }
    if !walker.at_root() {
        return Err(Error::IncompleteCode {
            bit_offset: consumed,
        });
    }
    Ok(out)
}

/// Huffman decoder.
pub struct Decoder<'a> {
    tree: &'a HuffmanTree,
}

impl<'a> Decoder<'a> {
    /// Create a decoder for `tree`.
    pub fn new(tree: &'a HuffmanTree) -> Self {
        Self { tree }
    }

    /// Decode exactly `header.bit_len` bits from `source` into `writer`.
    ///
    /// Returns the number of symbols written.
    ///
    /// # Errors
    /// - `Error::TruncatedPayload` if `source` ends early
    /// - `Error::IncompleteCode` if the last bit leaves the cursor mid-path
    /// - `Error::LengthMismatch` if the symbol count differs from the header
    pub fn decode<S: BitSource, W: Write>(
        &self,
        source: &mut S,
        header: &PayloadHeader,
        mut writer: W,
    ) -> Result<u64> {
        let mut buf = Vec::with_capacity(CHUNK);
        let mut emitted = 0u64;

        if let Node::Leaf { symbol, .. } = self.tree.root() {
            if header.bit_len != 0 {
                return Err(Error::IncompleteCode { bit_offset: 0 });
            }
            let mut remaining = header.symbol_count;
            while remaining > 0 {
                let n = remaining.min(CHUNK as u64) as usize;
                buf.clear();
                buf.resize(n, *symbol);
                writer.write_all(&buf)?;
                remaining -= n as u64;
            }
            writer.flush()?;
            return Ok(header.symbol_count);
        }

        let mut walker = Walker::new(self.tree.root());
        for read in 0..header.bit_len {
            let bit = source.read_bit()?.ok_or(Error::TruncatedPayload {
                expected_bits: header.bit_len,
                actual_bits: read,
            })?;
            if let Some(symbol) = walker.step(bit) {
                buf.push(symbol);
                emitted += 1;
                if buf.len() == CHUNK {
                    writer.write_all(&buf)?;
                    buf.clear();
                }
            }
        }
        writer.write_all(&buf)?;
        writer.flush()?;

        if !walker.at_root() {
            return Err(Error::IncompleteCode {
                bit_offset: header.bit_len,
            });
        }
        if emitted != header.symbol_count {
            return Err(Error::LengthMismatch {
                expected: header.symbol_count,
                actual: emitted,
            });
        }
        Ok(emitted)
    }

    /// Read a framed payload from `reader` and decode it into `writer`.
    pub fn decode_from<R: Read, W: Write>(&self, mut reader: R, writer: W) -> Result<PayloadHeader> {
        let header = PayloadHeader::read_from(&mut reader)?;
        match header.format {
            BitFormat::Packed => self.decode(&mut BitReader::new(reader), &header, writer)?,
            BitFormat::Ascii => self.decode(&mut AsciiBitReader::new(reader), &header, writer)?,
        };
        log::debug!(
            "Decoded {} symbols from {} bits ({:?})",
            header.symbol_count,
            header.bit_len,
            header.format
        );
        Ok(header)
    }

    /// Decode an in-memory payload.
    pub fn decode_payload(&self, payload: &EncodedPayload) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let data = &payload.data[..];
        match payload.header.format {
            BitFormat::Packed => {
                self.decode(&mut BitReader::new(data), &payload.header, &mut out)?
            }
            BitFormat::Ascii => {
                self.decode(&mut AsciiBitReader::new(data), &payload.header, &mut out)?
            }
        };
        Ok(out)
    }
}
