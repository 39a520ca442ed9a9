//! Symbol codes and the encoding transducer.
//!
//! A symbol's code is the path from the root to its leaf: `0` for each left
//! descent, `1` for each right descent. The [`Encoder`] precomputes every
//! code once and then appends codes to a [`BitSink`] in stream order, with
//! no delimiters between symbols.
//!
//! When the tree is a single leaf, the only symbol's code is empty and
//! encoding emits zero bits; only the symbol count survives in the payload
//! header.

use std::fmt;
use std::io::{ErrorKind, Read, Write};

use crate::bitio::{AsciiBitWriter, BitSink, BitWriter};
use crate::container::{BitFormat, EncodedPayload, PayloadHeader, HEADER_LEN};
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::tree::{HuffmanTree, Node};

const CHUNK: usize = 8 * 1024;

/// Root-to-leaf path of one symbol.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    /// Build a code from explicit bits, `false` meaning left.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// The bits, first descent first.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for the code of a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// True when `self` is a prefix of `other` (including equality).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({self})")
    }
}

/// Find the code of `symbol` by depth-first search.
///
/// # Errors
/// Returns `Error::SymbolNotFound` if no leaf holds `symbol`.
pub fn derive_code(tree: &HuffmanTree, symbol: u8) -> Result<Code> {
    let mut path = Vec::new();
    if search(tree.root(), symbol, &mut path) {
        Ok(Code { bits: path })
    } else {
        Err(Error::SymbolNotFound(symbol))
    }
}

fn search(node: &Node, symbol: u8, path: &mut Vec<bool>) -> bool {
    match node {
        Node::Leaf { symbol: s, .. } => *s == symbol,
        Node::Internal { left, right, .. } => {
            path.push(false);
            if search(left, symbol, path) {
                return true;
            }
            path.pop();
            path.push(true);
            if search(right, symbol, path) {
                return true;
            }
            path.pop();
            false
        }
    }
}

/// Code of every symbol present in a tree.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: Vec<Option<Code>>, // symbol -> code
}

impl CodeTable {
    /// Walk `tree` once and record every leaf's path.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = vec![None; 256];
        Self::build_codes(tree.root(), Vec::new(), &mut codes);
        Self { codes }
    }

    fn build_codes(node: &Node, prefix: Vec<bool>, codes: &mut Vec<Option<Code>>) {
        match node {
            Node::Leaf { symbol, .. } => {
                codes[*symbol as usize] = Some(Code { bits: prefix });
            }
            Node::Internal { left, right, .. } => {
                let mut left_prefix = prefix.clone();
                left_prefix.push(false);
                Self::build_codes(left, left_prefix, codes);

                let mut right_prefix = prefix;
                right_prefix.push(true);
                Self::build_codes(right, right_prefix, codes);
            }
        }
    }

    /// Code for `symbol`, if the tree holds it.
    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    /// Iterate `(symbol, code)` in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.as_ref().map(|c| (s as u8, c)))
    }

    /// Exact header for encoding a stream with the counts in `table`.
    ///
    /// # Errors
    /// Returns `Error::SymbolNotFound` if `table` counts a symbol this table
    /// has no code for.
    pub fn header_for(&self, table: &FrequencyTable, format: BitFormat) -> Result<PayloadHeader> {
        let mut bit_len = 0u64;
        for (symbol, count) in table.symbols() {
            let code = self.get(symbol).ok_or(Error::SymbolNotFound(symbol))?;
            bit_len += count * code.len() as u64;
        }
        Ok(PayloadHeader {
            format,
            symbol_count: table.total(),
            bit_len,
        })
    }
}

/// Huffman encoder.
pub struct Encoder {
    codes: CodeTable,
}

impl Encoder {
    /// Create an encoder for `tree`.
    pub fn new(tree: &HuffmanTree) -> Self {
        let codes = CodeTable::from_tree(tree);
        if log::log_enabled!(log::Level::Trace) {
            for (symbol, code) in codes.iter() {
                log::trace!("code {symbol:#04x} -> {code}");
            }
        }
        Self { codes }
    }

    /// The precomputed codes.
    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    /// Append the code of every byte of `reader` to `sink`.
    ///
    /// Returns the number of symbols encoded.
    ///
    /// # Errors
    /// - `Error::Io` if `reader` or the sink fails
    /// - `Error::SymbolNotFound` if a byte has no leaf in the tree
    pub fn encode<R: Read, S: BitSink>(&self, mut reader: R, sink: &mut S) -> Result<u64> {
        let mut buf = [0u8; CHUNK];
        let mut symbols = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &b in &buf[..n] {
                let code = self.codes.get(b).ok_or(Error::SymbolNotFound(b))?;
                for &bit in code.bits() {
                    sink.write_bit(bit)?;
                }
            }
            symbols += n as u64;
        }
        Ok(symbols)
    }

    /// Encode `reader` into `writer` as a framed payload.
    ///
    /// The header is computed from `table` and written first; `reader` must
    /// yield exactly the bytes `table` counted.
    ///
    /// # Errors
    /// Returns `Error::LengthMismatch` if the stream differs from `table`.
    pub fn encode_to<R: Read, W: Write>(
        &self,
        table: &FrequencyTable,
        reader: R,
        format: BitFormat,
        mut writer: W,
    ) -> Result<PayloadHeader> {
        let header = self.codes.header_for(table, format)?;
        header.write_to(&mut writer)?;
        let (symbols, bits) = match format {
            BitFormat::Packed => {
                let mut sink = BitWriter::new(writer);
                let symbols = self.encode(reader, &mut sink)?;
                let bits = sink.bits_written();
                sink.finish()?;
                (symbols, bits)
            }
            BitFormat::Ascii => {
                let mut sink = AsciiBitWriter::new(writer);
                let symbols = self.encode(reader, &mut sink)?;
                let bits = sink.bits_written();
                sink.finish()?;
                (symbols, bits)
            }
        };
        if symbols != header.symbol_count {
            return Err(Error::LengthMismatch {
                expected: header.symbol_count,
                actual: symbols,
            });
        }
        if bits != header.bit_len {
            return Err(Error::LengthMismatch {
                expected: header.bit_len,
                actual: bits,
            });
        }
        log::debug!("Encoded {} symbols into {} bits ({:?})", symbols, bits, format);
        Ok(header)
    }

    /// Encode an in-memory buffer.
    pub fn encode_bytes(&self, data: &[u8], format: BitFormat) -> Result<EncodedPayload> {
        let table = FrequencyTable::from_bytes(data);
        let mut out = Vec::new();
        let header = self.encode_to(&table, data, format, &mut out)?;
        let data = out.split_off(HEADER_LEN);
        Ok(EncodedPayload { header, data })
    }
}
