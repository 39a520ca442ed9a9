//! Error types for Huffman coding.

use thiserror::Error;

/// Error variants for Huffman operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred while reading a source or writing a destination.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The input contained no bytes, so no tree can be built.
    #[error("empty input: cannot build a Huffman tree without at least one symbol")]
    EmptyInput,

    /// A serialized tree ended before a complete tree was read.
    #[error("truncated tree: data ended at byte offset {offset}")]
    TruncatedTree {
        /// Byte offset at which the data ran out.
        offset: u64,
    },

    /// The bit stream ended while the decoder was between root and leaf.
    #[error("incomplete code: bit stream ended mid-path at bit offset {bit_offset}")]
    IncompleteCode {
        /// Number of bits consumed when the stream ended.
        bit_offset: u64,
    },

    /// The payload header promised more bits than the data holds.
    #[error("truncated payload: expected {expected_bits} bits, found {actual_bits}")]
    TruncatedPayload {
        /// Bit count recorded in the header.
        expected_bits: u64,
        /// Bits actually available.
        actual_bits: u64,
    },

    /// A symbol has no leaf in the tree used for encoding.
    #[error("symbol {0:#04x} not found in tree")]
    SymbolNotFound(u8),

    /// The marker tree format cannot represent a leaf holding the marker byte.
    #[error("leaf symbol 0x23 ('#') collides with the internal-node marker")]
    MarkerCollision,

    /// A serialized tree holds the same symbol in two leaves.
    #[error("duplicate leaf symbol {symbol:#04x} at byte offset {offset}")]
    DuplicateSymbol {
        /// The repeated symbol.
        symbol: u8,
        /// Byte offset of the second occurrence.
        offset: u64,
    },

    /// A serialized tree has more internal nodes than a byte alphabet allows.
    #[error("tree too large: more than 255 internal nodes at byte offset {offset}")]
    TreeTooLarge {
        /// Byte offset at which the limit was exceeded.
        offset: u64,
    },

    /// A byte other than `'0'` or `'1'` appeared in an ASCII bit stream.
    #[error("invalid ascii bit {byte:#04x} at byte offset {offset}")]
    InvalidAsciiBit {
        /// Byte offset of the offending byte.
        offset: u64,
        /// The offending byte.
        byte: u8,
    },

    /// The payload does not start with the expected magic bytes.
    #[error("bad payload magic: {0:?}")]
    BadMagic([u8; 4]),

    /// The payload header version is not understood.
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u8),

    /// The payload header names an unknown bit format.
    #[error("unknown bit format {0}")]
    UnknownBitFormat(u8),

    /// A symbol or bit count disagrees with the payload header.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Count recorded in the header.
        expected: u64,
        /// Count actually produced.
        actual: u64,
    },
}

/// A specialized Result type for Huffman operations.
pub type Result<T> = std::result::Result<T, Error>;
