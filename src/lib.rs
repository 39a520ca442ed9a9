//! # Huffman coding
//!
//! *Greedy optimal prefix codes over the byte alphabet.*
//!
//! ## Intuition First
//!
//! Frequent bytes should cost fewer bits than rare ones. Huffman's algorithm
//! finds the best possible per-symbol bit lengths for a known distribution by
//! repeatedly merging the two rarest subtrees. The resulting binary tree *is*
//! the code: the path from the root to a leaf, read as `0` = left and
//! `1` = right, is that leaf's codeword. No codeword is a prefix of another,
//! so a concatenation of codewords needs no separators.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ──► FrequencyTable ──► HuffmanTree ──┬──► codec::write_tree ──► tree artifact
//!                                            └──► Encoder ──► PayloadHeader + code bits
//!
//! tree artifact ──► codec::read_tree ──► Decoder ◄── PayloadHeader + code bits
//!                                           └──► bytes
//! ```
//!
//! ## Failure Modes
//!
//! 1. **Empty input**: no symbol, no tree (`Error::EmptyInput`).
//! 2. **One distinct byte**: the root is a leaf and its code is empty. The
//!    payload header's symbol count carries all the information.
//! 3. **Corrupt artifacts**: truncated trees, truncated payloads and streams
//!    that stop mid-codeword are reported, never silently decoded.
//!
//! ## Example
//!
//! ```
//! use huff::{BitFormat, Decoder, Encoder, FrequencyTable, HuffmanTree};
//!
//! let data = b"aaaabbbcc";
//! let tree = HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap();
//!
//! let payload = Encoder::new(&tree).encode_bytes(data, BitFormat::Packed).unwrap();
//! assert_eq!(payload.header.bit_len, 14);
//!
//! let stored = huff::codec::write_tree(&tree).unwrap();
//! let loaded = huff::codec::read_tree(&stored).unwrap();
//! let decoded = Decoder::new(&loaded).decode_payload(&payload).unwrap();
//! assert_eq!(decoded, data);
//! ```
//!
//! ## References
//!
//! - Huffman, D. A. (1952). "A Method for the Construction of Minimum-Redundancy Codes."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitio;
pub mod codec;
pub mod container;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod session;
pub mod tree;

pub use codec::TreeFormat;
pub use container::{BitFormat, EncodedPayload, PayloadHeader};
pub use decoder::Decoder;
pub use encoder::{Code, CodeTable, Encoder};
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use session::{Config, Session};
pub use tree::{HuffmanTree, Node};
