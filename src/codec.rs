//! Tree serialization.
//!
//! Both formats are a pre-order walk and are self-delimiting: a reader stops
//! as soon as the last leaf of the tree has been read.
//!
//! # Tagged (default)
//!
//! One tag bit per node, `1` for internal and `0` for leaf. A leaf tag is
//! followed by the 8 bits of its symbol. Bits are packed MSB-first and the
//! final byte is zero-padded, so a tree of `n` leaves takes
//! `ceil((10n - 1) / 8)` bytes. Every byte value can appear as a leaf.
//!
//! # Marker
//!
//! The historical byte-oriented layout: an internal node is the byte `'#'`
//! followed by its left and right subtrees, a leaf is its raw symbol byte.
//! A leaf holding `'#'` would read back as an internal node, so writing such
//! a tree fails with `Error::MarkerCollision`.

use std::io::{Read, Write};

use crate::bitio::{BitReader, BitSink, BitSource, BitWriter};
use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, Node};

/// Byte that marks an internal node in [`TreeFormat::Marker`].
pub const MARKER: u8 = b'#';

/// On-disk tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeFormat {
    /// Tag bit per node, symbols only after leaf tags.
    #[default]
    Tagged,
    /// `'#'` byte per internal node, raw byte per leaf.
    Marker,
}

/// Serialize `tree` in the tagged format.
pub fn write_tree(tree: &HuffmanTree) -> Result<Vec<u8>> {
    write_tree_with(tree, TreeFormat::Tagged)
}

/// Serialize `tree` in the given format.
///
/// # Errors
/// Returns `Error::MarkerCollision` if `format` is `Marker` and a leaf holds
/// the marker byte.
pub fn write_tree_with(tree: &HuffmanTree, format: TreeFormat) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_tree_to(tree, format, &mut out)?;
    Ok(out)
}

/// Serialize `tree` into `writer`.
///
/// For the marker format the collision check runs before anything is
/// written.
pub fn write_tree_to<W: Write>(tree: &HuffmanTree, format: TreeFormat, writer: W) -> Result<()> {
    if format == TreeFormat::Marker && tree.leaves().any(|(s, _)| s == MARKER) {
        return Err(Error::MarkerCollision);
    }
    let mut sink = BitWriter::new(writer);
    write_node(tree.root(), format, &mut sink)?;
    sink.finish()?;
    Ok(())
}

fn write_node<S: BitSink>(node: &Node, format: TreeFormat, sink: &mut S) -> Result<()> {
    match (node, format) {
        (Node::Leaf { symbol, .. }, TreeFormat::Tagged) => {
            sink.write_bit(false)?;
            sink.write_bits(*symbol as u64, 8)
        }
        (Node::Leaf { symbol, .. }, TreeFormat::Marker) => sink.write_bits(*symbol as u64, 8),
        (Node::Internal { left, right, .. }, _) => {
            match format {
                TreeFormat::Tagged => sink.write_bit(true)?,
                TreeFormat::Marker => sink.write_bits(MARKER as u64, 8)?,
            }
            write_node(left, format, sink)?;
            write_node(right, format, sink)
        }
    }
}

/// Reconstruct a tree from tagged bytes. Bytes after the tree are ignored.
pub fn read_tree(bytes: &[u8]) -> Result<HuffmanTree> {
    read_tree_with(bytes, TreeFormat::Tagged)
}

/// Reconstruct a tree from bytes in the given format.
pub fn read_tree_with(bytes: &[u8], format: TreeFormat) -> Result<HuffmanTree> {
    read_tree_from(bytes, format)
}

/// Reconstruct a tree from the front of `reader`.
///
/// Only the bytes that hold the tree are pulled from `reader`, so whatever
/// follows can still be read by the caller.
///
/// # Errors
/// - `Error::TruncatedTree` if the data ends before the tree is complete
/// - `Error::DuplicateSymbol` if two leaves hold the same byte
/// - `Error::TreeTooLarge` if more than 255 internal nodes appear
pub fn read_tree_from<R: Read>(reader: R, format: TreeFormat) -> Result<HuffmanTree> {
    let mut parser = Parser {
        src: BitReader::unbuffered(reader),
        format,
        seen: [false; 256],
        internals: 0,
    };
    let root = parser.node()?;
    log::debug!("Read {:?} tree: {} bytes", format, parser.src.bytes_read());
    Ok(HuffmanTree::from_root(root))
}

/// Recursive-descent reader. Depth is bounded by the 255 internal node limit.
struct Parser<S> {
    src: S,
    format: TreeFormat,
    seen: [bool; 256],
    internals: usize,
}

impl<S: BitSource> Parser<S> {
    fn node(&mut self) -> Result<Node> {
        let internal = match self.format {
            TreeFormat::Tagged => self.bit()?,
            TreeFormat::Marker => {
                let byte = self.byte()?;
                if byte != MARKER {
                    return self.leaf(byte);
                }
                true
            }
        };

        if !internal {
            let symbol = self.byte()?;
            return self.leaf(symbol);
        }

        self.internals += 1;
        if self.internals > 255 {
            return Err(Error::TreeTooLarge {
                offset: self.src.bytes_read(),
            });
        }
        let left = self.node()?;
        let right = self.node()?;
        Ok(Node::internal(left, right, 0))
    }

    fn leaf(&mut self, symbol: u8) -> Result<Node> {
        if std::mem::replace(&mut self.seen[symbol as usize], true) {
            return Err(Error::DuplicateSymbol {
                symbol,
                offset: self.src.bytes_read().saturating_sub(1),
            });
        }
        Ok(Node::leaf(symbol, 0))
    }

    fn bit(&mut self) -> Result<bool> {
        self.src.read_bit()?.ok_or(Error::TruncatedTree {
            offset: self.src.bytes_read(),
        })
    }

    fn byte(&mut self) -> Result<u8> {
        match self.src.read_bits(8)? {
            Some(v) => Ok(v as u8),
            None => Err(Error::TruncatedTree {
                offset: self.src.bytes_read(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn literal_tree() -> HuffmanTree {
        HuffmanTree::build(&FrequencyTable::from_bytes(b"aaaabbbcc")).unwrap()
    }

    #[test]
    fn test_tagged_layout() {
        let bytes = write_tree(&literal_tree()).unwrap();
        // 1 0[a] 1 0[c] 0[b], 29 bits
        assert_eq!(bytes, vec![0b1001_1000, 0b0110_0110, 0b0011_0011, 0b0001_0000]);
    }

    #[test]
    fn test_marker_layout() {
        let bytes = write_tree_with(&literal_tree(), TreeFormat::Marker).unwrap();
        assert_eq!(bytes, b"#a#cb");
        let back = read_tree_with(&bytes, TreeFormat::Marker).unwrap();
        assert!(back.same_shape(&literal_tree()));
    }

    #[test]
    fn test_single_leaf() {
        let tree = HuffmanTree::from_root(Node::leaf(0x41, 1000));
        let bytes = write_tree(&tree).unwrap();
        assert_eq!(bytes, vec![0b0010_0000, 0b1000_0000]);
        let back = read_tree(&bytes).unwrap();
        assert_eq!(back.root(), &Node::leaf(0x41, 0));
    }

    #[test]
    fn test_marker_collision_rejected() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"##ab")).unwrap();
        let mut out = Vec::new();
        let err = write_tree_to(&tree, TreeFormat::Marker, &mut out).unwrap_err();
        assert!(matches!(err, Error::MarkerCollision));
        assert!(out.is_empty());
    }

    #[test]
    fn test_marker_byte_tagged_roundtrip() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"##ab")).unwrap();
        let back = read_tree(&write_tree(&tree).unwrap()).unwrap();
        assert!(back.same_shape(&tree));
    }

    #[test]
    fn test_truncated_prefixes() {
        let bytes = write_tree(&literal_tree()).unwrap();
        for n in 0..bytes.len() {
            let err = read_tree(&bytes[..n]).unwrap_err();
            assert!(
                matches!(err, Error::TruncatedTree { offset } if offset == n as u64),
                "prefix {n}: {err:?}"
            );
        }
    }

    #[test]
    fn test_duplicate_symbol() {
        let mut w = BitWriter::new(Vec::new());
        w.write_bit(true).unwrap();
        w.write_bit(false).unwrap();
        w.write_bits(5, 8).unwrap();
        w.write_bit(false).unwrap();
        w.write_bits(5, 8).unwrap();
        let bytes = w.finish().unwrap();
        let err = read_tree(&bytes).unwrap_err();
        assert!(matches!(err, Error::DuplicateSymbol { symbol: 5, .. }));
    }

    #[test]
    fn test_too_many_internal_nodes() {
        let err = read_tree(&[0xFF; 64]).unwrap_err();
        assert!(matches!(err, Error::TreeTooLarge { offset: 32 }));
    }

    #[test]
    fn test_reader_leaves_trailing_bytes() {
        let mut data = write_tree(&literal_tree()).unwrap();
        let tree_len = data.len() as u64;
        data.extend_from_slice(b"payload");
        let mut cursor = Cursor::new(&data[..]);
        let tree = read_tree_from(&mut cursor, TreeFormat::Tagged).unwrap();
        assert!(tree.same_shape(&literal_tree()));
        assert_eq!(cursor.position(), tree_len);
    }

    proptest! {
        #[test]
        fn prop_tree_roundtrip(data in prop::collection::vec(any::<u8>(), 1..1024)) {
            let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&data)).unwrap();
            let bytes = write_tree(&tree).unwrap();
            let n = tree.leaf_count();
            prop_assert_eq!(bytes.len(), (10 * n - 1 + 7) / 8);
            let back = read_tree(&bytes).unwrap();
            prop_assert!(back.same_shape(&tree));
        }

        #[test]
        fn prop_hostile_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let _ = read_tree(&data);
            let _ = read_tree_with(&data, TreeFormat::Marker);
        }
    }
}
