//! File-level encode/decode sessions.
//!
//! A [`Session`] owns the artifact paths and the tree loaded for the current
//! run, so front ends never keep that state in globals. Encoding writes two
//! artifacts: the serialized tree and the framed payload. Decoding reads
//! them back.
//!
//! A destination that was created by a failing operation is removed before
//! the error is returned.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use crate::codec::{self, TreeFormat};
use crate::container::{BitFormat, PayloadHeader};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::tree::HuffmanTree;

/// Default tree artifact path.
pub const DEFAULT_TREE_PATH: &str = "tree.txt";
/// Default payload artifact path.
pub const DEFAULT_PAYLOAD_PATH: &str = "encoded.bin";
/// Default decode destination.
pub const DEFAULT_OUTPUT_PATH: &str = "decoded.txt";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the serialized tree is written and read.
    pub tree_path: PathBuf,
    /// Where the framed payload is written and read.
    pub payload_path: PathBuf,
    /// Storage of payload code bits.
    pub bit_format: BitFormat,
    /// Layout of the tree artifact.
    pub tree_format: TreeFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree_path: PathBuf::from(DEFAULT_TREE_PATH),
            payload_path: PathBuf::from(DEFAULT_PAYLOAD_PATH),
            bit_format: BitFormat::default(),
            tree_format: TreeFormat::default(),
        }
    }
}

/// Outcome of [`Session::encode_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeReport {
    /// Bytes read from the input.
    pub input_bytes: u64,
    /// Distinct byte values in the input.
    pub distinct_symbols: usize,
    /// Size of the tree artifact.
    pub tree_bytes: u64,
    /// Header written to the payload artifact.
    pub header: PayloadHeader,
}

/// Outcome of [`Session::decode_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    /// Header read from the payload artifact.
    pub header: PayloadHeader,
    /// Bytes written to the output.
    pub output_bytes: u64,
}

/// State for one front-end run.
#[derive(Debug, Default)]
pub struct Session {
    config: Config,
    tree: Option<HuffmanTree>,
}

impl Session {
    /// Create a session with no tree loaded.
    pub fn new(config: Config) -> Self {
        Self { config, tree: None }
    }

    /// The session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The tree built or loaded most recently.
    pub fn tree(&self) -> Option<&HuffmanTree> {
        self.tree.as_ref()
    }

    /// Compress `input` into the configured tree and payload artifacts.
    ///
    /// The input is read twice: once to count, once to encode.
    pub fn encode_file(&mut self, input: &Path) -> Result<EncodeReport> {
        log::debug!("Encoding {}", input.display());
        let mut file = File::open(input)?;
        let table = FrequencyTable::count(BufReader::new(&mut file))?;
        let tree = HuffmanTree::build(&table)?;

        let tree_bytes = codec::write_tree_with(&tree, self.config.tree_format)?;
        create_with(&self.config.tree_path, |w| {
            w.write_all(&tree_bytes)?;
            Ok(())
        })?;

        file.rewind()?;
        let encoder = Encoder::new(&tree);
        let format = self.config.bit_format;
        let header = create_with(&self.config.payload_path, |w| {
            encoder.encode_to(&table, BufReader::new(&mut file), format, w)
        })
        .inspect_err(|_| remove_partial(&self.config.tree_path))?;

        let report = EncodeReport {
            input_bytes: table.total(),
            distinct_symbols: table.distinct(),
            tree_bytes: tree_bytes.len() as u64,
            header,
        };
        self.tree = Some(tree);
        log::debug!("Encode finished: {:?}", report);
        Ok(report)
    }

    /// Read the configured tree artifact and keep it in the session.
    pub fn load_tree(&mut self) -> Result<&HuffmanTree> {
        let file = File::open(&self.config.tree_path)?;
        let tree = codec::read_tree_from(BufReader::new(file), self.config.tree_format)?;
        log::debug!(
            "Loaded tree from {}: {} leaves",
            self.config.tree_path.display(),
            tree.leaf_count()
        );
        Ok(&*self.tree.insert(tree))
    }

    /// Decode the configured payload artifact into `output`.
    ///
    /// The tree artifact is always reloaded, since it may have changed on
    /// disk since the last call.
    pub fn decode_file(&mut self, output: &Path) -> Result<DecodeReport> {
        let payload_path = self.config.payload_path.clone();
        let tree = self.load_tree()?;
        let payload = BufReader::new(File::open(&payload_path)?);
        let decoder = Decoder::new(tree);
        let header = create_with(output, |w| decoder.decode_from(payload, w))?;
        let report = DecodeReport {
            header,
            output_bytes: header.symbol_count,
        };
        log::debug!("Decode finished into {}: {:?}", output.display(), report);
        Ok(report)
    }
}

/// Create `path`, run `f` on a buffered writer, and remove the file if
/// anything fails.
fn create_with<T, F>(path: &Path, f: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let result = f(&mut writer).and_then(|value| {
        writer.flush()?;
        Ok(value)
    });
    if result.is_err() {
        drop(writer);
        remove_partial(path);
    }
    result
}

fn remove_partial(path: &Path) {
    log::warn!("Removing partial output {}", path.display());
    if let Err(e) = fs::remove_file(path) {
        log::warn!("Could not remove {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tree_path, PathBuf::from("tree.txt"));
        assert_eq!(config.payload_path, PathBuf::from("encoded.bin"));
        assert_eq!(config.bit_format, BitFormat::Packed);
        assert_eq!(config.tree_format, TreeFormat::Tagged);
    }

    #[test]
    fn test_new_session_has_no_tree() {
        assert!(Session::new(Config::default()).tree().is_none());
    }
}
