//! Byte frequency counting.
//!
//! A [`FrequencyTable`] is the only input the tree builder needs. It is built
//! once per encode session and dropped after the tree exists.

use std::io::{ErrorKind, Read};

use crate::error::Result;

const CHUNK: usize = 8 * 1024;

/// Occurrence counts for every byte value.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    /// Create a table with every count at zero.
    pub fn new() -> Self {
        Self { counts: [0; 256] }
    }

    /// Read `reader` to the end, counting every byte.
    ///
    /// The stream is fully consumed; rewinding it is the caller's job.
    ///
    /// # Errors
    /// Returns `Error::Io` if the stream cannot be read.
    pub fn count<R: Read>(mut reader: R) -> Result<Self> {
        let mut table = Self::new();
        let mut buf = [0u8; CHUNK];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            table.add_bytes(&buf[..n]);
        }
        log::trace!("Byte frequency: {:?}", table);
        Ok(table)
    }

    /// Count the bytes of an in-memory slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.add_bytes(data);
        table
    }

    /// Build a table from an explicit count array.
    pub fn from_counts(counts: [u64; 256]) -> Self {
        Self { counts }
    }

    fn add_bytes(&mut self, data: &[u8]) {
        for &b in data {
            self.counts[b as usize] += 1;
        }
    }

    /// Count recorded for `symbol`.
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Number of distinct byte values with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// True when no byte has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Iterate `(symbol, count)` over non-zero entries in ascending symbol order.
    pub fn symbols(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.symbols()).finish()
    }
}
