//! Bit-level I/O.
//!
//! Two wire representations share the [`BitSink`] / [`BitSource`] traits:
//!
//! - **Packed**: eight bits per byte, most significant bit first. The final
//!   partial byte is padded with zero bits; the caller tracks the exact bit
//!   count.
//! - **ASCII**: one `'0'` or `'1'` byte per bit. Eight times larger, but
//!   readable in a text editor. Kept for debugging and interchange.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};

const CHUNK: usize = 8 * 1024;

/// Destination for a stream of bits.
pub trait BitSink {
    /// Append one bit.
    fn write_bit(&mut self, bit: bool) -> Result<()>;

    /// Number of bits written so far.
    fn bits_written(&self) -> u64;

    /// Append the low `count` bits of `value`, most significant first.
    fn write_bits(&mut self, value: u64, count: u32) -> Result<()> {
        debug_assert!(count <= 64);
        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }
}

/// Source of a stream of bits.
pub trait BitSource {
    /// Next bit, or `None` once the underlying data is exhausted.
    fn read_bit(&mut self) -> Result<Option<bool>>;

    /// Number of bits returned so far.
    fn bits_read(&self) -> u64;

    /// Number of bytes pulled from the underlying reader so far.
    fn bytes_read(&self) -> u64;

    /// Read `count` bits, most significant first.
    ///
    /// Returns `None` if the data ends before `count` bits are available.
    fn read_bits(&mut self, count: u32) -> Result<Option<u64>> {
        debug_assert!(count <= 64);
        let mut value = 0u64;
        for _ in 0..count {
            match self.read_bit()? {
                Some(bit) => value = (value << 1) | bit as u64,
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }
}

/// Buffered byte output shared by both writers.
struct ByteSink<W: Write> {
    inner: W,
    buf: Vec<u8>,
}

impl<W: Write> ByteSink<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(CHUNK),
        }
    }

    fn push(&mut self, byte: u8) -> Result<()> {
        self.buf.push(byte);
        if self.buf.len() >= CHUNK {
            self.flush_buf()?;
        }
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.inner.write_all(&self.buf)?;
        self.buf.clear();
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        self.flush_buf()?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Buffered byte input shared by both readers.
///
/// With a capacity of one it never pulls a byte it does not hand out, which
/// lets a self-delimiting structure be read from the front of a longer stream.
struct ByteSource<R: Read> {
    inner: R,
    buf: Box<[u8]>,
    pos: usize,
    len: usize,
    consumed: u64,
}

impl<R: Read> ByteSource<R> {
    fn with_capacity(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            len: 0,
            consumed: 0,
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.pos == self.len {
            loop {
                match self.inner.read(&mut self.buf) {
                    Ok(0) => return Ok(None),
                    Ok(n) => {
                        self.pos = 0;
                        self.len = n;
                        break;
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        self.consumed += 1;
        Ok(Some(byte))
    }
}

/// Packs bits MSB-first into bytes.
///
/// # Invariants
/// - `filled` is always < 8; a full accumulator is flushed immediately.
pub struct BitWriter<W: Write> {
    out: ByteSink<W>,
    acc: u8,
    filled: u8,
    bits: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a writer over `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            out: ByteSink::new(inner),
            acc: 0,
            filled: 0,
            bits: 0,
        }
    }

    /// Pad the final byte with zeros, flush, and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        if self.filled > 0 {
            let byte = self.acc << (8 - self.filled);
            self.out.push(byte)?;
        }
        self.out.finish()
    }
}

impl<W: Write> BitSink for BitWriter<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.acc = (self.acc << 1) | bit as u8;
        self.filled += 1;
        self.bits += 1;
        if self.filled == 8 {
            self.out.push(self.acc)?;
            self.acc = 0;
            self.filled = 0;
        }
        Ok(())
    }

    fn bits_written(&self) -> u64 {
        self.bits
    }
}

/// Reads bits MSB-first from bytes.
///
/// Padding bits in the last byte are indistinguishable from data; callers
/// stop at a known bit count.
pub struct BitReader<R: Read> {
    src: ByteSource<R>,
    cur: u8,
    left: u8,
    bits: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a buffered reader over `inner`.
    pub fn new(inner: R) -> Self {
        Self::with_source(ByteSource::with_capacity(inner, CHUNK))
    }

    /// Create a reader that never pulls more bytes from `inner` than it has
    /// started to consume.
    pub fn unbuffered(inner: R) -> Self {
        Self::with_source(ByteSource::with_capacity(inner, 1))
    }

    fn with_source(src: ByteSource<R>) -> Self {
        Self {
            src,
            cur: 0,
            left: 0,
            bits: 0,
        }
    }
}

impl<R: Read> BitSource for BitReader<R> {
    fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.left == 0 {
            match self.src.next_byte()? {
                Some(byte) => {
                    self.cur = byte;
                    self.left = 8;
                }
                None => return Ok(None),
            }
        }
        let bit = self.cur & 0x80 != 0;
        self.cur <<= 1;
        self.left -= 1;
        self.bits += 1;
        Ok(Some(bit))
    }

    fn bits_read(&self) -> u64 {
        self.bits
    }

    fn bytes_read(&self) -> u64 {
        self.src.consumed
    }
}

/// Writes one ASCII `'0'` / `'1'` byte per bit.
pub struct AsciiBitWriter<W: Write> {
    out: ByteSink<W>,
    bits: u64,
}

impl<W: Write> AsciiBitWriter<W> {
    /// Create a writer over `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            out: ByteSink::new(inner),
            bits: 0,
        }
    }

    /// Flush and return the inner writer.
    pub fn finish(self) -> Result<W> {
        self.out.finish()
    }
}

impl<W: Write> BitSink for AsciiBitWriter<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.out.push(if bit { b'1' } else { b'0' })?;
        self.bits += 1;
        Ok(())
    }

    fn bits_written(&self) -> u64 {
        self.bits
    }
}

/// Reads one ASCII `'0'` / `'1'` byte per bit.
pub struct AsciiBitReader<R: Read> {
    src: ByteSource<R>,
}

impl<R: Read> AsciiBitReader<R> {
    /// Create a reader over `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            src: ByteSource::with_capacity(inner, CHUNK),
        }
    }
}

impl<R: Read> BitSource for AsciiBitReader<R> {
    fn read_bit(&mut self) -> Result<Option<bool>> {
        let offset = self.src.consumed;
        match self.src.next_byte()? {
            None => Ok(None),
            Some(b'0') => Ok(Some(false)),
            Some(b'1') => Ok(Some(true)),
            Some(byte) => Err(Error::InvalidAsciiBit { offset, byte }),
        }
    }

    fn bits_read(&self) -> u64 {
        self.src.consumed
    }

    fn bytes_read(&self) -> u64 {
        self.src.consumed
    }
}
