//! Succinct bit vector with rank/select support.
//!
//! The wavelet matrix stores one of these per bit plane, so every query it
//! answers bottoms out in `rank` and `select` calls here.
//!
//! # Layout
//!
//! Storage is the raw word array plus a rank directory with one entry per
//! 512-bit block holding the absolute number of ones before that block:
//! - `rank1` reads a single directory entry and popcounts at most eight
//!   words.
//! - `select1`/`select0` binary-search the directory for the right block,
//!   then scan that block word by word.
//!
//! The directory is derived data. Serialization carries only the bit length
//! and the raw words; the directory is rebuilt on decode.

use std::io::{Read, Write};

use crate::codec;
use crate::error::{Error, Result};

/// Bits covered by one rank-directory entry.
const BLOCK_BITS: usize = 512;
/// Words per rank block.
const BLOCK_WORDS: usize = BLOCK_BITS / 64;

/// Append-only builder for [`BitVector`].
#[derive(Debug, Clone, Default)]
pub struct BitVectorBuilder {
    words: Vec<u64>,
    len: usize,
}

impl BitVectorBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `n` bits.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            words: Vec::with_capacity(n.div_ceil(64)),
            len: 0,
        }
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        if self.len % 64 == 0 {
            self.words.push(0);
        }
        if bit {
            self.words[self.len / 64] |= 1u64 << (self.len % 64);
        }
        self.len += 1;
    }

    /// Number of bits pushed so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if no bits have been pushed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Freeze the accumulated bits into an indexed [`BitVector`].
    pub fn build(self) -> BitVector {
        BitVector::from_words(self.words, self.len)
    }
}

/// An immutable bit sequence answering rank and select queries.
#[derive(Clone, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
    /// `block_ranks[b]` = ones in the first `b * 512` bits; one trailing
    /// entry holds the total.
    block_ranks: Vec<u64>,
    len: usize,
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len)
            .field("ones", &self.ones())
            .finish()
    }
}

impl BitVector {
    /// Build from raw words. Bits at `len` and beyond must be zero.
    fn from_words(words: Vec<u64>, len: usize) -> Self {
        debug_assert_eq!(words.len(), len.div_ceil(64));
        let num_blocks = words.len().div_ceil(BLOCK_WORDS);
        let mut block_ranks = Vec::with_capacity(num_blocks + 1);
        let mut ones = 0u64;
        for block in words.chunks(BLOCK_WORDS) {
            block_ranks.push(ones);
            for w in block {
                ones += w.count_ones() as u64;
            }
        }
        block_ranks.push(ones);
        Self {
            words,
            block_ranks,
            len,
        }
    }

    /// Collect an iterator of bits into an indexed vector.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut builder = BitVectorBuilder::new();
        for bit in bits {
            builder.push(bit);
        }
        builder.build()
    }

    /// Total number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if the vector has length 0.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    pub fn ones(&self) -> usize {
        self.block_ranks.last().copied().unwrap_or(0) as usize
    }

    /// Number of unset bits, i.e. `rank0(len)`.
    pub fn zeros(&self) -> usize {
        self.len - self.ones()
    }

    /// Return true if the bit at index `i` is set; false past the end.
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        (self.words[i / 64] >> (i % 64)) & 1 == 1
    }

    /// Number of set bits in `[0, i)`. `i` is clamped to the length.
    pub fn rank1(&self, i: usize) -> usize {
        let i = i.min(self.len);
        let block = i / BLOCK_BITS;
        let mut rank = self.block_ranks[block] as usize;
        let word_idx = i / 64;
        for w in (block * BLOCK_WORDS)..word_idx {
            rank += self.words[w].count_ones() as usize;
        }
        let rem = i % 64;
        if rem > 0 {
            rank += (self.words[word_idx] & ((1u64 << rem) - 1)).count_ones() as usize;
        }
        rank
    }

    /// Number of unset bits in `[0, i)`. `i` is clamped to the length.
    pub fn rank0(&self, i: usize) -> usize {
        i.min(self.len) - self.rank1(i)
    }

    /// Number of bits equal to `bit` in `[0, i)`.
    pub fn rank(&self, i: usize, bit: bool) -> usize {
        if bit {
            self.rank1(i)
        } else {
            self.rank0(i)
        }
    }

    /// Position of the `k`-th (0-indexed) set bit, or [`None`] if there are
    /// at most `k` set bits.
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones() {
            return None;
        }
        // Last block whose prefix rank is <= k; block_ranks[0] == 0 makes
        // the search well-founded.
        let mut lo = 0usize;
        let mut hi = self.block_ranks.len() - 1;
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if self.block_ranks[mid] as usize <= k {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let mut rem = k - self.block_ranks[lo] as usize;
        let mut w = lo * BLOCK_WORDS;
        loop {
            let count = self.words[w].count_ones() as usize;
            if rem < count {
                return Some(w * 64 + select_in_word(self.words[w], rem));
            }
            rem -= count;
            w += 1;
        }
    }

    /// Position of the `k`-th (0-indexed) unset bit, or [`None`] if there
    /// are at most `k` unset bits.
    pub fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.zeros() {
            return None;
        }
        let mut lo = 0usize;
        let mut hi = self.block_ranks.len() - 1;
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if mid * BLOCK_BITS - self.block_ranks[mid] as usize <= k {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let mut rem = k - (lo * BLOCK_BITS - self.block_ranks[lo] as usize);
        let mut w = lo * BLOCK_WORDS;
        loop {
            let count = (!self.words[w]).count_ones() as usize;
            if rem < count {
                return Some(w * 64 + select_in_word(!self.words[w], rem));
            }
            rem -= count;
            w += 1;
        }
    }

    /// Position of the `k`-th bit equal to `bit`.
    pub fn select(&self, k: usize, bit: bool) -> Option<usize> {
        if bit {
            self.select1(k)
        } else {
            self.select0(k)
        }
    }

    /// Serialize into `wr`: the bit length, then the words as one
    /// little-endian binary blob.
    pub fn encode_into<W: Write>(&self, wr: &mut W) -> Result<()> {
        codec::write_uint(wr, self.len as u64)?;
        let mut bytes = Vec::with_capacity(self.words.len() * 8);
        for w in &self.words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        codec::write_bin(wr, &bytes)
    }

    /// Deserialize one bit vector from `rd`, rebuilding the rank directory.
    pub fn decode_from<R: Read>(rd: &mut R) -> Result<Self> {
        let len = codec::read_uint(rd, "bit vector length")? as usize;
        let num_words = len.div_ceil(64);
        let expected = num_words
            .checked_mul(8)
            .ok_or_else(|| Error::InvalidEncoding("bit vector length overflows".to_string()))?;
        let bytes = codec::read_bin(rd, "bit vector words")?;
        if bytes.len() != expected {
            return Err(Error::InvalidEncoding(format!(
                "bit vector payload is {} bytes, expected {expected}",
                bytes.len()
            )));
        }
        let mut words = Vec::with_capacity(num_words);
        for chunk in bytes.chunks_exact(8) {
            words.push(u64::from_le_bytes(chunk.try_into().unwrap()));
        }
        if len % 64 != 0 {
            if let Some(&last) = words.last() {
                if last >> (len % 64) != 0 {
                    return Err(Error::InvalidEncoding(
                        "nonzero padding bits past the end".to_string(),
                    ));
                }
            }
        }
        Ok(Self::from_words(words, len))
    }

    /// Serialize to a standalone byte buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// Deserialize from a standalone buffer produced by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut rd = bytes;
        let bv = Self::decode_from(&mut rd)?;
        if !rd.is_empty() {
            return Err(Error::InvalidEncoding(
                "trailing bytes after bit vector".to_string(),
            ));
        }
        Ok(bv)
    }
}

/// Position of the `k`-th set bit of `word`. Requires `k < popcount(word)`.
fn select_in_word(mut word: u64, k: usize) -> usize {
    for _ in 0..k {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}
