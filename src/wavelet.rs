//! Wavelet matrix for arbitrary integer alphabets.
//!
//! Generalizes rank and select from bit vectors to sequences over an
//! alphabet $[0, D)$, and adds order statistics on top.
//!
//! # Theory
//!
//! A wavelet matrix for a sequence $T$ of length $n$ stores one bit vector
//! per bit plane, most significant first. Layer $d$ holds, for every
//! element, its $d$-th bit from the top; between layers the elements are
//! stably partitioned so that all zero-bit elements precede all one-bit
//! elements. A position (or interval) can then be pushed through a layer
//! with two rank calls:
//!
//! - zero branch: $p \mapsto \mathrm{rank}_0(p)$
//! - one branch:  $p \mapsto Z_d + \mathrm{rank}_1(p)$
//!
//! where $Z_d$ is the layer's zero count. Every query below is a walk over
//! these two transforms, so each costs $O(\lg D)$ rank/select calls.
//!
//! Total space is $n \lceil \lg D \rceil + o(n \lg D)$ bits. Unlike the
//! pointer-based wavelet tree, the matrix keeps exactly one bit vector per
//! level regardless of alphabet size, which is what makes 64-bit alphabets
//! practical.

use std::io::{Read, Write};
use std::ops::Range;

use crate::bitvec::{BitVector, BitVectorBuilder};
use crate::codec;
use crate::error::{Error, Result};

/// Comparison mode for [`WaveletMatrix::ranged_rank_op`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOp {
    /// Count occurrences equal to the probe value.
    Equal,
    /// Count occurrences strictly smaller than the probe value.
    LessThan,
    /// Count occurrences strictly greater than the probe value.
    MoreThan,
}

/// Accumulates values for a [`WaveletMatrix`]; call [`push`] repeatedly,
/// then [`build`].
///
/// [`push`]: WaveletMatrixBuilder::push
/// [`build`]: WaveletMatrixBuilder::build
#[derive(Debug, Clone, Default)]
pub struct WaveletMatrixBuilder {
    vals: Vec<u64>,
    dim: u64,
}

impl WaveletMatrixBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value. O(1) amortized.
    pub fn push(&mut self, val: u64) {
        self.vals.push(val);
        if val >= self.dim {
            self.dim = val.saturating_add(1);
        }
    }

    /// Number of values pushed so far.
    pub fn len(&self) -> usize {
        self.vals.len()
    }

    /// Return true if no values have been pushed.
    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// Consume the builder and construct the matrix.
    ///
    /// Performs one stable radix partition per bit plane, most significant
    /// bit first: elements with a zero bit keep their order in front,
    /// elements with a one bit keep their order behind. Two scratch vectors
    /// are reused across planes, so transient memory beyond the layers is
    /// O(n).
    pub fn build(self) -> WaveletMatrix {
        let len = self.vals.len();
        let width = width_for(self.dim);
        let mut layers = Vec::with_capacity(width);
        let mut src = self.vals;
        let mut dst = Vec::with_capacity(len);
        let mut ones = Vec::with_capacity(len);
        for depth in 0..width {
            let shift = width - depth - 1;
            let mut bits = BitVectorBuilder::with_capacity(len);
            for &v in &src {
                if (v >> shift) & 1 == 1 {
                    bits.push(true);
                    ones.push(v);
                } else {
                    bits.push(false);
                    dst.push(v);
                }
            }
            dst.append(&mut ones);
            std::mem::swap(&mut src, &mut dst);
            dst.clear();
            layers.push(bits.build());
        }
        WaveletMatrix {
            layers,
            dim: self.dim,
            len,
        }
    }
}

/// Bits needed to tell apart values below `dim`: $\lceil \lg D \rceil$,
/// zero when `dim <= 1`.
fn width_for(dim: u64) -> usize {
    if dim <= 1 {
        0
    } else {
        64 - (dim - 1).leading_zeros() as usize
    }
}

/// Succinct immutable index over a sequence of unsigned integers,
/// answering positional, rank, select, quantile, and intersection queries
/// in time proportional to the alphabet bit width.
///
/// Every query takes `&self` and nothing is mutated after construction, so
/// a built matrix can be shared freely across threads.
///
/// Build one with [`WaveletMatrixBuilder`] or by collecting an iterator:
///
/// ```
/// use wavix::WaveletMatrix;
///
/// let wm: WaveletMatrix = [5u64, 4, 5, 2, 1, 5, 6].iter().copied().collect();
/// assert_eq!(wm.len(), 7);
/// assert_eq!(wm.dim(), 7);
/// assert_eq!(wm.access(2), Some(5));
/// assert_eq!(wm.rank(6, 5), 3);
/// assert_eq!(wm.select(1, 5), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveletMatrix {
    layers: Vec<BitVector>,
    dim: u64,
    len: usize,
}

impl WaveletMatrix {
    /// Number of values in the sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One more than the largest value in the sequence; 0 for an empty
    /// sequence.
    pub fn dim(&self) -> u64 {
        self.dim
    }

    /// Number of bit-plane layers, $\lceil \lg D \rceil$.
    pub fn width(&self) -> usize {
        self.layers.len()
    }

    /// The value at `pos`, or [`None`] if `pos` is out of bounds.
    pub fn access(&self, mut pos: usize) -> Option<u64> {
        if pos >= self.len {
            return None;
        }
        let mut val = 0u64;
        for layer in &self.layers {
            val <<= 1;
            if layer.get(pos) {
                val |= 1;
                pos = layer.zeros() + layer.rank1(pos);
            } else {
                pos = layer.rank0(pos);
            }
        }
        Some(val)
    }

    /// The value at `pos` together with the number of its occurrences
    /// before `pos`, or [`None`] if `pos` is out of bounds.
    ///
    /// One traversal instead of the two that separate [`access`] and
    /// [`rank`] calls would take.
    ///
    /// [`access`]: WaveletMatrix::access
    /// [`rank`]: WaveletMatrix::rank
    pub fn access_and_rank(&self, pos: usize) -> Option<(u64, usize)> {
        if pos >= self.len {
            return None;
        }
        let mut val = 0u64;
        let mut lo = 0usize;
        let mut hi = pos;
        for layer in &self.layers {
            let bit = layer.get(hi);
            lo = layer.rank(lo, bit);
            hi = layer.rank(hi, bit);
            val <<= 1;
            if bit {
                lo += layer.zeros();
                hi += layer.zeros();
                val |= 1;
            }
        }
        Some((val, hi - lo))
    }

    /// Number of occurrences of `val` in `[0, pos)`. Requires `pos <= len`.
    pub fn rank(&self, pos: usize, val: u64) -> usize {
        self.ranged_rank_op(0..pos, val, RankOp::Equal)
    }

    /// Number of values strictly smaller than `val` in `[0, pos)`.
    /// Requires `pos <= len`.
    pub fn rank_less_than(&self, pos: usize, val: u64) -> usize {
        self.ranged_rank_op(0..pos, val, RankOp::LessThan)
    }

    /// Number of values strictly greater than `val` in `[0, pos)`.
    /// Requires `pos <= len`.
    pub fn rank_more_than(&self, pos: usize, val: u64) -> usize {
        self.ranged_rank_op(0..pos, val, RankOp::MoreThan)
    }

    /// Number of positions `p` in `range` whose value compares to `val` as
    /// `op` demands. Requires `range.end <= len`.
    ///
    /// The three modes share one descent: at each layer, elements that peel
    /// off on the wrong side of `val`'s bit are already decided and are
    /// tallied into the less-than or more-than counter.
    pub fn ranged_rank_op(&self, range: Range<usize>, val: u64, op: RankOp) -> usize {
        debug_assert!(range.start <= range.end && range.end <= self.len);
        let width = self.width();
        let mut lo = range.start;
        let mut hi = range.end;
        // Values outside the representable alphabet never descend cleanly;
        // answer them up front.
        if width < 64 && val >> width != 0 {
            return match op {
                RankOp::Equal | RankOp::MoreThan => 0,
                RankOp::LessThan => hi - lo,
            };
        }
        let mut less = 0usize;
        let mut more = 0usize;
        for (depth, layer) in self.layers.iter().enumerate() {
            if msb(val, depth, width) {
                if op == RankOp::LessThan {
                    less += layer.rank0(hi) - layer.rank0(lo);
                }
                lo = layer.zeros() + layer.rank1(lo);
                hi = layer.zeros() + layer.rank1(hi);
            } else {
                if op == RankOp::MoreThan {
                    more += layer.rank1(hi) - layer.rank1(lo);
                }
                lo = layer.rank0(lo);
                hi = layer.rank0(hi);
            }
        }
        match op {
            RankOp::Equal => hi - lo,
            RankOp::LessThan => less,
            RankOp::MoreThan => more,
        }
    }

    /// Number of positions in `range` holding a value inside `vals`.
    /// Requires `range.end <= len` and `vals.start <= vals.end`.
    pub fn ranged_rank_range(&self, range: Range<usize>, vals: Range<u64>) -> usize {
        debug_assert!(vals.start <= vals.end);
        let below_end = self.ranged_rank_op(range.clone(), vals.end, RankOp::LessThan);
        let below_start = self.ranged_rank_op(range, vals.start, RankOp::LessThan);
        below_end - below_start
    }

    /// Number of positions in `range` whose value matches `val` on the top
    /// `width - ignore_bits` bits. Requires `range.end <= len`.
    ///
    /// With `ignore_bits == 0` this is an exact-match count; larger values
    /// widen the match to a prefix, the shape of an IP-style
    /// `a.b.c.0/24` lookup. `ignore_bits >= width` matches everything.
    pub fn ranged_rank_ignore_lsbs(
        &self,
        range: Range<usize>,
        val: u64,
        ignore_bits: usize,
    ) -> usize {
        debug_assert!(range.start <= range.end && range.end <= self.len);
        let width = self.width();
        if ignore_bits < width && width < 64 && val >> width != 0 {
            return 0;
        }
        self.descend_prefix(range, val, ignore_bits).len()
    }

    /// Position of the `k`-th (0-indexed) occurrence in `range` of a value
    /// matching `val` on the top `width - ignore_bits` bits, or [`None`]
    /// if there are at most `k` matches. Requires `range.end <= len`.
    pub fn ranged_select_ignore_lsbs(
        &self,
        range: Range<usize>,
        k: usize,
        val: u64,
        ignore_bits: usize,
    ) -> Option<usize> {
        debug_assert!(range.start <= range.end && range.end <= self.len);
        let width = self.width();
        if ignore_bits < width && width < 64 && val >> width != 0 {
            return None;
        }
        // Descend to the image interval of the matching values, pick the
        // k-th slot, then invert the descent with select calls, low bit
        // first.
        let img = self.descend_prefix(range, val, ignore_bits);
        let mut pos = img.start.checked_add(k)?;
        if pos >= img.end {
            return None;
        }
        for depth in ignore_bits..width {
            let layer = &self.layers[width - depth - 1];
            pos = if (val >> depth) & 1 == 1 {
                layer.select1(pos - layer.zeros())?
            } else {
                layer.select0(pos)?
            };
        }
        Some(pos)
    }

    /// Position of the `k`-th (0-indexed) occurrence of `val` within
    /// `range`, or [`None`] if there are at most `k` occurrences there.
    /// Requires `range.end <= len`.
    pub fn ranged_select(&self, range: Range<usize>, k: usize, val: u64) -> Option<usize> {
        self.ranged_select_ignore_lsbs(range, k, val, 0)
    }

    /// Position of the `k`-th (0-indexed) occurrence of `val`, or [`None`]
    /// if `val` occurs at most `k` times.
    pub fn select(&self, k: usize, val: u64) -> Option<usize> {
        self.ranged_select_ignore_lsbs(0..self.len, k, val, 0)
    }

    /// The `k`-th smallest value in `range` (0-indexed, duplicates
    /// counted), or [`None`] if `k >= range.len()` or the range is out of
    /// bounds.
    pub fn quantile(&self, range: Range<usize>, mut k: usize) -> Option<u64> {
        if k >= range.len() || range.end > self.len {
            return None;
        }
        let mut lo = range.start;
        let mut hi = range.end;
        let mut val = 0u64;
        for layer in &self.layers {
            val <<= 1;
            let z_lo = layer.rank0(lo);
            let z_hi = layer.rank0(hi);
            let zeros = z_hi - z_lo;
            if k < zeros {
                lo = z_lo;
                hi = z_hi;
            } else {
                k -= zeros;
                val |= 1;
                lo = layer.zeros() + lo - z_lo;
                hi = layer.zeros() + hi - z_hi;
            }
        }
        Some(val)
    }

    /// All distinct values occurring in at least `k` of the given ranges,
    /// in ascending order. Requires every `range.end <= len`.
    ///
    /// `k <= 1` asks for the union of values present in the ranges;
    /// `k > ranges.len()` yields an empty result.
    pub fn intersect(&self, ranges: &[Range<usize>], k: usize) -> Vec<u64> {
        let k = k.max(1);
        let live: Vec<Range<usize>> = ranges.iter().filter(|r| !r.is_empty()).cloned().collect();
        debug_assert!(live.iter().all(|r| r.end <= self.len));
        let mut out = Vec::new();
        if live.len() >= k {
            self.intersect_at(&live, k, 0, 0, &mut out);
        }
        out
    }

    fn intersect_at(
        &self,
        ranges: &[Range<usize>],
        k: usize,
        depth: usize,
        prefix: u64,
        out: &mut Vec<u64>,
    ) {
        if depth == self.width() {
            out.push(prefix);
            return;
        }
        let layer = &self.layers[depth];
        let mut zero_ranges = Vec::new();
        let mut one_ranges = Vec::new();
        for r in ranges {
            let z_lo = layer.rank0(r.start);
            let z_hi = layer.rank0(r.end);
            let o_lo = layer.zeros() + r.start - z_lo;
            let o_hi = layer.zeros() + r.end - z_hi;
            if z_hi > z_lo {
                zero_ranges.push(z_lo..z_hi);
            }
            if o_hi > o_lo {
                one_ranges.push(o_lo..o_hi);
            }
        }
        // Emitting the zero subtree first keeps the output sorted.
        if zero_ranges.len() >= k {
            self.intersect_at(&zero_ranges, k, depth + 1, prefix << 1, out);
        }
        if one_ranges.len() >= k {
            self.intersect_at(&one_ranges, k, depth + 1, (prefix << 1) | 1, out);
        }
    }

    /// Iterator over the stored values in sequence order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { wm: self, pos: 0 }
    }

    /// Push an interval through the top `width - ignore_bits` layers along
    /// `val`'s bits.
    fn descend_prefix(&self, range: Range<usize>, val: u64, ignore_bits: usize) -> Range<usize> {
        let width = self.width();
        let mut lo = range.start;
        let mut hi = range.end;
        for depth in 0..width.saturating_sub(ignore_bits) {
            let layer = &self.layers[depth];
            if msb(val, depth, width) {
                lo = layer.zeros() + layer.rank1(lo);
                hi = layer.zeros() + layer.rank1(hi);
            } else {
                lo = layer.rank0(lo);
                hi = layer.rank0(hi);
            }
        }
        lo..hi
    }

    /// Serialize to the byte stream format: the layer count, the layers in
    /// depth order, the alphabet size, the sequence length, and the layer
    /// count once more (the format has always carried it twice; readers
    /// check both).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// Serialize into an arbitrary writer; see [`Self::to_bytes`].
    pub fn encode_into<W: Write>(&self, wr: &mut W) -> Result<()> {
        codec::write_uint(wr, self.width() as u64)?;
        for layer in &self.layers {
            layer.encode_into(wr)?;
        }
        codec::write_uint(wr, self.dim)?;
        codec::write_uint(wr, self.len as u64)?;
        codec::write_uint(wr, self.width() as u64)?;
        Ok(())
    }

    /// Deserialize from a buffer produced by [`Self::to_bytes`]. Rejects
    /// malformed, inconsistent, or over-long input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut rd = bytes;
        let wm = Self::decode_from(&mut rd)?;
        if !rd.is_empty() {
            return Err(Error::InvalidEncoding(
                "trailing bytes after wavelet matrix".to_string(),
            ));
        }
        Ok(wm)
    }

    /// Deserialize one matrix from an arbitrary reader.
    pub fn decode_from<R: Read>(rd: &mut R) -> Result<Self> {
        let width = codec::read_uint(rd, "layer count")? as usize;
        if width > 64 {
            return Err(Error::InvalidEncoding(format!(
                "layer count {width} exceeds 64"
            )));
        }
        let mut layers = Vec::with_capacity(width);
        for _ in 0..width {
            layers.push(BitVector::decode_from(rd)?);
        }
        let dim = codec::read_uint(rd, "alphabet size")?;
        let len = codec::read_uint(rd, "sequence length")? as usize;
        let width_dup = codec::read_uint(rd, "trailing layer count")? as usize;
        if width_dup != width {
            return Err(Error::InvalidEncoding(format!(
                "layer counts disagree: {width} then {width_dup}"
            )));
        }
        for (depth, layer) in layers.iter().enumerate() {
            if layer.len() != len {
                return Err(Error::InvalidEncoding(format!(
                    "layer {depth} holds {} bits, expected {len}",
                    layer.len()
                )));
            }
        }
        Ok(Self { layers, dim, len })
    }
}

impl FromIterator<u64> for WaveletMatrix {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut builder = WaveletMatrixBuilder::new();
        for v in iter {
            builder.push(v);
        }
        builder.build()
    }
}

impl<'a> IntoIterator for &'a WaveletMatrix {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over a matrix's values, created by [`WaveletMatrix::iter`].
#[derive(Debug)]
pub struct Iter<'a> {
    wm: &'a WaveletMatrix,
    pos: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let val = self.wm.access(self.pos)?;
        self.pos += 1;
        Some(val)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.wm.len() - self.pos.min(self.wm.len());
        (left, Some(left))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// The `depth`-th bit of `val` counting down from bit `width - 1`.
#[inline]
fn msb(val: u64, depth: usize, width: usize) -> bool {
    (val >> (width - depth - 1)) & 1 == 1
}
