//! # Wavelet Matrix
//!
//! *One succinct index, a whole family of range queries.*
//!
//! ## Intuition First
//!
//! Picture a filing cabinet where every document has been shredded into
//! individual bits and refiled by bit position: one drawer holds everyone's
//! top bit, the next drawer the second bit, and so on. That sounds like
//! vandalism, but the drawers are filed so systematically that you can
//! reconstruct any document, and better: you can answer questions like "how
//! many documents smaller than X were filed before position P?" by opening
//! only one drawer per bit, never touching the rest.
//!
//! ## The Problem
//!
//! Rank ("how many of value v before position p?") and select ("where is
//! the k-th v?") are solved for *bit* vectors in constant time and tiny
//! space. For sequences over larger alphabets the naive options are grim:
//! - **Per-value occurrence lists**: fast select, but $O(n \log n)$ bits
//!   per distinct value and no range counting.
//! - **Scanning**: zero overhead, $O(n)$ per query.
//!
//! ## Historical Context
//!
//! ```text
//! 1989  Jacobson       rank/select on bit vectors in o(n) extra space
//! 2003  Grossi et al.  Wavelet tree: rank/select for arbitrary alphabets
//! 2012  Claude-Navarro The wavelet matrix: drop the tree pointers, keep
//!                      one bit vector per level
//! 2012  Gagie et al.   Range quantile and intersection algorithms on
//!                      wavelet trees
//! ```
//!
//! Claude and Navarro's observation: the wavelet tree's node boundaries
//! within each level are bookkeeping, not information. Concatenate every
//! level into a single bit vector, stably partition elements by the
//! previous level's bits (zeros left, ones right), and each node boundary
//! becomes recomputable from one number per level: the count of zeros.
//!
//! ## Mathematical Formulation
//!
//! For a sequence $T$ of $n$ values over alphabet $[0, D)$ with width
//! $B = \lceil \log_2 D \rceil$, the matrix stores bit vectors
//! $L_0 \dots L_{B-1}$, each of length $n$. An interval $[b, e)$ at level
//! $d$ maps through the level by
//!
//! $$ b, e \mapsto \mathrm{rank}_0(b), \mathrm{rank}_0(e)
//!    \quad\text{or}\quad
//!    Z_d + \mathrm{rank}_1(b), Z_d + \mathrm{rank}_1(e) $$
//!
//! choosing the zero or one branch of the current bit of the probe value;
//! $Z_d$ is the number of zeros in $L_d$. Access, rank (equal, less-than,
//! greater-than), select, range quantile, prefix matching, and multi-range
//! intersection are all walks over these two transforms.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(B)$ bit-vector operations per query.
//! - **Space**: $nB + o(nB)$ bits; construction uses $O(n)$ transient words.
//!
//! ## What Could Go Wrong
//!
//! 1. **Static only**: any mutation invalidates every level at once; this
//!    structure is build-once, query-forever.
//! 2. **Pointer chasing in disguise**: each level is one cache-unfriendly
//!    rank away from the next. $O(B)$ is small but not free; batch queries
//!    if you can.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **[`WaveletMatrix`]** / **[`WaveletMatrixBuilder`]**: the index and
//!   its push-then-build constructor.
//! - **[`BitVector`]**: the rank/select bit vector underneath
//!   (one per bit plane).
//! - A MessagePack byte-stream codec on both
//!   ([`WaveletMatrix::to_bytes`] / [`WaveletMatrix::from_bytes`]).
//!
//! ## References
//!
//! - Claude, F., & Navarro, G. (2012). "The Wavelet Matrix." SPIRE.
//! - Gagie, T., Navarro, G., & Puglisi, S. J. (2012). "New algorithms on
//!   wavelet trees and applications to information retrieval." TCS 426.
//! - Grossi, R., Gupta, A., & Vitter, J. S. (2003). "High-order
//!   entropy-compressed text indexes." SODA.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitvec;
mod codec;
pub mod error;
pub mod wavelet;

pub use bitvec::{BitVector, BitVectorBuilder};
pub use error::Error;
pub use wavelet::{RankOp, WaveletMatrix, WaveletMatrixBuilder};
