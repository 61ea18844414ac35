//! MessagePack stream helpers shared by the codec methods.
//!
//! The wire format is a plain concatenation of MessagePack values rather
//! than a single enclosing array, so the helpers here read and write one
//! value at a time. Every read is labelled with the field being decoded so
//! malformed streams produce errors that say which field broke.

use std::io::{Read, Write};

use rmp::decode;
use rmp::encode::{self, ValueWriteError};

use crate::error::{Error, Result};

fn write_error(err: ValueWriteError) -> Error {
    match err {
        ValueWriteError::InvalidMarkerWrite(e) | ValueWriteError::InvalidDataWrite(e) => {
            Error::Io(e)
        }
    }
}

/// Writes one unsigned integer value.
pub(crate) fn write_uint<W: Write>(wr: &mut W, val: u64) -> Result<()> {
    encode::write_uint(wr, val).map(|_| ()).map_err(write_error)
}

/// Reads one unsigned integer value; `what` names the field for errors.
pub(crate) fn read_uint<R: Read>(rd: &mut R, what: &str) -> Result<u64> {
    decode::read_int(rd).map_err(|e| Error::InvalidEncoding(format!("{what}: {e}")))
}

/// Writes one binary blob.
pub(crate) fn write_bin<W: Write>(wr: &mut W, data: &[u8]) -> Result<()> {
    encode::write_bin(wr, data).map_err(write_error)
}

/// Reads one binary blob. The payload is pulled through a bounded reader so
/// a forged length header cannot trigger a huge up-front allocation.
pub(crate) fn read_bin<R: Read>(rd: &mut R, what: &str) -> Result<Vec<u8>> {
    let len = decode::read_bin_len(rd)
        .map_err(|e| Error::InvalidEncoding(format!("{what}: {e}")))? as usize;
    let mut buf = Vec::new();
    rd.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(Error::InvalidEncoding(format!(
            "{what}: unexpected end of input"
        )));
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitvec::BitVector;
    use crate::wavelet::WaveletMatrix;

    #[test]
    fn uint_roundtrip() {
        let mut buf = Vec::new();
        for v in [0u64, 1, 127, 128, 255, 256, 1 << 20, u64::MAX] {
            buf.clear();
            write_uint(&mut buf, v).unwrap();
            let mut rd = &buf[..];
            assert_eq!(read_uint(&mut rd, "value").unwrap(), v);
            assert!(rd.is_empty());
        }
    }

    #[test]
    fn bin_roundtrip() {
        let mut buf = Vec::new();
        write_bin(&mut buf, b"watrix").unwrap();
        let mut rd = &buf[..];
        assert_eq!(read_bin(&mut rd, "blob").unwrap(), b"watrix");
    }

    #[test]
    fn bin_rejects_truncated_payload() {
        let mut buf = Vec::new();
        write_bin(&mut buf, &[0xAB; 32]).unwrap();
        buf.truncate(buf.len() - 5);
        let mut rd = &buf[..];
        assert!(read_bin(&mut rd, "blob").is_err());
    }

    #[test]
    fn uint_rejects_wrong_type() {
        // 0xc0 is the MessagePack nil marker.
        let mut rd = &[0xc0u8][..];
        assert!(read_uint(&mut rd, "value").is_err());
    }

    #[test]
    fn matrix_roundtrip() {
        let wm: WaveletMatrix = [8u64, 9, 10, 11, 12, 18, 8, 9].iter().copied().collect();
        let bytes = wm.to_bytes().unwrap();
        let other = WaveletMatrix::from_bytes(&bytes).unwrap();
        assert_eq!(other, wm);
        assert_eq!(other.rank(8, 9), wm.rank(8, 9));
        assert_eq!(other.select(1, 10), wm.select(1, 10));
    }

    #[test]
    fn empty_matrix_roundtrip() {
        let wm: WaveletMatrix = std::iter::empty::<u64>().collect();
        let bytes = wm.to_bytes().unwrap();
        let other = WaveletMatrix::from_bytes(&bytes).unwrap();
        assert_eq!(other.len(), 0);
        assert_eq!(other.dim(), 0);
        assert_eq!(other.width(), 0);
    }

    #[test]
    fn matrix_rejects_truncation_at_every_point() {
        let wm: WaveletMatrix = (0u64..40).map(|v| v % 13).collect();
        let bytes = wm.to_bytes().unwrap();
        for cut in 0..bytes.len() {
            assert!(
                WaveletMatrix::from_bytes(&bytes[..cut]).is_err(),
                "decode succeeded on {cut}-byte prefix"
            );
        }
    }

    #[test]
    fn matrix_rejects_trailing_bytes() {
        let wm: WaveletMatrix = [3u64, 1, 4, 1, 5].iter().copied().collect();
        let mut bytes = wm.to_bytes().unwrap();
        bytes.push(0x00);
        assert!(WaveletMatrix::from_bytes(&bytes).is_err());
    }

    #[test]
    fn matrix_rejects_layer_count_mismatch() {
        let wm: WaveletMatrix = [3u64, 1, 4, 1, 5].iter().copied().collect();
        let mut bytes = wm.to_bytes().unwrap();
        // The trailing duplicate of the layer count is the last value in the
        // stream; for small widths it is a single positive-fixint byte.
        let last = bytes.len() - 1;
        bytes[last] ^= 1;
        assert!(WaveletMatrix::from_bytes(&bytes).is_err());
    }

    #[test]
    fn matrix_rejects_layer_length_mismatch() {
        // Handcraft a stream whose declared sequence length disagrees with
        // the layer payloads.
        let bv = BitVector::from_bits([true, false]);
        let mut bytes = Vec::new();
        write_uint(&mut bytes, 1).unwrap();
        bv.encode_into(&mut bytes).unwrap();
        write_uint(&mut bytes, 2).unwrap(); // dim
        write_uint(&mut bytes, 3).unwrap(); // len, but the layer holds 2 bits
        write_uint(&mut bytes, 1).unwrap();
        assert!(WaveletMatrix::from_bytes(&bytes).is_err());
    }

    #[test]
    fn matrix_rejects_absurd_layer_count() {
        let mut bytes = Vec::new();
        write_uint(&mut bytes, 1000).unwrap();
        assert!(WaveletMatrix::from_bytes(&bytes).is_err());
    }
}
