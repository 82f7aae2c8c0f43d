//! Match-distance bookkeeping and overlap-safe back-reference expansion.
//!
//! Compression and decompression in this crate operate on one whole buffer
//! per call (no streaming across calls), so there is no reused, wrapping
//! window buffer the way the teacher's chunked LZXD decoder needs one —
//! the compressor reads directly from its input slice and the decompressor
//! writes directly into the caller's output slice. What survives from the
//! teacher's `Window` is the one genuinely tricky primitive: expanding a
//! back-reference whose offset is smaller than its length (a run), which
//! must proceed byte-by-byte in increasing order so that bytes just written
//! become valid source bytes for later positions in the same copy.

use crate::error::{Error, Result};

/// Smallest window size this crate will construct. Below this, hash-chain
/// overhead dominates any possible match.
pub const MIN_WINDOW_SIZE: usize = 1 << 12;

/// Largest window size this crate will construct, independent of how large
/// `max_buffer_size` is asked to be — match offsets beyond this are never
/// worth the hash-chain memory.
pub const MAX_WINDOW_SIZE: usize = 1 << 27;

/// Picks a power-of-two match-distance ceiling for a given buffer size,
/// clamped to `[MIN_WINDOW_SIZE, MAX_WINDOW_SIZE]`.
pub fn window_size_for(max_buffer_size: usize) -> usize {
    let size = max_buffer_size.next_power_of_two();
    size.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE)
}

/// True when `offset` is a legal back-reference distance at `current_pos`
/// under a window of size `w`: `1 <= offset <= min(current_pos, w)`.
pub fn is_valid_offset(current_pos: usize, offset: usize, w: usize) -> bool {
    offset >= 1 && offset <= current_pos && offset <= w
}

/// Expands a back-reference of `length` bytes at `offset` into `out`,
/// starting at `out[dst_pos]`. Tolerates `offset < length` (a run): the
/// copy proceeds one byte at a time in increasing order, so a source byte
/// that was itself just written earlier in this same call is read
/// correctly. Validates bounds first so a corrupt offset/length pair never
/// reads or writes out of `out`.
pub fn copy_match(out: &mut [u8], dst_pos: usize, offset: usize, length: usize) -> Result<()> {
    if offset == 0 || offset > dst_pos {
        return Err(Error::Corrupt("back-reference offset out of range"));
    }
    let end = dst_pos
        .checked_add(length)
        .ok_or(Error::Corrupt("back-reference length overflows output"))?;
    if end > out.len() {
        return Err(Error::ShortOutput);
    }
    for i in 0..length {
        out[dst_pos + i] = out[dst_pos + i - offset];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_size_rounds_up_to_power_of_two_and_clamps() {
        assert_eq!(window_size_for(1000), MIN_WINDOW_SIZE);
        assert_eq!(window_size_for(1 << 20), 1 << 20);
        assert_eq!(window_size_for(usize::MAX), MAX_WINDOW_SIZE);
    }

    #[test]
    fn offset_validity() {
        assert!(is_valid_offset(10, 5, 32));
        assert!(is_valid_offset(10, 10, 32));
        assert!(!is_valid_offset(10, 11, 32));
        assert!(!is_valid_offset(10, 0, 32));
        assert!(!is_valid_offset(10, 5, 4));
    }

    #[test]
    fn copy_match_non_overlapping() {
        let mut buf = vec![0u8; 16];
        buf[0..4].copy_from_slice(&[1, 2, 3, 4]);
        copy_match(&mut buf, 4, 4, 4).unwrap();
        assert_eq!(&buf[0..8], &[1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn copy_match_run_expansion_offset_one() {
        let mut buf = vec![0u8; 8];
        buf[0] = 0xAB;
        copy_match(&mut buf, 1, 1, 7).unwrap();
        assert_eq!(buf, [0xAB; 8]);
    }

    #[test]
    fn copy_match_run_expansion_offset_less_than_length() {
        let mut buf = vec![0u8; 10];
        buf[0..3].copy_from_slice(&[1, 2, 3]);
        copy_match(&mut buf, 3, 3, 7).unwrap();
        assert_eq!(buf, [1, 2, 3, 1, 2, 3, 1, 2, 3, 1]);
    }

    #[test]
    fn copy_match_rejects_out_of_range_offset() {
        let mut buf = vec![0u8; 8];
        assert!(copy_match(&mut buf, 2, 5, 2).is_err());
    }

    #[test]
    fn copy_match_rejects_overflowing_output() {
        let mut buf = vec![0u8; 8];
        buf[0] = 1;
        assert!(copy_match(&mut buf, 4, 1, 10).is_err());
    }
}
