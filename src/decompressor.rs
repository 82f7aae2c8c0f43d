//! The decompressor driver: mirrors [`crate::compressor::Compressor`],
//! built once per object and driven repeatedly, reading blocks back to
//! back until the caller's expected output length is reached.

use crate::bit_io::BitReader;
use crate::block::{self, CodeTables};
use crate::error::{Error, Result};
use crate::roq::Roq;

pub struct Decompressor {
    tables: CodeTables,
}

impl Decompressor {
    pub fn new(max_buffer_size: usize) -> Decompressor {
        let window = crate::window::window_size_for(max_buffer_size);
        let tables = CodeTables::new(max_buffer_size, window);
        Decompressor { tables }
    }

    /// Decompresses `input` into `output`, stopping once `expected_len`
    /// bytes have been produced. Returns `expected_len` on success.
    pub fn decompress(&mut self, input: &[u8], output: &mut [u8], expected_len: usize) -> Result<usize> {
        if expected_len > output.len() {
            return Err(Error::ShortOutput);
        }
        if expected_len == 0 {
            return Ok(0);
        }
        let mut reader = BitReader::new(input);
        let x86_applied = reader.get(1)? != 0;
        if x86_applied && cfg!(not(feature = "x86-bcj")) {
            return Err(Error::Corrupt("x86 preprocessing not supported in this build"));
        }
        log::trace!("decompressing {expected_len} bytes, x86-bcj applied: {x86_applied}");

        let mut roq = Roq::new();
        let mut pos = 0usize;

        while pos < expected_len {
            let written = block::read_block(&mut reader, &mut roq, &self.tables, output, pos)?;
            if written == 0 {
                return Err(Error::Corrupt("block produced no output"));
            }
            pos += written;
        }

        if pos != expected_len {
            return Err(Error::Corrupt("decompressed length does not match expected length"));
        }

        #[cfg(feature = "x86-bcj")]
        if x86_applied {
            crate::x86::decode(&mut output[..expected_len]);
        }

        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::Compressor;

    #[test]
    fn short_input_is_rejected() {
        let mut decompressor = Decompressor::new(1024);
        let mut output = vec![0u8; 64];
        let err = decompressor.decompress(&[], &mut output, 64);
        assert!(err.is_err());
    }

    #[test]
    fn expected_len_larger_than_output_is_rejected() {
        let mut decompressor = Decompressor::new(1024);
        let mut output = vec![0u8; 8];
        let err = decompressor.decompress(&[0u8; 16], &mut output, 64);
        assert!(matches!(err, Err(Error::ShortOutput)));
    }

    #[test]
    fn garbage_input_reports_corrupt_rather_than_panicking() {
        let mut decompressor = Decompressor::new(4096);
        let mut output = vec![0u8; 256];
        let garbage = vec![0xFFu8; 256];
        let _ = decompressor.decompress(&garbage, &mut output, 256);
    }

    #[test]
    fn zero_length_round_trip() {
        let mut compressor = Compressor::new(16, 3).unwrap();
        let mut compressed = vec![0u8; 64];
        let n = compressor.compress(b"", &mut compressed);
        let mut decompressor = Decompressor::new(16);
        let mut output = vec![0u8; 0];
        let written = decompressor.decompress(&compressed[..n], &mut output, 0).unwrap();
        assert_eq!(written, 0);
    }
}
