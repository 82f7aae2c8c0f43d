//! A block-based LZ77/FSE lossless compressor.
//!
//! The public surface is small and deliberately symmetric: construct a
//! [`Compressor`] or [`Decompressor`] once for a given maximum buffer size,
//! then drive it over as many independent buffers as needed. Each call to
//! [`Compressor::compress`] or [`Decompressor::decompress`] resets the
//! sliding window and recent-offsets queue, so the two sides never need to
//! agree on anything beyond the bytes actually exchanged.
//!
//! The [`container`] module layers a simple chunked file format on top for
//! callers that want to compress something larger than fits in one buffer;
//! the `xpack`/`xunpack` binaries use it directly.

mod bit_io;
mod block;
mod codes;
pub mod container;
mod error;
mod fse;
mod matcher;
mod parser;
mod roq;
mod window;

mod compressor;
mod decompressor;

#[cfg(feature = "x86-bcj")]
mod x86;

pub use compressor::Compressor;
pub use decompressor::Decompressor;
pub use error::{Error, Result};

pub use matcher::LevelParams;
pub use window::{window_size_for, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_round_trip_smoke_test() {
        let data = b"hello hello hello, world world world!".repeat(10);
        let mut compressor = Compressor::new(data.len(), 6).unwrap();
        let mut compressed = vec![0u8; data.len() * 2 + 64];
        let n = compressor.compress(&data, &mut compressed);
        assert!(n > 0 && n < data.len());

        let mut decompressor = Decompressor::new(data.len());
        let mut output = vec![0u8; data.len()];
        let written = decompressor
            .decompress(&compressed[..n], &mut output, data.len())
            .unwrap();
        assert_eq!(written, data.len());
        assert_eq!(output, data);
    }
}
