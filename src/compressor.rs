//! The compressor driver: constructs its scratch structures once, then
//! turns one whole input buffer into a sequence of blocks per call, the
//! way the teacher's `Lzxd` is built once and driven repeatedly — except
//! here construction happens once per *object*, not once per *block*, and
//! `compress` resets window/ROQ state itself so the object can be reused
//! across unrelated buffers.

use crate::block::{self, CodeTables};
use crate::bit_io::BitWriter;
use crate::error::{Error, Result};
use crate::matcher::{LevelParams, MatchFinder};
use crate::roq::Roq;

/// Byte size of each block this crate emits. Real sequence-count-based
/// block closing (the spec's `MAX_SEQUENCES_PER_BLOCK` / literal-buffer
/// overflow heuristics) is approximated by a fixed input-byte budget per
/// block, which bounds the sequence count from above for any realistic
/// literal/match mix and keeps per-block FSE table overhead amortized.
const BLOCK_SIZE: usize = 128 * 1024;

/// log2 fraction of a block's raw bit-length reserved as a safety margin
/// before falling back to `Mode::Uncompressed` — a block whose estimated
/// compressed size doesn't beat raw size by at least this much isn't worth
/// the entropy-coding overhead.
const SIZE_MARGIN_SHIFT: u32 = 5;

pub struct Compressor {
    max_buffer_size: usize,
    level: u8,
    params: LevelParams,
    finder: MatchFinder,
    tables: CodeTables,
}

impl Compressor {
    /// Allocates every scratch structure the compressor will ever need
    /// up front: hash chains sized for `max_buffer_size` and the length/
    /// offset slot tables for this object's window. No further allocation
    /// happens inside [`Self::compress`].
    pub fn new(max_buffer_size: usize, level: u8) -> Result<Compressor> {
        if max_buffer_size == 0 {
            return Err(Error::Corrupt("max_buffer_size must be nonzero"));
        }
        if !(1..=9).contains(&level) {
            return Err(Error::Corrupt("compression level must be 1..=9"));
        }
        let params = LevelParams::for_level(level);
        let finder = MatchFinder::new(max_buffer_size, &params);
        let window = finder.window();
        let tables = CodeTables::new(max_buffer_size, window);
        Ok(Compressor {
            max_buffer_size,
            level,
            params,
            finder,
            tables,
        })
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Compresses `input` into `output`. Returns the number of bytes
    /// written, or `0` if the compressed form would not fit in `output`
    /// or would not be smaller than `input` (the caller should store it
    /// raw in that case).
    pub fn compress(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        if input.len() > self.max_buffer_size {
            return 0;
        }
        self.finder.reset();
        let mut roq = Roq::new();
        let mut writer = BitWriter::with_capacity(output.len());

        #[cfg(feature = "x86-bcj")]
        let transformed = crate::x86::encode(input);
        #[cfg(feature = "x86-bcj")]
        let data: &[u8] = &transformed;
        #[cfg(not(feature = "x86-bcj"))]
        let data: &[u8] = input;

        writer.put(if cfg!(feature = "x86-bcj") { 1 } else { 0 }, 1);

        let input = data;
        let mut pos = 0;
        while pos < input.len() {
            let end = (pos + BLOCK_SIZE).min(input.len());
            let block_len = end - pos;

            let mut trial_roq = roq;
            let sequences = crate::parser::parse_range(
                input,
                pos,
                end,
                &mut self.finder,
                &mut trial_roq,
                &self.params,
            );

            let estimate = block::estimate_compressed_bits(&sequences, &roq, &self.tables);
            let raw_bits = (block_len as u64) * 8;
            let margin = raw_bits >> SIZE_MARGIN_SHIFT;

            if estimate + margin < raw_bits {
                log::debug!(
                    "block at {pos}..{end}: {} sequences, estimate {estimate} bits vs raw {raw_bits} bits, storing compressed",
                    sequences.len()
                );
                let written =
                    block::write_compressed_block(&mut writer, block_len, &sequences, &mut roq, &self.tables);
                if written.is_err() {
                    return 0;
                }
            } else {
                log::debug!(
                    "block at {pos}..{end}: estimate {estimate} bits not worth it vs raw {raw_bits} bits, storing uncompressed"
                );
                block::write_uncompressed_block(&mut writer, &input[pos..end]);
            }

            pos = end;
        }

        let compressed = writer.finish();
        if compressed.len() >= input.len() || compressed.len() > output.len() {
            return 0;
        }
        output[..compressed.len()].copy_from_slice(&compressed);
        compressed.len()
    }
}
