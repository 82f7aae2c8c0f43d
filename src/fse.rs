//! Finite-state entropy (tANS) coding: table construction, a stateful
//! encoder/decoder pair, and the table-header wire format.
//!
//! The state-transition tables are built the way `final-state-rs` builds
//! them (`delta_nb_bits`/`starts` on the encode side, `nb_bits`/`new_state`
//! on the decode side, both keyed off a strided "spread" of symbols across
//! the state table) — see the module-level comment on [`EncodeTable`] for
//! the exact recurrence. A tANS encoder must walk its input in reverse to
//! compute the state transitions, but the decoder reads forward; rather
//! than physically reversing the output bitstream, [`FseEncoder`] records
//! each (value, width) emission while walking backward and replays them in
//! the opposite order into the real [`BitWriter`], preceded by the final
//! state. This keeps the wire bits themselves in plain forward order.

use crate::bit_io::{BitReader, BitWriter};
use crate::error::{Error, Result};

/// Normalized symbol counts for one alphabet: `counts.iter().sum() ==
/// 1 << table_log`, and every symbol with nonzero input frequency keeps a
/// count of at least 1.
#[derive(Debug, Clone)]
pub struct NormalizedCounts {
    table_log: u32,
    counts: Vec<u32>,
}

impl NormalizedCounts {
    /// Normalizes a raw histogram to sum exactly to `1 << table_log`, using
    /// floor-then-largest-remainder distribution, then a final
    /// steal-from-the-largest pass if the floor step overshot the budget
    /// (which happens whenever low-frequency symbols were bumped up to the
    /// mandatory minimum count of 1).
    pub fn build(hist: &[u32], table_log: u32) -> Self {
        let target = 1u32 << table_log;
        let total: u64 = hist.iter().map(|&c| c as u64).sum();
        let mut counts = vec![0u32; hist.len()];
        if total == 0 {
            return NormalizedCounts { table_log, counts };
        }

        let mut remainders: Vec<(u64, usize)> = Vec::new();
        let mut assigned: u64 = 0;
        for (i, &c) in hist.iter().enumerate() {
            if c == 0 {
                continue;
            }
            let scaled = c as u64 * target as u64;
            let mut q = scaled / total;
            if q == 0 {
                q = 1;
            }
            counts[i] = q as u32;
            assigned += q;
            remainders.push((scaled % total, i));
        }

        let mut diff = target as i64 - assigned as i64;
        if diff > 0 {
            remainders.sort_by(|a, b| b.0.cmp(&a.0));
            let mut i = 0;
            while diff > 0 && !remainders.is_empty() {
                let idx = remainders[i % remainders.len()].1;
                counts[idx] += 1;
                diff -= 1;
                i += 1;
            }
        } else if diff < 0 {
            let mut order: Vec<usize> = (0..counts.len()).filter(|&i| counts[i] > 1).collect();
            order.sort_by_key(|&i| std::cmp::Reverse(counts[i]));
            let mut need = (-diff) as u32;
            for idx in order {
                if need == 0 {
                    break;
                }
                let reducible = counts[idx] - 1;
                let take = reducible.min(need);
                counts[idx] -= take;
                need -= take;
            }
            debug_assert_eq!(need, 0, "table_log should guarantee enough reducible capacity");
        }

        NormalizedCounts { table_log, counts }
    }

    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn alphabet_size(&self) -> usize {
        self.counts.len()
    }
}

/// Scatters symbols across `2^table_log` state slots by a fixed strided
/// permutation, per the spec's `step = 5/8 * 2^L + 3` rule (forced odd so
/// the stride is coprime with the power-of-two table size, guaranteeing
/// every slot is visited exactly once).
fn spread_table(counts: &[u32], table_log: u32) -> Vec<u16> {
    let table_size = 1usize << table_log;
    let step = ((5 * table_size) / 8 + 3) | 1;
    let mask = table_size - 1;
    let mut table = vec![0u16; table_size];
    let mut pos = 0usize;
    for (symbol, &count) in counts.iter().enumerate() {
        for _ in 0..count {
            table[pos] = symbol as u16;
            pos = (pos + step) & mask;
        }
    }
    table
}

/// Per-symbol transition constants for encoding, built from the spread
/// table the way `final-state-rs`'s `build_encode_table` does:
///
/// ```text
/// for state in table_size..2*table_size {
///     symbol = spread[state - table_size]
///     table[starts[symbol] + next[symbol]] = state
///     next[symbol] += 1
/// }
/// ```
///
/// `delta_nb_bits[symbol]` and `starts[symbol]` (renamed here
/// `delta_find_state`) let [`FseEncoder`] compute, for any current state
/// about to emit `symbol`, both the number of bits to flush and the index
/// into `next_state` that yields the post-transition state.
#[derive(Debug, Clone)]
pub struct EncodeTable {
    table_log: u32,
    next_state: Vec<u32>,
    delta_nb_bits: Vec<i64>,
    delta_find_state: Vec<i32>,
}

impl EncodeTable {
    pub fn build(counts: &NormalizedCounts) -> Self {
        let table_log = counts.table_log();
        let table_size = 1usize << table_log;
        let spread = spread_table(counts.counts(), table_log);
        let alphabet_size = counts.alphabet_size();

        let mut delta_nb_bits = vec![0i64; alphabet_size];
        let mut delta_find_state = vec![0i32; alphabet_size];
        let mut total: i64 = 0;
        for (symbol, &c) in counts.counts().iter().enumerate() {
            if c == 0 {
                continue;
            }
            if c == 1 {
                delta_nb_bits[symbol] = ((table_log as i64) << 16) - table_size as i64;
            } else {
                let hb = 31 - (c - 1).leading_zeros() as i64;
                let max_bits_out = table_log as i64 - hb;
                delta_nb_bits[symbol] = (max_bits_out << 16) - ((c as i64) << max_bits_out);
            }
            delta_find_state[symbol] = (total - c as i64) as i32;
            total += c as i64;
        }

        let mut next_state = vec![0u32; table_size];
        let mut next = counts.counts().to_vec();
        for state in table_size..2 * table_size {
            let symbol = spread[state - table_size] as usize;
            let idx = (delta_find_state[symbol] + next[symbol] as i32) as usize;
            next_state[idx] = state as u32;
            next[symbol] += 1;
        }

        EncodeTable {
            table_log,
            next_state,
            delta_nb_bits,
            delta_find_state,
        }
    }

    pub fn table_log(&self) -> u32 {
        self.table_log
    }
}

/// Per-state decode constants built from the same spread table, per
/// `final-state-rs`'s `build_decode_table`.
#[derive(Debug, Clone)]
pub struct DecodeTable {
    table_log: u32,
    symbols: Vec<u16>,
    nb_bits: Vec<u8>,
    new_state_base: Vec<u32>,
}

impl DecodeTable {
    pub fn build(counts: &NormalizedCounts) -> Self {
        let table_log = counts.table_log();
        let table_size = 1usize << table_log;
        let spread = spread_table(counts.counts(), table_log);
        let mut symbol_next = counts.counts().to_vec();
        let mut nb_bits = vec![0u8; table_size];
        let mut new_state_base = vec![0u32; table_size];

        for state in 0..table_size {
            let symbol = spread[state];
            let x = symbol_next[symbol as usize];
            symbol_next[symbol as usize] += 1;
            let hb = u32::BITS - 1 - x.leading_zeros();
            let bits = table_log - hb;
            nb_bits[state] = bits as u8;
            new_state_base[state] = (x << bits) - table_size as u32;
        }

        DecodeTable {
            table_log,
            symbols: spread,
            nb_bits,
            new_state_base,
        }
    }

    pub fn table_log(&self) -> u32 {
        self.table_log
    }
}

/// Encodes a run of symbols against one [`EncodeTable`], in one state.
pub struct FseEncoder<'a> {
    table: &'a EncodeTable,
    state: u32,
    emissions: Vec<(u32, u32)>,
}

impl<'a> FseEncoder<'a> {
    pub fn new(table: &'a EncodeTable) -> Self {
        FseEncoder {
            table,
            state: 1u32 << table.table_log,
            emissions: Vec::new(),
        }
    }

    /// Folds one symbol into the running state. Symbols must be fed in
    /// the *reverse* of their original order; [`Self::finish`] replays the
    /// recorded emissions forward so the bitstream itself stays in plain
    /// forward order for the decoder.
    pub fn encode_reverse(&mut self, symbol: u16) {
        let delta = self.table.delta_nb_bits[symbol as usize];
        let nb_bits_out = ((self.state as i64 + delta) >> 16) as u32;
        let mask = if nb_bits_out == 0 {
            0
        } else {
            (1u32 << nb_bits_out) - 1
        };
        let value = self.state & mask;
        self.emissions.push((value, nb_bits_out));
        let idx =
            ((self.state >> nb_bits_out) as i32 + self.table.delta_find_state[symbol as usize])
                as usize;
        self.state = self.table.next_state[idx];
    }

    /// Writes the final state followed by every recorded emission in
    /// forward (original data) order.
    pub fn finish(self, writer: &mut BitWriter) {
        let table_size = 1u32 << self.table.table_log;
        writer.put(self.state - table_size, self.table.table_log);
        for (value, nbits) in self.emissions.into_iter().rev() {
            writer.put(value, nbits);
        }
    }
}

/// Decodes a run of `count` symbols against one [`DecodeTable`].
pub struct FseDecoder<'a> {
    table: &'a DecodeTable,
    state: u32,
}

impl<'a> FseDecoder<'a> {
    pub fn new(table: &'a DecodeTable, reader: &mut BitReader) -> Result<Self> {
        let state = reader.get(table.table_log)?;
        Ok(FseDecoder { table, state })
    }

    pub fn decode_one(&mut self, reader: &mut BitReader) -> Result<u16> {
        let symbol = self.table.symbols[self.state as usize];
        let nbits = self.table.nb_bits[self.state as usize] as u32;
        let bits = reader.get(nbits)?;
        self.state = self.table.new_state_base[self.state as usize] + bits;
        Ok(symbol)
    }
}

fn bits_for_range(values: u32) -> u32 {
    if values <= 1 {
        0
    } else {
        32 - (values - 1).leading_zeros()
    }
}

/// Writes (1) a 5-bit table log, then (2) per symbol either a 1-flag-bit
/// plus a count sized to the remaining state budget, or a 1-flag-bit plus
/// a 5-bit run length opening a run of zero-count symbols.
pub fn write_table_header(writer: &mut BitWriter, counts: &NormalizedCounts) {
    writer.put(counts.table_log(), 5);
    let mut remaining = 1u32 << counts.table_log();
    let values = counts.counts();
    let mut i = 0;
    while i < values.len() {
        if values[i] == 0 {
            let mut run = 0u32;
            while i < values.len() && values[i] == 0 && run < 31 {
                run += 1;
                i += 1;
            }
            writer.put(0, 1);
            writer.put(run, 5);
        } else {
            let bits = bits_for_range(remaining + 1);
            writer.put(1, 1);
            writer.put(values[i], bits);
            remaining -= values[i];
            i += 1;
        }
    }
}

/// Inverse of [`write_table_header`]; validates that the counts sum to
/// exactly `1 << table_log` before returning.
pub fn read_table_header(reader: &mut BitReader, alphabet_size: usize) -> Result<NormalizedCounts> {
    let table_log = reader.get(5)?;
    if table_log == 0 || table_log > 24 {
        return Err(Error::Corrupt("fse table log out of range"));
    }
    let mut remaining = 1u32 << table_log;
    let mut counts = vec![0u32; alphabet_size];
    let mut i = 0usize;
    while i < alphabet_size {
        let flag = reader.get(1)?;
        if flag == 0 {
            let run = reader.get(5)? as usize;
            if run == 0 || i + run > alphabet_size {
                return Err(Error::Corrupt("fse table zero-run out of range"));
            }
            i += run;
        } else {
            let bits = bits_for_range(remaining + 1);
            let count = reader.get(bits)?;
            if count == 0 || count > remaining {
                return Err(Error::Corrupt("fse table count exceeds remaining budget"));
            }
            counts[i] = count;
            remaining -= count;
            i += 1;
        }
    }
    if remaining != 0 {
        return Err(Error::Corrupt("fse table counts do not sum to table size"));
    }
    Ok(NormalizedCounts { table_log, counts })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist_from(symbols: &[u16], alphabet_size: usize) -> Vec<u32> {
        let mut hist = vec![0u32; alphabet_size];
        for &s in symbols {
            hist[s as usize] += 1;
        }
        hist
    }

    #[test]
    fn normalized_counts_sum_to_table_size() {
        let hist = vec![100u32, 1, 1, 50, 0, 7];
        let counts = NormalizedCounts::build(&hist, 6);
        assert_eq!(counts.counts().iter().sum::<u32>(), 1 << 6);
        for (i, &h) in hist.iter().enumerate() {
            if h > 0 {
                assert!(counts.counts()[i] >= 1);
            } else {
                assert_eq!(counts.counts()[i], 0);
            }
        }
    }

    #[test]
    fn normalized_counts_handle_skewed_distribution() {
        let mut hist = vec![0u32; 16];
        hist[0] = 10_000;
        for i in 1..16 {
            hist[i] = 1;
        }
        let counts = NormalizedCounts::build(&hist, 8);
        assert_eq!(counts.counts().iter().sum::<u32>(), 1 << 8);
        assert!(counts.counts()[0] >= 1);
    }

    #[test]
    fn normalized_counts_exact_sum_when_one_symbol_dominates() {
        // One dominant symbol plus 19 near-silent ones: the floor-then-
        // remainder pass bumps every near-silent symbol up to the mandatory
        // minimum of 1, overshooting the table budget by far more than a
        // handful of units, so reducing back to the target must not give up
        // partway and leave the sum short.
        let mut hist = vec![0u32; 20];
        hist[0] = 10_000;
        for i in 1..20 {
            hist[i] = 1;
        }
        let counts = NormalizedCounts::build(&hist, 7);
        assert_eq!(counts.counts().iter().sum::<u32>(), 1 << 7);
        for (i, &h) in hist.iter().enumerate() {
            if h > 0 {
                assert!(counts.counts()[i] >= 1);
            }
        }
    }

    #[test]
    fn spread_table_visits_every_slot_once() {
        let hist = vec![3u32, 1, 4];
        let counts = NormalizedCounts::build(&hist, 3);
        let spread = spread_table(counts.counts(), 3);
        assert_eq!(spread.len(), 8);
        let mut hits = [0u32; 3];
        for &s in &spread {
            hits[s as usize] += 1;
        }
        assert_eq!(hits.to_vec(), counts.counts());
    }

    #[test]
    fn table_header_round_trips() {
        let hist = vec![5u32, 0, 0, 3, 12, 0, 1, 9];
        let counts = NormalizedCounts::build(&hist, 5);
        let mut writer = BitWriter::new();
        write_table_header(&mut writer, &counts);
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        let decoded = read_table_header(&mut reader, hist.len()).unwrap();
        assert_eq!(decoded.table_log(), counts.table_log());
        assert_eq!(decoded.counts(), counts.counts());
    }

    #[test]
    fn encode_decode_round_trip() {
        let symbols: Vec<u16> = (0..500).map(|i| (i * 37 % 6) as u16).collect();
        let hist = hist_from(&symbols, 6);
        let counts = NormalizedCounts::build(&hist, 7);
        let encode_table = EncodeTable::build(&counts);
        let decode_table = DecodeTable::build(&counts);

        let mut encoder = FseEncoder::new(&encode_table);
        for &s in symbols.iter().rev() {
            encoder.encode_reverse(s);
        }
        let mut writer = BitWriter::new();
        encoder.finish(&mut writer);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let mut decoder = FseDecoder::new(&decode_table, &mut reader).unwrap();
        let mut decoded = Vec::with_capacity(symbols.len());
        for _ in 0..symbols.len() {
            decoded.push(decoder.decode_one(&mut reader).unwrap());
        }
        assert_eq!(decoded, symbols);
    }

    #[test]
    fn encode_decode_single_symbol_alphabet() {
        let symbols: Vec<u16> = vec![0; 20];
        let hist = vec![20u32];
        let counts = NormalizedCounts::build(&hist, 2);
        let encode_table = EncodeTable::build(&counts);
        let decode_table = DecodeTable::build(&counts);

        let mut encoder = FseEncoder::new(&encode_table);
        for &s in symbols.iter().rev() {
            encoder.encode_reverse(s);
        }
        let mut writer = BitWriter::new();
        encoder.finish(&mut writer);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let mut decoder = FseDecoder::new(&decode_table, &mut reader).unwrap();
        for &want in &symbols {
            assert_eq!(decoder.decode_one(&mut reader).unwrap(), want);
        }
    }

    #[test]
    fn malformed_header_reports_corrupt() {
        // table_log = 3 (table_size = 8); first symbol claims the whole
        // budget (count = 8, needs bits_for_range(9) = 4 bits), leaving
        // zero remaining. A second symbol then wrongly claims a nonzero
        // count instead of opening a zero-run: `read_table_header` must
        // reject it rather than reading a bogus count with zero width.
        let mut writer = BitWriter::new();
        writer.put(3, 5);
        writer.put(1, 1);
        writer.put(8, 4);
        writer.put(1, 1);
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        assert!(read_table_header(&mut reader, 2).is_err());
    }
}
