//! Hash-chain LZ77 match finder.
//!
//! For each input position the finder hashes a 3- or 4-byte prefix into a
//! bucket, chains through prior positions sharing that prefix, and keeps
//! the longest verified match — the same multiplicative-hash,
//! word-at-a-time-comparator idiom the corpus's LZ4-style finder uses for
//! its single-slot table (`hash_for_u32`/`count_matching_bytes`), expanded
//! here from a single slot per bucket into a proper chain via a `prev`
//! array, since the spec requires bounded-depth chain walks rather than a
//! most-recent-only table.

use crate::roq::{Roq, RoqRef};

const NONE: u32 = u32::MAX;

/// Compression-level tunables. Levels 1..=9, low to high effort.
#[derive(Debug, Clone, Copy)]
pub struct LevelParams {
    pub hash_bits: u32,
    pub use_3byte_hash: bool,
    pub max_chain_depth: u32,
    pub good_length: usize,
    pub nice_length: usize,
    pub lazy_depth: u8,
}

impl LevelParams {
    pub fn for_level(level: u8) -> LevelParams {
        match level.clamp(1, 9) {
            1 => LevelParams {
                hash_bits: 14,
                use_3byte_hash: false,
                max_chain_depth: 4,
                good_length: 8,
                nice_length: 16,
                lazy_depth: 0,
            },
            2 => LevelParams {
                hash_bits: 15,
                use_3byte_hash: false,
                max_chain_depth: 8,
                good_length: 8,
                nice_length: 32,
                lazy_depth: 0,
            },
            3 => LevelParams {
                hash_bits: 15,
                use_3byte_hash: true,
                max_chain_depth: 16,
                good_length: 16,
                nice_length: 32,
                lazy_depth: 0,
            },
            4 => LevelParams {
                hash_bits: 16,
                use_3byte_hash: true,
                max_chain_depth: 24,
                good_length: 24,
                nice_length: 64,
                lazy_depth: 1,
            },
            5 => LevelParams {
                hash_bits: 16,
                use_3byte_hash: true,
                max_chain_depth: 32,
                good_length: 32,
                nice_length: 64,
                lazy_depth: 1,
            },
            6 => LevelParams {
                hash_bits: 17,
                use_3byte_hash: true,
                max_chain_depth: 48,
                good_length: 48,
                nice_length: 128,
                lazy_depth: 1,
            },
            7 => LevelParams {
                hash_bits: 17,
                use_3byte_hash: true,
                max_chain_depth: 64,
                good_length: 64,
                nice_length: 128,
                lazy_depth: 2,
            },
            8 => LevelParams {
                hash_bits: 18,
                use_3byte_hash: true,
                max_chain_depth: 128,
                good_length: 96,
                nice_length: 192,
                lazy_depth: 2,
            },
            _ => LevelParams {
                hash_bits: 18,
                use_3byte_hash: true,
                max_chain_depth: 256,
                good_length: 128,
                nice_length: 256,
                lazy_depth: 2,
            },
        }
    }
}

/// Where a found match's offset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Roq(RoqRef),
    Chain,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchCandidate {
    pub length: usize,
    pub offset: u32,
    pub source: MatchSource,
}

impl MatchCandidate {
    pub fn is_roq(&self) -> bool {
        matches!(self.source, MatchSource::Roq(_))
    }
}

fn hash4(v: u32) -> u32 {
    v.wrapping_mul(2_654_435_761)
}

fn hash3(v: u32) -> u32 {
    (v & 0x00ff_ffff).wrapping_mul(506_832_829)
}

fn read_u32_le(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// Counts matching bytes starting at `a` and `b` in `data`, up to
/// `max_len`, word-at-a-time via XOR + trailing/leading zero counts —
/// the same comparator shape as the corpus's LZ4-style finder.
pub fn count_matching_bytes(data: &[u8], a: usize, b: usize, max_len: usize) -> usize {
    let mut n = 0;
    while n + 8 <= max_len {
        let wa = u64::from_ne_bytes(data[a + n..a + n + 8].try_into().unwrap());
        let wb = u64::from_ne_bytes(data[b + n..b + n + 8].try_into().unwrap());
        let x = wa ^ wb;
        if x != 0 {
            return n + (x.trailing_zeros() / 8) as usize;
        }
        n += 8;
    }
    while n < max_len && data[a + n] == data[b + n] {
        n += 1;
    }
    n
}

/// Hash-chain head/prev tables plus an optional smaller 3-byte head table,
/// scratch-allocated once per compressor and reset at the start of each
/// `compress` call.
pub struct MatchFinder {
    head: Vec<u32>,
    head3: Vec<u32>,
    prev: Vec<u32>,
    window: usize,
}

impl MatchFinder {
    pub fn new(max_buffer_size: usize, params: &LevelParams) -> Self {
        let head_len = 1usize << params.hash_bits;
        MatchFinder {
            head: vec![NONE; head_len],
            head3: if params.use_3byte_hash {
                vec![NONE; head_len]
            } else {
                Vec::new()
            },
            prev: vec![NONE; max_buffer_size.max(1)],
            window: crate::window::window_size_for(max_buffer_size),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Clears chain heads so no stale match from a prior `compress` call
    /// can be found. `prev` entries do not need clearing: they only
    /// become reachable through a head this call has populated.
    pub fn reset(&mut self) {
        self.head.iter_mut().for_each(|h| *h = NONE);
        self.head3.iter_mut().for_each(|h| *h = NONE);
    }

    fn hash_bits(&self) -> u32 {
        self.head.len().trailing_zeros()
    }

    /// Inserts `pos` into the hash chains. `data` must have at least 4
    /// bytes remaining from `pos`.
    pub fn insert(&mut self, data: &[u8], pos: usize, params: &LevelParams) {
        let v = read_u32_le(data, pos);
        let h4 = (hash4(v) >> (32 - self.hash_bits())) as usize;
        self.prev[pos] = self.head[h4];
        self.head[h4] = pos as u32;
        if params.use_3byte_hash {
            let h3 = (hash3(v) >> (32 - self.hash_bits())) as usize;
            self.head3[h3] = pos as u32;
        }
    }

    /// Finds the best match at `pos`, checking the ROQ offsets and the
    /// hash chain. Returns `None` if nothing of length >= 2 was found.
    pub fn find_best_match(
        &self,
        data: &[u8],
        pos: usize,
        roq: &Roq,
        params: &LevelParams,
    ) -> Option<MatchCandidate> {
        self.find_best_match_bounded(data, pos, data.len() - pos, roq, params)
    }

    /// Same as [`Self::find_best_match`], but caps match length at `limit`
    /// bytes from `pos` instead of the rest of `data` — used to keep a
    /// match from reaching past the end of the block currently being
    /// parsed even though `data` (and the hash chains) span the whole
    /// input buffer.
    pub fn find_best_match_bounded(
        &self,
        data: &[u8],
        pos: usize,
        limit: usize,
        roq: &Roq,
        params: &LevelParams,
    ) -> Option<MatchCandidate> {
        let max_len = limit.min(data.len() - pos);
        if max_len < 2 {
            return None;
        }
        let mut best: Option<MatchCandidate> = None;

        let roq_refs = [RoqRef::Slot0, RoqRef::Slot1, RoqRef::Slot2];
        for (slot, &r) in roq_refs.iter().enumerate() {
            let offset = roq.get(slot) as usize;
            if offset == 0 || offset > pos {
                continue;
            }
            let len = count_matching_bytes(data, pos, pos - offset, max_len);
            if len >= 2 {
                let better = match best {
                    None => true,
                    Some(b) => len > b.length,
                };
                if better {
                    best = Some(MatchCandidate {
                        length: len,
                        offset: offset as u32,
                        source: MatchSource::Roq(r),
                    });
                }
            }
        }

        if max_len >= 4 {
            let v = read_u32_le(data, pos);
            let h4 = (hash4(v) >> (32 - self.hash_bits())) as usize;
            let mut candidate = self.head[h4];
            let mut depth = 0;
            while candidate != NONE && depth < params.max_chain_depth {
                let cpos = candidate as usize;
                if pos - cpos > self.window {
                    break;
                }
                let len = count_matching_bytes(data, pos, cpos, max_len);
                if len >= 4 {
                    let offset = (pos - cpos) as u32;
                    let better = match best {
                        None => true,
                        Some(b) if b.is_roq() => len > b.length,
                        Some(b) => len > b.length || (len == b.length && offset < b.offset),
                    };
                    if better {
                        best = Some(MatchCandidate {
                            length: len,
                            offset,
                            source: MatchSource::Chain,
                        });
                    }
                    if len >= params.nice_length {
                        break;
                    }
                }
                if best.map(|b| b.length).unwrap_or(0) >= params.good_length {
                    break;
                }
                candidate = self.prev[cpos];
                depth += 1;
            }

            if params.use_3byte_hash {
                let h3 = (hash3(v) >> (32 - self.hash_bits())) as usize;
                let cpos3 = self.head3[h3];
                if cpos3 != NONE {
                    let cpos3 = cpos3 as usize;
                    if pos > cpos3 && pos - cpos3 <= self.window {
                        let len = count_matching_bytes(data, pos, cpos3, max_len);
                        if len >= 3 {
                            let offset = (pos - cpos3) as u32;
                            let better = match best {
                                None => true,
                                Some(b) if b.is_roq() => len > b.length,
                                Some(b) => len > b.length || (len == b.length && offset < b.offset),
                            };
                            if better {
                                best = Some(MatchCandidate {
                                    length: len,
                                    offset,
                                    source: MatchSource::Chain,
                                });
                            }
                        }
                    }
                }
            }
        }

        best
    }
}
