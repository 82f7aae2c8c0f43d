//! Greedy and lazy parsers: drive the [`crate::matcher::MatchFinder`] over
//! one block's worth of input and produce a flat sequence of literals and
//! matches for [`crate::block`] to encode.

use crate::matcher::{LevelParams, MatchCandidate, MatchFinder};
use crate::roq::{Roq, RoqRef};

pub const MIN_MATCH: usize = 2;

/// One literal byte or one accepted match, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Literal(u8),
    Match { length: u32, offset: u32 },
}

/// A small length bonus that keeps a match using an already-recent offset
/// competitive against a marginally longer match that would introduce a
/// brand new offset — new offsets cost a full offset code, ROQ hits don't.
fn roq_bias(candidate: &MatchCandidate) -> usize {
    if candidate.is_roq() {
        1
    } else {
        0
    }
}

fn resolve_reference(roq: &Roq, candidate: &MatchCandidate) -> RoqRef {
    match candidate.source {
        crate::matcher::MatchSource::Roq(r) => r,
        crate::matcher::MatchSource::Chain => match roq.find(candidate.offset) {
            Some(0) => RoqRef::Slot0,
            Some(1) => RoqRef::Slot1,
            Some(2) => RoqRef::Slot2,
            _ => RoqRef::New(candidate.offset),
        },
    }
}

fn insert_range(finder: &mut MatchFinder, data: &[u8], start: usize, end: usize, params: &LevelParams) {
    for p in start..end {
        if p + 4 <= data.len() {
            finder.insert(data, p, params);
        }
    }
}

/// At each position, take the finder's best match outright if it meets
/// `MIN_MATCH`; otherwise emit a literal. Parses `data[start..end]`, but
/// matches may still reference bytes before `start` from earlier blocks.
pub fn parse_greedy(
    data: &[u8],
    start: usize,
    end: usize,
    finder: &mut MatchFinder,
    roq: &mut Roq,
    params: &LevelParams,
) -> Vec<Sequence> {
    let mut out = Vec::with_capacity((end - start) / 2 + 1);
    let mut pos = start;
    while pos < end {
        let limit = end - pos;
        let candidate = finder.find_best_match_bounded(data, pos, limit, roq, params);
        match candidate {
            Some(m) if m.length >= MIN_MATCH => {
                out.push(Sequence::Match {
                    length: m.length as u32,
                    offset: m.offset,
                });
                roq.update(resolve_reference(roq, &m));
                insert_range(finder, data, pos, pos + m.length, params);
                pos += m.length;
            }
            _ => {
                out.push(Sequence::Literal(data[pos]));
                if pos + 4 <= data.len() {
                    finder.insert(data, pos, params);
                }
                pos += 1;
            }
        }
    }
    out
}

/// Peeks one (or, at the highest levels, two) positions ahead before
/// committing to a match, preferring to let a longer match downstream win
/// by emitting a literal now instead. Parses `data[start..end]`.
pub fn parse_lazy(
    data: &[u8],
    start: usize,
    end: usize,
    finder: &mut MatchFinder,
    roq: &mut Roq,
    params: &LevelParams,
) -> Vec<Sequence> {
    let mut out = Vec::with_capacity((end - start) / 2 + 1);
    let mut pos = start;
    while pos < end {
        let limit = end - pos;
        let here = finder.find_best_match_bounded(data, pos, limit, roq, params);
        let here_len = here.map(|m| m.length + roq_bias(&m)).unwrap_or(0);

        if here_len < MIN_MATCH {
            out.push(Sequence::Literal(data[pos]));
            if pos + 4 <= data.len() {
                finder.insert(data, pos, params);
            }
            pos += 1;
            continue;
        }

        let mut defer = false;
        if pos + 1 < end {
            if pos + 4 <= data.len() {
                finder.insert(data, pos, params);
            }
            let next_limit = end - (pos + 1);
            let next = finder.find_best_match_bounded(data, pos + 1, next_limit, roq, params);
            let next_len = next.map(|m| m.length).unwrap_or(0);
            if next_len > here_len {
                defer = true;
                if params.lazy_depth >= 2 && pos + 2 < end {
                    if pos + 5 <= data.len() {
                        finder.insert(data, pos + 1, params);
                    }
                    let next2_limit = end - (pos + 2);
                    let next2 =
                        finder.find_best_match_bounded(data, pos + 2, next2_limit, roq, params);
                    let next2_len = next2.map(|m| m.length).unwrap_or(0);
                    defer = next2_len > here_len || next_len > here_len;
                }
            }
            if defer {
                out.push(Sequence::Literal(data[pos]));
                pos += 1;
                continue;
            }
        }

        let candidate = here.unwrap();
        out.push(Sequence::Match {
            length: candidate.length as u32,
            offset: candidate.offset,
        });
        roq.update(resolve_reference(roq, &candidate));
        let match_end = pos + candidate.length;
        insert_range(finder, data, pos + 1, match_end, params);
        pos = match_end;
    }
    out
}

/// Drives whichever parser the level calls for over `data[start..end]`.
pub fn parse_range(
    data: &[u8],
    start: usize,
    end: usize,
    finder: &mut MatchFinder,
    roq: &mut Roq,
    params: &LevelParams,
) -> Vec<Sequence> {
    if params.lazy_depth == 0 {
        parse_greedy(data, start, end, finder, roq, params)
    } else {
        parse_lazy(data, start, end, finder, roq, params)
    }
}

/// Convenience wrapper for parsing the whole buffer in one block.
pub fn parse(
    data: &[u8],
    finder: &mut MatchFinder,
    roq: &mut Roq,
    params: &LevelParams,
) -> Vec<Sequence> {
    parse_range(data, 0, data.len(), finder, roq, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(data_len_hint: usize, sequences: &[Sequence]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data_len_hint);
        for seq in sequences {
            match *seq {
                Sequence::Literal(b) => out.push(b),
                Sequence::Match { length, offset } => {
                    for _ in 0..length {
                        let byte = out[out.len() - offset as usize];
                        out.push(byte);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn greedy_parse_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog. the quick brown fox.";
        let params = LevelParams::for_level(3);
        let mut finder = MatchFinder::new(data.len(), &params);
        let mut roq = Roq::new();
        let seqs = parse_greedy(data, 0, data.len(), &mut finder, &mut roq, &params);
        assert_eq!(reconstruct(data.len(), &seqs), data);
    }

    #[test]
    fn lazy_parse_round_trips() {
        let data = b"ababababab the quick brown fox jumps, the quick brown fox jumps again";
        let params = LevelParams::for_level(8);
        let mut finder = MatchFinder::new(data.len(), &params);
        let mut roq = Roq::new();
        let seqs = parse_lazy(data, 0, data.len(), &mut finder, &mut roq, &params);
        assert_eq!(reconstruct(data.len(), &seqs), data);
    }

    #[test]
    fn lazy_parse_finds_matches_on_repetitive_input() {
        let data = vec![b'z'; 1024];
        let params = LevelParams::for_level(9);
        let mut finder = MatchFinder::new(data.len(), &params);
        let mut roq = Roq::new();
        let seqs = parse_lazy(&data, 0, data.len(), &mut finder, &mut roq, &params);
        assert_eq!(reconstruct(data.len(), &seqs), data);
        let match_count = seqs
            .iter()
            .filter(|s| matches!(s, Sequence::Match { .. }))
            .count();
        assert!(match_count < 20, "expected heavy run-length collapse, got {match_count} matches");
    }

    #[test]
    fn empty_input_produces_no_sequences() {
        let data: &[u8] = b"";
        let params = LevelParams::for_level(1);
        let mut finder = MatchFinder::new(1, &params);
        let mut roq = Roq::new();
        let seqs = parse_greedy(data, 0, 0, &mut finder, &mut roq, &params);
        assert!(seqs.is_empty());
    }

    #[test]
    fn bounded_parse_does_not_cross_block_end() {
        // A match at the block boundary must not claim bytes past `end`
        // even though the source text continues beyond it in `data`.
        let data = b"abcabcabcabcabcabc_TAIL_BYTES_NOT_IN_BLOCK";
        let block_end = 18; // "abcabcabcabcabcabc"
        let params = LevelParams::for_level(6);
        let mut finder = MatchFinder::new(data.len(), &params);
        let mut roq = Roq::new();
        let seqs = parse_range(data, 0, block_end, &mut finder, &mut roq, &params);
        let total: usize = seqs
            .iter()
            .map(|s| match s {
                Sequence::Literal(_) => 1,
                Sequence::Match { length, .. } => *length as usize,
            })
            .sum();
        assert_eq!(total, block_end);
        assert_eq!(reconstruct(block_end, &seqs), &data[..block_end]);
    }
}
