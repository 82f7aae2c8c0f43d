//! Base/extra-bits slot tables for the length and offset alphabets.
//!
//! Both alphabets use the same shape: a small number of "slots", each
//! covering a contiguous range of values of growing width, encoded as
//! (slot index, extra bits verbatim within the slot's range). The growth
//! rule is the one the teacher's LZX position-slot tables hardcode as
//! 289/290-entry const arrays for a single fixed window ceiling:
//!
//! ```text
//! footer_bits(slot) = 0                      for slot < 4
//!                    = min(cap, (slot - 2) / 2)  otherwise
//! base(0)    = 0
//! base(slot) = base(slot - 1) + (1 << footer_bits(slot - 1))
//! ```
//!
//! `SlotTable::build` computes this for a caller-chosen value ceiling and
//! footer-bit cap instead of baking in one window size, so the same
//! function serves both the length alphabet (applied to `length - 2`) and
//! the offset alphabet (applied to the raw offset, for offsets past the
//! ROQ's 3-entry sub-alphabet).

/// One slot: the first value it covers, and how many extra bits are
/// needed to address any value within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub base: u32,
    pub footer_bits: u8,
}

/// A full base/extra-bits table covering `0..=max_value`.
#[derive(Debug, Clone)]
pub struct SlotTable {
    slots: Vec<Slot>,
}

impl SlotTable {
    /// Builds a table whose slots cover every value in `0..=max_value`.
    /// `footer_bits` grows by one every two slots past the first four
    /// (which are flat, zero-width slots for the smallest values) and is
    /// capped at `max_footer_bits`.
    pub fn build(max_value: u32, max_footer_bits: u8) -> Self {
        let mut slots = Vec::new();
        let mut base = 0u32;
        let mut slot_index = 0u32;
        loop {
            let footer_bits = Self::footer_bits_for_slot(slot_index, max_footer_bits);
            slots.push(Slot { base, footer_bits });
            let span = 1u64 << footer_bits;
            let next_base = base as u64 + span;
            if base as u64 <= max_value as u64 && next_base > max_value as u64 {
                break;
            }
            base = next_base as u32;
            slot_index += 1;
        }
        SlotTable { slots }
    }

    fn footer_bits_for_slot(slot_index: u32, cap: u8) -> u8 {
        if slot_index < 4 {
            0
        } else {
            (((slot_index - 2) / 2) as u8).min(cap)
        }
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Slot {
        self.slots[index]
    }

    /// Finds the slot covering `value` and the extra bits identifying its
    /// exact position within that slot's range.
    pub fn encode(&self, value: u32) -> (u16, u32, u8) {
        debug_assert!(!self.slots.is_empty());
        let idx = match self.slots.binary_search_by(|s| s.base.cmp(&value)) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let slot = self.slots[idx];
        let extra = value - slot.base;
        (idx as u16, extra, slot.footer_bits)
    }

    /// Reconstructs the value from a slot index and its extra bits.
    pub fn decode(&self, slot_index: u16, extra: u32) -> Option<u32> {
        let slot = self.slots.get(slot_index as usize)?;
        Some(slot.base + extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_teacher_footer_bits_for_small_slots() {
        let expected = [0u8, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7];
        for (i, &want) in expected.iter().enumerate() {
            assert_eq!(SlotTable::footer_bits_for_slot(i as u32, 17), want);
        }
    }

    #[test]
    fn caps_footer_bits() {
        assert_eq!(SlotTable::footer_bits_for_slot(100, 17), 17);
    }

    #[test]
    fn base_progression_matches_teacher_prefix() {
        let table = SlotTable::build(1 << 20, 17);
        let expected_bases = [0u32, 1, 2, 3, 4, 6, 8, 12, 16, 24, 32, 48, 64, 96, 128];
        for (i, &base) in expected_bases.iter().enumerate() {
            assert_eq!(table.slot(i).base, base);
        }
    }

    #[test]
    fn encode_decode_round_trip_every_value() {
        let table = SlotTable::build(5000, 8);
        for value in 0..=5000u32 {
            let (slot, extra, footer_bits) = table.encode(value);
            assert!(extra < (1u32 << footer_bits) || footer_bits == 0);
            let back = table.decode(slot, extra).unwrap();
            assert_eq!(back, value, "value {value} round-tripped to {back}");
        }
    }

    #[test]
    fn small_values_get_zero_footer_bits() {
        let table = SlotTable::build(10, 4);
        for v in 0..4 {
            let (_, _, footer_bits) = table.encode(v);
            assert_eq!(footer_bits, 0);
        }
    }

    #[test]
    fn covers_full_32_bit_offset_domain_with_small_cap() {
        let table = SlotTable::build(u32::MAX, 24);
        let (slot, extra, footer_bits) = table.encode(u32::MAX);
        assert_eq!(table.decode(slot, extra).unwrap(), u32::MAX);
        assert!(footer_bits <= 24);
    }
}
