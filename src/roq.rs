//! The recent-offsets queue: an ordered triple of the three most recently
//! emitted match offsets, with promote-on-hit semantics.
//!
//! The teacher has no standalone type for this — LZXD inlines it as a
//! `r: [u32; 3]` field on the decoder and updates it by hand at each match
//! (`self.r[2] = self.r[1]; self.r[1] = self.r[0]; self.r[0] = offset;`
//! when a genuinely new offset is used, with a swap-to-front instead when
//! the match reuses slot 1 or 2). This lifts that logic into a small
//! reusable type so the compressor and decompressor share one
//! implementation and can't drift apart.

/// Index of the ROQ entry a match referred to. `New` carries the literal
/// offset that becomes the new slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoqRef {
    Slot0,
    Slot1,
    Slot2,
    New(u32),
}

/// Three most recent match offsets, most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roq {
    offsets: [u32; 3],
}

impl Default for Roq {
    fn default() -> Self {
        Self::new()
    }
}

impl Roq {
    /// The initial state both sides agree on before any block has been
    /// decoded: `{1, 2, 3}`.
    pub fn new() -> Self {
        Roq {
            offsets: [1, 2, 3],
        }
    }

    pub fn get(&self, slot: usize) -> u32 {
        self.offsets[slot]
    }

    pub fn offsets(&self) -> [u32; 3] {
        self.offsets
    }

    /// Finds which slot (if any) already holds `offset`.
    pub fn find(&self, offset: u32) -> Option<usize> {
        self.offsets.iter().position(|&o| o == offset)
    }

    /// Updates the queue after emitting a match referencing `reference`.
    /// Slot-0 hits leave the queue untouched; slot-1/slot-2 hits promote
    /// that entry to the front, shifting the others back; a new offset is
    /// pushed to the front and the others shift back, dropping slot 2.
    pub fn update(&mut self, reference: RoqRef) {
        match reference {
            RoqRef::Slot0 => {}
            RoqRef::Slot1 => {
                self.offsets.swap(0, 1);
            }
            RoqRef::Slot2 => {
                let hit = self.offsets[2];
                self.offsets[2] = self.offsets[1];
                self.offsets[1] = self.offsets[0];
                self.offsets[0] = hit;
            }
            RoqRef::New(offset) => {
                self.offsets[2] = self.offsets[1];
                self.offsets[1] = self.offsets[0];
                self.offsets[0] = offset;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_one_two_three() {
        assert_eq!(Roq::new().offsets(), [1, 2, 3]);
    }

    #[test]
    fn slot0_hit_is_a_no_op() {
        let mut r = Roq::new();
        r.update(RoqRef::Slot0);
        assert_eq!(r.offsets(), [1, 2, 3]);
    }

    #[test]
    fn slot1_hit_swaps_to_front() {
        let mut r = Roq::new();
        r.update(RoqRef::Slot1);
        assert_eq!(r.offsets(), [2, 1, 3]);
    }

    #[test]
    fn slot2_hit_promotes_to_front() {
        let mut r = Roq::new();
        r.update(RoqRef::Slot2);
        assert_eq!(r.offsets(), [3, 1, 2]);
    }

    #[test]
    fn new_offset_pushes_and_drops_oldest() {
        let mut r = Roq::new();
        r.update(RoqRef::New(99));
        assert_eq!(r.offsets(), [99, 1, 2]);
    }

    #[test]
    fn find_locates_existing_offsets() {
        let r = Roq::new();
        assert_eq!(r.find(1), Some(0));
        assert_eq!(r.find(2), Some(1));
        assert_eq!(r.find(3), Some(2));
        assert_eq!(r.find(42), None);
    }
}
