use std::collections::BTreeSet;

// ---------------------------------------------
// SPAWN RESULT RETURNED TO STATE
// ---------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSlot {
    pub slot: usize,
    pub position: [f32; 3],
}

// ---------------------------------------------
// SPAWN MANAGER FOR ALL VEHICLES
// ---------------------------------------------
/// Hands out non-overlapping spawn points around a base point, fanning out
/// along X: slot 0 at the base, then +1, -1, +2, -2 … times `spacing`.
#[derive(Debug)]
pub struct SpawnManager {
    pub spacing: f32,
    taken: BTreeSet<usize>,
}

impl SpawnManager {
    pub fn new(spacing: f32) -> Self {
        Self {
            spacing,
            taken: BTreeSet::new(),
        }
    }

    // ---------------------------------------------------------
    // Lowest free slot first, so released slots get reused
    // ---------------------------------------------------------
    pub fn allocate(&mut self, base: [f32; 3]) -> SpawnSlot {
        let slot = (0..).find(|s| !self.taken.contains(s)).unwrap_or(self.taken.len());
        self.taken.insert(slot);

        SpawnSlot {
            slot,
            position: self.position_for(slot, base),
        }
    }

    pub fn release(&mut self, slot: usize) {
        self.taken.remove(&slot);
    }

    pub fn in_use(&self) -> usize {
        self.taken.len()
    }

    fn position_for(&self, slot: usize, base: [f32; 3]) -> [f32; 3] {
        // 0, +1, -1, +2, -2, ...
        let rank = slot.div_ceil(2) as f32;
        let side = if slot % 2 == 1 { 1.0 } else { -1.0 };
        [base[0] + side * rank * self.spacing, base[1], base[2]]
    }
}
