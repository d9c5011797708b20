//! Bin-indexed storage for the vectors of one phase.

use crate::bin_context::BinContext;
use crate::vector::{Vector, VectorMut};
use std::collections::HashMap;

/// Arena of fixed-size feature vectors, one per touched bin.
///
/// All vectors live in one contiguous buffer with a stride of the composite
/// vector size; a map from bin index to slot gives O(1) access. Slots are
/// handed out in first-touch order and never move, so growing the arena does
/// not allocate per bin beyond the bin's [`BinContext`].
#[derive(Debug)]
pub struct BinArena {
    stride: usize,
    data: Vec<f32>,
    slots: HashMap<i64, usize>,
    entries: Vec<ArenaEntry>,
}

#[derive(Debug)]
struct ArenaEntry {
    index: i64,
    num_obs: usize,
    context: BinContext,
}

impl BinArena {
    pub fn new(stride: usize) -> Self {
        Self {
            stride,
            data: Vec::new(),
            slots: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, index: i64) -> bool {
        self.slots.contains_key(&index)
    }

    /// Slot of bin `index`, allocating and initializing it with `init` on
    /// first touch.
    pub fn slot_or_insert_with<F>(&mut self, index: i64, init: F) -> usize
    where
        F: FnOnce(&mut BinContext, &mut VectorMut<'_>),
    {
        if let Some(&slot) = self.slots.get(&index) {
            return slot;
        }
        let slot = self.entries.len();
        self.data.resize(self.data.len() + self.stride, f32::NAN);
        self.entries.push(ArenaEntry {
            index,
            num_obs: 0,
            context: BinContext::new(index),
        });
        self.slots.insert(index, slot);

        let (context, mut vector) = self.slot_mut(slot);
        init(context, &mut vector);
        slot
    }

    /// Context and writable vector of `slot`.
    pub fn slot_mut(&mut self, slot: usize) -> (&mut BinContext, VectorMut<'_>) {
        let start = slot * self.stride;
        let vector = VectorMut::new(&mut self.data[start..start + self.stride]);
        (&mut self.entries[slot].context, vector)
    }

    pub fn vector(&self, slot: usize) -> Vector<'_> {
        let start = slot * self.stride;
        Vector::new(&self.data[start..start + self.stride])
    }

    pub fn increment_obs(&mut self, slot: usize) {
        self.entries[slot].num_obs += 1;
    }

    pub fn num_obs(&self, slot: usize) -> usize {
        self.entries[slot].num_obs
    }

    pub fn bin_index(&self, slot: usize) -> i64 {
        self.entries[slot].index
    }

    /// Slots ordered by ascending bin index.
    pub fn sorted_slots(&self) -> Vec<usize> {
        let mut slots: Vec<usize> = (0..self.entries.len()).collect();
        slots.sort_unstable_by_key(|&slot| self.entries[slot].index);
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_reuse_and_init_once() {
        let mut arena = BinArena::new(2);
        let mut inits = 0;
        let a = arena.slot_or_insert_with(42, |_, v| {
            inits += 1;
            v.fill(0.0);
        });
        let b = arena.slot_or_insert_with(42, |_, _| inits += 1);
        assert_eq!(a, b);
        assert_eq!(inits, 1);
        assert_eq!(arena.vector(a).as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_vectors_do_not_overlap() {
        let mut arena = BinArena::new(3);
        let s1 = arena.slot_or_insert_with(9, |_, v| v.fill(1.0));
        let s2 = arena.slot_or_insert_with(3, |_, v| v.fill(2.0));
        {
            let (ctx, mut v) = arena.slot_mut(s1);
            assert_eq!(ctx.index(), 9);
            v.set(2, 5.0);
        }
        assert_eq!(arena.vector(s1).as_slice(), &[1.0, 1.0, 5.0]);
        assert_eq!(arena.vector(s2).as_slice(), &[2.0, 2.0, 2.0]);
        assert_eq!(arena.sorted_slots(), vec![s2, s1]);
        assert_eq!(arena.bin_index(s2), 3);
    }

    #[test]
    fn test_obs_counting() {
        let mut arena = BinArena::new(1);
        let s = arena.slot_or_insert_with(1, |_, _| {});
        arena.increment_obs(s);
        arena.increment_obs(s);
        assert_eq!(arena.num_obs(s), 2);
        assert_eq!(arena.len(), 1);
        assert!(arena.contains(1));
        assert!(!arena.contains(2));
    }
}
