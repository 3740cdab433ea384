// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::{OrdinaryObject, ShapeId, Value};

/// An array's element storage is a sum over its mode: a contiguous fast
/// buffer, or nothing at all because the indexed properties live in the
/// backing generic store. The transition out of `Fast` is one-way.
#[derive(Debug, Clone)]
pub enum ArrayElements {
    Fast(FastElements),
    Slow,
}

impl ArrayElements {
    pub(crate) fn is_fast(&self) -> bool {
        matches!(self, ArrayElements::Fast(_))
    }
}

/// An Array gives special treatment to array index property keys. Every
/// array carries a `length` slot in `[0, 2^32 - 1]` whose writability can be
/// cleared exactly once, and either a fast buffer of exactly `length`
/// logical slots or a reference into the generic store.
#[derive(Debug, Clone)]
pub struct ArrayHeapData {
    /// Backing object for named properties, and for indexed properties once
    /// the array has left fast mode.
    pub object_index: Option<OrdinaryObject>,
    /// Mirrors the backing object's shape after every structural change so
    /// snapshots can use one identity per object.
    pub(crate) shape: ShapeId,
    pub(crate) length: u32,
    pub(crate) length_writable: bool,
    pub(crate) elements: ArrayElements,
}

/// Buffers no longer than this are always sized exactly.
const EXACT_FIT_MAX_LENGTH: u32 = 128;
/// Expansions use percentage growth this many times, then jump to powers of
/// two.
const PERCENT_GROWTH_EXPANSIONS: u8 = 3;

/// The fast-mode buffer: `length` logical slots of `Option<Value>` where
/// `None` is a hole, over an allocation whose capacity follows the growth
/// schedule.
#[derive(Debug, Clone, Default)]
pub struct FastElements {
    values: Vec<Option<Value>>,
    capacity: u32,
    expand_count: u8,
}

impl FastElements {
    pub(crate) fn len(&self) -> u32 {
        self.values.len() as u32
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    pub(crate) fn as_slice(&self) -> &[Option<Value>] {
        &self.values
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Option<Value>] {
        &mut self.values
    }

    pub(crate) fn into_values(self) -> Vec<Option<Value>> {
        self.values
    }

    /// Resizes the logical length. New slots are holes. Small buffers and
    /// first allocations are sized exactly; larger growth reserves ahead of
    /// need, 30% over length for the first expansions and the next power of
    /// two after that; larger shrinks keep the allocation.
    pub(crate) fn resize(&mut self, new_length: u32) {
        let old_length = self.len();
        if new_length == old_length {
            return;
        }
        if new_length <= EXACT_FIT_MAX_LENGTH || old_length == 0 {
            self.values.truncate(new_length as usize);
            self.values.resize(new_length as usize, None);
            self.values.shrink_to_fit();
            self.capacity = new_length;
            return;
        }
        if new_length < old_length {
            self.values.truncate(new_length as usize);
            return;
        }
        if new_length > self.capacity {
            let new_capacity = if self.expand_count >= PERCENT_GROWTH_EXPANSIONS {
                new_length.next_power_of_two()
            } else {
                self.expand_count += 1;
                ((new_length as u64 * 130).div_ceil(100)).min(u32::MAX as u64) as u32
            };
            self.values
                .reserve_exact(new_capacity as usize - self.values.len());
            self.capacity = new_capacity;
        }
        self.values.resize(new_length as usize, None);
    }
}

#[cfg(test)]
mod tests {
    use super::FastElements;

    #[test]
    fn small_buffers_size_exactly() {
        let mut elements = FastElements::default();
        elements.resize(3);
        assert_eq!(elements.len(), 3);
        assert_eq!(elements.capacity(), 3);
        elements.resize(100);
        assert_eq!(elements.capacity(), 100);
        elements.resize(7);
        assert_eq!(elements.capacity(), 7);
    }

    #[test]
    fn first_expansions_grow_by_thirty_percent() {
        let mut elements = FastElements::default();
        elements.resize(100);
        // Growing past the exact-fit bound reserves 30% over the length.
        elements.resize(200);
        assert_eq!(elements.capacity(), 260);
        // Growth within capacity does not reallocate.
        elements.resize(260);
        assert_eq!(elements.capacity(), 260);
        elements.resize(300);
        assert_eq!(elements.capacity(), 390);
    }

    #[test]
    fn later_expansions_jump_to_powers_of_two() {
        let mut elements = FastElements::default();
        elements.resize(100);
        elements.resize(200);
        elements.resize(400);
        elements.resize(600);
        assert_eq!(elements.capacity(), 780);
        // Fourth expansion switches to the next power of two.
        elements.resize(800);
        assert_eq!(elements.capacity(), 1024);
    }

    #[test]
    fn large_shrinks_keep_the_allocation() {
        let mut elements = FastElements::default();
        elements.resize(100);
        elements.resize(1000);
        let capacity = elements.capacity();
        elements.resize(500);
        assert_eq!(elements.len(), 500);
        assert_eq!(elements.capacity(), capacity);
    }

    #[test]
    fn growth_fills_with_holes() {
        let mut elements = FastElements::default();
        elements.resize(4);
        assert!(elements.as_slice().iter().all(Option::is_none));
    }
}
