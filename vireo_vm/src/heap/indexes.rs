// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt::Debug;
use std::{
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem::size_of,
    num::NonZeroU32,
};

use crate::ecmascript::{
    builtins::{
        array::data::ArrayHeapData, array_buffer::ArrayBufferHeapData,
        array_iterator::ArrayIteratorHeapData, error::ErrorHeapData,
        typed_array::TypedArrayHeapData,
    },
    types::{ObjectHeapData, StringHeapData, SymbolHeapData},
};

/// Typed handle to a slot in one of the heap's data vectors.
///
/// The slot position is stored offset by one in a `NonZeroU32`: the zero
/// bit pattern becomes the niche for `None`, keeping `Option<BaseIndex<T>>`
/// four bytes wide. The phantom parameter ties each handle kind to the
/// vector it indexes, so a symbol handle cannot be used to look up an
/// array.
pub struct BaseIndex<T>(NonZeroU32, PhantomData<T>);

const _HANDLE_HAS_NICHE: () =
    assert!(size_of::<Option<BaseIndex<ErrorHeapData>>>() == size_of::<u32>());

impl<T> BaseIndex<T> {
    /// Position of the slot this handle points at.
    pub const fn into_index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub const fn from_u32_index(value: u32) -> Self {
        assert!(value < u32::MAX);
        // SAFETY: value + 1 cannot wrap to zero, per the assert above. The
        // check is written out by hand so the constructor stays const.
        Self(unsafe { NonZeroU32::new_unchecked(value + 1) }, PhantomData)
    }

    pub const fn from_index(value: usize) -> Self {
        Self::from_u32_index(value as u32)
    }

    /// Handle to the most recently pushed slot.
    pub fn last(vec: &[Option<T>]) -> Self {
        assert!(!vec.is_empty());
        Self::from_index(vec.len() - 1)
    }
}

// Derives would put bounds on `T`, which the heap data types do not carry.
// Handles are compared, ordered and hashed by slot position alone.

impl<T> Debug for BaseIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.into_index().fmt(f)
    }
}

impl<T> Clone for BaseIndex<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BaseIndex<T> {}

impl<T> PartialEq for BaseIndex<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for BaseIndex<T> {}

impl<T> PartialOrd for BaseIndex<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for BaseIndex<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for BaseIndex<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> Default for BaseIndex<T> {
    fn default() -> Self {
        Self::from_u32_index(0)
    }
}

pub type ArrayBufferIndex = BaseIndex<ArrayBufferHeapData>;
pub type ArrayIndex = BaseIndex<ArrayHeapData>;
pub type ArrayIteratorIndex = BaseIndex<ArrayIteratorHeapData>;
pub type ErrorIndex = BaseIndex<ErrorHeapData>;
pub type ObjectIndex = BaseIndex<ObjectHeapData>;
pub type StringIndex = BaseIndex<StringHeapData>;
pub type SymbolIndex = BaseIndex<SymbolHeapData>;
pub type TypedArrayIndex = BaseIndex<TypedArrayHeapData>;
