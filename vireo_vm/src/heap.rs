// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod indexes;

use std::hash::BuildHasher;

use ahash::RandomState;
use hashbrown::hash_table::{Entry, HashTable};

use crate::ecmascript::{
    builtins::{
        array::data::ArrayHeapData,
        array_buffer::{ArrayBuffer, ArrayBufferHeapData},
        array_iterator::{ArrayIterator, ArrayIteratorHeapData},
        error::{Error, ErrorHeapData},
        typed_array::{TypedArray, TypedArrayHeapData},
        Array,
    },
    types::{
        HeapString, ObjectHeapData, OrdinaryObject, ShapeId, StringHeapData, Symbol,
        SymbolHeapData, BUILTIN_STRING_MEMORY,
    },
};
use self::indexes::{
    ArrayBufferIndex, ArrayIndex, ArrayIteratorIndex, ErrorIndex, ObjectIndex, StringIndex,
    SymbolIndex, TypedArrayIndex,
};

/// Heap data of every object kind lives in its own slot vector; handles are
/// typed indexes into these vectors.
#[derive(Debug)]
pub struct Heap {
    pub array_buffers: Vec<Option<ArrayBufferHeapData>>,
    pub array_iterators: Vec<Option<ArrayIteratorHeapData>>,
    pub arrays: Vec<Option<ArrayHeapData>>,
    pub errors: Vec<Option<ErrorHeapData>>,
    pub objects: Vec<Option<ObjectHeapData>>,
    pub strings: Vec<Option<StringHeapData>>,
    pub symbols: Vec<Option<SymbolHeapData>>,
    pub typed_arrays: Vec<Option<TypedArrayHeapData>>,
    /// Content-addressed view over `strings`; equal string data resolves to
    /// the same handle, so handle equality is content equality.
    string_lookup: HashTable<HeapString>,
    string_hasher: RandomState,
    shapes_allocated: u64,
}

pub trait CreateHeapData<T, F> {
    /// Creates a heap handle from the given data. Allocating the data is
    /// **not** guaranteed; strings in particular are deduplicated.
    fn create(&mut self, data: T) -> F;
}

impl Heap {
    pub fn new() -> Self {
        let mut heap = Self {
            array_buffers: Vec::new(),
            array_iterators: Vec::new(),
            arrays: Vec::new(),
            errors: Vec::new(),
            objects: Vec::new(),
            strings: Vec::new(),
            symbols: Vec::new(),
            typed_arrays: Vec::new(),
            string_lookup: HashTable::new(),
            string_hasher: RandomState::new(),
            shapes_allocated: 0,
        };
        // Seed the well-known strings so that BUILTIN_STRING_MEMORY handles
        // are valid from the first observable moment.
        let length = heap.create_string("length");
        debug_assert_eq!(length, BUILTIN_STRING_MEMORY.length);
        heap
    }

    /// Allocates a fresh structure identity. Identities are never reused, so
    /// inequality of two ShapeIds from different moments implies a structural
    /// change happened in between.
    pub(crate) fn alloc_shape(&mut self) -> ShapeId {
        let id = self.shapes_allocated;
        self.shapes_allocated += 1;
        ShapeId(id)
    }

    pub(crate) fn create_string(&mut self, data: &str) -> HeapString {
        let hash = self.string_hasher.hash_one(data);
        let Heap {
            strings,
            string_lookup,
            string_hasher,
            ..
        } = self;
        let entry = string_lookup.entry(
            hash,
            |handle| strings[handle.get_index()].as_ref().unwrap().as_str() == data,
            |handle| string_hasher.hash_one(strings[handle.get_index()].as_ref().unwrap().as_str()),
        );
        match entry {
            Entry::Occupied(occupied) => *occupied.get(),
            Entry::Vacant(vacant) => {
                strings.push(Some(StringHeapData::from_str(data)));
                let handle = HeapString(StringIndex::last(strings));
                vacant.insert(handle);
                handle
            }
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateHeapData<&str, HeapString> for Heap {
    fn create(&mut self, data: &str) -> HeapString {
        self.create_string(data)
    }
}

impl CreateHeapData<ArrayHeapData, Array> for Heap {
    fn create(&mut self, data: ArrayHeapData) -> Array {
        self.arrays.push(Some(data));
        Array(ArrayIndex::last(&self.arrays))
    }
}

impl CreateHeapData<ArrayBufferHeapData, ArrayBuffer> for Heap {
    fn create(&mut self, data: ArrayBufferHeapData) -> ArrayBuffer {
        self.array_buffers.push(Some(data));
        ArrayBuffer(ArrayBufferIndex::last(&self.array_buffers))
    }
}

impl CreateHeapData<ArrayIteratorHeapData, ArrayIterator> for Heap {
    fn create(&mut self, data: ArrayIteratorHeapData) -> ArrayIterator {
        self.array_iterators.push(Some(data));
        ArrayIterator(ArrayIteratorIndex::last(&self.array_iterators))
    }
}

impl CreateHeapData<ErrorHeapData, Error> for Heap {
    fn create(&mut self, data: ErrorHeapData) -> Error {
        self.errors.push(Some(data));
        Error(ErrorIndex::last(&self.errors))
    }
}

impl CreateHeapData<ObjectHeapData, OrdinaryObject> for Heap {
    fn create(&mut self, data: ObjectHeapData) -> OrdinaryObject {
        self.objects.push(Some(data));
        OrdinaryObject(ObjectIndex::last(&self.objects))
    }
}

impl CreateHeapData<SymbolHeapData, Symbol> for Heap {
    fn create(&mut self, data: SymbolHeapData) -> Symbol {
        self.symbols.push(Some(data));
        Symbol(SymbolIndex::last(&self.symbols))
    }
}

impl CreateHeapData<TypedArrayHeapData, TypedArray> for Heap {
    fn create(&mut self, data: TypedArrayHeapData) -> TypedArray {
        self.typed_arrays.push(Some(data));
        TypedArray(TypedArrayIndex::last(&self.typed_arrays))
    }
}
