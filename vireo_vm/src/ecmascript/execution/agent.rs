// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{
        builtins::error::{Error, ErrorHeapData},
        types::{HeapString, StringHeapData, Symbol, SymbolHeapData, Value},
    },
    heap::CreateHeapData,
    Heap,
};

use super::realm::Realm;

/// Tunables of the core. The defaults match the behavior the surrounding
/// engine ships with.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// A fast-mode array whose length would grow by more than this gap in a
    /// single step is converted to the generic store first, so a stray
    /// `length = huge` cannot commit a huge allocation.
    pub array_fast_mode_growth_gap: u32,
    /// Enumerating a prototype chain longer than this fails with a range
    /// error.
    pub enumeration_chain_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            array_fast_mode_growth_gap: 65536,
            enumeration_chain_limit: 1024 * 128,
        }
    }
}

pub type JsResult<T> = std::result::Result<T, JsError>;

/// A thrown engine error, wrapping the heap error value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsError(pub(crate) Value);

impl JsError {
    pub fn value(self) -> Value {
        self.0
    }

    pub fn kind(self, agent: &Agent) -> ExceptionType {
        match self.0 {
            Value::Error(error) => agent[error].kind,
            _ => ExceptionType::Error,
        }
    }

    pub fn message(self, agent: &Agent) -> Option<&str> {
        match self.0 {
            Value::Error(error) => agent[error].message.map(|message| message.as_str(agent)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    Error,
    RangeError,
    TypeError,
}

/// The single execution agent owning a heap of arrays, objects and
/// iterators. No operation of the core runs concurrently with another on
/// the same agent.
#[derive(Debug)]
pub struct Agent {
    pub heap: Heap,
    pub(crate) options: Options,
    pub(crate) realm: Realm,
    /// Raised when any prototype object anywhere acquires an indexed
    /// property. Arrays created after that start in the generic store so
    /// inherited indexed lookups stay correct.
    prototype_defined_indexed_property: bool,
}

impl Agent {
    pub fn new(options: Options) -> Self {
        let mut heap = Heap::new();
        let realm = Realm::initialize(&mut heap);
        Self {
            heap,
            options,
            realm,
            prototype_defined_indexed_property: false,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn current_realm(&self) -> &Realm {
        &self.realm
    }

    pub(crate) fn prototypes_define_indexed_properties(&self) -> bool {
        self.prototype_defined_indexed_property
    }

    pub(crate) fn note_prototype_defined_indexed_property(&mut self) {
        self.prototype_defined_indexed_property = true;
    }

    pub fn throw_exception(&mut self, kind: ExceptionType, message: &'static str) -> JsError {
        let message = self.heap.create(message);
        let error = self.heap.create(ErrorHeapData::new(kind, Some(message)));
        JsError(Value::Error(error))
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Index<HeapString> for Agent {
    type Output = StringHeapData;

    fn index(&self, index: HeapString) -> &Self::Output {
        self.heap
            .strings
            .get(index.get_index())
            .expect("HeapString out of bounds")
            .as_ref()
            .expect("HeapString slot empty")
    }
}

impl Index<Symbol> for Agent {
    type Output = SymbolHeapData;

    fn index(&self, index: Symbol) -> &Self::Output {
        self.heap
            .symbols
            .get(index.0.into_index())
            .expect("Symbol out of bounds")
            .as_ref()
            .expect("Symbol slot empty")
    }
}

impl Index<Error> for Agent {
    type Output = ErrorHeapData;

    fn index(&self, index: Error) -> &Self::Output {
        self.heap
            .errors
            .get(index.0.into_index())
            .expect("Error out of bounds")
            .as_ref()
            .expect("Error slot empty")
    }
}

impl IndexMut<Error> for Agent {
    fn index_mut(&mut self, index: Error) -> &mut Self::Output {
        self.heap
            .errors
            .get_mut(index.0.into_index())
            .expect("Error out of bounds")
            .as_mut()
            .expect("Error slot empty")
    }
}
