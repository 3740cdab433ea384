// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{
        abstract_operations::operations_on_objects::{get, length_of_array_like},
        builtins::{array::create_array_from_list, error::messages},
        execution::{Agent, ExceptionType, JsResult},
        types::{Object, PropertyKey, Value, MAX_ARRAY_INDEX},
    },
    heap::{indexes::ArrayIteratorIndex, CreateHeapData},
};

#[derive(Debug, Clone, Copy, Default)]
pub enum CollectionIteratorKind {
    #[default]
    Key,
    Value,
    KeyAndValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArrayIterator(pub(crate) ArrayIteratorIndex);

#[derive(Debug, Clone, Copy)]
pub struct ArrayIteratorHeapData {
    /// Cleared on exhaustion.
    pub(crate) array: Option<Object>,
    pub(crate) next_index: i64,
    pub(crate) kind: CollectionIteratorKind,
}

impl ArrayIterator {
    pub fn from_object(agent: &mut Agent, array: Object, kind: CollectionIteratorKind) -> Self {
        agent.heap.create(ArrayIteratorHeapData {
            array: Some(array),
            next_index: 0,
            kind,
        })
    }

    /// One iteration step: `Ok(None)` once exhausted.
    ///
    /// The effective length is re-read on every step because the target may
    /// have been resized since the last one. Typed-array targets are
    /// revalidated against their buffer every step for the same reason.
    pub fn next(self, agent: &mut Agent) -> JsResult<Option<Value>> {
        let Some(target) = agent[self].array else {
            return Ok(None);
        };
        let index = agent[self].next_index;
        let kind = agent[self].kind;
        let len = match target {
            Object::TypedArray(typed_array) => {
                if typed_array.viewed_array_buffer(agent).is_detached(agent)
                    || typed_array.is_out_of_bounds(agent)
                {
                    return Err(agent
                        .throw_exception(ExceptionType::TypeError, messages::DETACHED_TYPED_ARRAY));
                }
                typed_array.array_length(agent) as i64
            }
            _ => length_of_array_like(agent, target)?,
        };
        if index >= len {
            agent[self].array = None;
            return Ok(None);
        }
        agent[self].next_index = index + 1;
        match kind {
            CollectionIteratorKind::Key => Ok(Some(Value::Integer(index))),
            CollectionIteratorKind::Value => {
                let key = index_property_key(agent, index);
                let value = get(agent, target, key)?;
                Ok(Some(value))
            }
            CollectionIteratorKind::KeyAndValue => {
                let key = index_property_key(agent, index);
                let value = get(agent, target, key)?;
                let pair = create_array_from_list(agent, &[Value::Integer(index), value])?;
                Ok(Some(Value::Array(pair)))
            }
        }
    }
}

fn index_property_key(agent: &mut Agent, index: i64) -> PropertyKey {
    if (0..=MAX_ARRAY_INDEX as i64).contains(&index) {
        PropertyKey::Integer(index as u32)
    } else {
        // Array-like targets can report lengths past the index range;
        // those steps read string keys.
        PropertyKey::from_str(agent, &index.to_string())
    }
}

impl Index<ArrayIterator> for Agent {
    type Output = ArrayIteratorHeapData;

    fn index(&self, index: ArrayIterator) -> &Self::Output {
        self.heap
            .array_iterators
            .get(index.0.into_index())
            .expect("ArrayIterator out of bounds")
            .as_ref()
            .expect("ArrayIterator slot empty")
    }
}

impl IndexMut<ArrayIterator> for Agent {
    fn index_mut(&mut self, index: ArrayIterator) -> &mut Self::Output {
        self.heap
            .array_iterators
            .get_mut(index.0.into_index())
            .expect("ArrayIterator out of bounds")
            .as_mut()
            .expect("ArrayIterator slot empty")
    }
}
