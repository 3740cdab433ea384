// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal typed-array collaborator. Carries the view geometry the iterator
//! validates on every step; element storage and conversion semantics live
//! outside this core. Named properties go through a backing object like any
//! other object kind.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::{
        builtins::{
            array_buffer::ArrayBuffer,
            ordinary::{
                generic_get, generic_set, ordinary_define_own_property, ordinary_delete,
                ordinary_get_own_property, ordinary_own_property_keys, ordinary_set_prototype_of,
            },
        },
        execution::{Agent, JsResult},
        types::{
            InternalMethods, Object, OrdinaryObject, PropertyDescriptor, PropertyKey, ShapeId,
            Value,
        },
    },
    heap::{indexes::TypedArrayIndex, CreateHeapData},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedArray(pub(crate) TypedArrayIndex);

#[derive(Debug, Clone, Copy)]
pub struct TypedArrayHeapData {
    pub object_index: Option<OrdinaryObject>,
    pub(crate) shape: ShapeId,
    pub(crate) viewed_array_buffer: ArrayBuffer,
    pub(crate) byte_offset: usize,
    pub(crate) byte_length: usize,
    pub(crate) array_length: u32,
    /// Set when a buffer resize invalidated this view's geometry.
    pub(crate) invalidated_by_resize: bool,
}

impl TypedArray {
    pub fn new(
        agent: &mut Agent,
        buffer: ArrayBuffer,
        byte_offset: usize,
        byte_length: usize,
        array_length: u32,
    ) -> Self {
        let shape = agent.heap.alloc_shape();
        agent.heap.create(TypedArrayHeapData {
            object_index: None,
            shape,
            viewed_array_buffer: buffer,
            byte_offset,
            byte_length,
            array_length,
            invalidated_by_resize: false,
        })
    }

    pub fn viewed_array_buffer(self, agent: &Agent) -> ArrayBuffer {
        agent[self].viewed_array_buffer
    }

    pub fn array_length(self, agent: &Agent) -> u32 {
        agent[self].array_length
    }

    pub fn mark_invalidated_by_resize(self, agent: &mut Agent) {
        agent[self].invalidated_by_resize = true;
    }

    /// True when the view's byte range no longer lies within its buffer.
    pub(crate) fn is_out_of_bounds(self, agent: &Agent) -> bool {
        let data = &agent[self];
        let buffer_byte_length = agent[data.viewed_array_buffer].byte_length;
        let byte_offset_start = data.byte_offset;
        let byte_offset_end = data.byte_offset + data.byte_length;
        byte_offset_start > buffer_byte_length
            || byte_offset_end > buffer_byte_length
            || data.invalidated_by_resize
    }

    pub(crate) fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    pub(crate) fn ensure_backing_object(self, agent: &mut Agent) -> OrdinaryObject {
        if let Some(backing) = agent[self].object_index {
            return backing;
        }
        let prototype = Object::Object(agent.current_realm().intrinsics().object_prototype());
        let backing = OrdinaryObject::create_object(agent, Some(prototype));
        agent[self].object_index = Some(backing);
        let shape = agent[backing].shape;
        agent[self].shape = shape;
        backing
    }

    fn sync_shape(self, agent: &mut Agent) {
        if let Some(backing) = agent[self].object_index {
            let shape = agent[backing].shape;
            agent[self].shape = shape;
        }
    }
}

impl InternalMethods for TypedArray {
    fn internal_get_prototype_of(self, agent: &Agent) -> Option<Object> {
        match self.get_backing_object(agent) {
            Some(backing) => agent[backing].prototype,
            None => Some(Object::Object(
                agent.current_realm().intrinsics().object_prototype(),
            )),
        }
    }

    fn internal_set_prototype_of(self, agent: &mut Agent, prototype: Option<Object>) -> bool {
        ordinary_set_prototype_of(agent, Object::TypedArray(self), prototype)
    }

    fn internal_is_extensible(self, agent: &Agent) -> bool {
        self.get_backing_object(agent)
            .map_or(true, |backing| agent[backing].extensible)
    }

    fn internal_prevent_extensions(self, agent: &mut Agent) -> bool {
        let backing = self.ensure_backing_object(agent);
        agent[backing].extensible = false;
        true
    }

    fn internal_get_own_property(
        self,
        agent: &Agent,
        property_key: PropertyKey,
    ) -> Option<PropertyDescriptor> {
        let backing = self.get_backing_object(agent)?;
        ordinary_get_own_property(agent, backing, property_key)
    }

    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        let backing = self.ensure_backing_object(agent);
        let succeeded = ordinary_define_own_property(agent, backing, property_key, descriptor);
        self.sync_shape(agent);
        Ok(succeeded)
    }

    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        generic_get(agent, Object::TypedArray(self), property_key, receiver)
    }

    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        _receiver: Value,
    ) -> JsResult<bool> {
        generic_set(agent, Object::TypedArray(self), property_key, value)
    }

    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        match self.get_backing_object(agent) {
            Some(backing) => {
                let deleted = ordinary_delete(agent, backing, property_key);
                self.sync_shape(agent);
                Ok(deleted)
            }
            None => Ok(true),
        }
    }

    fn internal_own_property_keys(self, agent: &Agent) -> Vec<PropertyKey> {
        match self.get_backing_object(agent) {
            Some(backing) => ordinary_own_property_keys(agent, backing),
            None => Vec::new(),
        }
    }

    fn enumerate_own_properties(
        self,
        agent: &Agent,
        skip_symbol_keys: bool,
        callback: &mut dyn FnMut(PropertyKey, bool) -> bool,
    ) {
        if let Some(backing) = self.get_backing_object(agent) {
            backing.enumerate_own_properties(agent, skip_symbol_keys, callback);
        }
    }
}

impl From<TypedArray> for Object {
    fn from(value: TypedArray) -> Self {
        Object::TypedArray(value)
    }
}

impl From<TypedArray> for Value {
    fn from(value: TypedArray) -> Self {
        Value::TypedArray(value)
    }
}

impl Index<TypedArray> for Agent {
    type Output = TypedArrayHeapData;

    fn index(&self, index: TypedArray) -> &Self::Output {
        self.heap
            .typed_arrays
            .get(index.0.into_index())
            .expect("TypedArray out of bounds")
            .as_ref()
            .expect("TypedArray slot empty")
    }
}

impl IndexMut<TypedArray> for Agent {
    fn index_mut(&mut self, index: TypedArray) -> &mut Self::Output {
        self.heap
            .typed_arrays
            .get_mut(index.0.into_index())
            .expect("TypedArray out of bounds")
            .as_mut()
            .expect("TypedArray slot empty")
    }
}
