// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use ahash::AHashMap;

use crate::{
    ecmascript::{
        builtins::{
            ordinary::{
                ordinary_define_own_property, ordinary_delete, ordinary_get_own_property,
                ordinary_own_property_keys, ordinary_set_prototype_of,
            },
            typed_array::TypedArray,
            Array,
        },
        execution::{Agent, JsResult},
        types::{PropertyDescriptor, PropertyKey, Value},
    },
    heap::{indexes::ObjectIndex, CreateHeapData},
};

/// Opaque structure identity of an object. Allocated from a monotone
/// counter; two observations with different identities imply the object's
/// shape (key set, attributes or prototype) changed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub(crate) u64);

/// Handle to an ordinary object: the generic property store every other
/// object kind backs its named properties with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrdinaryObject(pub(crate) ObjectIndex);

/// Any object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Object {
    Object(OrdinaryObject),
    Array(Array),
    TypedArray(TypedArray),
}

/// Attribute storage for a property slot whose attributes differ from the
/// default `{writable, enumerable, configurable}` data profile. Slots with
/// no entry carry the default profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementDescriptor {
    Data {
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    /// Getter and setter are opaque values here; invoking them is the
    /// embedder's concern.
    Accessor {
        get: Option<Value>,
        set: Option<Value>,
        enumerable: bool,
        configurable: bool,
    },
}

impl ElementDescriptor {
    pub(crate) fn is_enumerable(&self) -> bool {
        match self {
            ElementDescriptor::Data { enumerable, .. }
            | ElementDescriptor::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub(crate) fn is_configurable(&self) -> bool {
        match self {
            ElementDescriptor::Data { configurable, .. }
            | ElementDescriptor::Accessor { configurable, .. } => *configurable,
        }
    }

    /// Builds the storage form of a descriptor, returning `None` for the
    /// default data profile which is stored implicitly. The descriptor is
    /// expected to have its attribute defaults already applied.
    pub(crate) fn from_property_descriptor(descriptor: &PropertyDescriptor) -> Option<Self> {
        if descriptor.is_accessor_descriptor() {
            return Some(ElementDescriptor::Accessor {
                get: descriptor.get,
                set: descriptor.set,
                enumerable: descriptor.enumerable.unwrap_or(false),
                configurable: descriptor.configurable.unwrap_or(false),
            });
        }
        let writable = descriptor.writable.unwrap_or(false);
        let enumerable = descriptor.enumerable.unwrap_or(false);
        let configurable = descriptor.configurable.unwrap_or(false);
        if writable && enumerable && configurable {
            None
        } else {
            Some(ElementDescriptor::Data {
                writable,
                enumerable,
                configurable,
            })
        }
    }

    /// Expands a storage slot back into a fully populated descriptor.
    pub(crate) fn to_property_descriptor(
        descriptor: Option<&ElementDescriptor>,
        value: Option<Value>,
    ) -> PropertyDescriptor {
        match descriptor {
            None => PropertyDescriptor {
                value: Some(value.unwrap_or(Value::Undefined)),
                writable: Some(true),
                get: None,
                set: None,
                enumerable: Some(true),
                configurable: Some(true),
            },
            Some(ElementDescriptor::Data {
                writable,
                enumerable,
                configurable,
            }) => PropertyDescriptor {
                value: Some(value.unwrap_or(Value::Undefined)),
                writable: Some(*writable),
                get: None,
                set: None,
                enumerable: Some(*enumerable),
                configurable: Some(*configurable),
            },
            Some(ElementDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            }) => PropertyDescriptor {
                value: None,
                writable: None,
                get: *get,
                set: *set,
                enumerable: Some(*enumerable),
                configurable: Some(*configurable),
            },
        }
    }
}

/// The generic property store: insertion-ordered parallel key and value
/// vectors, with attribute overrides in a lazily allocated side map keyed by
/// slot index. A `None` value slot marks an accessor property; holes do not
/// exist in the named store.
#[derive(Debug, Clone)]
pub struct ObjectHeapData {
    pub extensible: bool,
    pub prototype: Option<Object>,
    pub(crate) shape: ShapeId,
    /// Set when this object has been installed as some object's prototype.
    pub(crate) is_prototype: bool,
    pub(crate) keys: Vec<PropertyKey>,
    pub(crate) values: Vec<Option<Value>>,
    pub(crate) descriptors: Option<AHashMap<u32, ElementDescriptor>>,
}

impl ObjectHeapData {
    pub(crate) fn new(shape: ShapeId, prototype: Option<Object>) -> Self {
        Self {
            extensible: true,
            prototype,
            shape,
            is_prototype: false,
            keys: Vec::new(),
            values: Vec::new(),
            descriptors: None,
        }
    }

    pub(crate) fn descriptor_of(&self, index: usize) -> Option<&ElementDescriptor> {
        self.descriptors
            .as_ref()
            .and_then(|descriptors| descriptors.get(&(index as u32)))
    }

    pub(crate) fn has_indexed_property(&self) -> bool {
        self.keys.iter().any(|key| key.is_array_index())
    }
}

impl OrdinaryObject {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    /// Creates an empty extensible object with the given prototype. The
    /// prototype, when given, is marked as such; becoming a prototype has
    /// observable effects on arrays and on the agent.
    pub fn create_object(agent: &mut Agent, prototype: Option<Object>) -> Self {
        let shape = agent.heap.alloc_shape();
        let object = agent.heap.create(ObjectHeapData::new(shape, prototype));
        if let Some(prototype) = prototype {
            crate::ecmascript::builtins::ordinary::mark_as_prototype_object(agent, prototype);
        }
        object
    }

    pub(crate) fn shape(self, agent: &Agent) -> ShapeId {
        agent[self].shape
    }

    pub(crate) fn bump_shape(self, agent: &mut Agent) {
        let shape = agent.heap.alloc_shape();
        agent[self].shape = shape;
    }

    pub(crate) fn property_index_of(self, agent: &Agent, key: PropertyKey) -> Option<usize> {
        agent[self].keys.iter().position(|k| *k == key)
    }

    /// Appends a property slot. Bumps the shape; growing a prototype object
    /// with an indexed key raises the agent-wide prototype-index flag.
    pub(crate) fn insert_property(
        self,
        agent: &mut Agent,
        key: PropertyKey,
        value: Option<Value>,
        descriptor: Option<ElementDescriptor>,
    ) {
        let shape = agent.heap.alloc_shape();
        let data = &mut agent[self];
        data.shape = shape;
        let index = data.keys.len() as u32;
        data.keys.push(key);
        data.values.push(value);
        if let Some(descriptor) = descriptor {
            data.descriptors
                .get_or_insert_with(AHashMap::new)
                .insert(index, descriptor);
        }
        if key.is_array_index() && agent[self].is_prototype {
            agent.note_prototype_defined_indexed_property();
        }
    }

    /// Overwrites the value of an existing slot without touching its
    /// attributes. Pure value writes do not change the shape.
    pub(crate) fn update_property_value(self, agent: &mut Agent, index: usize, value: Value) {
        agent[self].values[index] = Some(value);
    }

    /// Replaces the value and attributes of an existing slot. Attribute
    /// changes are shape changes.
    pub(crate) fn update_property(
        self,
        agent: &mut Agent,
        index: usize,
        value: Option<Value>,
        descriptor: Option<ElementDescriptor>,
    ) {
        let shape = agent.heap.alloc_shape();
        let data = &mut agent[self];
        data.shape = shape;
        data.values[index] = value;
        match descriptor {
            Some(descriptor) => {
                data.descriptors
                    .get_or_insert_with(AHashMap::new)
                    .insert(index as u32, descriptor);
            }
            None => {
                if let Some(descriptors) = data.descriptors.as_mut() {
                    descriptors.remove(&(index as u32));
                }
            }
        }
    }

    /// Removes a property slot, re-keying the descriptor map for every slot
    /// that shifted down.
    pub(crate) fn remove_property(self, agent: &mut Agent, index: usize) {
        let shape = agent.heap.alloc_shape();
        let data = &mut agent[self];
        data.shape = shape;
        data.keys.remove(index);
        data.values.remove(index);
        if let Some(descriptors) = data.descriptors.as_mut() {
            let index = index as u32;
            descriptors.remove(&index);
            let shifted: Vec<(u32, ElementDescriptor)> = descriptors
                .iter()
                .filter(|(slot, _)| **slot > index)
                .map(|(slot, descriptor)| (*slot, *descriptor))
                .collect();
            for (slot, descriptor) in shifted {
                descriptors.remove(&slot);
                descriptors.insert(slot - 1, descriptor);
            }
        }
    }

    /// Largest present integer-index key strictly below `below`, or -1.
    /// Lets length shrinking skip over gaps in sparse storage without
    /// probing every index.
    pub(crate) fn next_index_backward(self, agent: &Agent, below: i64) -> i64 {
        let mut result = -1;
        for key in agent[self].keys.iter() {
            if let PropertyKey::Integer(index) = key {
                let index = *index as i64;
                if index < below && index > result {
                    result = index;
                }
            }
        }
        result
    }
}

impl Object {
    pub fn structure_id(self, agent: &Agent) -> ShapeId {
        match self {
            Object::Object(ordinary) => agent[ordinary].shape,
            Object::Array(array) => agent[array].shape,
            Object::TypedArray(typed_array) => agent[typed_array].shape,
        }
    }
}

/// The essential internal methods every object kind answers.
pub trait InternalMethods: Copy + Into<Object> {
    fn internal_get_prototype_of(self, agent: &Agent) -> Option<Object>;

    fn internal_set_prototype_of(self, agent: &mut Agent, prototype: Option<Object>) -> bool;

    fn internal_is_extensible(self, agent: &Agent) -> bool;

    fn internal_prevent_extensions(self, agent: &mut Agent) -> bool;

    fn internal_get_own_property(
        self,
        agent: &Agent,
        property_key: PropertyKey,
    ) -> Option<PropertyDescriptor>;

    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> JsResult<bool>;

    fn internal_has_property(self, agent: &Agent, property_key: PropertyKey) -> bool {
        let object: Object = self.into();
        if object.internal_get_own_property(agent, property_key).is_some() {
            return true;
        }
        object
            .internal_get_prototype_of(agent)
            .is_some_and(|parent| parent.internal_has_property(agent, property_key))
    }

    fn internal_get(self, agent: &mut Agent, property_key: PropertyKey, receiver: Value)
        -> JsResult<Value>;

    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
    ) -> JsResult<bool>;

    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool>;

    fn internal_own_property_keys(self, agent: &Agent) -> Vec<PropertyKey>;

    /// Walks every own property in storage order, reporting `(key,
    /// enumerable)` pairs. The callback returns `false` to stop the walk.
    fn enumerate_own_properties(
        self,
        agent: &Agent,
        skip_symbol_keys: bool,
        callback: &mut dyn FnMut(PropertyKey, bool) -> bool,
    );
}

impl InternalMethods for OrdinaryObject {
    fn internal_get_prototype_of(self, agent: &Agent) -> Option<Object> {
        agent[self].prototype
    }

    fn internal_set_prototype_of(self, agent: &mut Agent, prototype: Option<Object>) -> bool {
        ordinary_set_prototype_of(agent, self.into(), prototype)
    }

    fn internal_is_extensible(self, agent: &Agent) -> bool {
        agent[self].extensible
    }

    fn internal_prevent_extensions(self, agent: &mut Agent) -> bool {
        agent[self].extensible = false;
        true
    }

    fn internal_get_own_property(
        self,
        agent: &Agent,
        property_key: PropertyKey,
    ) -> Option<PropertyDescriptor> {
        ordinary_get_own_property(agent, self, property_key)
    }

    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        Ok(ordinary_define_own_property(
            agent,
            self,
            property_key,
            descriptor,
        ))
    }

    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        crate::ecmascript::builtins::ordinary::generic_get(
            agent,
            self.into(),
            property_key,
            receiver,
        )
    }

    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        _receiver: Value,
    ) -> JsResult<bool> {
        crate::ecmascript::builtins::ordinary::generic_set(agent, self.into(), property_key, value)
    }

    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        Ok(ordinary_delete(agent, self, property_key))
    }

    fn internal_own_property_keys(self, agent: &Agent) -> Vec<PropertyKey> {
        ordinary_own_property_keys(agent, self)
    }

    fn enumerate_own_properties(
        self,
        agent: &Agent,
        skip_symbol_keys: bool,
        callback: &mut dyn FnMut(PropertyKey, bool) -> bool,
    ) {
        let data = &agent[self];
        for (index, key) in data.keys.iter().enumerate() {
            if skip_symbol_keys && matches!(key, PropertyKey::Symbol(_)) {
                continue;
            }
            let enumerable = data
                .descriptor_of(index)
                .map_or(true, ElementDescriptor::is_enumerable);
            if !callback(*key, enumerable) {
                return;
            }
        }
    }
}

impl InternalMethods for Object {
    fn internal_get_prototype_of(self, agent: &Agent) -> Option<Object> {
        match self {
            Object::Object(ordinary) => ordinary.internal_get_prototype_of(agent),
            Object::Array(array) => array.internal_get_prototype_of(agent),
            Object::TypedArray(typed_array) => typed_array.internal_get_prototype_of(agent),
        }
    }

    fn internal_set_prototype_of(self, agent: &mut Agent, prototype: Option<Object>) -> bool {
        match self {
            Object::Object(ordinary) => ordinary.internal_set_prototype_of(agent, prototype),
            Object::Array(array) => array.internal_set_prototype_of(agent, prototype),
            Object::TypedArray(typed_array) => {
                typed_array.internal_set_prototype_of(agent, prototype)
            }
        }
    }

    fn internal_is_extensible(self, agent: &Agent) -> bool {
        match self {
            Object::Object(ordinary) => ordinary.internal_is_extensible(agent),
            Object::Array(array) => array.internal_is_extensible(agent),
            Object::TypedArray(typed_array) => typed_array.internal_is_extensible(agent),
        }
    }

    fn internal_prevent_extensions(self, agent: &mut Agent) -> bool {
        match self {
            Object::Object(ordinary) => ordinary.internal_prevent_extensions(agent),
            Object::Array(array) => array.internal_prevent_extensions(agent),
            Object::TypedArray(typed_array) => typed_array.internal_prevent_extensions(agent),
        }
    }

    fn internal_get_own_property(
        self,
        agent: &Agent,
        property_key: PropertyKey,
    ) -> Option<PropertyDescriptor> {
        match self {
            Object::Object(ordinary) => ordinary.internal_get_own_property(agent, property_key),
            Object::Array(array) => array.internal_get_own_property(agent, property_key),
            Object::TypedArray(typed_array) => {
                typed_array.internal_get_own_property(agent, property_key)
            }
        }
    }

    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        match self {
            Object::Object(ordinary) => {
                ordinary.internal_define_own_property(agent, property_key, descriptor)
            }
            Object::Array(array) => {
                array.internal_define_own_property(agent, property_key, descriptor)
            }
            Object::TypedArray(typed_array) => {
                typed_array.internal_define_own_property(agent, property_key, descriptor)
            }
        }
    }

    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        match self {
            Object::Object(ordinary) => ordinary.internal_get(agent, property_key, receiver),
            Object::Array(array) => array.internal_get(agent, property_key, receiver),
            Object::TypedArray(typed_array) => {
                typed_array.internal_get(agent, property_key, receiver)
            }
        }
    }

    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
    ) -> JsResult<bool> {
        match self {
            Object::Object(ordinary) => ordinary.internal_set(agent, property_key, value, receiver),
            Object::Array(array) => array.internal_set(agent, property_key, value, receiver),
            Object::TypedArray(typed_array) => {
                typed_array.internal_set(agent, property_key, value, receiver)
            }
        }
    }

    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        match self {
            Object::Object(ordinary) => ordinary.internal_delete(agent, property_key),
            Object::Array(array) => array.internal_delete(agent, property_key),
            Object::TypedArray(typed_array) => typed_array.internal_delete(agent, property_key),
        }
    }

    fn internal_own_property_keys(self, agent: &Agent) -> Vec<PropertyKey> {
        match self {
            Object::Object(ordinary) => ordinary.internal_own_property_keys(agent),
            Object::Array(array) => array.internal_own_property_keys(agent),
            Object::TypedArray(typed_array) => typed_array.internal_own_property_keys(agent),
        }
    }

    fn enumerate_own_properties(
        self,
        agent: &Agent,
        skip_symbol_keys: bool,
        callback: &mut dyn FnMut(PropertyKey, bool) -> bool,
    ) {
        match self {
            Object::Object(ordinary) => {
                ordinary.enumerate_own_properties(agent, skip_symbol_keys, callback)
            }
            Object::Array(array) => {
                array.enumerate_own_properties(agent, skip_symbol_keys, callback)
            }
            Object::TypedArray(typed_array) => {
                typed_array.enumerate_own_properties(agent, skip_symbol_keys, callback)
            }
        }
    }
}

impl From<OrdinaryObject> for Object {
    fn from(value: OrdinaryObject) -> Self {
        Object::Object(value)
    }
}

impl From<OrdinaryObject> for Value {
    fn from(value: OrdinaryObject) -> Self {
        Value::Object(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        match value {
            Object::Object(ordinary) => Value::Object(ordinary),
            Object::Array(array) => Value::Array(array),
            Object::TypedArray(typed_array) => Value::TypedArray(typed_array),
        }
    }
}

impl TryFrom<Value> for Object {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        match value {
            Value::Object(ordinary) => Ok(Object::Object(ordinary)),
            Value::Array(array) => Ok(Object::Array(array)),
            Value::TypedArray(typed_array) => Ok(Object::TypedArray(typed_array)),
            _ => Err(()),
        }
    }
}

impl TryFrom<Object> for OrdinaryObject {
    type Error = ();

    fn try_from(value: Object) -> Result<Self, ()> {
        match value {
            Object::Object(ordinary) => Ok(ordinary),
            _ => Err(()),
        }
    }
}

impl Index<OrdinaryObject> for Agent {
    type Output = ObjectHeapData;

    fn index(&self, index: OrdinaryObject) -> &Self::Output {
        self.heap
            .objects
            .get(index.get_index())
            .expect("OrdinaryObject out of bounds")
            .as_ref()
            .expect("OrdinaryObject slot empty")
    }
}

impl IndexMut<OrdinaryObject> for Agent {
    fn index_mut(&mut self, index: OrdinaryObject) -> &mut Self::Output {
        self.heap
            .objects
            .get_mut(index.get_index())
            .expect("OrdinaryObject out of bounds")
            .as_mut()
            .expect("OrdinaryObject slot empty")
    }
}
