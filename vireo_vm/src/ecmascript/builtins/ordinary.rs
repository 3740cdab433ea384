// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generic property-store operations, shared by ordinary objects and by
//! every object kind that backs its named properties with one.

use crate::ecmascript::{
    abstract_operations::testing_and_comparison::same_value,
    execution::Agent,
    types::{
        ElementDescriptor, InternalMethods, Object, PropertyDescriptor, PropertyKey,
        OrdinaryObject, Value,
    },
};

/// OrdinaryGetOwnProperty: a fully populated descriptor for an own property,
/// or None.
pub(crate) fn ordinary_get_own_property(
    agent: &Agent,
    object: OrdinaryObject,
    property_key: PropertyKey,
) -> Option<PropertyDescriptor> {
    let index = object.property_index_of(agent, property_key)?;
    let data = &agent[object];
    Some(ElementDescriptor::to_property_descriptor(
        data.descriptor_of(index),
        data.values[index],
    ))
}

/// OrdinaryDefineOwnProperty. Never calls user code: the store holds plain
/// data and opaque accessor values.
pub(crate) fn ordinary_define_own_property(
    agent: &mut Agent,
    object: OrdinaryObject,
    property_key: PropertyKey,
    descriptor: PropertyDescriptor,
) -> bool {
    let current_index = object.property_index_of(agent, property_key);
    let current = current_index.map(|index| {
        let data = &agent[object];
        ElementDescriptor::to_property_descriptor(data.descriptor_of(index), data.values[index])
    });
    let extensible = agent[object].extensible;
    validate_and_apply_property_descriptor(
        agent,
        Some((object, current_index)),
        property_key,
        extensible,
        descriptor,
        current,
    )
}

/// ValidateAndApplyPropertyDescriptor.
fn validate_and_apply_property_descriptor(
    agent: &mut Agent,
    target: Option<(OrdinaryObject, Option<usize>)>,
    property_key: PropertyKey,
    extensible: bool,
    descriptor: PropertyDescriptor,
    current: Option<PropertyDescriptor>,
) -> bool {
    let Some(current) = current else {
        // No existing property: creation requires extensibility.
        if !extensible {
            return false;
        }
        let Some((object, _)) = target else {
            return true;
        };
        if descriptor.is_accessor_descriptor() {
            object.insert_property(
                agent,
                property_key,
                None,
                Some(ElementDescriptor::Accessor {
                    get: descriptor.get,
                    set: descriptor.set,
                    enumerable: descriptor.enumerable.unwrap_or(false),
                    configurable: descriptor.configurable.unwrap_or(false),
                }),
            );
        } else {
            let filled = PropertyDescriptor {
                value: Some(descriptor.value.unwrap_or(Value::Undefined)),
                writable: Some(descriptor.writable.unwrap_or(false)),
                get: None,
                set: None,
                enumerable: Some(descriptor.enumerable.unwrap_or(false)),
                configurable: Some(descriptor.configurable.unwrap_or(false)),
            };
            object.insert_property(
                agent,
                property_key,
                filled.value,
                ElementDescriptor::from_property_descriptor(&filled),
            );
        }
        return true;
    };

    debug_assert!(current.is_fully_populated());

    if !descriptor.has_fields() {
        return true;
    }

    if current.configurable == Some(false) {
        if descriptor.configurable == Some(true) {
            return false;
        }
        if descriptor.enumerable.is_some() && descriptor.enumerable != current.enumerable {
            return false;
        }
        if !descriptor.is_generic_descriptor()
            && descriptor.is_accessor_descriptor() != current.is_accessor_descriptor()
        {
            return false;
        }
        if current.is_accessor_descriptor() {
            if descriptor.get.is_some() && descriptor.get != current.get {
                return false;
            }
            if descriptor.set.is_some() && descriptor.set != current.set {
                return false;
            }
        } else if current.writable == Some(false) {
            if descriptor.writable == Some(true) {
                return false;
            }
            if let Some(value) = descriptor.value {
                if !same_value(value, current.value.unwrap()) {
                    return false;
                }
            }
        }
    }

    let Some((object, Some(index))) = target else {
        return true;
    };

    // Merge the request over the current state, switching property kind
    // when the request is of the other kind.
    let mut merged = current;
    if descriptor.is_accessor_descriptor() {
        if !current.is_accessor_descriptor() {
            merged.value = None;
            merged.writable = None;
            merged.get = None;
            merged.set = None;
        }
        if descriptor.get.is_some() {
            merged.get = descriptor.get;
        }
        if descriptor.set.is_some() {
            merged.set = descriptor.set;
        }
    } else if descriptor.is_data_descriptor() {
        if current.is_accessor_descriptor() {
            merged.get = None;
            merged.set = None;
            merged.value = Some(Value::Undefined);
            merged.writable = Some(false);
        }
        if descriptor.value.is_some() {
            merged.value = descriptor.value;
        }
        if descriptor.writable.is_some() {
            merged.writable = descriptor.writable;
        }
    }
    if descriptor.enumerable.is_some() {
        merged.enumerable = descriptor.enumerable;
    }
    if descriptor.configurable.is_some() {
        merged.configurable = descriptor.configurable;
    }

    let current_storage = {
        let data = &agent[object];
        data.descriptor_of(index).copied()
    };
    let merged_storage = ElementDescriptor::from_property_descriptor(&merged);
    let value_slot = if merged.is_accessor_descriptor() {
        None
    } else {
        merged.value
    };
    if merged_storage == current_storage {
        // Attributes unchanged: a pure value write, which is not a shape
        // change.
        if let Some(value) = value_slot {
            object.update_property_value(agent, index, value);
        }
    } else {
        object.update_property(agent, index, value_slot, merged_storage);
    }
    true
}

/// OrdinaryDelete: only configurable properties can be removed.
pub(crate) fn ordinary_delete(
    agent: &mut Agent,
    object: OrdinaryObject,
    property_key: PropertyKey,
) -> bool {
    let Some(index) = object.property_index_of(agent, property_key) else {
        return true;
    };
    let configurable = agent[object]
        .descriptor_of(index)
        .map_or(true, ElementDescriptor::is_configurable);
    if !configurable {
        return false;
    }
    object.remove_property(agent, index);
    true
}

/// OrdinaryOwnPropertyKeys: integer keys in ascending numeric order first,
/// then string keys in insertion order, then symbol keys in insertion
/// order.
pub(crate) fn ordinary_own_property_keys(
    agent: &Agent,
    object: OrdinaryObject,
) -> Vec<PropertyKey> {
    let data = &agent[object];
    let mut integer_keys = Vec::new();
    let mut string_keys = Vec::new();
    let mut symbol_keys = Vec::new();
    for key in data.keys.iter() {
        match key {
            PropertyKey::Integer(index) => integer_keys.push(*index),
            PropertyKey::String(_) => string_keys.push(*key),
            PropertyKey::Symbol(_) => symbol_keys.push(*key),
        }
    }
    integer_keys.sort_unstable();
    let mut keys = Vec::with_capacity(data.keys.len());
    keys.extend(integer_keys.into_iter().map(PropertyKey::Integer));
    keys.extend(string_keys);
    keys.extend(symbol_keys);
    keys
}

/// OrdinarySetPrototypeOf, with the prototype-cycle check and prototype
/// marking.
pub(crate) fn ordinary_set_prototype_of(
    agent: &mut Agent,
    object: Object,
    prototype: Option<Object>,
) -> bool {
    let current = object.internal_get_prototype_of(agent);
    if current == prototype {
        return true;
    }
    if !object.internal_is_extensible(agent) {
        return false;
    }
    let mut ancestor = prototype;
    while let Some(candidate) = ancestor {
        if candidate == object {
            return false;
        }
        ancestor = candidate.internal_get_prototype_of(agent);
    }
    match object {
        Object::Object(ordinary) => {
            ordinary.bump_shape(agent);
            agent[ordinary].prototype = prototype;
        }
        Object::Array(array) => {
            let backing = array.ensure_backing_object(agent);
            backing.bump_shape(agent);
            agent[backing].prototype = prototype;
            array.sync_shape(agent);
        }
        Object::TypedArray(typed_array) => {
            let backing = typed_array.ensure_backing_object(agent);
            backing.bump_shape(agent);
            agent[backing].prototype = prototype;
        }
    }
    if let Some(prototype) = prototype {
        mark_as_prototype_object(agent, prototype);
    }
    true
}

/// Records that an object became some object's prototype. Arrays leave fast
/// mode for good at this point; a prototype that already carries indexed
/// keys raises the agent-wide flag that makes future arrays start in the
/// generic store.
pub(crate) fn mark_as_prototype_object(agent: &mut Agent, object: Object) {
    match object {
        Object::Object(ordinary) => {
            agent[ordinary].is_prototype = true;
            if agent[ordinary].has_indexed_property() {
                agent.note_prototype_defined_indexed_property();
            }
        }
        Object::Array(array) => {
            array.convert_to_slow(agent);
            let backing = array.ensure_backing_object(agent);
            agent[backing].is_prototype = true;
            if agent[backing].has_indexed_property() {
                agent.note_prototype_defined_indexed_property();
            }
            array.sync_shape(agent);
        }
        Object::TypedArray(typed_array) => {
            let backing = typed_array.ensure_backing_object(agent);
            agent[backing].is_prototype = true;
        }
    }
}

/// Prototype-aware get over own descriptors. Accessor invocation is outside
/// this core: an accessor slot reads as undefined at this layer.
pub(crate) fn generic_get(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    receiver: Value,
) -> crate::ecmascript::execution::JsResult<Value> {
    if let Some(descriptor) = object.internal_get_own_property(agent, property_key) {
        if let Some(value) = descriptor.value {
            return Ok(value);
        }
        return Ok(Value::Undefined);
    }
    match object.internal_get_prototype_of(agent) {
        Some(parent) => generic_get(agent, parent, property_key, receiver),
        None => Ok(Value::Undefined),
    }
}

/// Prototype-aware set. An own or inherited non-writable data property or
/// accessor property rejects the write; otherwise the write lands on the
/// object itself through its own property definition path.
pub(crate) fn generic_set(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    value: Value,
) -> crate::ecmascript::execution::JsResult<bool> {
    if let Some(own) = object.internal_get_own_property(agent, property_key) {
        if own.is_accessor_descriptor() {
            return Ok(false);
        }
        if own.writable == Some(false) {
            return Ok(false);
        }
        return object.internal_define_own_property(
            agent,
            property_key,
            PropertyDescriptor {
                value: Some(value),
                ..Default::default()
            },
        );
    }
    let mut ancestor = object.internal_get_prototype_of(agent);
    while let Some(parent) = ancestor {
        if let Some(descriptor) = parent.internal_get_own_property(agent, property_key) {
            if descriptor.is_accessor_descriptor() || descriptor.writable == Some(false) {
                return Ok(false);
            }
            break;
        }
        ancestor = parent.internal_get_prototype_of(agent);
    }
    object.internal_define_own_property(
        agent,
        property_key,
        PropertyDescriptor::new_data_descriptor(value),
    )
}
