// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::{
    execution::{Agent, JsResult},
    types::{
        InternalMethods, Object, PropertyDescriptor, PropertyKey, Value, BUILTIN_STRING_MEMORY,
    },
};

use super::type_conversion::to_length;

pub fn get(agent: &mut Agent, object: Object, property_key: PropertyKey) -> JsResult<Value> {
    object.internal_get(agent, property_key, object.into())
}

/// CreateDataProperty: define an own property with the default
/// `{writable, enumerable, configurable}` profile.
pub fn create_data_property(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    value: Value,
) -> JsResult<bool> {
    object.internal_define_own_property(
        agent,
        property_key,
        PropertyDescriptor::new_data_descriptor(value),
    )
}

/// LengthOfArrayLike. Arrays answer from their length slot; other objects
/// go through a `length` property read and ToLength.
pub fn length_of_array_like(agent: &mut Agent, object: Object) -> JsResult<i64> {
    if let Object::Array(array) = object {
        return Ok(array.len(agent) as i64);
    }
    let value = get(
        agent,
        object,
        PropertyKey::String(BUILTIN_STRING_MEMORY.length),
    )?;
    to_length(agent, value)
}
