// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::{
    abstract_operations::type_conversion::{to_number, to_uint32},
    builtins::error::messages,
    execution::{Agent, ExceptionType, JsResult},
    types::{
        InternalMethods, Object, OrdinaryObject, PropertyDescriptor, PropertyKey, Value,
    },
};
use crate::heap::CreateHeapData;

use super::data::{ArrayElements, ArrayHeapData, FastElements};
use super::Array;

/// Arrays at or below this length never leave fast mode on a length write,
/// whatever the gap.
pub(crate) const ARRAY_NON_FAST_MODE_MIN_SIZE: u32 = 65;
/// Fast mode is abandoned before a length write that reaches this bound.
pub(crate) const ARRAY_FAST_MODE_MAX_LENGTH: u32 = 1 << 31;

/// ArrayCreate. `dense` marks callers that will fill every slot immediately;
/// they skip the growth-gap pre-check since no hole-filled allocation can
/// result.
pub fn array_create(
    agent: &mut Agent,
    length: u64,
    proto: Option<Object>,
    dense: bool,
) -> JsResult<Array> {
    if length > u32::MAX as u64 {
        return Err(agent.throw_exception(ExceptionType::RangeError, messages::INVALID_ARRAY_LENGTH));
    }
    let length = length as u32;
    // An array created after some prototype gained an indexed property must
    // consult the prototype chain on every indexed miss; it starts out in
    // the generic store.
    let start_slow = agent.prototypes_define_indexed_properties();
    let object_index = match proto {
        Some(proto) if proto != Object::Array(agent.current_realm().intrinsics().array_prototype()) => {
            Some(OrdinaryObject::create_object(agent, Some(proto)))
        }
        _ => None,
    };
    let shape = match object_index {
        Some(backing) => backing.shape(agent),
        None => agent.heap.alloc_shape(),
    };
    let array = agent.heap.create(ArrayHeapData {
        object_index,
        shape,
        length: 0,
        length_writable: true,
        elements: if start_slow {
            ArrayElements::Slow
        } else {
            ArrayElements::Fast(FastElements::default())
        },
    });
    if length > 0 {
        set_array_length(agent, array, length, !dense)?;
    }
    Ok(array)
}

/// CreateArrayFromList: a dense fast array holding exactly the given
/// values.
pub fn create_array_from_list(agent: &mut Agent, elements: &[Value]) -> JsResult<Array> {
    let array = array_create(agent, elements.len() as u64, None, true)?;
    if array.is_fast(agent) {
        let ArrayElements::Fast(fast) = &mut agent[array].elements else {
            unreachable!();
        };
        for (slot, value) in fast.as_mut_slice().iter_mut().zip(elements) {
            *slot = Some(*value);
        }
    } else {
        for (index, value) in elements.iter().enumerate() {
            array.internal_define_own_property(
                agent,
                PropertyKey::Integer(index as u32),
                PropertyDescriptor::new_data_descriptor(*value),
            )?;
        }
    }
    Ok(array)
}

/// ArraySetLength: the full `length` descriptor algorithm. Coerces and
/// validates the requested length, applies attribute constraints, clears
/// writability one-way, and delegates the actual resize.
pub(crate) fn array_set_length(
    agent: &mut Agent,
    a: Array,
    desc: PropertyDescriptor,
) -> JsResult<bool> {
    let mut new_len = 0;
    if let Some(desc_value) = desc.value {
        // The requested length must equal its uint32 coercion exactly.
        new_len = to_uint32(agent, desc_value)?;
        let number_len = to_number(agent, desc_value)?;
        if number_len != new_len as f64 {
            return Err(
                agent.throw_exception(ExceptionType::RangeError, messages::INVALID_ARRAY_LENGTH)
            );
        }
    }
    let data = &agent[a];
    let (old_len, old_len_writable) = (data.length, data.length_writable);
    if !old_len_writable && desc.value.is_some() && old_len != new_len {
        return Ok(false);
    }
    if desc.configurable == Some(true) || desc.enumerable == Some(true) {
        return Ok(false);
    }
    if desc.is_accessor_descriptor() {
        return Ok(false);
    }
    if !old_len_writable && desc.writable == Some(true) {
        return Ok(false);
    }
    if desc.writable == Some(false) {
        agent[a].length_writable = false;
        // A fast array's length is always writable; clearing writability is
        // a mode trigger.
        if a.is_fast(agent) {
            a.convert_to_slow(agent);
        }
    }
    if desc.value.is_some() && old_len != new_len {
        return set_array_length(agent, a, new_len, true);
    }
    Ok(true)
}

/// Resizes the array to `new_length`.
///
/// A fast array is first checked against the growth gap: growing past the
/// configured gap in one step, or to a length at the fast-mode bound, falls
/// back to the generic store so that `length = huge` cannot commit a huge
/// allocation. In the generic store, shrinking walks present indices
/// downwards, skipping gaps, and pins the length at `failed + 1` when a
/// non-configurable element refuses deletion.
pub(crate) fn set_array_length(
    agent: &mut Agent,
    a: Array,
    new_length: u32,
    consider_holes: bool,
) -> JsResult<bool> {
    let mut is_fast = a.is_fast(agent);
    if is_fast && consider_holes && new_length > ARRAY_NON_FAST_MODE_MIN_SIZE {
        let old_length = a.len(agent);
        if new_length > old_length
            && (new_length - old_length >= agent.options().array_fast_mode_growth_gap
                || new_length >= ARRAY_FAST_MODE_MAX_LENGTH)
        {
            a.convert_to_slow(agent);
            is_fast = false;
        }
    }

    if is_fast {
        let old_length = a.len(agent);
        if old_length != new_length {
            let data = &mut agent[a];
            data.length = new_length;
            if let ArrayElements::Fast(fast) = &mut data.elements {
                fast.resize(new_length);
            }
            if !agent[a].length_writable {
                a.convert_to_slow(agent);
            }
        }
        Ok(true)
    } else {
        let new_len = new_length as i64;
        let mut old_len = a.len(agent) as i64;
        while new_len < old_len {
            old_len -= 1;
            let mut key = PropertyKey::Integer(old_len as u32);
            if a.internal_get_own_property(agent, key).is_none() {
                // Skip the gap down to the next present index.
                old_len = match a.get_backing_object(agent) {
                    Some(backing) => backing.next_index_backward(agent, old_len),
                    None => -1,
                };
                if old_len < new_len {
                    break;
                }
                key = PropertyKey::Integer(old_len as u32);
            }
            let delete_succeeded = a.internal_delete(agent, key)?;
            if !delete_succeeded {
                agent[a].length = (old_len + 1) as u32;
                return Ok(false);
            }
        }
        agent[a].length = new_length;
        Ok(true)
    }
}
