// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use vireo_vm::ecmascript::{
    builtins::Array,
    execution::{Agent, ExceptionType},
    types::{
        InternalMethods, PropertyDescriptor, PropertyKey, Value, BUILTIN_STRING_MEMORY,
    },
};

fn length_key() -> PropertyKey {
    PropertyKey::String(BUILTIN_STRING_MEMORY.length)
}

#[test]
fn length_reads_with_writability() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1), Value::from(2)]).unwrap();
    let own = a.internal_get_own_property(&agent, length_key()).unwrap();
    assert_eq!(own.value, Some(Value::from(2)));
    assert_eq!(own.writable, Some(true));
    assert_eq!(own.enumerable, Some(false));
    assert_eq!(own.configurable, Some(false));
    let read = a
        .internal_get(&mut agent, length_key(), Value::Array(a))
        .unwrap();
    assert_eq!(read, Value::from(2));
}

#[test]
fn length_cannot_be_deleted() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 1).unwrap();
    assert!(!a.internal_delete(&mut agent, length_key()).unwrap());
}

#[test]
fn shrink_drops_trailing_elements() {
    let mut agent = Agent::default();
    let a = Array::from_elements(
        &mut agent,
        &[Value::from(1), Value::from(2), Value::from(3)],
    )
    .unwrap();
    assert!(a.set_length(&mut agent, 1).unwrap());
    assert_eq!(a.len(&agent), 1);
    assert!(a.internal_has_property(&agent, PropertyKey::Integer(0)));
    assert!(!a.internal_has_property(&agent, PropertyKey::Integer(1)));
    assert!(a.is_fast(&agent));
}

#[test]
fn grow_fills_with_holes() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1)]).unwrap();
    assert!(a.set_length(&mut agent, 4).unwrap());
    assert_eq!(a.len(&agent), 4);
    for index in 1..4 {
        assert!(!a.internal_has_property(&agent, PropertyKey::Integer(index)));
    }
}

#[test]
fn length_descriptor_rejections() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 2).unwrap();
    let configurable = PropertyDescriptor {
        configurable: Some(true),
        ..Default::default()
    };
    assert!(!a
        .internal_define_own_property(&mut agent, length_key(), configurable)
        .unwrap());
    let enumerable = PropertyDescriptor {
        enumerable: Some(true),
        ..Default::default()
    };
    assert!(!a
        .internal_define_own_property(&mut agent, length_key(), enumerable)
        .unwrap());
    let getter = Value::from(0);
    let accessor = PropertyDescriptor {
        get: Some(getter),
        ..Default::default()
    };
    assert!(!a
        .internal_define_own_property(&mut agent, length_key(), accessor)
        .unwrap());
}

#[test]
fn non_canonical_length_is_a_range_error() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 0).unwrap();
    for bad in [Value::Float(1.5), Value::from(-1), Value::Float(4294967296.0)] {
        let descriptor = PropertyDescriptor {
            value: Some(bad),
            ..Default::default()
        };
        let err = a
            .internal_define_own_property(&mut agent, length_key(), descriptor)
            .unwrap_err();
        assert_eq!(err.kind(&agent), ExceptionType::RangeError);
        assert_eq!(err.message(&agent), Some("invalid array length"));
    }
}

#[test]
fn clearing_length_writability_is_one_way_and_converts() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1), Value::from(2)]).unwrap();
    let clear = PropertyDescriptor {
        writable: Some(false),
        ..Default::default()
    };
    assert!(a
        .internal_define_own_property(&mut agent, length_key(), clear)
        .unwrap());
    assert!(!a.length_writable(&agent));
    assert!(!a.is_fast(&agent));
    // Writes to length are now rejected.
    assert!(!a.set_length(&mut agent, 5).unwrap());
    assert_eq!(a.len(&agent), 2);
    let err = a.set_length_or_throw(&mut agent, 5).unwrap_err();
    assert_eq!(err.kind(&agent), ExceptionType::TypeError);
    // So is growth through an indexed define.
    let accepted = a
        .internal_set(
            &mut agent,
            PropertyKey::Integer(7),
            Value::from(8),
            Value::Array(a),
        )
        .unwrap();
    assert!(!accepted);
    // The transition cannot be undone.
    let restore = PropertyDescriptor {
        writable: Some(true),
        ..Default::default()
    };
    assert!(!a
        .internal_define_own_property(&mut agent, length_key(), restore)
        .unwrap());
    // In-range writes still work.
    assert!(a
        .internal_set(
            &mut agent,
            PropertyKey::Integer(0),
            Value::from(9),
            Value::Array(a)
        )
        .unwrap());
}

#[test]
fn shrink_pins_at_non_configurable_element() {
    let mut agent = Agent::default();
    let a = Array::from_elements(
        &mut agent,
        &[Value::from(10), Value::from(20), Value::from(30)],
    )
    .unwrap();
    let pin = PropertyDescriptor {
        value: Some(Value::from(20)),
        writable: Some(true),
        enumerable: Some(true),
        configurable: Some(false),
        ..Default::default()
    };
    assert!(a
        .internal_define_own_property(&mut agent, PropertyKey::Integer(1), pin)
        .unwrap());
    assert!(!a.is_fast(&agent));
    // Deletion proceeds downwards and stops at the pinned element.
    assert!(!a.set_length(&mut agent, 0).unwrap());
    assert_eq!(a.len(&agent), 2);
    assert!(a.internal_has_property(&agent, PropertyKey::Integer(0)));
    assert!(a.internal_has_property(&agent, PropertyKey::Integer(1)));
    assert!(!a.internal_has_property(&agent, PropertyKey::Integer(2)));
    let err = a.set_length_or_throw(&mut agent, 0).unwrap_err();
    assert_eq!(err.kind(&agent), ExceptionType::TypeError);
    assert_eq!(
        err.message(&agent),
        Some("cannot delete non-configurable array element")
    );
}

#[test]
fn slow_shrink_skips_gaps() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 0).unwrap();
    assert!(a
        .internal_set(
            &mut agent,
            PropertyKey::Integer(0),
            Value::from(1),
            Value::Array(a)
        )
        .unwrap());
    // A far write converts to the generic store and leaves a huge gap.
    assert!(a
        .internal_set(
            &mut agent,
            PropertyKey::Integer(1_000_000),
            Value::from(2),
            Value::Array(a),
        )
        .unwrap());
    assert!(!a.is_fast(&agent));
    assert_eq!(a.len(&agent), 1_000_001);
    assert!(a.set_length(&mut agent, 500).unwrap());
    assert_eq!(a.len(&agent), 500);
    assert!(a.internal_has_property(&agent, PropertyKey::Integer(0)));
    assert!(!a.internal_has_property(&agent, PropertyKey::Integer(1_000_000)));
}

#[test]
fn set_length_is_observable_through_the_property_surface() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1), Value::from(2)]).unwrap();
    // A plain set of the length property routes through the descriptor
    // algorithm.
    assert!(a
        .internal_set(&mut agent, length_key(), Value::from(1), Value::Array(a))
        .unwrap());
    assert_eq!(a.len(&agent), 1);
}
