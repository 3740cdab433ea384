// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use vireo_vm::ecmascript::{
    builtins::Array,
    execution::{Agent, ExceptionType},
    types::{
        HeapString, InternalMethods, Object, OrdinaryObject, PropertyDescriptor, PropertyKey,
        Value,
    },
};

fn string_value(agent: &mut Agent, data: &str) -> Value {
    Value::String(HeapString::from_str(agent, data))
}

#[test]
fn new_array_starts_fast_with_holes() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 3).unwrap();
    assert_eq!(a.len(&agent), 3);
    assert!(a.is_fast(&agent));
    assert!(a.length_writable(&agent));
    for index in 0..3 {
        assert!(!a.internal_has_property(&agent, PropertyKey::Integer(index)));
        let value = a
            .internal_get(&mut agent, PropertyKey::Integer(index), Value::Array(a))
            .unwrap();
        assert_eq!(value, Value::Undefined);
    }
}

#[test]
fn invalid_array_length_is_a_range_error() {
    let mut agent = Agent::default();
    let err = Array::new(&mut agent, 1 << 32).unwrap_err();
    assert_eq!(err.kind(&agent), ExceptionType::RangeError);
    assert_eq!(err.message(&agent), Some("invalid array length"));
}

#[test]
fn hole_creation() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 3).unwrap();
    let x = string_value(&mut agent, "x");
    let z = string_value(&mut agent, "z");
    assert!(a
        .internal_set(&mut agent, PropertyKey::Integer(0), x, Value::Array(a))
        .unwrap());
    assert!(a
        .internal_set(&mut agent, PropertyKey::Integer(2), z, Value::Array(a))
        .unwrap());
    assert_eq!(
        a.internal_own_property_keys(&agent),
        vec![PropertyKey::Integer(0), PropertyKey::Integer(2)]
    );
    assert_eq!(a.len(&agent), 3);
    assert!(a
        .internal_get_own_property(&agent, PropertyKey::Integer(1))
        .is_none());
}

#[test]
fn from_elements_is_dense_and_ordered() {
    let mut agent = Agent::default();
    let a = Array::from_elements(
        &mut agent,
        &[Value::from(10), Value::from(20), Value::from(30)],
    )
    .unwrap();
    assert!(a.is_fast(&agent));
    assert_eq!(a.len(&agent), 3);
    assert_eq!(
        a.internal_own_property_keys(&agent),
        vec![
            PropertyKey::Integer(0),
            PropertyKey::Integer(1),
            PropertyKey::Integer(2)
        ]
    );
    for index in 0..3 {
        let value = a
            .internal_get(&mut agent, PropertyKey::Integer(index), Value::Array(a))
            .unwrap();
        assert_eq!(value, Value::from((index as i64 + 1) * 10));
    }
}

#[test]
fn deletion_leaves_a_hole_and_keeps_length() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1), Value::from(2)]).unwrap();
    assert!(a
        .internal_delete(&mut agent, PropertyKey::Integer(0))
        .unwrap());
    assert_eq!(a.len(&agent), 2);
    assert!(a.is_fast(&agent));
    assert!(!a.internal_has_property(&agent, PropertyKey::Integer(0)));
    assert!(a.internal_has_property(&agent, PropertyKey::Integer(1)));
}

#[test]
fn growing_set_extends_length() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1)]).unwrap();
    assert!(a
        .internal_set(
            &mut agent,
            PropertyKey::Integer(4),
            Value::from(5),
            Value::Array(a)
        )
        .unwrap());
    assert!(a.is_fast(&agent));
    assert_eq!(a.len(&agent), 5);
    assert!(!a.internal_has_property(&agent, PropertyKey::Integer(3)));
}

#[test]
fn gap_growth_triggers_slow_mode() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 10).unwrap();
    let y = string_value(&mut agent, "y");
    assert!(a
        .internal_set(&mut agent, PropertyKey::Integer(200_000), y, Value::Array(a))
        .unwrap());
    assert!(!a.is_fast(&agent));
    assert_eq!(a.len(&agent), 200_001);
    assert_eq!(
        a.internal_own_property_keys(&agent),
        vec![PropertyKey::Integer(200_000)]
    );
    let read = a
        .internal_get(&mut agent, PropertyKey::Integer(200_000), Value::Array(a))
        .unwrap();
    assert_eq!(read, y);
}

#[test]
fn sparse_construction_past_the_gap_starts_slow() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 200_000).unwrap();
    assert!(!a.is_fast(&agent));
    assert_eq!(a.len(&agent), 200_000);
}

#[test]
fn non_default_descriptor_triggers_slow_mode() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1), Value::from(2)]).unwrap();
    let descriptor = PropertyDescriptor {
        value: Some(Value::from(7)),
        writable: Some(false),
        enumerable: Some(true),
        configurable: Some(true),
        ..Default::default()
    };
    assert!(a
        .internal_define_own_property(&mut agent, PropertyKey::Integer(0), descriptor)
        .unwrap());
    assert!(!a.is_fast(&agent));
    let own = a
        .internal_get_own_property(&agent, PropertyKey::Integer(0))
        .unwrap();
    assert_eq!(own.value, Some(Value::from(7)));
    assert_eq!(own.writable, Some(false));
    // The untouched element keeps its value and default attributes.
    let other = a
        .internal_get_own_property(&agent, PropertyKey::Integer(1))
        .unwrap();
    assert_eq!(other.value, Some(Value::from(2)));
    assert_eq!(other.writable, Some(true));
    assert_eq!(other.configurable, Some(true));
}

#[test]
fn accessor_at_index_triggers_slow_mode() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1)]).unwrap();
    let getter = string_value(&mut agent, "getter");
    let descriptor = PropertyDescriptor {
        get: Some(getter),
        enumerable: Some(true),
        configurable: Some(true),
        ..Default::default()
    };
    assert!(a
        .internal_define_own_property(&mut agent, PropertyKey::Integer(0), descriptor)
        .unwrap());
    assert!(!a.is_fast(&agent));
    let own = a
        .internal_get_own_property(&agent, PropertyKey::Integer(0))
        .unwrap();
    assert!(own.is_accessor_descriptor());
}

#[test]
fn convert_to_slow_preserves_elements() {
    let mut agent = Agent::default();
    let a = Array::from_elements(
        &mut agent,
        &[Value::from(10), Value::from(20), Value::from(30)],
    )
    .unwrap();
    a.internal_delete(&mut agent, PropertyKey::Integer(1))
        .unwrap();
    a.convert_to_slow(&mut agent);
    assert!(!a.is_fast(&agent));
    assert_eq!(a.len(&agent), 3);
    for (index, expected) in [(0u32, Some(Value::from(10))), (1, None), (2, Some(Value::from(30)))] {
        let own = a.internal_get_own_property(&agent, PropertyKey::Integer(index));
        match expected {
            Some(value) => {
                let own = own.unwrap();
                assert_eq!(own.value, Some(value));
                assert_eq!(own.writable, Some(true));
                assert_eq!(own.enumerable, Some(true));
                assert_eq!(own.configurable, Some(true));
            }
            None => assert!(own.is_none()),
        }
    }
}

#[test]
fn prevent_extensions_converts_and_seals_growth() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1)]).unwrap();
    assert!(a.internal_prevent_extensions(&mut agent));
    assert!(!a.is_fast(&agent));
    assert!(!a.internal_is_extensible(&agent));
    // Writing past length must fail.
    let accepted = a
        .internal_set(
            &mut agent,
            PropertyKey::Integer(5),
            Value::from(6),
            Value::Array(a),
        )
        .unwrap();
    assert!(!accepted);
    assert_eq!(a.len(&agent), 1);
    let err = a
        .set_indexed_property_or_throw(&mut agent, Value::from(5), Value::from(6))
        .unwrap_err();
    assert_eq!(err.kind(&agent), ExceptionType::TypeError);
    assert_eq!(err.message(&agent), Some("object is not extensible"));
    // Existing elements stay writable.
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
fn becoming_a_prototype_converts_and_flags_new_arrays() {
    let mut agent = Agent::default();
    let a = Array::new(&mut agent, 3).unwrap();
    assert!(a.is_fast(&agent));
    // Installing the array as a prototype is a mode trigger.
    let child = OrdinaryObject::create_object(&mut agent, Some(Object::Array(a)));
    assert!(!a.is_fast(&agent));
    // An indexed property on a prototype makes subsequently created arrays
    // start in the generic store.
    assert!(a
        .internal_set(
            &mut agent,
            PropertyKey::Integer(0),
            Value::from(41),
            Value::Array(a)
        )
        .unwrap());
    let b = Array::new(&mut agent, 2).unwrap();
    assert!(!b.is_fast(&agent));
    // The inherited indexed lookup works through the chain.
    let inherited = child
        .internal_get(&mut agent, PropertyKey::Integer(0), Value::Object(child))
        .unwrap();
    assert_eq!(inherited, Value::from(41));
}

#[test]
fn fast_hole_reads_through_the_prototype_chain() {
    let mut agent = Agent::default();
    let proto = OrdinaryObject::create_object(&mut agent, None);
    assert!(proto
        .internal_set(
            &mut agent,
            PropertyKey::Integer(1),
            Value::from(77),
            Value::Object(proto)
        )
        .unwrap());
    let a = Array::from_elements(&mut agent, &[Value::from(1), Value::from(2)]).unwrap();
    assert!(a.internal_set_prototype_of(&mut agent, Some(Object::Object(proto))));
    a.internal_delete(&mut agent, PropertyKey::Integer(1))
        .unwrap();
    // The hole is absent at the own-property layer...
    assert!(a
        .internal_get_own_property(&agent, PropertyKey::Integer(1))
        .is_none());
    // ...but the prototype still supplies a value on get.
    let value = a
        .internal_get(&mut agent, PropertyKey::Integer(1), Value::Array(a))
        .unwrap();
    assert_eq!(value, Value::from(77));
}

#[test]
fn value_keyed_accessors_parse_indices() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(5), Value::from(6)]).unwrap();
    let key_string = string_value(&mut agent, "1");
    let read = a.get_indexed_property(&mut agent, key_string).unwrap();
    assert_eq!(read, Value::from(6));
    assert!(a.has_indexed_property(&mut agent, Value::from(0)).unwrap());
    assert!(a
        .set_indexed_property(&mut agent, Value::from(0), Value::from(50))
        .unwrap());
    let read = a.get_indexed_property(&mut agent, Value::from(0)).unwrap();
    assert_eq!(read, Value::from(50));
    assert!(a
        .delete_indexed_property(&mut agent, Value::from(0))
        .unwrap());
    assert!(!a.has_indexed_property(&mut agent, Value::from(0)).unwrap());
}

#[test]
fn named_properties_live_beside_elements() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1)]).unwrap();
    let key = PropertyKey::from_str(&mut agent, "tag");
    assert!(a
        .internal_set(&mut agent, key, Value::from(9), Value::Array(a))
        .unwrap());
    assert!(a.is_fast(&agent));
    let own = a.internal_get_own_property(&agent, key).unwrap();
    assert_eq!(own.value, Some(Value::from(9)));
    assert_eq!(
        a.internal_own_property_keys(&agent),
        vec![PropertyKey::Integer(0), key]
    );
}
