// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use vireo_vm::ecmascript::{
    builtins::{Array, ArrayBuffer, ArrayIterator, CollectionIteratorKind, TypedArray},
    execution::{Agent, ExceptionType},
    types::{
        InternalMethods, Object, OrdinaryObject, PropertyKey, Value, BUILTIN_STRING_MEMORY,
    },
};

#[test]
fn value_iteration_yields_elements_in_order() {
    let mut agent = Agent::default();
    let a = Array::from_elements(
        &mut agent,
        &[Value::from(10), Value::from(20), Value::from(30)],
    )
    .unwrap();
    let iterator =
        ArrayIterator::from_object(&mut agent, Object::Array(a), CollectionIteratorKind::Value);
    for expected in [10, 20, 30] {
        assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::from(expected)));
    }
    assert_eq!(iterator.next(&mut agent).unwrap(), None);
    // Exhaustion is sticky.
    assert_eq!(iterator.next(&mut agent).unwrap(), None);
}

#[test]
fn key_iteration_yields_indices() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(5), Value::from(6)]).unwrap();
    let iterator =
        ArrayIterator::from_object(&mut agent, Object::Array(a), CollectionIteratorKind::Key);
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::Integer(0)));
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::Integer(1)));
    assert_eq!(iterator.next(&mut agent).unwrap(), None);
}

#[test]
fn key_value_iteration_yields_fresh_pairs() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(7)]).unwrap();
    let iterator = ArrayIterator::from_object(
        &mut agent,
        Object::Array(a),
        CollectionIteratorKind::KeyAndValue,
    );
    let Some(Value::Array(pair)) = iterator.next(&mut agent).unwrap() else {
        panic!("expected a key-value pair");
    };
    assert_eq!(pair.len(&agent), 2);
    let key = pair
        .internal_get(&mut agent, PropertyKey::Integer(0), Value::Array(pair))
        .unwrap();
    let value = pair
        .internal_get(&mut agent, PropertyKey::Integer(1), Value::Array(pair))
        .unwrap();
    assert_eq!(key, Value::Integer(0));
    assert_eq!(value, Value::from(7));
}

#[test]
fn length_is_reread_on_every_step() {
    let mut agent = Agent::default();
    let a = Array::from_elements(
        &mut agent,
        &[Value::from(1), Value::from(2), Value::from(3)],
    )
    .unwrap();
    let iterator =
        ArrayIterator::from_object(&mut agent, Object::Array(a), CollectionIteratorKind::Value);
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::from(1)));
    // Shrinking the array ends the iteration early.
    a.set_length(&mut agent, 1).unwrap();
    assert_eq!(iterator.next(&mut agent).unwrap(), None);
}

#[test]
fn growth_after_the_cursor_is_observed() {
    let mut agent = Agent::default();
    let a = Array::from_elements(&mut agent, &[Value::from(1), Value::from(2)]).unwrap();
    let iterator =
        ArrayIterator::from_object(&mut agent, Object::Array(a), CollectionIteratorKind::Value);
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::from(1)));
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::from(2)));
    a.internal_set(
        &mut agent,
        PropertyKey::Integer(2),
        Value::from(3),
        Value::Array(a),
    )
    .unwrap();
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::from(3)));
    assert_eq!(iterator.next(&mut agent).unwrap(), None);
}

#[test]
fn holes_read_through_the_prototype_chain() {
    let mut agent = Agent::default();
    let proto = OrdinaryObject::create_object(&mut agent, None);
    proto
        .internal_set(
            &mut agent,
            PropertyKey::Integer(0),
            Value::from(99),
            Value::Object(proto),
        )
        .unwrap();
    let a = Array::new(&mut agent, 1).unwrap();
    assert!(a.internal_set_prototype_of(&mut agent, Some(Object::Object(proto))));
    let iterator =
        ArrayIterator::from_object(&mut agent, Object::Array(a), CollectionIteratorKind::Value);
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::from(99)));
}

#[test]
fn array_like_object_iteration() {
    let mut agent = Agent::default();
    let object = OrdinaryObject::create_object(&mut agent, None);
    object
        .internal_set(
            &mut agent,
            PropertyKey::String(BUILTIN_STRING_MEMORY.length),
            Value::from(2),
            Value::Object(object),
        )
        .unwrap();
    for (index, value) in [(0, 4), (1, 5)] {
        object
            .internal_set(
                &mut agent,
                PropertyKey::Integer(index),
                Value::from(value),
                Value::Object(object),
            )
            .unwrap();
    }
    let iterator = ArrayIterator::from_object(
        &mut agent,
        Object::Object(object),
        CollectionIteratorKind::Value,
    );
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::from(4)));
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::from(5)));
    assert_eq!(iterator.next(&mut agent).unwrap(), None);
}

#[test]
fn detached_typed_array_is_a_type_error() {
    let mut agent = Agent::default();
    let buffer = ArrayBuffer::new(&mut agent, 16);
    let typed_array = TypedArray::new(&mut agent, buffer, 0, 16, 4);
    let iterator = ArrayIterator::from_object(
        &mut agent,
        Object::TypedArray(typed_array),
        CollectionIteratorKind::Key,
    );
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::Integer(0)));
    buffer.detach(&mut agent);
    let err = iterator.next(&mut agent).unwrap_err();
    assert_eq!(err.kind(&agent), ExceptionType::TypeError);
    assert_eq!(
        err.message(&agent),
        Some("cannot perform operation on detached or out-of-bounds typed array")
    );
}

#[test]
fn out_of_bounds_typed_array_is_a_type_error() {
    let mut agent = Agent::default();
    let buffer = ArrayBuffer::new(&mut agent, 16);
    let typed_array = TypedArray::new(&mut agent, buffer, 8, 8, 2);
    let iterator = ArrayIterator::from_object(
        &mut agent,
        Object::TypedArray(typed_array),
        CollectionIteratorKind::Key,
    );
    assert_eq!(iterator.next(&mut agent).unwrap(), Some(Value::Integer(0)));
    // Shrinking the buffer leaves the view's byte range dangling.
    buffer.resize(&mut agent, 4);
    let err = iterator.next(&mut agent).unwrap_err();
    assert_eq!(err.kind(&agent), ExceptionType::TypeError);
}
