// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enumeration snapshots: a key list materialized once per enumeration
//! pass, stable under concurrent mutation of the objects being walked.
//!
//! Before every yield the snapshot asks its modification detector whether
//! the world still matches the capture; on change the key list is rebuilt
//! so that no key is visited twice and no key deleted before its visit is
//! yielded at all.

use std::collections::BTreeSet;

use ahash::AHashSet;

use crate::ecmascript::{
    abstract_operations::operations_on_objects::create_data_property,
    builtins::error::messages,
    execution::{Agent, ExceptionType, JsResult},
    types::{InternalMethods, Object, PropertyKey, ShapeId, Value},
};

/// Which capture the snapshot performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Own keys only, symbols last. Used for collecting the rest of a
    /// destructuring pattern.
    OwnKeys,
    /// Own plus inherited enumerable string keys, with shadowing, walking
    /// the prototype chain. Used for generic object iteration.
    PrototypeChain,
}

#[derive(Debug)]
enum SnapshotState {
    OwnKeys { shape: ShapeId },
    PrototypeChain { shape_chain: Vec<ShapeId> },
}

#[derive(Debug)]
pub struct EnumerationSnapshot {
    object: Object,
    keys: Vec<PropertyKey>,
    index: usize,
    /// Captured array length; meaningful only for array targets.
    array_length: u32,
    state: SnapshotState,
}

impl EnumerationSnapshot {
    pub fn open(agent: &mut Agent, object: Object, kind: SnapshotKind) -> JsResult<Self> {
        let mut snapshot = Self {
            object,
            keys: Vec::new(),
            index: 0,
            array_length: 0,
            state: match kind {
                SnapshotKind::OwnKeys => SnapshotState::OwnKeys {
                    shape: object.structure_id(agent),
                },
                SnapshotKind::PrototypeChain => SnapshotState::PrototypeChain {
                    shape_chain: Vec::new(),
                },
            },
        };
        snapshot.keys = snapshot.capture(agent)?;
        Ok(snapshot)
    }

    /// The next key, or `None` when the snapshot is exhausted. Runs the
    /// modification check first and repairs the key list on change.
    pub fn next(&mut self, agent: &mut Agent) -> JsResult<Option<PropertyKey>> {
        if self.check_if_modified(agent) {
            self.update(agent)?;
        }
        if self.index >= self.keys.len() {
            return Ok(None);
        }
        let key = self.keys[self.index];
        self.index += 1;
        Ok(Some(key))
    }

    /// Drains the remaining keys, copying each `(key, get(key))` pair into
    /// the target object as fresh data properties. Destructuring-rest
    /// collection.
    pub fn rest_into(&mut self, agent: &mut Agent, target: Object) -> JsResult<()> {
        debug_assert!(matches!(self.state, SnapshotState::OwnKeys { .. }));
        while let Some(key) = self.next(agent)? {
            let value = self
                .object
                .internal_get(agent, key, Value::from(self.object))?;
            create_data_property(agent, target, key, value)?;
        }
        Ok(())
    }

    /// Recaptures the key list and refreshes the captured identity state.
    fn capture(&mut self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        if let Object::Array(array) = self.object {
            self.array_length = array.len(agent);
        }
        match self.state {
            SnapshotState::OwnKeys { .. } => {
                let keys = capture_own_keys(agent, self.object, false);
                self.state = SnapshotState::OwnKeys {
                    shape: self.object.structure_id(agent),
                };
                Ok(keys)
            }
            SnapshotState::PrototypeChain { .. } => {
                let (keys, shape_chain) = capture_chain_keys(agent, self.object)?;
                self.state = SnapshotState::PrototypeChain { shape_chain };
                Ok(keys)
            }
        }
    }

    /// The modification detector.
    fn check_if_modified(&self, agent: &Agent) -> bool {
        match &self.state {
            SnapshotState::OwnKeys { shape } => {
                if *shape != self.object.structure_id(agent) {
                    return true;
                }
            }
            SnapshotState::PrototypeChain { shape_chain } => {
                let mut object = self.object;
                for expected in shape_chain.iter() {
                    if *expected != object.structure_id(agent) {
                        return true;
                    }
                    match object.internal_get_prototype_of(agent) {
                        Some(prototype) => object = prototype,
                        None => break,
                    }
                }
            }
        }
        if let Object::Array(array) = self.object {
            if array.len(agent) != self.array_length {
                return true;
            }
            // The key under the cursor may have been deleted out of the
            // fast buffer since capture; visiting it would resurrect it.
            if array.is_fast(agent) && self.index < self.keys.len() {
                if let PropertyKey::Integer(index) = self.keys[self.index] {
                    if index < self.array_length && array.fast_slot(agent, index).is_none() {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Snapshot repair: recapture, then keep exactly the keys that were not
    /// yet visited and still exist in the old unvisited tail. Keys deleted
    /// before their visit drop out; keys added since capture are not picked
    /// up by the repaired snapshot.
    fn update(&mut self, agent: &mut Agent) -> JsResult<()> {
        let new_keys = self.capture(agent)?;
        let visited_prefix = &self.keys[..self.index];
        let unvisited_tail = &self.keys[self.index..];
        let difference_keys: Vec<PropertyKey> = new_keys
            .into_iter()
            .filter(|key| !visited_prefix.contains(key) && unvisited_tail.contains(key))
            .collect();
        self.keys = difference_keys;
        self.index = 0;
        Ok(())
    }
}

/// Own-keys capture with the canonical ordering: integer indices in
/// ascending numeric order, then string keys in insertion order, then
/// symbol keys in insertion order (unless skipped).
fn capture_own_keys(agent: &Agent, object: Object, skip_symbol_keys: bool) -> Vec<PropertyKey> {
    let mut indexes: BTreeSet<u32> = BTreeSet::new();
    let mut strings: Vec<PropertyKey> = Vec::new();
    let mut symbols: Vec<PropertyKey> = Vec::new();
    object.enumerate_own_properties(agent, skip_symbol_keys, &mut |key, enumerable| {
        if enumerable {
            match key {
                PropertyKey::Integer(index) => {
                    indexes.insert(index);
                }
                PropertyKey::String(_) => strings.push(key),
                PropertyKey::Symbol(_) => symbols.push(key),
            }
        }
        true
    });
    let mut keys = Vec::with_capacity(indexes.len() + strings.len() + symbols.len());
    keys.extend(indexes.into_iter().map(PropertyKey::Integer));
    keys.extend(strings);
    keys.extend(symbols);
    keys
}

/// Chain capture: walks the prototype chain twice. The first walk records
/// every structure identity and decides whether any prototype contributes
/// enumerable keys at all; if none does, the capture degrades to the plain
/// own-keys form. The second walk collects enumerable string keys level by
/// level with per-level ordering, suppressing keys already seen and keys
/// shadowed by a non-enumerable own property of the target.
fn capture_chain_keys(
    agent: &mut Agent,
    object: Object,
) -> JsResult<(Vec<PropertyKey>, Vec<ShapeId>)> {
    if let Object::TypedArray(typed_array) = object {
        // A detached view has nothing to enumerate, and no identity chain
        // is captured for it either: detachment is permanent, so a later
        // structure change on the view must not force a rebuild.
        if typed_array.viewed_array_buffer(agent).is_detached(agent) {
            return Ok((Vec::new(), Vec::new()));
        }
    }
    let mut shape_chain = vec![object.structure_id(agent)];
    let chain_limit = agent.options().enumeration_chain_limit;
    let mut should_search_prototype = false;
    let mut prototype = object.internal_get_prototype_of(agent);
    while let Some(current) = prototype {
        if !should_search_prototype {
            current.enumerate_own_properties(agent, false, &mut |_key, enumerable| {
                if enumerable {
                    should_search_prototype = true;
                    false
                } else {
                    true
                }
            });
        }
        shape_chain.push(current.structure_id(agent));
        prototype = current.internal_get_prototype_of(agent);
        if shape_chain.len() > chain_limit {
            return Err(
                agent.throw_exception(ExceptionType::RangeError, messages::PROTOTYPE_CHAIN_TOO_DEEP)
            );
        }
    }

    if !should_search_prototype {
        return Ok((capture_own_keys(agent, object, true), shape_chain));
    }

    let mut seen: AHashSet<PropertyKey> = AHashSet::new();
    let mut keys: Vec<PropertyKey> = Vec::new();
    let mut level = Some(object);
    let mut is_target_level = true;
    while let Some(current) = level {
        let mut indexes: BTreeSet<u32> = BTreeSet::new();
        let mut strings: Vec<PropertyKey> = Vec::new();
        current.enumerate_own_properties(agent, true, &mut |key, enumerable| {
            if enumerable {
                if !seen.contains(&key) {
                    seen.insert(key);
                    match key {
                        PropertyKey::Integer(index) => {
                            indexes.insert(index);
                        }
                        PropertyKey::String(_) => strings.push(key),
                        PropertyKey::Symbol(_) => {}
                    }
                }
            } else if is_target_level {
                // The enumerability of a shadowing own property is not
                // consulted: a non-enumerable own key of the target still
                // suppresses every inherited key with the same name.
                seen.insert(key);
            }
            true
        });
        keys.extend(indexes.into_iter().map(PropertyKey::Integer));
        keys.extend(strings);
        level = current.internal_get_prototype_of(agent);
        is_target_level = false;
    }
    Ok((keys, shape_chain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::builtins::{array_buffer::ArrayBuffer, typed_array::TypedArray};

    #[test]
    fn detached_typed_array_chain_capture_is_empty() {
        let mut agent = Agent::default();
        let buffer = ArrayBuffer::new(&mut agent, 16);
        let typed_array = TypedArray::new(&mut agent, buffer, 0, 16, 4);
        buffer.detach(&mut agent);
        let (keys, shape_chain) =
            capture_chain_keys(&mut agent, Object::TypedArray(typed_array)).unwrap();
        assert!(keys.is_empty());
        // The identity chain stays empty too, not a one-entry chain of the
        // view's structure: detachment is final, so the detector must
        // never report a dead view as modified.
        assert!(shape_chain.is_empty());
    }
}
