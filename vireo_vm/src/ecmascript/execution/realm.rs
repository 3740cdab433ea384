// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        builtins::{
            array::data::{ArrayElements, ArrayHeapData},
            Array,
        },
        types::{Object, ObjectHeapData, OrdinaryObject},
    },
    heap::CreateHeapData,
    Heap,
};

/// A realm holds the intrinsic objects shared by everything the agent
/// creates. One realm per agent.
#[derive(Debug)]
pub struct Realm {
    intrinsics: Intrinsics,
}

#[derive(Debug)]
pub struct Intrinsics {
    object_prototype: OrdinaryObject,
    array_prototype: Array,
}

impl Realm {
    /// Builds the intrinsics. The array prototype is itself an array that
    /// lives in the generic store from birth; both prototypes are marked as
    /// prototype objects up front.
    pub(crate) fn initialize(heap: &mut Heap) -> Self {
        let object_prototype_shape = heap.alloc_shape();
        let mut object_prototype_data = ObjectHeapData::new(object_prototype_shape, None);
        object_prototype_data.is_prototype = true;
        let object_prototype = heap.create(object_prototype_data);

        let backing_shape = heap.alloc_shape();
        let mut backing_data =
            ObjectHeapData::new(backing_shape, Some(Object::Object(object_prototype)));
        backing_data.is_prototype = true;
        let array_prototype_backing = heap.create(backing_data);

        let array_prototype = heap.create(ArrayHeapData {
            object_index: Some(array_prototype_backing),
            shape: backing_shape,
            length: 0,
            length_writable: true,
            elements: ArrayElements::Slow,
        });

        Self {
            intrinsics: Intrinsics {
                object_prototype,
                array_prototype,
            },
        }
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }
}

impl Intrinsics {
    pub fn object_prototype(&self) -> OrdinaryObject {
        self.object_prototype
    }

    pub fn array_prototype(&self) -> Array {
        self.array_prototype
    }
}
