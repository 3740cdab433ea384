// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod object;
mod property_descriptor;
mod property_key;
mod string;
mod symbol;
mod value;

pub use object::{
    ElementDescriptor, InternalMethods, Object, ObjectHeapData, OrdinaryObject, ShapeId,
};
pub use property_descriptor::PropertyDescriptor;
pub use property_key::{PropertyKey, MAX_ARRAY_INDEX};
pub use string::{BuiltinStringMemory, HeapString, StringHeapData, BUILTIN_STRING_MEMORY};
pub use symbol::{Symbol, SymbolHeapData};
pub use value::Value;
