// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{
        execution::ExceptionType,
        types::HeapString,
    },
    heap::indexes::ErrorIndex,
};

/// Messages of the error conditions this core raises.
pub mod messages {
    pub const INVALID_ARRAY_LENGTH: &str = "invalid array length";
    pub const INVALID_PROPERTY_KEY: &str = "cannot convert value to a property key";
    pub const NOT_EXTENSIBLE: &str = "object is not extensible";
    pub const CANNOT_SET_PROPERTY: &str = "cannot set property";
    pub const LENGTH_NOT_WRITABLE: &str = "cannot assign to read only property 'length'";
    pub const PROPERTY_NOT_CONFIGURABLE: &str = "cannot delete non-configurable array element";
    pub const DETACHED_TYPED_ARRAY: &str =
        "cannot perform operation on detached or out-of-bounds typed array";
    pub const PROTOTYPE_CHAIN_TOO_DEEP: &str = "maximum prototype chain size exceeded";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Error(pub(crate) ErrorIndex);

#[derive(Debug, Clone, Copy)]
pub struct ErrorHeapData {
    pub kind: ExceptionType,
    pub message: Option<HeapString>,
}

impl ErrorHeapData {
    pub(crate) fn new(kind: ExceptionType, message: Option<HeapString>) -> Self {
        Self { kind, message }
    }
}
