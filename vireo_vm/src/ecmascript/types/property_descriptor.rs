// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::Value;

/// A property descriptor with every field optional, mirroring the language's
/// partially-populated descriptor records. Getter and setter slots carry
/// opaque values; invoking accessors is outside this core.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PropertyDescriptor {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub get: Option<Value>,
    pub set: Option<Value>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// A data descriptor with the default fast-path attribute profile:
    /// writable, enumerable and configurable.
    pub fn new_data_descriptor(value: Value) -> Self {
        Self {
            value: Some(value),
            writable: Some(true),
            get: None,
            set: None,
            enumerable: Some(true),
            configurable: Some(true),
        }
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    pub fn has_fields(&self) -> bool {
        self.value.is_some()
            || self.writable.is_some()
            || self.get.is_some()
            || self.set.is_some()
            || self.enumerable.is_some()
            || self.configurable.is_some()
    }

    pub fn is_fully_populated(&self) -> bool {
        ((self.value.is_some() && self.writable.is_some())
            || (self.get.is_some() && self.set.is_some()))
            && self.enumerable.is_some()
            && self.configurable.is_some()
    }

    /// True when the descriptor carries only a value and no attribute
    /// requests at all.
    pub(crate) fn is_value_present_alone(&self) -> bool {
        self.value.is_some()
            && self.writable.is_none()
            && self.get.is_none()
            && self.set.is_none()
            && self.enumerable.is_none()
            && self.configurable.is_none()
    }

    /// True for a data descriptor explicitly requesting the default
    /// `{writable, enumerable, configurable}` profile.
    pub(crate) fn is_data_writable_enumerable_configurable(&self) -> bool {
        self.value.is_some()
            && self.writable == Some(true)
            && self.get.is_none()
            && self.set.is_none()
            && self.enumerable == Some(true)
            && self.configurable == Some(true)
    }
}
