// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::{
    execution::Agent,
    types::{HeapString, Symbol, Value},
};

/// The largest valid array index, `2^32 - 2`. An array's length can reach
/// `2^32 - 1`, which is exactly one past the largest index.
pub const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

/// A property key: an array index, a string, or a symbol.
///
/// Canonical integer-index strings are parsed into the `Integer` variant at
/// construction and converted back to strings at the point where a key
/// becomes observable as a language value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Integer(u32),
    String(HeapString),
    Symbol(Symbol),
}

impl PropertyKey {
    pub fn from_str(agent: &mut Agent, data: &str) -> Self {
        parse_string_to_integer_property_key(data)
            .map(PropertyKey::Integer)
            .unwrap_or_else(|| PropertyKey::String(HeapString::from_str(agent, data)))
    }

    /// Reads a language value as a property key. Numeric values that are
    /// valid array indices become integer keys; strings are parsed for the
    /// canonical index form. Other coercions are not in scope here.
    pub fn from_value(agent: &Agent, value: Value) -> Option<Self> {
        if let Some(index) = value.try_as_array_index() {
            return Some(PropertyKey::Integer(index));
        }
        match value {
            Value::String(string) => Some(
                parse_string_to_integer_property_key(string.as_str(agent))
                    .map(PropertyKey::Integer)
                    .unwrap_or(PropertyKey::String(string)),
            ),
            Value::Symbol(symbol) => Some(PropertyKey::Symbol(symbol)),
            _ => None,
        }
    }

    pub fn is_array_index(self) -> bool {
        matches!(self, PropertyKey::Integer(_))
    }

    /// Converts the key into a language value. Integer keys materialize as
    /// strings, which is the only form in which they are observable.
    pub fn convert_to_value(self, agent: &mut Agent) -> Value {
        match self {
            PropertyKey::Integer(index) => {
                Value::String(HeapString::from_str(agent, &index.to_string()))
            }
            PropertyKey::String(string) => Value::String(string),
            PropertyKey::Symbol(symbol) => Value::Symbol(symbol),
        }
    }
}

impl From<u32> for PropertyKey {
    fn from(value: u32) -> Self {
        debug_assert!(value <= MAX_ARRAY_INDEX);
        PropertyKey::Integer(value)
    }
}

impl From<HeapString> for PropertyKey {
    fn from(value: HeapString) -> Self {
        PropertyKey::String(value)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(value: Symbol) -> Self {
        PropertyKey::Symbol(value)
    }
}

/// Parses a string in the canonical array-index form: `"0"`, or a non-empty
/// digit run without a leading zero, with a value of at most `2^32 - 2`.
pub(crate) fn parse_string_to_integer_property_key(data: &str) -> Option<u32> {
    if data == "0" {
        return Some(0);
    }
    let bytes = data.as_bytes();
    if bytes.is_empty() || bytes[0] == b'0' || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = data.parse().ok()?;
    if value <= MAX_ARRAY_INDEX as u64 {
        Some(value as u32)
    } else {
        None
    }
}
