// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::Value;

/// SameValue. Handles are compared by identity; strings are interned so
/// handle identity is content equality; numbers are normalized at
/// construction so the derived equality only needs the NaN and signed-zero
/// corrections.
pub fn same_value(x: Value, y: Value) -> bool {
    match (x, y) {
        (Value::Float(x), Value::Float(y)) => {
            if x.is_nan() && y.is_nan() {
                true
            } else {
                x == y && x.is_sign_negative() == y.is_sign_negative()
            }
        }
        _ => x == y,
    }
}
