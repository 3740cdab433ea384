// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::{
    execution::{Agent, ExceptionType, JsResult},
    types::Value,
};

/// Numeric conversion of the value kinds this core can meet. Object
/// valuation (`toString`/`valueOf`) belongs to the embedder; objects and
/// symbols fail with a type error here.
pub fn to_number(agent: &mut Agent, value: Value) -> JsResult<f64> {
    match value {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Boolean(value) => Ok(if value { 1.0 } else { 0.0 }),
        Value::Integer(value) => Ok(value as f64),
        Value::Float(value) => Ok(value),
        Value::String(string) => {
            let data = string.as_str(agent).trim();
            if data.is_empty() {
                Ok(0.0)
            } else {
                Ok(data.parse::<f64>().unwrap_or(f64::NAN))
            }
        }
        _ => Err(agent.throw_exception(ExceptionType::TypeError, "cannot convert value to a number")),
    }
}

pub fn to_uint32(agent: &mut Agent, value: Value) -> JsResult<u32> {
    let number = to_number(agent, value)?;
    Ok(to_uint32_number(number))
}

/// ToUint32 over an already-converted number: truncate, then take the value
/// modulo 2^32.
pub(crate) fn to_uint32_number(number: f64) -> u32 {
    if !number.is_finite() || number == 0.0 {
        return 0;
    }
    let number = number.trunc();
    number.rem_euclid(4294967296.0) as u32
}

/// ToLength: clamp into the safe array-like length range `[0, 2^53 - 1]`.
pub fn to_length(agent: &mut Agent, value: Value) -> JsResult<i64> {
    let number = to_number(agent, value)?;
    if number.is_nan() {
        return Ok(0);
    }
    let number = number.trunc();
    Ok(number.clamp(0.0, ((1i64 << 53) - 1) as f64) as i64)
}
