//! Total order over JSON values, used by sequence sorting
//!
//! null < bool < number < string < array < object. Numbers compare
//! numerically, strings lexicographically, arrays element by element and
//! objects by size, then entry by entry.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Direction of a replicated sort.
///
/// Only a direction crosses the bus; comparator closures cannot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Compare two values in this direction.
    #[must_use]
    pub fn compare(self, a: &Value, b: &Value) -> Ordering {
        match self {
            Self::Ascending => compare_values(a, b),
            Self::Descending => compare_values(b, a),
        }
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison of an integer with a float. Never rounds the integer
/// through `f64`, which would merge neighbours above 2^53.
fn compare_integer_float(i: i128, f: f64) -> Ordering {
    // Unreachable for parsed JSON; keep the order total anyway
    if f.is_nan() {
        return Ordering::Less;
    }
    // i128::MAX as f64 rounds up to exactly 2^127
    let bound = i128::MAX as f64;
    if f >= bound {
        return Ordering::Less;
    }
    if f < -bound {
        return Ordering::Greater;
    }
    // |floor| <= 2^127 and integral, so the cast is exact
    let floor = f.floor();
    i.cmp(&(floor as i128)).then(if f > floor {
        Ordering::Less
    } else {
        Ordering::Equal
    })
}

fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    match (integer(x), integer(y)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(a), None) => compare_integer_float(a, y.as_f64().unwrap_or(f64::NAN)),
        (None, Some(b)) => compare_integer_float(b, x.as_f64().unwrap_or(f64::NAN)).reverse(),
        (None, None) => {
            let a = x.as_f64().unwrap_or(f64::NAN);
            let b = y.as_f64().unwrap_or(f64::NAN);
            // partial_cmp first so -0.0 and 0.0 stay equal, matching integer 0
            a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
        }
    }
}

/// Compare two JSON values.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(a, b)| compare_values(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.iter()
                .zip(y.iter())
                .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| compare_values(va, vb)))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        _ => rank(a).cmp(&rank(b)),
    }
}
