//! Value comparison used when conditions are evaluated in memory.
//!
//! Mirrors SQL semantics closely enough that both backends return the same
//! rows: a null column never satisfies a scalar comparison, and numbers and
//! numeric strings compare by value.

use serde_json::Value;
use softrow_model::Operator;
use std::cmp::Ordering;

/// Decides whether `actual` satisfies `operator expected`.
pub(crate) fn satisfies(operator: Operator, actual: &Value, expected: &Value) -> Option<bool> {
    match expected {
        Value::Null => match operator {
            Operator::Eq => Some(actual.is_null()),
            Operator::Ne => Some(!actual.is_null()),
            _ => None,
        },
        Value::Array(items) => {
            let hit = !actual.is_null() && items.iter().any(|item| loose_eq(actual, item));
            match operator {
                Operator::Eq => Some(hit),
                Operator::Ne => Some(!actual.is_null() && !hit),
                _ => None,
            }
        }
        Value::Object(_) => None,
        _ if actual.is_null() => Some(false),
        _ => Some(match operator {
            Operator::Eq => loose_eq(actual, expected),
            Operator::Ne => !loose_eq(actual, expected),
            Operator::Gt => compare(actual, expected) == Some(Ordering::Greater),
            Operator::Ge => matches!(
                compare(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lt => compare(actual, expected) == Some(Ordering::Less),
            Operator::Le => matches!(
                compare(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => as_number(a)?.partial_cmp(&as_number(b)?),
    }
}

/// Total order used for sorting: nulls first, then by value.
pub(crate) fn sort_order(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}
