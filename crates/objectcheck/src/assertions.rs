//! Field-level assertions
//!
//! Each helper returns `Err(Error::FieldMismatch)` (or a status/schema error)
//! instead of panicking, so scenarios can propagate failures with `?` and the
//! runner can classify them.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{Response, StatusCode};
use crate::types::{Attributes, ObjectRecord};

/// Require a response status.
pub fn expect_status(response: &Response, expected: StatusCode) -> Result<()> {
    response.ensure_status(expected).map(|_| ())
}

/// Require `key` to be present in a JSON object.
pub fn expect_key(value: &Value, key: &str) -> Result<()> {
    match value.get(key) {
        Some(_) => Ok(()),
        None => Err(Error::field_mismatch(
            format!("/{}", key),
            "key present",
            "key absent",
        )),
    }
}

/// Require the `id`, `name` and `data` keys of a product record.
pub fn expect_product_fields(value: &Value) -> Result<()> {
    for key in ["id", "name", "data"] {
        expect_key(value, key)?;
    }
    Ok(())
}

/// Require two values to be equal, reporting them with `Debug`.
pub fn expect_eq<T>(field: &str, expected: &T, actual: &T) -> Result<()>
where
    T: PartialEq + Debug + ?Sized,
{
    if expected == actual {
        Ok(())
    } else {
        Err(Error::field_mismatch(
            field,
            format!("{:?}", expected),
            format!("{:?}", actual),
        ))
    }
}

/// Compare two JSON values, treating numbers as equal when they denote the
/// same quantity (`2019` and `2019.0`).
pub fn json_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => left == right,
    }
}

/// Require a JSON value at `field` to equal `expected`.
pub fn expect_json(field: &str, expected: &Value, actual: &Value) -> Result<()> {
    if json_eq(expected, actual) {
        Ok(())
    } else {
        Err(Error::field_mismatch(field, expected, actual))
    }
}

/// Require a record's `data` to equal `expected` exactly: no missing keys, no
/// extra keys, no changed values.
pub fn expect_data(record: &ObjectRecord, expected: Option<&Attributes>) -> Result<()> {
    let expected = expected.map_or(Value::Null, |data| Value::Object(data.clone()));
    let actual = record
        .data
        .as_ref()
        .map_or(Value::Null, |data| Value::Object(data.clone()));
    expect_json("/data", &expected, &actual)
}

/// Require one attribute of a record's `data`.
pub fn expect_attribute(record: &ObjectRecord, key: &str, expected: &Value) -> Result<()> {
    let field = format!("/data/{}", key);
    match record.attribute(key) {
        Some(actual) => expect_json(&field, expected, actual),
        None => Err(Error::field_mismatch(field, expected, "absent")),
    }
}

/// Require a record's identity: id and name.
pub fn expect_identity(record: &ObjectRecord, id: &str, name: &str) -> Result<()> {
    expect_eq("/id", id, record.id.as_str())?;
    expect_eq("/name", name, record.name.as_str())
}

/// Require `actual` to hold exactly the items of `expected`, in any order.
///
/// Duplicates count: `[a, a]` and `[a]` differ.
pub fn expect_same_set<E, A>(field: &str, expected: E, actual: A) -> Result<()>
where
    E: IntoIterator,
    E::Item: AsRef<str>,
    A: IntoIterator,
    A::Item: AsRef<str>,
{
    let expected = multiset(expected);
    let actual = multiset(actual);
    if expected == actual {
        Ok(())
    } else {
        Err(Error::field_mismatch(
            field,
            render_multiset(&expected),
            render_multiset(&actual),
        ))
    }
}

fn multiset<I>(items: I) -> BTreeMap<String, usize>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.as_ref().to_string()).or_insert(0) += 1;
    }
    counts
}

fn render_multiset(counts: &BTreeMap<String, usize>) -> String {
    let items: Vec<&str> = counts
        .iter()
        .flat_map(|(item, n)| std::iter::repeat_n(item.as_str(), *n))
        .collect();
    format!("{:?}", items)
}
