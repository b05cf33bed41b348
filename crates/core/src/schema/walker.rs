//! Recursive traversal over the four structural schema shapes.
//!
//! Both walkers treat the shapes the same way:
//! - object: handed to the callback
//! - `$ref`: left alone (dereferencing happens before the core runs)
//! - union / array: recursed per branch / item
//! - `null` leaf inside a union: left alone
//! - any other leaf: [`SchemaError::Shape`], which aborts the run

use serde_json::{Map, Value};

use super::{Items, SchemaNode};
use crate::error::SchemaError;

/// Rebuild `value`, replacing every nested object node with `f(node)`.
pub fn map_inner<F>(value: &Value, path: &str, f: &mut F) -> Result<Value, SchemaError>
where
    F: FnMut(&Map<String, Value>, &str) -> Result<Map<String, Value>, SchemaError>,
{
    match SchemaNode::classify(value) {
        SchemaNode::Ref(_) => Ok(value.clone()),
        SchemaNode::Object(map) => Ok(Value::Object(f(map, path)?)),
        SchemaNode::Union { schema, branches } => {
            let mut mapped = Vec::with_capacity(branches.len());
            for (i, branch) in branches.iter().enumerate() {
                let branch_path = format!("{path}/anyOf/{i}");
                if SchemaNode::classify(branch).is_null() {
                    mapped.push(branch.clone());
                } else {
                    mapped.push(map_inner(branch, &branch_path, f)?);
                }
            }
            let mut out = schema.clone();
            out.insert("anyOf".to_string(), Value::Array(mapped));
            Ok(Value::Object(out))
        }
        SchemaNode::Array { schema, items } => {
            let mapped = match items {
                Items::Single(item) => map_inner(item, &format!("{path}/items"), f)?,
                Items::Tuple(tuple) => Value::Array(
                    tuple
                        .iter()
                        .enumerate()
                        .map(|(i, item)| map_inner(item, &format!("{path}/items/{i}"), f))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                Items::Missing => return Ok(value.clone()),
            };
            let mut out = schema.clone();
            out.insert("items".to_string(), mapped);
            Ok(Value::Object(out))
        }
        SchemaNode::Leaf(leaf) => Err(SchemaError::shape(path, leaf)),
    }
}

/// Apply `f` to every object node reachable from `value`, collecting results
/// in traversal order. `$ref` and `null` branches contribute nothing.
pub fn collect_objects<T, F>(value: &Value, path: &str, f: &mut F) -> Result<Vec<T>, SchemaError>
where
    F: FnMut(&Map<String, Value>, &str) -> Result<T, SchemaError>,
{
    let mut out = Vec::new();
    collect_into(value, path, f, &mut out)?;
    Ok(out)
}

fn collect_into<T, F>(
    value: &Value,
    path: &str,
    f: &mut F,
    out: &mut Vec<T>,
) -> Result<(), SchemaError>
where
    F: FnMut(&Map<String, Value>, &str) -> Result<T, SchemaError>,
{
    match SchemaNode::classify(value) {
        SchemaNode::Ref(_) => Ok(()),
        SchemaNode::Object(map) => {
            out.push(f(map, path)?);
            Ok(())
        }
        SchemaNode::Union { branches, .. } => {
            for (i, branch) in branches.iter().enumerate() {
                if SchemaNode::classify(branch).is_null() {
                    continue;
                }
                collect_into(branch, &format!("{path}/anyOf/{i}"), f, out)?;
            }
            Ok(())
        }
        SchemaNode::Array { items, .. } => match items {
            Items::Single(item) => collect_into(item, &format!("{path}/items"), f, out),
            Items::Tuple(tuple) => {
                for (i, item) in tuple.iter().enumerate() {
                    collect_into(item, &format!("{path}/items/{i}"), f, out)?;
                }
                Ok(())
            }
            Items::Missing => Ok(()),
        },
        SchemaNode::Leaf(leaf) => Err(SchemaError::shape(path, leaf)),
    }
}
