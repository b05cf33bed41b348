//! Local `$ref` dereferencing.
//!
//! Endpoint extraction reads request bodies structurally, so every local
//! `#/...` reference is inlined first. A reference that is already being
//! inlined further up the same path is cyclic and stays a `$ref`.

use serde_json::{Map, Value};
use tracing::warn;

/// Inline every resolvable local `$ref` of `document`.
///
/// Keys next to a `$ref` are dropped, as draft-04 prescribes. The `links` of
/// an inlined target are not copied: they describe operations, not values.
pub fn dereference(document: &Value) -> Value {
    let mut stack = Vec::new();
    resolve(document, document, &mut stack)
}

fn resolve(root: &Value, node: &Value, stack: &mut Vec<String>) -> Value {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                return resolve_ref(root, node, reference, stack);
            }
            Value::Object(resolve_map(root, map, stack))
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve(root, v, stack)).collect()),
        _ => node.clone(),
    }
}

fn resolve_map(root: &Value, map: &Map<String, Value>, stack: &mut Vec<String>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), resolve(root, v, stack)))
        .collect()
}

fn resolve_ref(root: &Value, node: &Value, reference: &str, stack: &mut Vec<String>) -> Value {
    let Some(pointer) = reference.strip_prefix('#') else {
        warn!(reference = %reference, "Leaving non-local reference unresolved.");
        return node.clone();
    };
    if stack.iter().any(|r| r == reference) {
        return node.clone();
    }
    let Some(target) = root.pointer(pointer) else {
        warn!(reference = %reference, "Reference target not found, leaving it unresolved.");
        return node.clone();
    };

    stack.push(reference.to_string());
    let resolved = match target {
        Value::Object(map) => {
            let mut map = map.clone();
            map.remove("links");
            resolve(root, &Value::Object(map), stack)
        }
        other => resolve(root, other, stack),
    };
    stack.pop();
    resolved
}
