//! Structural view over hyperschema nodes.
//!
//! - `walker`: recursive matcher/transformer shared by extraction and simplification
//! - `simplify`: flattens JSON:API envelopes into a single property bag

mod simplify;
mod walker;

use serde_json::{Map, Value};

pub use simplify::{simplify, simplify_object};
pub use walker::{collect_objects, map_inner};

/// Borrowed classification of a schema node.
///
/// Exactly one variant applies to any value, checked in declaration order.
#[derive(Debug, Clone, Copy)]
pub enum SchemaNode<'a> {
    /// `{"$ref": "..."}`; resolution is the caller's business.
    Ref(&'a str),
    /// `{"anyOf": [...]}`
    Union {
        schema: &'a Map<String, Value>,
        branches: &'a [Value],
    },
    /// Declares `properties`, or a `type` naming `object`.
    Object(&'a Map<String, Value>),
    /// A `type` naming `array`, or an `items` keyword.
    Array {
        schema: &'a Map<String, Value>,
        items: Items<'a>,
    },
    /// Anything else: scalars, `{"type": "null"}`, empty schemas.
    Leaf(&'a Value),
}

/// The `items` keyword of an array node.
#[derive(Debug, Clone, Copy)]
pub enum Items<'a> {
    Single(&'a Value),
    Tuple(&'a [Value]),
    Missing,
}

impl<'a> SchemaNode<'a> {
    /// Classify a JSON value as a schema node.
    pub fn classify(value: &'a Value) -> Self {
        let Value::Object(map) = value else {
            return SchemaNode::Leaf(value);
        };

        if let Some(Value::String(ref_path)) = map.get("$ref") {
            return SchemaNode::Ref(ref_path);
        }

        if let Some(Value::Array(branches)) = map.get("anyOf") {
            return SchemaNode::Union {
                schema: map,
                branches,
            };
        }

        if map.contains_key("properties") || type_includes(map, "object") {
            return SchemaNode::Object(map);
        }

        if type_includes(map, "array") || map.contains_key("items") {
            let items = match map.get("items") {
                Some(Value::Array(tuple)) => Items::Tuple(tuple),
                Some(single) => Items::Single(single),
                None => Items::Missing,
            };
            return SchemaNode::Array { schema: map, items };
        }

        SchemaNode::Leaf(value)
    }

    /// A leaf that only admits `null`: the nullable arm of a union.
    pub fn is_null(&self) -> bool {
        match self {
            SchemaNode::Leaf(Value::Object(map)) => {
                matches!(map.get("type"), Some(Value::String(t)) if t == "null")
            }
            _ => false,
        }
    }
}

/// Whether the `type` keyword names `wanted`, directly or inside a type array.
pub fn type_includes(map: &Map<String, Value>, wanted: &str) -> bool {
    match map.get("type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

/// `properties` of an object schema, if declared.
pub fn properties(map: &Map<String, Value>) -> Option<&Map<String, Value>> {
    map.get("properties").and_then(Value::as_object)
}

/// `required` of an object schema as string slices.
pub fn required(map: &Map<String, Value>) -> Vec<&str> {
    map.get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_variants() {
        let r = json!({ "$ref": "#/definitions/item" });
        assert!(matches!(SchemaNode::classify(&r), SchemaNode::Ref("#/definitions/item")));

        let u = json!({ "anyOf": [{ "type": "null" }, { "type": "object" }] });
        assert!(matches!(SchemaNode::classify(&u), SchemaNode::Union { branches, .. } if branches.len() == 2));

        let o = json!({ "type": ["object", "null"], "properties": {} });
        assert!(matches!(SchemaNode::classify(&o), SchemaNode::Object(_)));

        let a = json!({ "type": "array", "items": { "type": "string" } });
        assert!(matches!(
            SchemaNode::classify(&a),
            SchemaNode::Array { items: Items::Single(_), .. }
        ));

        let t = json!({ "items": [{ "type": "string" }, { "type": "number" }] });
        assert!(matches!(
            SchemaNode::classify(&t),
            SchemaNode::Array { items: Items::Tuple(tuple), .. } if tuple.len() == 2
        ));

        let l = json!({ "type": "string" });
        assert!(matches!(SchemaNode::classify(&l), SchemaNode::Leaf(_)));
    }

    #[test]
    fn test_ref_wins_over_siblings() {
        let v = json!({ "$ref": "#/definitions/item", "properties": {} });
        assert!(matches!(SchemaNode::classify(&v), SchemaNode::Ref(_)));
    }

    #[test]
    fn test_is_null() {
        assert!(SchemaNode::classify(&json!({ "type": "null" })).is_null());
        assert!(!SchemaNode::classify(&json!({ "type": "string" })).is_null());
        assert!(!SchemaNode::classify(&json!({ "type": "object" })).is_null());
    }
}
