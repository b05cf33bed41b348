//! Flattening of JSON:API envelopes.
//!
//! A raw entity schema looks like
//! `{ id, type, attributes: { properties }, relationships: { properties: { rel: { data } } }, meta }`.
//! The simplified shape moves attributes and relationship data one level up,
//! so downstream declarations read `item.title` instead of `item.attributes.title`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::walker::map_inner;
use super::{SchemaNode, properties, required};
use crate::error::SchemaError;

/// Keys a link schema may carry next to `data` and still count as an envelope.
const ENVELOPE_SIBLINGS: [&str; 4] = ["meta", "included", "links", "jsonapi"];

/// Link keys holding schemas with a `data` envelope. `hrefSchema` is query
/// parameters and stays as is.
const ENVELOPE_LINK_KEYS: [&str; 3] = ["schema", "targetSchema", "jobSchema"];

/// Bound on `$ref` chains followed for one envelope block.
const MAX_REF_HOPS: usize = 16;

/// Simplify every entity definition and every link schema of a hyperschema document.
///
/// The input is the raw (not dereferenced) document; `$ref`s are left for the
/// declaration compiler to resolve against the simplified definitions.
pub fn simplify(document: &Value) -> Result<Value, SchemaError> {
    let Some(root) = document.as_object() else {
        return Err(SchemaError::InvalidDocument(
            "document root is not an object".to_string(),
        ));
    };
    let Some(definitions) = root.get("definitions").and_then(Value::as_object) else {
        return Err(SchemaError::InvalidDocument(
            "missing 'definitions' object".to_string(),
        ));
    };

    let mut simplified = Map::with_capacity(definitions.len());
    for (name, definition) in definitions {
        let path = format!("#/definitions/{name}");
        let out = simplify_definition(document, definition, &path)?;
        debug!(definition = %name, "Simplified definition.");
        simplified.insert(name.clone(), out);
    }

    let mut out = root.clone();
    out.insert("definitions".to_string(), Value::Object(simplified));
    Ok(Value::Object(out))
}

fn simplify_definition(document: &Value, definition: &Value, path: &str) -> Result<Value, SchemaError> {
    let Value::Object(map) = definition else {
        return Ok(definition.clone());
    };

    let mut out = match SchemaNode::classify(definition) {
        SchemaNode::Object(_) => simplify_object(document, map, path)?,
        _ => map.clone(),
    };

    if let Some(Value::Array(links)) = map.get("links") {
        let mut simplified_links = Vec::with_capacity(links.len());
        for (i, link) in links.iter().enumerate() {
            simplified_links.push(simplify_link(document, link, &format!("{path}/links/{i}"))?);
        }
        out.insert("links".to_string(), Value::Array(simplified_links));
    }

    Ok(Value::Object(out))
}

fn simplify_link(document: &Value, link: &Value, path: &str) -> Result<Value, SchemaError> {
    let Value::Object(map) = link else {
        return Ok(link.clone());
    };

    let mut out = map.clone();
    for key in ENVELOPE_LINK_KEYS {
        if let Some(schema) = map.get(key) {
            let simplified = simplify_link_schema(document, schema, &format!("{path}/{key}"))?;
            out.insert(key.to_string(), simplified);
        }
    }
    Ok(Value::Object(out))
}

/// Replace a `{ data: ... }` envelope by its simplified `data` schema.
fn simplify_link_schema(document: &Value, schema: &Value, path: &str) -> Result<Value, SchemaError> {
    let SchemaNode::Object(map) = SchemaNode::classify(schema) else {
        return Ok(schema.clone());
    };
    let Some(props) = properties(map) else {
        return Ok(schema.clone());
    };
    let Some(data) = props.get("data") else {
        return Ok(schema.clone());
    };
    if props
        .keys()
        .any(|k| k != "data" && !ENVELOPE_SIBLINGS.contains(&k.as_str()))
    {
        return Ok(schema.clone());
    }

    map_inner(
        data,
        &format!("{path}/properties/data"),
        &mut |map: &Map<String, Value>, path: &str| simplify_object(document, map, path),
    )
}

/// Flatten one entity-shaped object node.
///
/// A node without `attributes` or `relationships` properties is returned
/// unchanged, which makes the operation idempotent. An `attributes` or
/// `relationships` block given as a local `$ref` is looked up in `document`.
pub fn simplify_object(
    document: &Value,
    map: &Map<String, Value>,
    path: &str,
) -> Result<Map<String, Value>, SchemaError> {
    let Some(props) = properties(map) else {
        return Ok(map.clone());
    };
    if !props.contains_key("attributes") && !props.contains_key("relationships") {
        return Ok(map.clone());
    }

    let parent_required = required(map);
    let mut flat = Map::new();
    let mut flat_required: Vec<Value> = Vec::new();
    let mut open_attributes = false;

    for key in ["id", "type"] {
        if let Some(schema) = props.get(key) {
            flat.insert(key.to_string(), schema.clone());
        }
    }

    if let Some(attributes) = props.get("attributes") {
        let attributes_map =
            resolve_block(document, attributes, &format!("{path}/properties/attributes"))?;
        match attributes_map.and_then(properties) {
            Some(attribute_props) => {
                for (name, schema) in attribute_props {
                    insert_flat(&mut flat, name, schema.clone(), path);
                }
            }
            None => open_attributes = true,
        }
        if parent_required.contains(&"attributes")
            && let Some(attributes_map) = attributes_map
        {
            promote_required(&mut flat_required, &required(attributes_map));
        }
    }

    let relationships = match props.get("relationships") {
        Some(block) => {
            resolve_block(document, block, &format!("{path}/properties/relationships"))?
        }
        None => None,
    };
    if let Some(relationships) = relationships {
        if let Some(relationship_props) = properties(relationships) {
            for (name, schema) in relationship_props {
                insert_flat(&mut flat, name, unwrap_relationship(schema), path);
            }
        }
        if parent_required.contains(&"relationships") {
            promote_required(&mut flat_required, &required(relationships));
        }
    }

    if let Some(meta) = props.get("meta") {
        flat.insert("meta".to_string(), meta.clone());
        if parent_required.contains(&"meta") {
            promote_required(&mut flat_required, &["meta"]);
        }
    }

    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        match key.as_str() {
            "properties" => {
                out.insert(key.clone(), Value::Object(std::mem::take(&mut flat)));
            }
            "required" | "additionalProperties" => {}
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    if !flat_required.is_empty() {
        out.insert("required".to_string(), Value::Array(flat_required));
    }
    out.insert(
        "additionalProperties".to_string(),
        Value::Bool(open_attributes),
    );

    Ok(out)
}

/// Follow the local `$ref`s of an `attributes` / `relationships` block to the
/// object it stands for. A reference that does not resolve is a shape error.
fn resolve_block<'a>(
    document: &'a Value,
    block: &'a Value,
    path: &str,
) -> Result<Option<&'a Map<String, Value>>, SchemaError> {
    let mut current = block;
    for _ in 0..MAX_REF_HOPS {
        let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
            return Ok(current.as_object());
        };
        debug!(path = %path, reference = %reference, "Resolving referenced envelope block.");
        current = reference
            .strip_prefix('#')
            .and_then(|pointer| document.pointer(pointer))
            .ok_or_else(|| SchemaError::shape(path, block))?;
    }
    Err(SchemaError::shape(path, block))
}

fn insert_flat(flat: &mut Map<String, Value>, name: &str, schema: Value, path: &str) {
    if flat.insert(name.to_string(), schema).is_some() {
        warn!(path = %path, property = %name, "Flattened property shadows an earlier one.");
    }
}

fn promote_required(into: &mut Vec<Value>, names: &[&str]) {
    for name in names {
        if !into.iter().any(|v| v.as_str() == Some(name)) {
            into.push(Value::String((*name).to_string()));
        }
    }
}

/// `{ data: X }` -> `X`; references and anything else are kept.
fn unwrap_relationship(schema: &Value) -> Value {
    let SchemaNode::Object(map) = SchemaNode::classify(schema) else {
        return schema.clone();
    };
    let Some(data) = properties(map).and_then(|p| p.get("data")) else {
        return schema.clone();
    };

    let mut data = data.clone();
    if let (Some(description), Value::Object(data_map)) = (map.get("description"), &mut data)
        && !data_map.contains_key("description")
        && !data_map.contains_key("$ref")
    {
        data_map.insert("description".to_string(), description.clone());
    }
    data
}
