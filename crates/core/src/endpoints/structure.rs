//! Request body analysis.
//!
//! The ergonomic client methods accept a flat payload and split it back into
//! JSON:API `attributes` and `relationships`. That only works when the body
//! schema pins down a single entity type and the two key sets are known and
//! disjoint.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::schema::{SchemaNode, collect_objects, properties};

/// Entity type implied by a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityType {
    Concrete(String),
    /// Unknown or more than one type; serialized as `"*"`.
    Wildcard,
}

/// Keys of `attributes` or `relationships` implied by a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSet {
    Declared(Vec<String>),
    /// No declared properties; serialized as `"*"`.
    Wildcard,
}

/// How a flat payload maps back onto the JSON:API envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestStructure {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub attributes: FieldSet,
    pub relationships: FieldSet,
}

/// Why the ergonomic method is disabled for an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    NoConcreteType,
    WildcardFields,
    OverlappingKeys(Vec<String>),
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ambiguity::NoConcreteType => write!(f, "entity type is not a single value"),
            Ambiguity::WildcardFields => {
                write!(f, "neither attributes nor relationships declare properties")
            }
            Ambiguity::OverlappingKeys(keys) => {
                write!(f, "keys used as both attribute and relationship: {}", keys.join(", "))
            }
        }
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntityType::Concrete(t) => serializer.serialize_str(t),
            EntityType::Wildcard => serializer.serialize_str("*"),
        }
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldSet::Declared(keys) => keys.serialize(serializer),
            FieldSet::Wildcard => serializer.serialize_str("*"),
        }
    }
}

impl FieldSet {
    fn merge(self, other: FieldSet) -> FieldSet {
        match (self, other) {
            (FieldSet::Declared(mut a), FieldSet::Declared(b)) => {
                for key in b {
                    if !a.contains(&key) {
                        a.push(key);
                    }
                }
                FieldSet::Declared(a)
            }
            _ => FieldSet::Wildcard,
        }
    }
}

impl RequestStructure {
    /// Analyse a request body schema. Bodies without a `data` envelope have no structure.
    pub fn from_body(body: &Value, path: &str) -> Result<Option<Self>, SchemaError> {
        let Some(data) = body
            .as_object()
            .and_then(properties)
            .and_then(|p| p.get("data"))
        else {
            return Ok(None);
        };
        let data_path = format!("{path}/properties/data");

        let types = collect_objects(data, &data_path, &mut |map, _| Ok(entity_type_of(map)))?;
        let entity_type = combine_types(types);

        let attributes = fields_of(data, &data_path, "attributes")?;
        let relationships = fields_of(data, &data_path, "relationships")?;

        Ok(Some(RequestStructure {
            entity_type,
            attributes,
            relationships,
        }))
    }

    /// `None` when the structure can be used by the ergonomic method.
    pub fn ambiguity(&self) -> Option<Ambiguity> {
        if self.entity_type == EntityType::Wildcard {
            return Some(Ambiguity::NoConcreteType);
        }
        match (&self.attributes, &self.relationships) {
            (FieldSet::Wildcard, FieldSet::Wildcard) => Some(Ambiguity::WildcardFields),
            (FieldSet::Declared(attributes), FieldSet::Declared(relationships)) => {
                let overlap: Vec<String> = attributes
                    .iter()
                    .filter(|k| relationships.contains(*k))
                    .cloned()
                    .collect();
                if overlap.is_empty() {
                    None
                } else {
                    Some(Ambiguity::OverlappingKeys(overlap))
                }
            }
            _ => None,
        }
    }
}

fn entity_type_of(map: &Map<String, Value>) -> EntityType {
    let Some(type_schema) = properties(map).and_then(|p| p.get("type")) else {
        return EntityType::Wildcard;
    };
    if let Some(Value::String(t)) = type_schema.get("const") {
        return EntityType::Concrete(t.clone());
    }
    match type_schema.get("enum").and_then(Value::as_array).map(Vec::as_slice) {
        Some([Value::String(t)]) => EntityType::Concrete(t.clone()),
        _ => EntityType::Wildcard,
    }
}

fn combine_types(types: Vec<EntityType>) -> EntityType {
    let mut iter = types.into_iter();
    let Some(first) = iter.next() else {
        return EntityType::Wildcard;
    };
    if iter.all(|t| t == first) {
        first
    } else {
        EntityType::Wildcard
    }
}

/// Declared keys of `data.<section>` across every branch of `data`.
fn fields_of(data: &Value, path: &str, section: &str) -> Result<FieldSet, SchemaError> {
    let per_branch = collect_objects(data, path, &mut |map, branch_path| {
        let Some(section_schema) = properties(map).and_then(|p| p.get(section)) else {
            return Ok(FieldSet::Declared(Vec::new()));
        };
        let section_path = format!("{branch_path}/properties/{section}");
        match declared_keys(section_schema, &section_path) {
            Ok(keys) => Ok(keys),
            Err(SchemaError::NoPropertiesDefined { .. }) => Ok(FieldSet::Wildcard),
            Err(err) => Err(err),
        }
    })?;

    Ok(per_branch
        .into_iter()
        .reduce(FieldSet::merge)
        .unwrap_or(FieldSet::Wildcard))
}

fn declared_keys(section: &Value, path: &str) -> Result<FieldSet, SchemaError> {
    if matches!(SchemaNode::classify(section), SchemaNode::Ref(_)) {
        return Ok(FieldSet::Wildcard);
    }
    let branches = collect_objects(section, path, &mut |map, object_path| match properties(map) {
        Some(props) => Ok(FieldSet::Declared(props.keys().cloned().collect())),
        None => Err(SchemaError::NoPropertiesDefined {
            path: object_path.to_string(),
        }),
    })?;
    Ok(branches
        .into_iter()
        .reduce(FieldSet::merge)
        .unwrap_or(FieldSet::Wildcard))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declared(keys: &[&str]) -> FieldSet {
        FieldSet::Declared(keys.iter().map(|k| (*k).to_string()).collect())
    }

    fn structure(entity_type: EntityType, attributes: FieldSet, relationships: FieldSet) -> RequestStructure {
        RequestStructure {
            entity_type,
            attributes,
            relationships,
        }
    }

    #[test]
    fn test_ambiguity_rules() {
        let wildcard_type = structure(EntityType::Wildcard, declared(&["a"]), declared(&["b"]));
        assert_eq!(wildcard_type.ambiguity(), Some(Ambiguity::NoConcreteType));

        let overlap = structure(
            EntityType::Concrete("item".into()),
            declared(&["a", "b"]),
            declared(&["b"]),
        );
        assert_eq!(
            overlap.ambiguity(),
            Some(Ambiguity::OverlappingKeys(vec!["b".to_string()]))
        );

        let disjoint = structure(EntityType::Concrete("item".into()), declared(&["a"]), declared(&["b"]));
        assert_eq!(disjoint.ambiguity(), None);

        let both_open = structure(EntityType::Concrete("item".into()), FieldSet::Wildcard, FieldSet::Wildcard);
        assert_eq!(both_open.ambiguity(), Some(Ambiguity::WildcardFields));

        let open_attributes = structure(EntityType::Concrete("item".into()), FieldSet::Wildcard, declared(&["item_type"]));
        assert_eq!(open_attributes.ambiguity(), None);
    }

    #[test]
    fn test_from_body() {
        let body = json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "object",
                    "properties": {
                        "type": { "type": "string", "enum": ["item"] },
                        "attributes": { "type": "object" },
                        "relationships": {
                            "type": "object",
                            "properties": { "item_type": { "type": "object" }, "creator": { "type": "object" } }
                        }
                    }
                }
            }
        });
        let s = RequestStructure::from_body(&body, "#").unwrap().unwrap();
        assert_eq!(s.entity_type, EntityType::Concrete("item".into()));
        assert_eq!(s.attributes, FieldSet::Wildcard);
        assert_eq!(s.relationships, declared(&["item_type", "creator"]));
        assert_eq!(s.ambiguity(), None);
    }

    #[test]
    fn test_from_body_without_envelope() {
        let body = json!({ "type": "object", "properties": { "name": { "type": "string" } } });
        assert_eq!(RequestStructure::from_body(&body, "#").unwrap(), None);
    }

    #[test]
    fn test_union_of_types_is_wildcard() {
        let body = json!({
            "properties": {
                "data": {
                    "anyOf": [
                        { "properties": { "type": { "enum": ["field"] }, "attributes": { "properties": { "label": {} } } } },
                        { "properties": { "type": { "enum": ["fieldset"] }, "attributes": { "properties": { "title": {} } } } }
                    ]
                }
            }
        });
        let s = RequestStructure::from_body(&body, "#").unwrap().unwrap();
        assert_eq!(s.entity_type, EntityType::Wildcard);
        assert_eq!(s.attributes, declared(&["label", "title"]));
        assert_eq!(s.relationships, declared(&[]));
    }

    #[test]
    fn test_array_data() {
        let body = json!({
            "properties": {
                "data": {
                    "type": "array",
                    "items": { "properties": { "type": { "const": "upload" }, "id": { "type": "string" } } }
                }
            }
        });
        let s = RequestStructure::from_body(&body, "#").unwrap().unwrap();
        assert_eq!(s.entity_type, EntityType::Concrete("upload".into()));
        assert_eq!(s.attributes, declared(&[]));
    }

    #[test]
    fn test_serialize_wildcards() {
        let s = structure(EntityType::Wildcard, FieldSet::Wildcard, declared(&["b"]));
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({ "type": "*", "attributes": "*", "relationships": ["b"] })
        );
    }
}
