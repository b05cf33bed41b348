//! Naming rules for generated methods and type references.

use crate::utils::{camel_case, pascal_case};

/// Relations whose method name does not follow the suffix rule.
const REL_OVERRIDES: [(&str, &str); 3] = [("instances", "list"), ("self", "find"), ("me", "findMe")];

/// Normalize a link relation into a method base name.
///
/// `instances` -> `list`, `self` -> `find`, `me` -> `findMe`,
/// `foo_instances` -> `foo_list`, anything else passes through.
pub fn normalize_rel(rel: &str) -> String {
    if let Some((_, name)) = REL_OVERRIDES.iter().find(|(from, _)| *from == rel) {
        return (*name).to_string();
    }
    if let Some(stem) = rel.strip_suffix("_instances") {
        return format!("{stem}_list");
    }
    rel.to_string()
}

/// Ergonomic method name: `bulk_destroy` -> `bulkDestroy`.
pub fn method_name(rel: &str) -> String {
    camel_case(&normalize_rel(rel))
}

/// Low-level method name: `instances` -> `rawList`.
pub fn raw_method_name(rel: &str) -> String {
    format!("raw{}", pascal_case(&normalize_rel(rel)))
}

/// Which schema of a link a type name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRole {
    Request,
    QueryParams,
    Target,
    Job,
}

impl SchemaRole {
    fn suffix(self) -> &'static str {
        match self {
            SchemaRole::Request => "Schema",
            SchemaRole::QueryParams => "HrefSchema",
            SchemaRole::Target => "TargetSchema",
            SchemaRole::Job => "JobSchema",
        }
    }
}

/// `("item", "instances", Target)` -> `ItemInstancesTargetSchema`
pub fn schema_type_name(resource: &str, rel: &str, role: SchemaRole) -> String {
    format!("{}{}{}", pascal_case(resource), pascal_case(rel), role.suffix())
}
