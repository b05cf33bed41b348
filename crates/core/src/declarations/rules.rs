//! Name-keyed rewrite rules.
//!
//! Every exported declaration name maps to at most one [`Rule`]. The table is
//! a single map built from per-bucket lists, and building fails when a name is
//! listed twice, so the buckets are disjoint by construction.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::DeclarationError;

/// What happens to a declaration with a given exported name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Removed; a hand-written counterpart takes the name.
    Drop,
    /// Renamed to a stable, non-generic shell; body untouched.
    Rename(String),
    /// Response schema: gains `D` and `NestedMode`, body becomes a conditional.
    TargetSchema,
    /// Request body schema: gains `D`, attributes are typed per record type.
    ItemSchema,
    /// Relationship block: gains `D`.
    Relationships,
}

impl Rule {
    /// Bucket name used in diagnostics.
    pub fn bucket(&self) -> &'static str {
        match self {
            Rule::Drop => "drop",
            Rule::Rename(_) => "rename",
            Rule::TargetSchema => "target_schemas",
            Rule::ItemSchema => "item_schemas",
            Rule::Relationships => "relationships",
        }
    }
}

/// Type names the rewrites introduce or look for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TypeNames {
    /// Generic record type, e.g. `Item`
    pub record: String,
    /// Record as returned inside nested responses, e.g. `ItemInNestedResponse`
    pub nested_record: String,
    /// Record-definition type used as the bound and default of `D`
    pub definition: String,
    /// Record-type metadata reference parameterized by `D`
    pub type_metadata: String,
    /// Per-record attributes accepted in request bodies
    pub attributes_in_request: String,
}

impl Default for TypeNames {
    fn default() -> Self {
        TypeNames {
            record: "Item".to_string(),
            nested_record: "ItemInNestedResponse".to_string(),
            definition: "ItemTypeDefinition".to_string(),
            type_metadata: "ItemTypeData".to_string(),
            attributes_in_request: "ToItemAttributesInRequest".to_string(),
        }
    }
}

/// Rule lists as written in configuration.
///
/// ```toml
/// drop = ["ItemAttributes"]
/// target_schemas = ["ItemSelfTargetSchema"]
///
/// [rename]
/// Item = "ItemStableShell"
///
/// [types]
/// record = "Item"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub types: TypeNames,
    pub drop: Vec<String>,
    pub rename: BTreeMap<String, String>,
    pub target_schemas: Vec<String>,
    pub item_schemas: Vec<String>,
    pub relationships: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            types: TypeNames::default(),
            drop: names(&[
                "ItemTypeDefinition",
                "ToItemAttributesInRequest",
                "ItemAttributes",
                "ItemInNestedResponseAttributes",
            ]),
            rename: [
                ("Item", "ItemStableShell"),
                ("ItemInNestedResponse", "ItemInNestedResponseStableShell"),
            ]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect(),
            target_schemas: names(&[
                "ItemInstancesTargetSchema",
                "ItemSelfTargetSchema",
                "ItemCreateTargetSchema",
                "ItemUpdateTargetSchema",
                "ItemDestroyTargetSchema",
                "ItemDuplicateJobSchema",
                "ItemPublishTargetSchema",
                "ItemUnpublishTargetSchema",
                "ItemReferencesTargetSchema",
                "ItemBulkPublishJobSchema",
            ]),
            item_schemas: names(&[
                "ItemCreateSchema",
                "ItemUpdateSchema",
                "ItemValidateNewSchema",
                "ItemValidateExistingSchema",
            ]),
            relationships: names(&["ItemRelationships", "ItemInNestedResponseRelationships"]),
        }
    }
}

impl RuleSet {
    /// Parse a rule set from TOML; missing keys keep their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, DeclarationError> {
        toml::from_str(src).map_err(|e| DeclarationError::InvalidRuleSet(e.to_string()))
    }
}

/// Disjoint lookup from exported name to rule.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<String, Rule>,
    types: TypeNames,
}

impl RuleTable {
    /// Build the table, rejecting any name listed more than once.
    pub fn build(set: &RuleSet) -> Result<Self, DeclarationError> {
        let mut rules = HashMap::new();
        let entries = set
            .drop
            .iter()
            .map(|n| (n, Rule::Drop))
            .chain(set.rename.iter().map(|(n, to)| (n, Rule::Rename(to.clone()))))
            .chain(set.target_schemas.iter().map(|n| (n, Rule::TargetSchema)))
            .chain(set.item_schemas.iter().map(|n| (n, Rule::ItemSchema)))
            .chain(set.relationships.iter().map(|n| (n, Rule::Relationships)));

        for (name, rule) in entries {
            if let Some(existing) = rules.get(name) {
                return Err(DeclarationError::OverlappingRule {
                    name: name.clone(),
                    first: Rule::bucket(existing),
                    second: rule.bucket(),
                });
            }
            rules.insert(name.clone(), rule);
        }

        Ok(RuleTable {
            rules,
            types: set.types.clone(),
        })
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn types(&self) -> &TypeNames {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
