//! Serde model of a hyperschema link.
//!
//! Schema-valued fields stay as raw JSON: they are analysed structurally by
//! the schema walker rather than deserialized into a fixed shape.

use serde::Deserialize;
use serde_json::Value;

/// One API operation from a definition's `links` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDescriptor {
    pub method: String,
    pub rel: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub href: String,
    /// Query parameters
    pub href_schema: Option<Value>,
    /// Request body
    pub schema: Option<Value>,
    /// Synchronous response
    pub target_schema: Option<Value>,
    /// Result of an asynchronous job
    pub job_schema: Option<Value>,
    #[serde(default)]
    pub private: bool,
    pub deprecated: Option<Deprecation>,
}

/// `deprecated` is either a flag or an explanatory note.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Deprecation {
    Flag(bool),
    Note(String),
}

impl Deprecation {
    pub fn note(&self) -> Option<String> {
        match self {
            Deprecation::Flag(true) => Some("This endpoint is deprecated".to_string()),
            Deprecation::Flag(false) => None,
            Deprecation::Note(note) => Some(note.clone()),
        }
    }
}

impl LinkDescriptor {
    /// Parse a definition's `links` array.
    pub fn parse_all(links: &Value) -> Result<Vec<LinkDescriptor>, serde_json::Error> {
        Vec::<LinkDescriptor>::deserialize(links)
    }
}
