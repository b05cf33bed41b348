//! Error types for schema analysis and declaration rewriting.

use thiserror::Error;

/// Errors raised while walking or analysing a hyperschema document.
///
/// Every variant except [`SchemaError::NoPropertiesDefined`] aborts the whole
/// run: generated files reference each other's names, so partial output is
/// never useful.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A schema node is neither object, array, union nor `$ref` where one was expected.
    #[error("Don't know how to handle schema node at {path}: {snippet}")]
    Shape { path: String, snippet: String },

    /// An href carries more than one identity placeholder.
    #[error("Multiple placeholders in href '{href}' ({count} found)")]
    MultiplePlaceholders { href: String, count: usize },

    /// An object node declares no `properties`.
    ///
    /// Recovered by the request structure analysis, which reads it as a wildcard.
    #[error("No properties defined at {path}")]
    NoPropertiesDefined { path: String },

    /// A link uses an HTTP method the client cannot express.
    #[error("Unsupported HTTP method '{method}' on {resource}.{rel}")]
    UnsupportedMethod {
        resource: String,
        rel: String,
        method: String,
    },

    /// Two links of one resource normalize to the same method name.
    #[error(
        "Duplicate method '{name}' on resource '{resource}'. Each link must normalize to a unique name."
    )]
    DuplicateMethod { resource: String, name: String },

    /// The `links` array of a definition does not deserialize into link descriptors.
    #[error("Invalid links on definition '{resource}': {message}")]
    InvalidLinks { resource: String, message: String },

    /// The document itself is not a hyperschema (e.g. no `definitions` object).
    #[error("Invalid hyperschema document: {0}")]
    InvalidDocument(String),
}

/// Errors raised while parsing declaration source or building rule tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// The declaration source could not be parsed.
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A declaration name was listed under more than one rule.
    #[error("Declaration '{name}' is listed as both {first} and {second}")]
    OverlappingRule {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    /// The rule set file could not be read as TOML.
    #[error("Invalid rule set: {0}")]
    InvalidRuleSet(String),
}

impl SchemaError {
    pub(crate) fn shape(path: &str, node: &serde_json::Value) -> Self {
        let mut snippet = node.to_string();
        if snippet.len() > 120 {
            let cut = (0..=120)
                .rev()
                .find(|i| snippet.is_char_boundary(*i))
                .unwrap_or(0);
            snippet.truncate(cut);
            snippet.push_str("...");
        }
        SchemaError::Shape {
            path: path.to_string(),
            snippet,
        }
    }
}
