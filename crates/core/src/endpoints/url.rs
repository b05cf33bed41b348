//! Identity placeholders and URL templates.
//!
//! Hyperschema hrefs encode path variables as `{(<percent-encoded JSON pointer>)}`,
//! e.g. `/items/{(%23%2Fdefinitions%2Fitem%2Fdefinitions%2Fidentity)}`.
//! A pointer ending in `definitions/<NAME>/definitions/identity` is an identity
//! placeholder and becomes one substitution variable.

use std::fmt;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::error::SchemaError;
use crate::utils::camel_case;

#[allow(clippy::expect_used)] // literal pattern
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\(([^)]*)\)\}").expect("placeholder pattern"));

#[allow(clippy::expect_used)] // literal pattern
static IDENTITY_POINTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"definitions/([^/]+)/definitions/identity$").expect("identity pattern")
});

/// URL template part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPart {
    /// Static string
    Static(String),
    /// Variable interpolation
    Param(String),
}

/// Parsed href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    pub parts: Vec<UrlPart>,
    pub placeholder: Option<UrlPlaceholder>,
}

/// The single substitution variable of an href.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlPlaceholder {
    /// e.g. "itemTypeId"
    pub variable_name: String,
    /// Whether the resource's own identifier fills the placeholder
    pub is_entity_id: bool,
    /// Definition whose identity the placeholder refers to
    pub rel_type: String,
}

impl UrlTemplate {
    /// Parse an href for the resource `resource`.
    pub fn parse(href: &str, resource: &str) -> Result<Self, SchemaError> {
        let identities: Vec<_> = PLACEHOLDER
            .captures_iter(href)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let pointer = percent_decode_str(caps.get(1)?.as_str())
                    .decode_utf8_lossy()
                    .into_owned();
                match IDENTITY_POINTER.captures(&pointer) {
                    Some(name) => Some((whole.range(), name[1].to_string())),
                    None => {
                        warn!(href = %href, pointer = %pointer, "Placeholder is not an identity, keeping it verbatim.");
                        None
                    }
                }
            })
            .collect();

        if identities.len() > 1 {
            return Err(SchemaError::MultiplePlaceholders {
                href: href.to_string(),
                count: identities.len(),
            });
        }

        let Some((range, rel_type)) = identities.into_iter().next() else {
            return Ok(UrlTemplate {
                parts: vec![UrlPart::Static(href.to_string())],
                placeholder: None,
            });
        };

        let variable_name = camel_case(&format!("{rel_type}_id"));
        let mut parts = Vec::new();
        if range.start > 0 {
            parts.push(UrlPart::Static(href[..range.start].to_string()));
        }
        parts.push(UrlPart::Param(variable_name.clone()));
        if range.end < href.len() {
            parts.push(UrlPart::Static(href[range.end..].to_string()));
        }

        Ok(UrlTemplate {
            parts,
            placeholder: Some(UrlPlaceholder {
                variable_name,
                is_entity_id: rel_type == resource,
                rel_type,
            }),
        })
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                UrlPart::Static(s) => f.write_str(&s.replace('`', "\\`"))?,
                UrlPart::Param(name) => write!(f, "${{{name}}}")?,
            }
        }
        Ok(())
    }
}
