//! Per-operation endpoint metadata extracted from a dereferenced hyperschema.
//!
//! - `link`: serde model of a hyperschema link
//! - `url`: identity placeholder scanning and URL templates
//! - `naming`: method and type naming rules
//! - `structure`: request body analysis and ambiguity detection
//! - `extract`: assembles [`ResourceInfo`] per definition

mod extract;
mod link;
mod naming;
mod structure;
mod url;

use serde::Serialize;

pub use extract::{ExtractOptions, extract_endpoints, extract_resource};
pub use link::{Deprecation, LinkDescriptor};
pub use naming::normalize_rel;
pub use structure::{Ambiguity, EntityType, FieldSet, RequestStructure};
pub use url::{UrlPart, UrlPlaceholder, UrlTemplate};

/// HTTP method of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Parse a method name, case-insensitively.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

/// Page size limits of a paginated collection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// `page.limit` default
    pub default_limit: Option<u64>,
    /// `page.limit` maximum
    pub max_limit: Option<u64>,
}

/// Derived metadata for one API operation, consumed by the template renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInfo {
    /// Link relation, as declared (e.g. "instances")
    pub rel: String,
    /// Ergonomic method name (e.g. "list")
    pub name: String,
    /// Low-level method name (e.g. "rawList")
    pub raw_name: String,
    pub returns_collection: bool,
    /// Template string body with `${var}` substitutions (e.g. "/items/${itemId}")
    pub url_template: String,
    pub method: HttpMethod,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_placeholder: Option<UrlPlaceholder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body_type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_structure: Option<RequestStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_params_type_name: Option<String>,
    pub query_params_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_note: Option<String>,
    /// False when the request body cannot be split into attributes and
    /// relationships unambiguously.
    pub simple_method_available: bool,
}

/// All endpoints of one hyperschema definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    /// Definition name / JSON:API type (e.g. "item_type")
    pub resource_type_name: String,
    /// Client namespace (e.g. "itemTypes")
    pub namespace: String,
    /// Generated class name (e.g. "ItemType")
    pub class_name: String,
    pub endpoints: Vec<EndpointInfo>,
}
