//! Endpoint extraction from a dereferenced hyperschema document.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use super::link::LinkDescriptor;
use super::naming::{SchemaRole, method_name, raw_method_name, schema_type_name};
use super::structure::RequestStructure;
use super::url::UrlTemplate;
use super::{EndpointInfo, HttpMethod, Pagination, ResourceInfo};
use crate::error::SchemaError;
use crate::schema::properties;
use crate::utils::{camel_case, kebab_case, pascal_case, pluralize};

/// Knobs for extraction that do not come from the document.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Base URL of the per-endpoint reference docs; `<base>/<resource>/<rel>`.
    pub docs_base_url: Option<String>,
}

/// Extract endpoint metadata for every definition that carries links.
///
/// Definitions are visited in document order. The document must already be
/// dereferenced: `$ref`s left in request bodies read as wildcards.
pub fn extract_endpoints(
    document: &Value,
    options: &ExtractOptions,
) -> Result<Vec<ResourceInfo>, SchemaError> {
    let Some(definitions) = document.get("definitions").and_then(Value::as_object) else {
        return Err(SchemaError::InvalidDocument(
            "missing 'definitions' object".to_string(),
        ));
    };

    let mut resources = Vec::new();
    for (name, definition) in definitions {
        let Some(links) = definition.get("links") else {
            continue;
        };
        let links = LinkDescriptor::parse_all(links).map_err(|e| SchemaError::InvalidLinks {
            resource: name.clone(),
            message: e.to_string(),
        })?;
        if links.is_empty() {
            continue;
        }

        let resource = extract_resource(name, &links, options)?;
        if resource.endpoints.is_empty() {
            debug!(resource = %name, "Skipping resource without public links.");
            continue;
        }
        resources.push(resource);
    }

    debug!(resources = resources.len(), "Extracted endpoint metadata.");
    Ok(resources)
}

/// Extract the endpoints of one resource from its (dereferenced) links.
pub fn extract_resource(
    resource: &str,
    links: &[LinkDescriptor],
    options: &ExtractOptions,
) -> Result<ResourceInfo, SchemaError> {
    let mut endpoints = Vec::with_capacity(links.len());
    let mut names = HashSet::new();

    for (i, link) in links.iter().enumerate() {
        if link.private {
            debug!(resource = %resource, rel = %link.rel, "Skipping private link.");
            continue;
        }
        let path = format!("#/definitions/{resource}/links/{i}");
        let endpoint = extract_endpoint(resource, link, &path, options)?;

        if !names.insert(endpoint.name.clone()) {
            return Err(SchemaError::DuplicateMethod {
                resource: resource.to_string(),
                name: endpoint.name,
            });
        }
        endpoints.push(endpoint);
    }

    Ok(ResourceInfo {
        resource_type_name: resource.to_string(),
        namespace: camel_case(&pluralize(resource)),
        class_name: pascal_case(resource),
        endpoints,
    })
}

fn extract_endpoint(
    resource: &str,
    link: &LinkDescriptor,
    path: &str,
    options: &ExtractOptions,
) -> Result<EndpointInfo, SchemaError> {
    let method = HttpMethod::parse(&link.method).ok_or_else(|| SchemaError::UnsupportedMethod {
        resource: resource.to_string(),
        rel: link.rel.clone(),
        method: link.method.clone(),
    })?;

    let url = UrlTemplate::parse(&link.href, resource)?;

    let request_structure = match &link.schema {
        Some(body) => RequestStructure::from_body(body, &format!("{path}/schema"))?,
        None => None,
    };

    let simple_method_available = match request_structure.as_ref().and_then(|s| s.ambiguity()) {
        Some(reason) => {
            warn!(
                resource = %resource,
                rel = %link.rel,
                reason = %reason,
                "Ambiguous request structure, disabling simple method."
            );
            false
        }
        None => true,
    };

    let response_type_name = if link.job_schema.is_some() {
        Some(schema_type_name(resource, &link.rel, SchemaRole::Job))
    } else if link.target_schema.is_some() {
        Some(schema_type_name(resource, &link.rel, SchemaRole::Target))
    } else {
        None
    };

    let query_params_required = link
        .href_schema
        .as_ref()
        .and_then(|s| s.get("required"))
        .and_then(Value::as_array)
        .is_some_and(|r| !r.is_empty());

    let comment = link
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| link.title.clone());

    let doc_url = options.docs_base_url.as_ref().map(|base| {
        format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            kebab_case(resource),
            kebab_case(&link.rel)
        )
    });

    let endpoint = EndpointInfo {
        rel: link.rel.clone(),
        name: method_name(&link.rel),
        raw_name: raw_method_name(&link.rel),
        returns_collection: link.rel.contains("query") || link.rel.contains("instances"),
        url_template: url.to_string(),
        method,
        comment,
        doc_url,
        url_placeholder: url.placeholder,
        request_body_type_name: link
            .schema
            .as_ref()
            .map(|_| schema_type_name(resource, &link.rel, SchemaRole::Request)),
        request_structure,
        query_params_type_name: link
            .href_schema
            .as_ref()
            .map(|_| schema_type_name(resource, &link.rel, SchemaRole::QueryParams)),
        query_params_required,
        response_type_name,
        pagination: link.href_schema.as_ref().and_then(pagination_of),
        deprecated_note: link.deprecated.as_ref().and_then(|d| d.note()),
        simple_method_available,
    };

    debug!(
        resource = %resource,
        rel = %endpoint.rel,
        name = %endpoint.name,
        url = %endpoint.url_template,
        "Extracted endpoint."
    );
    Ok(endpoint)
}

/// Page size limits from `hrefSchema.properties.page.properties.limit`.
fn pagination_of(href_schema: &Value) -> Option<Pagination> {
    let limit = href_schema
        .as_object()
        .and_then(properties)?
        .get("page")?
        .as_object()
        .and_then(properties)?
        .get("limit")?;

    Some(Pagination {
        default_limit: limit.get("default").and_then(Value::as_u64),
        max_limit: limit.get("maximum").and_then(Value::as_u64),
    })
}
