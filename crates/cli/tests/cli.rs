//! Full `generate` and `rewrite` runs against a mock hyperschema server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hypergen_cli::config::Config;
use hypergen_cli::error::CliError;
use hypergen_cli::generate::{RESOURCES_FILE, SIMPLIFIED_SCHEMA_FILE, generate};
use hypergen_cli::rewrite::rewrite_file;
use hypergen_core::RuleSet;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HYPERSCHEMA: &str = r##"{
  "definitions": {
    "upload": {
      "type": "object",
      "definitions": { "identity": { "type": "string" } },
      "properties": {
        "id": { "$ref": "#/definitions/upload/definitions/identity" },
        "type": { "enum": ["upload"] },
        "attributes": {
          "type": "object",
          "properties": { "path": { "type": "string" } }
        }
      },
      "required": ["id", "type"],
      "links": [
        {
          "method": "GET",
          "rel": "self",
          "title": "Retrieve an upload",
          "href": "/uploads/{(%23%2Fdefinitions%2Fupload%2Fdefinitions%2Fidentity)}",
          "targetSchema": {
            "type": "object",
            "properties": { "data": { "$ref": "#/definitions/upload" } }
          }
        }
      ]
    }
  }
}"##;

async fn serve_hyperschema() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hyperschema.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HYPERSCHEMA))
        .mount(&server)
        .await;
    server
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_generate_writes_both_files() {
    let server = serve_hyperschema().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        source: Some(format!("{}/hyperschema.json", server.uri())),
        out_dir: dir.path().join("generated"),
        docs_base_url: Some("https://docs.example.com/".into()),
        ..Config::default()
    };

    let report = generate(&config).await.unwrap();
    assert_eq!(report.resources, 1);
    assert_eq!(report.endpoints, 1);
    assert_eq!(report.files.len(), 2);

    let resources = read_json(&config.out_dir.join(RESOURCES_FILE));
    let find = &resources[0]["endpoints"][0];
    assert_eq!(resources[0]["namespace"], "uploads");
    assert_eq!(find["name"], "find");
    assert_eq!(find["urlTemplate"], "/uploads/${uploadId}");
    assert_eq!(find["docUrl"], "https://docs.example.com/upload/self");

    let simplified = read_json(&config.out_dir.join(SIMPLIFIED_SCHEMA_FILE));
    let upload = &simplified["definitions"]["upload"];
    assert_eq!(upload["properties"]["id"], json!({ "$ref": "#/definitions/upload/definitions/identity" }));
    assert!(upload.get("links").is_some(), "links survive simplification");
}

#[tokio::test]
async fn test_generate_failure_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        source: Some(format!("{}/hyperschema.json", server.uri())),
        out_dir: dir.path().join("generated"),
        ..Config::default()
    };

    let err = generate(&config).await.unwrap_err();
    assert!(matches!(err, CliError::Status { status: 503, .. }));
    assert!(!config.out_dir.exists());
}

#[test]
fn test_rewrite_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.d.ts");
    let output = dir.path().join("nested/schema.d.ts");
    std::fs::write(
        &input,
        r#"export type ItemTypeDefinition = unknown;

export interface ItemCreateSchema {
  data: {
    type: "item";
    attributes: {
      [k: string]: unknown;
    };
  };
}

export interface Upload {
  id: string;
}
"#,
    )
    .unwrap();

    rewrite_file(&input, &output, &RuleSet::default()).unwrap();
    let out = std::fs::read_to_string(&output).unwrap();
    assert!(!out.contains("ItemTypeDefinition = unknown"), "dropped: {out}");
    assert!(
        out.contains("export interface ItemCreateSchema<D extends ItemTypeDefinition = ItemTypeDefinition>"),
        "parametrized: {out}"
    );
    assert!(out.contains("attributes: ToItemAttributesInRequest<D>;"), "attributes: {out}");
    assert!(out.contains("__itemTypeId?: D[\"itemTypeId\"];"), "item type id: {out}");
    assert!(out.contains("export interface Upload {"), "passthrough: {out}");
}
