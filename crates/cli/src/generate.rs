//! `hypergen generate`: hyperschema -> `resources.json` + `simplified-schema.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use hypergen_core::{ExtractOptions, extract_endpoints, simplify};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::deref::dereference;
use crate::error::CliError;
use crate::fetch::fetch_document;

pub const RESOURCES_FILE: &str = "resources.json";
pub const SIMPLIFIED_SCHEMA_FILE: &str = "simplified-schema.json";

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Hyperschema URL or file path
    #[arg(long, value_name = "URL_OR_PATH")]
    pub source: Option<String>,
    /// Directory receiving the generated files
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
    /// Base URL of the per-endpoint reference docs
    #[arg(long = "docs-base-url", value_name = "URL")]
    pub docs_base_url: Option<String>,
    /// Fetch timeout in seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl GenerateArgs {
    /// Flags take precedence over config values.
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(source) = self.source {
            config.source = Some(source);
        }
        if let Some(out_dir) = self.out_dir {
            config.out_dir = out_dir;
        }
        if let Some(url) = self.docs_base_url {
            config.docs_base_url = Some(url);
        }
        if let Some(secs) = self.timeout_secs {
            config.fetch_timeout_secs = secs;
        }
        config
    }
}

/// What a generate run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub resources: usize,
    pub endpoints: usize,
    pub files: Vec<PathBuf>,
}

fn to_json<T: Serialize>(value: &T, origin: &str) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|err| CliError::Json {
        origin: origin.to_string(),
        source: err,
    })
}

async fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| CliError::io(path, e))
}

/// Run the pipeline. Nothing is written unless every step succeeds.
pub async fn generate(config: &Config) -> Result<GenerateReport, CliError> {
    let source = config.source.as_deref().ok_or(CliError::MissingSource)?;
    let raw = fetch_document(source, Duration::from_secs(config.fetch_timeout_secs)).await?;

    let options = ExtractOptions {
        docs_base_url: config.docs_base_url.clone(),
    };
    let resources = extract_endpoints(&dereference(&raw), &options)?;
    let simplified = simplify(&raw)?;

    let outputs = [
        (RESOURCES_FILE, to_json(&resources, RESOURCES_FILE)?),
        (SIMPLIFIED_SCHEMA_FILE, to_json(&simplified, SIMPLIFIED_SCHEMA_FILE)?),
    ];

    tokio::fs::create_dir_all(&config.out_dir)
        .await
        .map_err(|e| CliError::io(&config.out_dir, e))?;
    let mut files = Vec::with_capacity(outputs.len());
    for (name, contents) in &outputs {
        let path = config.out_dir.join(name);
        write_file(&path, contents).await?;
        files.push(path);
    }

    let report = GenerateReport {
        resources: resources.len(),
        endpoints: resources.iter().map(|r| r.endpoints.len()).sum(),
        files,
    };
    info!(
        resources = report.resources,
        endpoints = report.endpoints,
        out_dir = %config.out_dir.display(),
        "Generated endpoint metadata and simplified schema."
    );
    Ok(report)
}

pub async fn run(args: GenerateArgs, config: Config) -> i32 {
    let config = args.apply(config);
    match generate(&config).await {
        Ok(report) => {
            for file in &report.files {
                println!("wrote {}", file.display());
            }
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}
