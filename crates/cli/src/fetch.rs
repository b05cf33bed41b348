//! Hyperschema document loading over HTTP or from disk.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CliError;

/// Attempts per URL; only timeouts and connection failures are retried.
const MAX_ATTEMPTS: u32 = 2;

fn build_client() -> Result<reqwest::Client, CliError> {
    reqwest::Client::builder()
        .user_agent(concat!("hypergen/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| {
            warn!(error = %err, "Failed to build HTTP client.");
            CliError::Client(err)
        })
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load and parse the hyperschema document. The whole body is buffered.
pub async fn fetch_document(source: &str, timeout: Duration) -> Result<Value, CliError> {
    let body = if is_url(source) {
        fetch_url(source, timeout).await?
    } else {
        tokio::fs::read_to_string(Path::new(source))
            .await
            .map_err(|e| CliError::io(source, e))?
    };
    debug!(source = %source, bytes = body.len(), "Loaded hyperschema.");
    serde_json::from_str(&body).map_err(|err| CliError::Json {
        origin: source.to_string(),
        source: err,
    })
}

async fn fetch_url(url: &str, timeout: Duration) -> Result<String, CliError> {
    let client = build_client()?;
    let mut attempt = 1;
    loop {
        debug!(%url, attempt, "Sending hyperschema request.");
        match client.get(url).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    return Err(CliError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                return response.text().await.map_err(|err| CliError::Http {
                    url: url.to_string(),
                    source: err,
                });
            }
            Err(err) if attempt < MAX_ATTEMPTS && (err.is_timeout() || err.is_connect()) => {
                warn!(error = %err, %url, attempt, "Hyperschema request failed, retrying.");
                attempt += 1;
            }
            Err(err) => {
                return Err(CliError::Http {
                    url: url.to_string(),
                    source: err,
                });
            }
        }
    }
}
