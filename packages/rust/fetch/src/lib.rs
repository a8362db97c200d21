//! Remote document collection for ReportForge.
//!
//! The [`Collector`] resolves an `owner/repo` locator to a directory-listing
//! endpoint, filters the listing to the target file type, and downloads each
//! matching file's raw body through the bounded-retry fetcher. Individual
//! file failures are logged and skipped; the batch only fails when nothing
//! at all could be retrieved.

mod locator;
pub mod retry;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use reportforge_shared::{RemoteFile, ReportForgeError, Result};

pub use locator::RepoLocator;
pub use retry::{RetryPolicy, fetch_with_retry};

/// User-Agent string for collection requests.
const USER_AGENT: &str = concat!("ReportForge/", env!("CARGO_PKG_VERSION"));

/// Accept header asking the raw-content endpoint for the file body as-is.
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Configuration for the content collector.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Base URL of the listing API (points at a mock server in tests).
    pub api_base: String,
    /// Target file extension, without the leading dot.
    pub extension: String,
    /// Retry budget applied to the listing call and each file fetch.
    pub retry: RetryPolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            extension: "md".into(),
            retry: RetryPolicy::default(),
        }
    }
}

/// One entry of the directory-listing response.
#[derive(Debug, Clone, Deserialize)]
struct DirEntry {
    name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

/// Fetches the markdown document set of a remote repository.
pub struct Collector {
    client: Client,
    config: CollectorConfig,
}

impl Collector {
    /// Create a new collector with the given configuration.
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ReportForgeError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// List the repository root and download every matching file's body.
    ///
    /// Files are fetched sequentially in listing order; a failing file is
    /// skipped rather than aborting the batch.
    #[instrument(skip_all, fields(locator = %locator))]
    pub async fn collect(&self, locator: &RepoLocator) -> Result<Vec<RemoteFile>> {
        let listing_url = locator.contents_url(&self.config.api_base);
        info!(%listing_url, "listing repository contents");

        let response = retry::fetch_with_retry(
            &self.client,
            &listing_url,
            &[("Accept", ACCEPT_RAW)],
            &self.config.retry,
        )
        .await?;

        let listing: serde_json::Value = response.json().await.map_err(|e| {
            ReportForgeError::Network(format!("{listing_url}: body read failed: {e}"))
        })?;

        let entries: Vec<DirEntry> = match listing {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
            _ => {
                return Err(ReportForgeError::validation(format!(
                    "unreadable directory listing at {listing_url}: expected a JSON array of entries"
                )));
            }
        };

        let suffix = format!(".{}", self.config.extension);
        let matching: Vec<(String, String)> = entries
            .iter()
            .filter(|e| e.name.ends_with(&suffix))
            .filter_map(|e| {
                e.download_url
                    .clone()
                    .map(|url| (e.path.clone().unwrap_or_else(|| e.name.clone()), url))
            })
            .collect();

        if matching.is_empty() {
            return Err(ReportForgeError::validation(format!(
                "no {suffix} files found in repository root of {locator}"
            )));
        }

        debug!(count = matching.len(), "matching files in listing");

        let mut files = Vec::new();
        for (path, download_url) in &matching {
            match self.fetch_file(path, download_url).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!(path, error = %e, "failed to fetch file, skipping");
                }
            }
        }

        if files.is_empty() {
            return Err(ReportForgeError::validation(
                "no content retrieved: every matching file failed to download",
            ));
        }

        info!(
            fetched = files.len(),
            skipped = matching.len() - files.len(),
            "collection complete"
        );

        Ok(files)
    }

    /// Download one file's raw body.
    async fn fetch_file(&self, path: &str, url: &str) -> Result<RemoteFile> {
        let response = retry::fetch_with_retry(
            &self.client,
            url,
            &[("Accept", ACCEPT_RAW)],
            &self.config.retry,
        )
        .await?;

        let content = response.text().await.map_err(|e| {
            ReportForgeError::Network(format!("{url}: body read failed: {e}"))
        })?;

        debug!(
            path,
            bytes = content.len(),
            hash = %content_hash(&content),
            "file retrieved"
        );

        Ok(RemoteFile {
            path: path.to_string(),
            content,
        })
    }
}

/// Compute SHA-256 hash of content.
fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod collector_tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> CollectorConfig {
        CollectorConfig {
            api_base: server.uri(),
            extension: "md".into(),
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(5),
            },
        }
    }

    fn listing_body(server: &MockServer) -> serde_json::Value {
        serde_json::json!([
            {
                "name": "README.md",
                "path": "README.md",
                "download_url": format!("{}/raw/README.md", server.uri()),
            },
            {
                "name": "logo.png",
                "path": "assets/logo.png",
                "download_url": format!("{}/raw/logo.png", server.uri()),
            },
            {
                "name": "GUIDE.md",
                "path": "docs/GUIDE.md",
                "download_url": format!("{}/raw/GUIDE.md", server.uri()),
            },
        ])
    }

    #[tokio::test]
    async fn collects_matching_files_in_listing_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/docs/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&server)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/raw/README.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Readme\n"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/raw/GUIDE.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Guide\n"))
            .mount(&server)
            .await;

        let collector = Collector::new(test_config(&server)).unwrap();
        let locator = RepoLocator::parse("acme/docs").unwrap();
        let files = collector.collect(&locator).await.unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "README.md");
        assert_eq!(files[0].content, "# Readme\n");
        assert_eq!(files[1].path, "docs/GUIDE.md");
    }

    #[tokio::test]
    async fn single_file_failure_is_skipped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/docs/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&server)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/raw/README.md"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/raw/GUIDE.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Guide\n"))
            .mount(&server)
            .await;

        let collector = Collector::new(test_config(&server)).unwrap();
        let locator = RepoLocator::parse("acme/docs").unwrap();
        let files = collector.collect(&locator).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "docs/GUIDE.md");
    }

    #[tokio::test]
    async fn fails_when_every_file_download_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/docs/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&server)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/raw/README.md"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/raw/GUIDE.md"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let collector = Collector::new(test_config(&server)).unwrap();
        let locator = RepoLocator::parse("acme/docs").unwrap();
        let err = collector.collect(&locator).await.unwrap_err();

        assert!(err.to_string().contains("no content retrieved"));
    }

    #[tokio::test]
    async fn missing_repository_fails_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/gone/contents"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let collector = Collector::new(test_config(&server)).unwrap();
        let locator = RepoLocator::parse("acme/gone").unwrap();
        let err = collector.collect(&locator).await.unwrap_err();

        assert!(matches!(err, ReportForgeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn non_array_listing_is_unreadable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/docs/contents"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "Moved Permanently"})),
            )
            .mount(&server)
            .await;

        let collector = Collector::new(test_config(&server)).unwrap();
        let locator = RepoLocator::parse("acme/docs").unwrap();
        let err = collector.collect(&locator).await.unwrap_err();

        assert!(err.to_string().contains("unreadable directory listing"));
    }

    #[tokio::test]
    async fn listing_without_matching_files_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/docs/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "main.rs", "path": "src/main.rs", "download_url": "https://example.com/raw"},
            ])))
            .mount(&server)
            .await;

        let collector = Collector::new(test_config(&server)).unwrap();
        let locator = RepoLocator::parse("acme/docs").unwrap();
        let err = collector.collect(&locator).await.unwrap_err();

        assert!(err.to_string().contains("no .md files"));
    }

    #[test]
    fn content_hash_is_sha256_hex() {
        let hash = content_hash("hello world");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
