//! HTTP fetching with caching.
//!
//! Fetches published benchmark files (index, metadata, run lists, match
//! artifacts) from a remote data root and caches them on disk. A fresh cache
//! entry is served without touching the network; an expired one is
//! revalidated with the validators the server sent (`ETag`,
//! `Last-Modified`), so unchanged files are not downloaded again.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
    USER_AGENT,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("Cache metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// How a fetch was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Cache entry still within its TTL; no request made
    Fresh,
    /// Server answered 304; cached body reused
    Revalidated,
    /// Body downloaded and cached
    Downloaded,
}

/// Body of a fetched URL.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub text: String,
    pub status: CacheStatus,
}

/// Metadata stored alongside cached content.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheMetadata {
    url: String,
    fetched_at: DateTime<Utc>,
    #[serde(default)]
    etag: Option<String>,
    #[serde(default)]
    last_modified: Option<String>,
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Directory to cache fetched files
    pub cache_dir: PathBuf,

    /// How long cached content is served without revalidation
    pub cache_ttl: Duration,

    /// Maximum content size to fetch (default 20MB)
    pub max_content_size: usize,

    pub timeout: Duration,

    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache"),
            cache_ttl: Duration::from_secs(300),
            max_content_size: 20 * 1024 * 1024,
            timeout: Duration::from_secs(30),
            user_agent: format!("benchboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP fetcher with local caching.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("benchboard")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch a URL, using the cache when it is fresh.
    pub async fn fetch(&self, url: &Url) -> Result<Fetched, FetchError> {
        let cache_path = self.cache_path_for_url(url);
        let meta_path = self.meta_path_for_url(url);

        let cached = read_metadata(url, &cache_path, &meta_path).await;
        if let Some(meta) = &cached {
            if self.is_fresh(meta) {
                debug!("Serving {} from cache", url);
                let text = fs::read_to_string(&cache_path).await?;
                return Ok(Fetched {
                    text,
                    status: CacheStatus::Fresh,
                });
            }
            debug!("Cache expired for {}", url);
        }

        self.fetch_and_cache(url, cached, &cache_path, &meta_path)
            .await
    }

    /// Fetch a URL and return its body as text.
    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let fetched = self.fetch(url).await?;
        debug!("{} ({:?})", url, fetched.status);
        Ok(fetched.text)
    }

    fn is_fresh(&self, meta: &CacheMetadata) -> bool {
        let age = Utc::now().signed_duration_since(meta.fetched_at);
        age.num_seconds() < self.config.cache_ttl.as_secs() as i64
    }

    /// Fetch from network, revalidating `cached` if present, and cache the result.
    async fn fetch_and_cache(
        &self,
        url: &Url,
        cached: Option<CacheMetadata>,
        cache_path: &Path,
        meta_path: &Path,
    ) -> Result<Fetched, FetchError> {
        info!("Fetching {}", url);

        let mut request = self.client.get(url.as_str());
        if let Some(meta) = &cached {
            if let Some(etag) = &meta.etag {
                request = request.header(IF_NONE_MATCH, etag.as_str());
            }
            if let Some(last_modified) = &meta.last_modified {
                request = request.header(IF_MODIFIED_SINCE, last_modified.as_str());
            }
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            if let Some(mut meta) = cached {
                debug!("{} not modified", url);
                meta.fetched_at = Utc::now();
                write_atomic(meta_path, &serde_json::to_vec_pretty(&meta)?).await?;
                let text = fs::read_to_string(cache_path).await?;
                return Ok(Fetched {
                    text,
                    status: CacheStatus::Revalidated,
                });
            }
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };
        let etag = header(ETAG);
        let last_modified = header(LAST_MODIFIED);

        let content = response.bytes().await?;

        if content.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len(),
                max_size: self.config.max_content_size,
            });
        }

        let text = String::from_utf8(content.to_vec())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        write_atomic(cache_path, &content).await?;

        let meta = CacheMetadata {
            url: url.to_string(),
            fetched_at: Utc::now(),
            etag,
            last_modified,
        };
        write_atomic(meta_path, &serde_json::to_vec_pretty(&meta)?).await?;

        Ok(Fetched {
            text,
            status: CacheStatus::Downloaded,
        })
    }

    /// Generate a cache path for a URL.
    fn cache_path_for_url(&self, url: &Url) -> PathBuf {
        let hash = Self::url_hash(url);
        let host = url.host_str().unwrap_or("unknown");
        let extension = Self::extension_for_url(url);

        self.config
            .cache_dir
            .join(host)
            .join(format!("{}.{}", hash, extension))
    }

    /// Generate a metadata path for a URL.
    fn meta_path_for_url(&self, url: &Url) -> PathBuf {
        let hash = Self::url_hash(url);
        let host = url.host_str().unwrap_or("unknown");

        self.config
            .cache_dir
            .join(host)
            .join(format!("{}.meta.json", hash))
    }

    /// Hash a URL to a short string.
    fn url_hash(url: &Url) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    fn extension_for_url(url: &Url) -> &'static str {
        let path = url.path().to_lowercase();
        if path.ends_with(".jsonl") {
            "jsonl"
        } else if path.ends_with(".json") {
            "json"
        } else {
            "txt"
        }
    }
}

/// Metadata of the cache entry for `url`, if its content file exists.
/// Unreadable metadata, or metadata written for another URL, counts as no
/// entry.
async fn read_metadata(url: &Url, cache_path: &Path, meta_path: &Path) -> Option<CacheMetadata> {
    if !cache_path.exists() {
        return None;
    }
    let content = fs::read_to_string(meta_path).await.ok()?;
    let meta: CacheMetadata = serde_json::from_str(&content).ok()?;
    (meta.url == url.as_str()).then_some(meta)
}

/// Write `bytes` to a temporary sibling of `path`, then rename it into place.
///
/// Readers see either the old file or the new one, never a partial write.
/// Temp names are unique per process and call so concurrent writers of the
/// same entry do not share one.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    static NEXT_TEMP: AtomicU64 = AtomicU64::new(0);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(
        ".{}.{}-{}.tmp",
        file_name,
        std::process::id(),
        NEXT_TEMP.fetch_add(1, Ordering::Relaxed)
    ));

    let written = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}
