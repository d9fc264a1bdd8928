//! Texture sources: the safety predicate and where bytes come from.
//!
//! A texture URL is either an ephemeral local reference (an upload registered
//! in the [`LocalStore`], or an inline `data:` URI) or a remote URL whose host
//! is on the trusted list. Anything else is rejected before any network
//! access happens.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine as _;
use futures::{FutureExt, future::LocalBoxFuture};
use image::ImageFormat;
use instant::Duration;
use reqwest::Url;

use crate::error::BindError;

/// Which texture URLs may be loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct SourcePolicy {
    pub trusted_hosts: Vec<String>,
    /// Prefixes of references that never leave the process.
    pub local_schemes: Vec<String>,
    pub fetch_timeout: Duration,
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self {
            trusted_hosts: vec![
                "raw.githubusercontent.com".into(),
                "huggingface.co".into(),
                "aistudiocdn.com".into(),
            ],
            local_schemes: vec!["blob:".into(), "data:".into(), "local:".into()],
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Where an accepted URL is resolved from.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    Local,
    Remote(Url),
}

impl SourcePolicy {
    /// Classify `url`, rejecting anything that is neither local nor trusted.
    pub fn check(&self, url: &str) -> Result<SourceKind, BindError> {
        if url.is_empty() {
            return Err(BindError::UnsafeSource(url.to_string()));
        }
        if self
            .local_schemes
            .iter()
            .any(|scheme| url.starts_with(scheme.as_str()))
        {
            return Ok(SourceKind::Local);
        }
        let parsed = Url::parse(url).map_err(|_| BindError::UnsafeSource(url.to_string()))?;
        let trusted = matches!(parsed.scheme(), "http" | "https")
            && parsed.host_str().is_some_and(|host| {
                self.trusted_hosts
                    .iter()
                    .any(|trusted| trusted.eq_ignore_ascii_case(host))
            });
        if trusted {
            Ok(SourceKind::Remote(parsed))
        } else {
            Err(BindError::UnsafeSource(url.to_string()))
        }
    }

    pub fn is_safe(&self, url: &str) -> bool {
        self.check(url).is_ok()
    }
}

/// Raw bytes of a texture source plus an optional format hint.
#[derive(Clone, Debug)]
pub struct Fetched {
    pub bytes: Arc<[u8]>,
    pub format: Option<ImageFormat>,
}

#[derive(Clone, Debug)]
struct LocalBlob {
    mime: String,
    bytes: Arc<[u8]>,
}

/// In-memory storage behind ephemeral local references.
#[derive(Debug, Default)]
pub struct LocalStore {
    blobs: HashMap<String, LocalBlob>,
}

impl LocalStore {
    pub fn insert(&mut self, url: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) {
        self.blobs.insert(
            url.into(),
            LocalBlob {
                mime: mime.into(),
                bytes: bytes.into(),
            },
        );
    }

    pub fn contains(&self, url: &str) -> bool {
        self.blobs.contains_key(url)
    }

    pub fn remove(&mut self, url: &str) -> bool {
        self.blobs.remove(url).is_some()
    }

    /// Resolve a local reference synchronously.
    pub fn resolve(&self, url: &str) -> Result<Fetched> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }
        let blob = self
            .blobs
            .get(url)
            .ok_or_else(|| anyhow!("no local resource registered under {url}"))?;
        Ok(Fetched {
            bytes: blob.bytes.clone(),
            format: ImageFormat::from_mime_type(&blob.mime),
        })
    }
}

/// Decode a `data:[<mime>][;base64],<payload>` URI.
pub fn decode_data_uri(url: &str) -> Result<Fetched> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URI without payload separator"))?;
    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default();
    let is_base64 = params.any(|param| param.eq_ignore_ascii_case("base64"));
    if !is_base64 {
        bail!("only base64 data URIs carry image data");
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("invalid base64 payload")?;
    Ok(Fetched {
        bytes: bytes.into(),
        format: ImageFormat::from_mime_type(mime),
    })
}

/// Fetches bytes for trusted remote URLs.
///
/// The returned future must not borrow the source; the engine drives it on
/// the host's executor alongside the render loop.
pub trait RemoteSource {
    fn fetch(&self, url: Url) -> LocalBoxFuture<'static, Result<Fetched>>;
}

/// Plain HTTP GET through `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl RemoteSource for HttpSource {
    fn fetch(&self, url: Url) -> LocalBoxFuture<'static, Result<Fetched>> {
        let request = self.client.get(url.clone()).timeout(self.timeout);
        async move {
            let response = request
                .send()
                .await
                .with_context(|| format!("GET {url}"))?
                .error_for_status()?;
            let bytes = response.bytes().await?;
            Ok(Fetched {
                bytes: bytes.to_vec().into(),
                format: None,
            })
        }
        .boxed_local()
    }
}
