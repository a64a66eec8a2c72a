//! Client for the four GOPROXY read endpoints

use crate::proxy::download::{FetchOptions, fetch_bounded};
use crate::proxy::url::module_endpoint;
use gomodlab_core::config::consts;
use gomodlab_core::{GomodlabError, Result};
use reqwest::blocking::Client;
use url::Url;

/// Fetches module data from a Go module proxy
///
/// | Operation        | Endpoint                 |
/// |------------------|--------------------------|
/// | [`list_versions`](Self::list_versions) | `<module>/@v/list` |
/// | [`latest`](Self::latest)               | `<module>/@latest` |
/// | [`read_mod`](Self::read_mod)           | `<module>/@v/<version>.mod` |
/// | [`download_zip`](Self::download_zip)   | `<module>/@v/<version>.zip` |
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: Url,
    client: Client,
    max_response_bytes: u64,
}

impl ProxyClient {
    /// Creates a client for the given proxy base URL
    ///
    /// # Errors
    ///
    /// Returns error if the URL does not parse or the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self> {
        let client = crate::proxy::build_default_client()
            .map_err(|e| GomodlabError::InvalidUrl(format!("build HTTP client: {}", e)))?;
        Self::with_client(base_url, client)
    }

    /// Creates a client that reuses an existing HTTP client
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GomodlabError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            base_url,
            client,
            max_response_bytes: consts::proxy::MAX_RESPONSE_BYTES,
        })
    }

    /// Overrides the response size ceiling
    pub fn with_max_response_bytes(mut self, max: u64) -> Self {
        self.max_response_bytes = max;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the known versions of a module, in proxy order
    pub fn list_versions(&self, module: &str, options: &FetchOptions) -> Result<Vec<String>> {
        let body = self.get(module, &["@v", "list"], options)?;
        let text = String::from_utf8_lossy(&body);

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Returns the raw `@latest` info blob, e.g. `{"Version":"v0.1.0","Time":"..."}`
    pub fn latest(&self, module: &str, options: &FetchOptions) -> Result<String> {
        let body = self.get(module, &["@latest"], options)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Resolves the `latest` alias to a concrete version
    pub fn resolve_latest(&self, module: &str, options: &FetchOptions) -> Result<String> {
        let info = self.latest(module, options)?;
        parse_latest_version(&info)
    }

    /// Returns the go.mod content of a module version
    pub fn read_mod(&self, module: &str, version: &str, options: &FetchOptions) -> Result<String> {
        let file = format!("{}.mod", version);
        let body = self.get(module, &["@v", &file], options)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Downloads the source zip of a module version
    pub fn download_zip(&self, module: &str, version: &str, options: &FetchOptions) -> Result<Vec<u8>> {
        let file = format!("{}.zip", version);
        self.get(module, &["@v", &file], options)
    }

    fn get(&self, module: &str, tail: &[&str], options: &FetchOptions) -> Result<Vec<u8>> {
        let url = module_endpoint(&self.base_url, module, tail)?;
        tracing::debug!("GET {}", url);
        fetch_bounded(&self.client, &url, self.max_response_bytes, options)
    }
}

/// Extracts the version from an `@latest` info blob
///
/// Only looks for the literal `"Version":"` marker; no JSON parsing.
pub fn parse_latest_version(info: &str) -> Result<String> {
    const KEY: &str = r#""Version":""#;

    let start = info
        .find(KEY)
        .map(|i| i + KEY.len())
        .ok_or_else(|| GomodlabError::LatestParse(info.to_string()))?;

    let rest = &info[start..];
    let end = rest
        .find('"')
        .ok_or_else(|| GomodlabError::LatestParse("unterminated version".to_string()))?;

    Ok(rest[..end].to_string())
}
