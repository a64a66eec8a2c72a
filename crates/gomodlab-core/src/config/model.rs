use crate::config::consts;
use crate::error::{GomodlabError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// gomodlab.toml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_url")]
    pub url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: default_proxy_url(),
        }
    }
}

fn default_proxy_url() -> String {
    consts::proxy::DEFAULT_URL.to_string()
}

/// Local module download cache, read-only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Workspace root searched when the proxy has no record of a module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Loads a config file. Missing sections take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GomodlabError::io(format!("read {}", path.display()), e))?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| GomodlabError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Applies process environment overrides and fills in unset directories.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Same as [`Config::apply_env`] with an injectable variable lookup.
    ///
    /// Variables that name a setting directly (`GOMODLAB_PROXY_URL`,
    /// `GOMODCACHE`, `GOMODLAB_LOCAL_DIR`) override the file. Derived
    /// locations only fill settings the file left unset:
    ///
    /// - Mirror root: `GOMODCACHE`, then the file, then `$GOPATH/pkg/mod`, then `~/go/pkg/mod`.
    /// - Fallback root: `GOMODLAB_LOCAL_DIR`, then the file, then `~/Projects`.
    pub fn apply_env_with<F>(mut self, lookup: F, home: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(consts::env::PROXY_URL) {
            self.proxy.url = url;
        }

        if let Some(dir) = lookup(consts::env::GOMODCACHE) {
            self.mirror.dir = Some(PathBuf::from(dir));
        } else if self.mirror.dir.is_none() {
            self.mirror.dir = lookup(consts::env::GOPATH)
                .and_then(|gopath| {
                    // GOPATH may be a list; the module cache lives under the first entry
                    std::env::split_paths(&gopath)
                        .next()
                        .map(|first| first.join("pkg").join("mod"))
                })
                .or_else(|| home.as_ref().map(|h| h.join("go").join("pkg").join("mod")));
        }

        if let Some(dir) = lookup(consts::env::LOCAL_DIR) {
            self.fallback.dir = Some(PathBuf::from(dir));
        } else if self.fallback.dir.is_none() {
            self.fallback.dir = home.as_ref().map(|h| h.join("Projects"));
        }

        self
    }
}
