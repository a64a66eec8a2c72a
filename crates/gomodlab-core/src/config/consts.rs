//! Constants shared across the workspace

/// Module proxy protocol settings
pub mod proxy {
    /// Public Go module proxy
    pub const DEFAULT_URL: &str = "https://proxy.golang.org";

    /// Upper bound for any proxy response body (100 MiB)
    pub const MAX_RESPONSE_BYTES: u64 = 100 << 20;

    /// User agent sent with every proxy request
    pub const USER_AGENT: &str = "gomodlab";

    /// Read buffer size used while streaming response bodies
    pub const CHUNK_SIZE: usize = 8192;
}

/// Module naming conventions
pub mod module {
    /// Version alias rewritten to a concrete version before lookup
    pub const LATEST_ALIAS: &str = "latest";

    /// Manifest file at the root of every module
    pub const MANIFEST_FILE: &str = "go.mod";
}

/// Environment variables consulted by [`crate::Config::apply_env_with`]
pub mod env {
    pub const PROXY_URL: &str = "GOMODLAB_PROXY_URL";
    pub const LOCAL_DIR: &str = "GOMODLAB_LOCAL_DIR";
    pub const GOMODCACHE: &str = "GOMODCACHE";
    pub const GOPATH: &str = "GOPATH";
}
