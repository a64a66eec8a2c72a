use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GomodlabError {
    // Proxy errors
    #[error("MODULE_NOT_FOUND: module not found")]
    ModuleNotFound,

    #[error("PROXY_UNEXPECTED_STATUS: unexpected status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("PROXY_FETCH_FAILED: fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("PROXY_RESPONSE_TOO_LARGE: response from {url} exceeds {max} bytes")]
    ResponseTooLarge { url: String, max: u64 },

    #[error("PROXY_DEADLINE_EXCEEDED: deadline exceeded while fetching {url}")]
    DeadlineExceeded { url: String },

    #[error("PROXY_CANCELLED: request to {url} was cancelled")]
    Cancelled { url: String },

    #[error("PROXY_INVALID_URL: {0}")]
    InvalidUrl(String),

    #[error("LATEST_PARSE_FAILED: cannot parse latest response: {0}")]
    LatestParse(String),

    #[error("LATEST_RESOLVE_FAILED: resolve latest version of {module}: {source}")]
    AliasResolution {
        module: String,
        #[source]
        source: Box<GomodlabError>,
    },

    // Archive errors
    #[error("ARCHIVE_CORRUPT: parse zip for {module}@{version}: {reason}")]
    CorruptArchive {
        module: String,
        version: String,
        reason: String,
    },

    // File errors
    #[error("FILE_NOT_FOUND: file not found in {origin}: {path}")]
    FileNotFound { origin: String, path: String },

    #[error("FILE_BINARY: file appears to be binary: {0}")]
    BinaryContent(String),

    #[error("FILE_PATH_ESCAPE: path '{0}' resolves outside the module root")]
    PathEscape(String),

    // Config errors
    #[error("CONFIG_PARSE_ERROR: failed to parse {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    // IO errors
    #[error("IO_ERROR: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<GomodlabError>,
    },
}

/// Coarse classification callers branch on instead of matching message text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The proxy has no record of the module or version
    NotFound,
    /// Non-2xx status, connection failure, deadline, cancellation or oversize body
    Transport,
    MalformedArchive,
    /// Module exists but the requested file does not
    PathNotFound,
    BinaryContent,
    AliasResolution,
    InvalidPath,
    Io,
    Config,
}

impl GomodlabError {
    /// Wraps the error with a description of the stage that failed.
    ///
    /// The wrapper is transparent to [`GomodlabError::kind`].
    pub fn context(self, context: impl Into<String>) -> Self {
        GomodlabError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        GomodlabError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GomodlabError::ModuleNotFound => ErrorKind::NotFound,
            GomodlabError::UnexpectedStatus { .. }
            | GomodlabError::Fetch { .. }
            | GomodlabError::ResponseTooLarge { .. }
            | GomodlabError::DeadlineExceeded { .. }
            | GomodlabError::Cancelled { .. }
            | GomodlabError::InvalidUrl(_) => ErrorKind::Transport,
            GomodlabError::LatestParse(_) | GomodlabError::AliasResolution { .. } => {
                ErrorKind::AliasResolution
            }
            GomodlabError::CorruptArchive { .. } => ErrorKind::MalformedArchive,
            GomodlabError::FileNotFound { .. } => ErrorKind::PathNotFound,
            GomodlabError::BinaryContent(_) => ErrorKind::BinaryContent,
            GomodlabError::PathEscape(_) => ErrorKind::InvalidPath,
            GomodlabError::ConfigParse { .. } => ErrorKind::Config,
            GomodlabError::Io { .. } => ErrorKind::Io,
            GomodlabError::Context { source, .. } => source.kind(),
        }
    }

    /// Innermost error, looking through context and alias wrappers
    pub fn root(&self) -> &GomodlabError {
        match self {
            GomodlabError::Context { source, .. }
            | GomodlabError::AliasResolution { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_module_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, GomodlabError>;
