//! Bounded GET requests against the module proxy

use gomodlab_core::config::consts;
use gomodlab_core::{GomodlabError, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Per-call controls supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Absolute deadline for the whole call
    pub deadline: Option<Instant>,

    /// Checked before sending and between body chunks
    pub cancel: Option<CancellationToken>,
}

impl FetchOptions {
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            deadline: None,
            cancel: Some(cancel),
        }
    }

    fn check(&self, url: &Url) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(GomodlabError::Cancelled {
                url: url.to_string(),
            });
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(GomodlabError::DeadlineExceeded {
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

/// Issues a GET and returns the full body, never more than `max_size` bytes
///
/// # Errors
///
/// Returns error if:
/// - Status is 404 or 410 ([`GomodlabError::ModuleNotFound`])
/// - Status is anything else but 200
/// - The request fails, times out or is cancelled
/// - The body is larger than `max_size`
pub fn fetch_bounded(
    client: &Client,
    url: &Url,
    max_size: u64,
    options: &FetchOptions,
) -> Result<Vec<u8>> {
    options.check(url)?;

    let mut request = client.get(url.as_str());
    if let Some(deadline) = options.deadline {
        request = request.timeout(deadline.saturating_duration_since(Instant::now()));
    }

    let response = request.send().map_err(|e| transport_error(url, e))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Err(GomodlabError::ModuleNotFound);
    }
    if status != StatusCode::OK {
        return Err(GomodlabError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    if response.content_length().is_some_and(|len| len > max_size) {
        return Err(GomodlabError::ResponseTooLarge {
            url: url.to_string(),
            max: max_size,
        });
    }

    // Stream at most max_size + 1 bytes so oversize bodies are detected, not truncated
    let mut limited = response.take(max_size + 1);
    let mut buffer = Vec::new();
    let mut chunk = [0; consts::proxy::CHUNK_SIZE];

    loop {
        options.check(url)?;

        let bytes_read = limited.read(&mut chunk).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                GomodlabError::DeadlineExceeded {
                    url: url.to_string(),
                }
            } else {
                GomodlabError::Fetch {
                    url: url.to_string(),
                    reason: format!("read response: {}", e),
                }
            }
        })?;
        if bytes_read == 0 {
            break;
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);
    }

    if buffer.len() as u64 > max_size {
        return Err(GomodlabError::ResponseTooLarge {
            url: url.to_string(),
            max: max_size,
        });
    }

    Ok(buffer)
}

fn transport_error(url: &Url, err: reqwest::Error) -> GomodlabError {
    if err.is_timeout() {
        GomodlabError::DeadlineExceeded {
            url: url.to_string(),
        }
    } else {
        GomodlabError::Fetch {
            url: url.to_string(),
            reason: err.without_url().to_string(),
        }
    }
}
