//! Module path encoding and proxy endpoint URLs

use gomodlab_core::{GomodlabError, Result};
use url::Url;

/// Encodes a module path for proxy URLs and module cache directory names
///
/// Every uppercase ASCII letter becomes `!` followed by its lowercase form,
/// e.g. `github.com/BurntSushi/toml` -> `github.com/!burnt!sushi/toml`.
/// All other characters pass through unchanged.
pub fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            encoded.push('!');
            encoded.push(c.to_ascii_lowercase());
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Builds `<base>/<encoded module>/<tail...>`
///
/// Each module path component becomes its own URL path segment, so the
/// base may carry a path prefix of its own.
///
/// # Errors
///
/// Returns error if the base URL cannot carry path segments
pub fn module_endpoint(base: &Url, module: &str, tail: &[&str]) -> Result<Url> {
    let encoded = encode_path(module);
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|_| GomodlabError::InvalidUrl(format!("URL cannot be a base: {}", base)))?
        .pop_if_empty()
        .extend(encoded.split('/'))
        .extend(tail);

    Ok(url)
}
