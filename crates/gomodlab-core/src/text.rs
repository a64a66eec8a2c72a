//! Text/binary gate applied to every file handed back to a caller

use crate::error::{GomodlabError, Result};

/// Converts raw file bytes into text, rejecting anything that is not valid UTF-8.
///
/// `path` is only used for the error message.
pub fn decode_text(path: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| GomodlabError::BinaryContent(path.to_string()))
}
