//! Plain-text document ingestion.
//!
//! Turns uploaded bytes into the normalized text the QA engine expects:
//! decode (UTF-8, falling back to Latin-1), collapse whitespace, and reject
//! documents with too little text. PDF extraction is not supported.

mod normalize;

use std::path::Path;

use tracing::{info, instrument, warn};

use docqa_shared::{DocQaError, Result};

pub use normalize::{collapse_whitespace, normalize};

/// File extensions accepted as plain text.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md"];

/// Decode raw bytes as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so this
/// never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(valid_up_to = e.valid_up_to(), "input is not UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// A decoded, normalized document ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedText {
    pub file_name: String,
    pub text: String,
}

/// Read, decode, and normalize a text file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_file(path: &Path) -> Result<LoadedText> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| DocQaError::validation(format!("not a file path: {}", path.display())))?;

    check_extension(path)?;

    let bytes = std::fs::read(path).map_err(|e| DocQaError::io(path, e))?;
    let text = normalize(&decode_text(&bytes))?;

    info!(file_name = %file_name, bytes = bytes.len(), chars = text.chars().count(), "document loaded");
    Ok(LoadedText { file_name, text })
}

fn check_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if ext == "pdf" {
        return Err(DocQaError::validation(
            "PDF documents are not supported; extract the text to a .txt file first",
        ));
    }
    if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(DocQaError::validation(format!(
            "unsupported file format '{}'; accepted: {}",
            path.display(),
            TEXT_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}
