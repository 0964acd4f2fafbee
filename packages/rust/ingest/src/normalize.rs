//! Whitespace normalization and the minimum-length check.

use std::sync::LazyLock;

use regex::Regex;

use docqa_shared::{DocQaError, MIN_DOCUMENT_CHARS, Result};

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").trim().to_string()
}

/// Collapse whitespace, then require at least [`MIN_DOCUMENT_CHARS`] characters.
pub fn normalize(text: &str) -> Result<String> {
    let collapsed = collapse_whitespace(text);
    let chars = collapsed.chars().count();
    if chars < MIN_DOCUMENT_CHARS {
        return Err(DocQaError::validation(format!(
            "document contains insufficient text for processing ({chars} chars, need {MIN_DOCUMENT_CHARS})"
        )));
    }
    Ok(collapsed)
}
