// ABOUTME: Content-type classification from the leading bytes of a transfer source
// ABOUTME: Magic-byte detection via infer with a plain-text fallback and .md relabeling

use std::path::Path;

pub const JPEG: &str = "image/jpeg";
pub const PNG: &str = "image/png";
pub const WEBP: &str = "image/webp";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const MARKDOWN: &str = "text/markdown";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Formats the uploader may decode and re-encode for resizing
pub const RESIZABLE: &[&str] = &[JPEG, PNG];

/// Content type derived once from the head of a stream; immutable afterward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentClassification {
    mime: String,
}

impl ContentClassification {
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Type/subtype with any parameters (charset etc.) removed
    fn essence(&self) -> &str {
        self.mime.split(';').next().unwrap_or("").trim()
    }

    pub fn is(&self, candidate: &str) -> bool {
        self.essence() == candidate
    }

    pub fn matches_any(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|candidate| self.is(candidate))
    }
}

/// Classify a bounded prefix read from offset zero of a stream. Detection is
/// content-based; filenames only participate in [`content_type_for`].
pub fn classify(prefix: &[u8]) -> ContentClassification {
    let mime = if let Some(kind) = infer::get(prefix) {
        kind.mime_type().to_string()
    } else if looks_like_text(prefix) {
        TEXT_PLAIN.to_string()
    } else {
        OCTET_STREAM.to_string()
    };
    ContentClassification { mime }
}

/// Header value for the outbound Content-Type. Plain text named `*.md` is
/// relabeled as markdown; everything else keeps its sniffed type.
pub fn content_type_for(classification: &ContentClassification, display_name: &str) -> String {
    let extension = Path::new(display_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    if classification.is("text/plain") && extension.as_deref() == Some("md") {
        MARKDOWN.to_string()
    } else {
        classification.mime().to_string()
    }
}

fn looks_like_text(prefix: &[u8]) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let text = match std::str::from_utf8(prefix) {
        Ok(text) => text,
        // a bounded prefix may end mid-codepoint; only a trailing cut is forgiven
        Err(err) if err.error_len().is_none() => {
            std::str::from_utf8(&prefix[..err.valid_up_to()]).unwrap_or("")
        }
        Err(_) => return false,
    };
    !text.chars().any(|c| c.is_control() && !c.is_whitespace())
}
