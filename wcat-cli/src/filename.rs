// ABOUTME: Sanitization pipeline for server-supplied download filenames
// ABOUTME: Percent-decoding, basename extraction, reserved-character stripping, and trimming

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters no filesystem should receive in a single path segment,
/// plus line breaks
static RESERVED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/:"*?<>|\r\n]+"#).unwrap());

/// Percent-decode until the value stops changing, so a doubly-encoded
/// sequence cannot survive a single pass. Returns `None` when the decoded
/// bytes are not valid UTF-8.
pub fn percent_decode(raw: &str) -> Option<String> {
    let mut current = raw.to_string();
    loop {
        let decoded = urlencoding::decode(&current).ok()?.into_owned();
        if decoded == current {
            return Some(current);
        }
        current = decoded;
    }
}

/// Final path segment of a name using either separator style.
/// `.` and `..` are not usable names and map to the empty string.
pub fn basename(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base {
        "." | ".." => "",
        other => other,
    }
}

/// Remove every reserved character from the name.
pub fn strip_reserved(name: &str) -> String {
    RESERVED.replace_all(name, "").into_owned()
}

/// Sanitize a raw `filename` header value into something safe to join as a
/// single path segment: decode, take the basename, strip reserved
/// characters, trim whitespace. The steps run to a fixpoint, so the result
/// is stable under re-sanitization. An undecodable value becomes empty.
pub fn sanitize(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_once(value: &str) -> String {
    let decoded = match percent_decode(value) {
        Some(decoded) => decoded,
        None => return String::new(),
    };
    strip_reserved(basename(&decoded)).trim().to_string()
}
