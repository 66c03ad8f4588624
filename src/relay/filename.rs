//! Header-safe filename derivation for content-disposition.

/// Fallback filename stem when sanitization strips everything.
pub const DEFAULT_FILENAME: &str = "audio";

/// Reduce a title to a header-safe filename.
///
/// Keeps ASCII alphanumerics, space, period, underscore and hyphen; every
/// other character is dropped rather than percent-encoded so older header
/// parsers see plain text. An empty result falls back to
/// [`DEFAULT_FILENAME`]. Idempotent: sanitizing an already-sanitized name
/// is a no-op.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Best-effort file extension for a relayed content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    match essence {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some("m4a"),
        "audio/webm" => Some("webm"),
        "audio/ogg" | "application/ogg" => Some("ogg"),
        "audio/aac" => Some("aac"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/wav" | "audio/x-wav" => Some("wav"),
        _ => None,
    }
}

/// Sanitized filename with an extension matching the content type.
pub fn for_download(title: &str, content_type: &str) -> String {
    let stem = sanitize(title);
    match extension_for(content_type) {
        Some(ext) if !stem.to_ascii_lowercase().ends_with(&format!(".{ext}")) => {
            format!("{stem}.{ext}")
        }
        _ => stem,
    }
}
