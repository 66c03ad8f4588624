//! Normalization of resolver tool output.
//!
//! The tool emits either a single JSON document (structured mode) or bare
//! text lines (line mode). Parsing is attempted-then-validated: a document
//! that opens like JSON must parse into the expected shape, anything else
//! falls through to line mode, and output matching neither is rejected.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fallback title when the tool reports none.
pub const DEFAULT_TITLE: &str = "audio";

/// Normalized result of resolving one source URL.
///
/// Built once per request, never mutated afterwards, and discarded when the
/// response has been sent. Identical requests re-resolve from scratch.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub title: String,
    pub duration_secs: Option<f64>,
    pub uploader: Option<String>,
    pub thumbnail: Option<String>,
    /// Direct media URL, when the tool reports one at the top level.
    pub media_url: Option<String>,
    /// Candidate streams, in the tool's original order.
    pub formats: Vec<CandidateFormat>,
}

/// One candidate stream from the tool's format list.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateFormat {
    pub url: String,
    /// Audio bitrate in kbit/s; missing counts as zero during selection.
    pub audio_bitrate: Option<f64>,
    pub has_video: bool,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    thumbnail: Option<String>,
    url: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    url: Option<String>,
    abr: Option<f64>,
    vcodec: Option<String>,
}

/// Parse raw tool stdout into a [`Resolution`].
pub fn parse(stdout: &str) -> Result<Resolution> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyResolution);
    }
    if trimmed.starts_with('{') {
        return parse_structured(trimmed);
    }
    parse_lines(trimmed)
}

fn parse_structured(text: &str) -> Result<Resolution> {
    let doc: RawDocument = serde_json::from_str(text)
        .map_err(|e| Error::MalformedResolution(format!("structured output: {e}")))?;

    // Entries without a URL are useless for relaying and are dropped here so
    // selection never has to deal with them.
    let formats: Vec<CandidateFormat> = doc
        .formats
        .into_iter()
        .filter_map(|f| {
            let url = f.url?;
            Some(CandidateFormat {
                url,
                audio_bitrate: f.abr,
                has_video: f.vcodec.map(|v| v != "none").unwrap_or(false),
            })
        })
        .collect();

    if doc.url.is_none() && formats.is_empty() {
        return Err(Error::EmptyResolution);
    }

    Ok(Resolution {
        title: doc.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        duration_secs: doc.duration,
        uploader: doc.uploader,
        thumbnail: doc.thumbnail,
        media_url: doc.url,
        formats,
    })
}

fn parse_lines(text: &str) -> Result<Resolution> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    // Line order carries meaning: either a bare URL, or a title followed by
    // the URL on the final line.
    let (title, url) = match lines.as_slice() {
        [] => return Err(Error::EmptyResolution),
        [url] => (DEFAULT_TITLE, *url),
        [title, .., url] => (*title, *url),
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::MalformedResolution(format!(
            "expected a media URL on the final line, got {} line(s) of plain text",
            lines.len()
        )));
    }

    Ok(Resolution {
        title: title.to_string(),
        duration_secs: None,
        uploader: None,
        thumbnail: None,
        media_url: Some(url.to_string()),
        formats: Vec::new(),
    })
}
