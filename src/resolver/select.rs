//! Deterministic audio format selection.

use super::output::{CandidateFormat, Resolution};

/// Pick the direct audio URL from a resolution.
///
/// A top-level media URL wins outright when the tool supplied no candidate
/// list. Otherwise the audio-only candidate with the highest bitrate is
/// chosen: a missing bitrate counts as zero and ties keep the earliest
/// candidate, so identical input always yields the same pick. When every
/// candidate carries video the top-level URL is the fallback; `None` means
/// no stream is available.
pub fn select_audio_url(resolution: &Resolution) -> Option<&str> {
    if resolution.formats.is_empty() {
        return resolution.media_url.as_deref();
    }

    let mut best: Option<(&CandidateFormat, f64)> = None;
    for format in resolution.formats.iter().filter(|f| !f.has_video) {
        let bitrate = format.audio_bitrate.unwrap_or(0.0);
        match best {
            Some((_, current)) if bitrate <= current => {}
            _ => best = Some((format, bitrate)),
        }
    }

    best.map(|(format, _)| format.url.as_str())
        .or_else(|| resolution.media_url.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, abr: Option<f64>, has_video: bool) -> CandidateFormat {
        CandidateFormat {
            url: url.to_string(),
            audio_bitrate: abr,
            has_video,
        }
    }

    fn resolution(media_url: Option<&str>, formats: Vec<CandidateFormat>) -> Resolution {
        Resolution {
            title: "t".into(),
            duration_secs: None,
            uploader: None,
            thumbnail: None,
            media_url: media_url.map(str::to_string),
            formats,
        }
    }

    #[test]
    fn direct_url_without_candidates() {
        let r = resolution(Some("x"), vec![]);
        assert_eq!(select_audio_url(&r), Some("x"));
    }

    #[test]
    fn highest_bitrate_audio_only_wins() {
        let r = resolution(
            None,
            vec![
                candidate("a", Some(64.0), false),
                candidate("b", Some(128.0), false),
                candidate("c", Some(128.0), true),
            ],
        );
        // "c" is excluded for carrying video despite the equal bitrate.
        assert_eq!(select_audio_url(&r), Some("b"));
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let r = resolution(
            None,
            vec![
                candidate("first", Some(128.0), false),
                candidate("second", Some(128.0), false),
            ],
        );
        assert_eq!(select_audio_url(&r), Some("first"));
    }

    #[test]
    fn missing_bitrate_counts_as_zero() {
        let r = resolution(
            None,
            vec![
                candidate("unknown", None, false),
                candidate("known", Some(48.0), false),
            ],
        );
        assert_eq!(select_audio_url(&r), Some("known"));
    }

    #[test]
    fn all_video_falls_back_to_direct_url() {
        let r = resolution(
            Some("direct"),
            vec![candidate("video", Some(128.0), true)],
        );
        assert_eq!(select_audio_url(&r), Some("direct"));
    }

    #[test]
    fn nothing_usable_is_none() {
        let r = resolution(None, vec![candidate("video", Some(128.0), true)]);
        assert_eq!(select_audio_url(&r), None);

        let r = resolution(None, vec![]);
        assert_eq!(select_audio_url(&r), None);
    }

    #[test]
    fn only_unknown_bitrates_still_selects() {
        let r = resolution(None, vec![candidate("only", None, false)]);
        assert_eq!(select_audio_url(&r), Some("only"));
    }
}
