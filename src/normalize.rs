//! Format normalization
//!
//! Turns the raw yt-dlp format list into the ranked, deduplicated list of
//! download options served to clients. Selection is pure; size resolution
//! (which may need a HEAD probe) happens afterwards in the handler.

use std::cmp::Ordering;
use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::extractor::RawFormat;

lazy_static! {
    /// Height prefix of a quality label ("1080p (1920x1080)" -> 1080)
    static ref LABEL_HEIGHT_RE: Regex = Regex::new(r"^(\d+)p").unwrap();
}

/// Size string served when neither yt-dlp nor a HEAD probe knows the size
pub const SIZE_UNKNOWN: &str = "N/A";

/// Per-platform knobs over the shared selection pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizePolicy {
    /// Only admit records with `protocol == "https"`
    pub https_only: bool,
    /// Also admit m3u8/mpd records that carry an audio codec
    pub allow_manifest: bool,
    /// Append the single best audio-only record (by bitrate)
    pub include_audio: bool,
    /// Keep at most one record per distinct height
    pub dedupe_by_height: bool,
    /// Fall back to a page image when nothing qualifies
    pub image_fallback: bool,
}

/// A qualifying format with its label resolved but its size not yet known
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFormat {
    pub quality: String,
    pub download_url: String,
    pub declared_size: Option<u64>,
}

/// One download option as served to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedFormat {
    pub quality: String,
    pub file_size: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Image,
}

/// Top-level response body for a successful download lookup
#[derive(Debug, Clone, Serialize)]
pub struct MediaResult {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    pub thumbnail: Option<String>,
    pub formats: Vec<NormalizedFormat>,
}

impl MediaResult {
    pub fn video(title: String, thumbnail: Option<String>, formats: Vec<NormalizedFormat>) -> Self {
        Self {
            media_type: MediaType::Video,
            title,
            thumbnail,
            formats,
        }
    }

    /// Single-entry result for an image-only post; the image doubles as
    /// the thumbnail.
    pub fn image(title: String, image_url: String, file_size: String) -> Self {
        Self {
            media_type: MediaType::Image,
            title,
            thumbnail: Some(image_url.clone()),
            formats: vec![NormalizedFormat {
                quality: "Image".to_string(),
                file_size,
                download_url: image_url,
            }],
        }
    }
}

/// Apply the selection policy to a raw format list.
///
/// Output order: descending by the height derivable from the quality
/// label; entries without a derivable height (including the audio entry)
/// sort last.
pub fn select_formats(formats: &[RawFormat], policy: &NormalizePolicy) -> Vec<SelectedFormat> {
    let mut videos: Vec<&RawFormat> = formats
        .iter()
        .filter(|f| !f.url.is_empty() && qualifies_as_video(f, policy))
        .collect();

    videos.sort_by(|a, b| b.height.unwrap_or(0).cmp(&a.height.unwrap_or(0)));

    if policy.dedupe_by_height {
        let mut seen = HashSet::new();
        videos.retain(|f| seen.insert(f.height));
    }

    let mut selected: Vec<SelectedFormat> = videos
        .iter()
        .map(|f| SelectedFormat {
            quality: quality_label(f),
            download_url: f.url.clone(),
            declared_size: f.effective_size(),
        })
        .collect();

    if policy.include_audio {
        if let Some(best) = best_audio(formats) {
            selected.push(SelectedFormat {
                quality: format!("Audio ({}kbps)", best.abr.unwrap_or(0.0).round() as u32),
                download_url: best.url.clone(),
                declared_size: best.effective_size(),
            });
        }
    }

    // Stable sort keeps the height-sorted video order for equal keys
    selected.sort_by(|a, b| label_height(&b.quality).cmp(&label_height(&a.quality)));
    selected
}

fn qualifies_as_video(f: &RawFormat, policy: &NormalizePolicy) -> bool {
    if policy.https_only && f.protocol.as_deref() != Some("https") {
        return false;
    }
    if f.has_video_codec() && f.has_audio_codec() {
        return true;
    }
    // Some sites only expose muxed streams through HLS/DASH manifests
    policy.allow_manifest && f.has_audio_codec() && f.is_manifest()
}

/// At most one audio-only record survives: the one with the highest bitrate
fn best_audio(formats: &[RawFormat]) -> Option<&RawFormat> {
    formats
        .iter()
        .filter(|f| !f.url.is_empty() && f.is_audio_only())
        .max_by(|a, b| {
            a.abr
                .unwrap_or(0.0)
                .partial_cmp(&b.abr.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        })
}

/// Provider label first, then height, then the format id
fn quality_label(f: &RawFormat) -> String {
    if let Some(note) = f.format_note.as_deref().filter(|n| !n.is_empty()) {
        return note.to_string();
    }
    if let Some(h) = f.height {
        return format!("{}p", h);
    }
    if f.format_id.is_empty() {
        "Unknown".to_string()
    } else {
        f.format_id.clone()
    }
}

/// Height encoded in a quality label; 0 when not derivable
pub fn label_height(label: &str) -> u32 {
    LABEL_HEIGHT_RE
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Render a byte count: KB below 1 MB, MB otherwise, two decimals
pub fn human_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb >= 1024.0 {
        format!("{:.2} MB", kb / 1024.0)
    } else {
        format!("{:.2} KB", kb)
    }
}

/// Size string for a possibly-unknown byte count
pub fn size_label(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) if b > 0 => human_size(b),
        _ => SIZE_UNKNOWN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(height: Option<u32>, url: &str) -> RawFormat {
        RawFormat {
            format_id: format!("f{}", url.len()),
            ext: "mp4".to_string(),
            url: url.to_string(),
            protocol: Some("https".to_string()),
            height,
            vcodec: Some("avc1".to_string()),
            acodec: Some("mp4a".to_string()),
            ..Default::default()
        }
    }

    fn audio(abr: f32, url: &str) -> RawFormat {
        RawFormat {
            format_id: "140".to_string(),
            ext: "m4a".to_string(),
            url: url.to_string(),
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a".to_string()),
            abr: Some(abr),
            ..Default::default()
        }
    }

    #[test]
    fn muxed_records_always_qualify() {
        let formats = vec![video(Some(720), "https://cdn/v720")];
        let out = select_formats(&formats, &NormalizePolicy::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].quality, "720p");
    }

    #[test]
    fn video_only_records_are_dropped() {
        let mut f = video(Some(1080), "https://cdn/v1080");
        f.acodec = Some("none".to_string());
        let out = select_formats(&[f], &NormalizePolicy::default());
        assert!(out.is_empty());
    }

    #[test]
    fn records_without_urls_are_dropped() {
        let mut f = video(Some(1080), "");
        f.url.clear();
        let out = select_formats(&[f], &NormalizePolicy::default());
        assert!(out.is_empty());
    }

    #[test]
    fn manifest_with_audio_qualifies_under_policy() {
        let f = RawFormat {
            format_id: "hls-1".to_string(),
            ext: "m3u8".to_string(),
            url: "https://cdn/master.m3u8".to_string(),
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a".to_string()),
            ..Default::default()
        };

        let strict = select_formats(std::slice::from_ref(&f), &NormalizePolicy::default());
        assert!(strict.is_empty());

        let policy = NormalizePolicy {
            allow_manifest: true,
            ..Default::default()
        };
        let lenient = select_formats(&[f], &policy);
        assert_eq!(lenient.len(), 1);
    }

    #[test]
    fn https_only_drops_other_protocols() {
        let mut hls = video(Some(720), "https://cdn/seg");
        hls.protocol = Some("m3u8_native".to_string());
        let https = video(Some(480), "https://cdn/direct");

        let policy = NormalizePolicy {
            https_only: true,
            ..Default::default()
        };
        let out = select_formats(&[hls, https], &policy);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].quality, "480p");
    }

    #[test]
    fn dedupe_keeps_one_entry_per_height_descending() {
        let formats = vec![
            video(Some(720), "https://cdn/a"),
            video(Some(1080), "https://cdn/b"),
            video(Some(1080), "https://cdn/cc"),
            video(None, "https://cdn/d"),
        ];

        let policy = NormalizePolicy {
            dedupe_by_height: true,
            ..Default::default()
        };
        let out = select_formats(&formats, &policy);

        let labels: Vec<&str> = out.iter().map(|f| f.quality.as_str()).collect();
        assert_eq!(out.iter().filter(|f| f.quality == "1080p").count(), 1);
        assert_eq!(out.iter().filter(|f| f.quality == "720p").count(), 1);
        assert_eq!(labels[0], "1080p");
        assert_eq!(labels[1], "720p");
        // The first 1080p record encountered after sorting wins
        assert_eq!(out[0].download_url, "https://cdn/b");
    }

    #[test]
    fn best_audio_is_chosen_by_bitrate() {
        let formats = vec![
            audio(64.0, "https://cdn/low"),
            audio(129.5, "https://cdn/high"),
            video(Some(360), "https://cdn/v"),
        ];

        let policy = NormalizePolicy {
            include_audio: true,
            ..Default::default()
        };
        let out = select_formats(&formats, &policy);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].quality, "360p");
        assert_eq!(out[1].quality, "Audio (130kbps)");
        assert_eq!(out[1].download_url, "https://cdn/high");
    }

    #[test]
    fn label_prefers_note_then_height_then_format_id() {
        let mut f = video(Some(1080), "https://cdn/v");
        f.format_note = Some("1080p60".to_string());
        assert_eq!(quality_label(&f), "1080p60");

        f.format_note = None;
        assert_eq!(quality_label(&f), "1080p");

        f.height = None;
        f.format_id = "http-540".to_string();
        assert_eq!(quality_label(&f), "http-540");
    }

    #[test]
    fn formats_without_derivable_height_sort_last() {
        let mut named = video(None, "https://cdn/named");
        named.format_note = Some("source".to_string());
        let formats = vec![named, video(Some(480), "https://cdn/v480")];

        let out = select_formats(&formats, &NormalizePolicy::default());
        assert_eq!(out[0].quality, "480p");
        assert_eq!(out[1].quality, "source");
    }

    #[test]
    fn label_height_parses_resolution_prefixes() {
        assert_eq!(label_height("1080p (1920x1080)"), 1080);
        assert_eq!(label_height("720p"), 720);
        assert_eq!(label_height("Audio (128kbps)"), 0);
        assert_eq!(label_height("source"), 0);
    }

    #[test]
    fn one_mebibyte_renders_as_one_mb() {
        assert_eq!(human_size(1_048_576), "1.00 MB");
    }

    #[test]
    fn sizes_below_one_mb_render_as_kb() {
        assert_eq!(human_size(512_000), "500.00 KB");
    }

    #[test]
    fn unknown_sizes_use_the_sentinel() {
        assert_eq!(size_label(None), SIZE_UNKNOWN);
        assert_eq!(size_label(Some(0)), SIZE_UNKNOWN);
        assert_eq!(size_label(Some(1_048_576)), "1.00 MB");
    }

    #[test]
    fn image_result_reuses_the_image_as_thumbnail() {
        let result = MediaResult::image(
            "A post".to_string(),
            "https://cdn/full.jpg".to_string(),
            "1.00 MB".to_string(),
        );
        assert_eq!(result.media_type, MediaType::Image);
        assert_eq!(result.thumbnail.as_deref(), Some("https://cdn/full.jpg"));
        assert_eq!(result.formats.len(), 1);
        assert_eq!(result.formats[0].quality, "Image");
    }
}
