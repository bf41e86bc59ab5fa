// MediaExtractor trait and shared extraction types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::ExtractError;

/// Options carried into every extraction call
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Path to a Netscape cookie file, passed through when present
    pub cookies_path: Option<String>,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Socket timeout handed to yt-dlp; also bounds the subprocess itself
    pub timeout_seconds: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            cookies_path: None,
            proxy: None,
            timeout_seconds: 30,
        }
    }
}

/// One candidate stream as reported by yt-dlp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFormat {
    pub format_id: String,
    /// Container extension (mp4, webm, m3u8, ...)
    pub ext: String,
    pub url: String,
    /// Transport protocol (https, m3u8_native, http_dash_segments, ...)
    pub protocol: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f32>,
    /// Video codec, "none" for audio-only streams
    pub vcodec: Option<String>,
    /// Audio codec, "none" for video-only streams
    pub acodec: Option<String>,
    /// Exact file size in bytes
    pub filesize: Option<u64>,
    /// Approximate file size when the exact one is unknown
    pub filesize_approx: Option<u64>,
    /// Audio bitrate in kbps
    pub abr: Option<f32>,
    /// Total bitrate in kbps
    pub tbr: Option<f32>,
    /// Provider label (e.g. "1080p", "tiny")
    pub format_note: Option<String>,
}

impl RawFormat {
    /// Exact size when reported, approximate otherwise
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// A missing codec field counts as "none"
    pub fn has_video_codec(&self) -> bool {
        self.vcodec.as_deref().map_or(false, |v| v != "none")
    }

    pub fn has_audio_codec(&self) -> bool {
        self.acodec.as_deref().map_or(false, |a| a != "none")
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio_codec() && !self.has_video_codec()
    }

    /// HLS/DASH manifests surface with these container extensions
    pub fn is_manifest(&self) -> bool {
        matches!(self.ext.as_str(), "m3u8" | "mpd")
    }
}

/// Page-level metadata plus the raw format list; only what the gateway
/// serves onward
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    pub thumbnail: Option<String>,
    pub formats: Vec<RawFormat>,
}

/// Seam between the gateway and yt-dlp; stubbed out in handler tests
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Whether the backend's tooling is installed
    fn is_available(&self) -> bool;

    /// Fetch metadata and candidate formats for a URL; never downloads media
    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<MediaInfo, ExtractError>;
}

/// Parse the single-line JSON document emitted by `--dump-json`
pub(super) fn parse_dump_json(stdout: &[u8]) -> Result<MediaInfo, ExtractError> {
    let json_str = String::from_utf8_lossy(stdout);
    let json: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractError::Parse(format!("Invalid JSON: {}", e)))?;

    let formats = parse_formats(&json)?;

    Ok(MediaInfo {
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        thumbnail: json["thumbnail"].as_str().map(|s| s.to_string()),
        formats,
    })
}

fn parse_formats(json: &serde_json::Value) -> Result<Vec<RawFormat>, ExtractError> {
    let formats_array = json["formats"]
        .as_array()
        .ok_or_else(|| ExtractError::Parse("No formats array in JSON".to_string()))?;

    let mut formats = Vec::with_capacity(formats_array.len());

    for f in formats_array {
        formats.push(RawFormat {
            format_id: f["format_id"].as_str().unwrap_or("").to_string(),
            ext: f["ext"].as_str().unwrap_or("").to_string(),
            url: f["url"].as_str().unwrap_or("").to_string(),
            protocol: f["protocol"].as_str().map(|s| s.to_string()),
            width: f["width"].as_u64().map(|w| w as u32),
            height: f["height"].as_u64().map(|h| h as u32),
            fps: f["fps"].as_f64().map(|fps| fps as f32),
            vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
            acodec: f["acodec"].as_str().map(|s| s.to_string()),
            filesize: f["filesize"].as_u64(),
            filesize_approx: f["filesize_approx"].as_u64(),
            abr: f["abr"].as_f64().map(|a| a as f32),
            tbr: f["tbr"].as_f64().map(|t| t as f32),
            format_note: f["format_note"].as_str().map(|s| s.to_string()),
        });
    }

    Ok(formats)
}
