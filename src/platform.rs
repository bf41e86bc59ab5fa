//! Supported platforms and their normalization policies

use serde::Deserialize;

use crate::normalize::NormalizePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
    Facebook,
    Twitter,
    Vimeo,
    Dailymotion,
    Reddit,
    Linkedin,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Vimeo => "vimeo",
            Self::Dailymotion => "dailymotion",
            Self::Reddit => "reddit",
            Self::Linkedin => "linkedin",
        }
    }

    fn domains(&self) -> &'static [&'static str] {
        match self {
            Self::Youtube => &["youtube.com/", "youtu.be/"],
            Self::Instagram => &["instagram.com/"],
            Self::Facebook => &["facebook.com", "fb.watch"],
            // Bare "x.com" would also hit e.g. netflix.com; anchor it to a
            // scheme separator or subdomain dot
            Self::Twitter => &["twitter.com", "//x.com", ".x.com"],
            Self::Vimeo => &["vimeo.com"],
            Self::Dailymotion => &["dailymotion.com", "dai.ly"],
            Self::Reddit => &["reddit.com", "redd.it"],
            Self::Linkedin => &["linkedin.com"],
        }
    }

    /// Loose domain check; anything stricter is the extractor's job
    pub fn matches_url(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.domains().iter().any(|d| lower.contains(d))
    }

    /// Strip tracking parameters from share links before extraction
    pub fn sanitize_url<'a>(&self, url: &'a str) -> &'a str {
        match self {
            Self::Youtube => {
                if url.contains("youtu.be/") {
                    url.split('?').next().unwrap_or(url)
                } else if url.contains("youtube.com/watch") {
                    url.split('&').next().unwrap_or(url)
                } else {
                    url
                }
            }
            _ => url,
        }
    }

    /// Per-platform knobs over the shared normalization pipeline.
    ///
    /// Vimeo only serves playable URLs over plain https; the social
    /// platforms frequently hide muxed streams behind HLS manifests and
    /// post plain images that yt-dlp refuses.
    pub fn policy(&self) -> NormalizePolicy {
        match self {
            Self::Youtube => NormalizePolicy {
                include_audio: true,
                dedupe_by_height: true,
                ..Default::default()
            },
            Self::Instagram | Self::Facebook | Self::Twitter | Self::Linkedin => NormalizePolicy {
                allow_manifest: true,
                include_audio: true,
                image_fallback: true,
                ..Default::default()
            },
            Self::Vimeo => NormalizePolicy {
                https_only: true,
                ..Default::default()
            },
            Self::Dailymotion | Self::Reddit => NormalizePolicy::default(),
        }
    }
}
