// Classifies yt-dlp stderr into typed failures
//
// yt-dlp reports everything as free-form text on stderr; the strings
// matched here are the stable phrases its extractors emit for the cases
// the gateway maps onto distinct HTTP statuses.

use super::errors::ExtractError;

/// Map a failed yt-dlp run's stderr to an [`ExtractError`]
pub fn classify_stderr(stderr: &str) -> ExtractError {
    let lower = stderr.to_lowercase();

    if lower.contains("private video")
        || lower.contains("private account")
        || lower.contains("login required")
        || lower.contains("sign in to confirm")
    {
        return ExtractError::PrivateContent;
    }

    if lower.contains("video unavailable")
        || lower.contains("content isn't available")
        || lower.contains("has been removed")
        || lower.contains("http error 404")
    {
        return ExtractError::Unavailable;
    }

    if lower.contains("unsupported url")
        || lower.contains("is not a valid url")
        || lower.contains("no video in this post")
    {
        return ExtractError::UnsupportedUrl;
    }

    if lower.contains("not available in your country")
        || lower.contains("geo restriction")
        || lower.contains("geo-restricted")
    {
        return ExtractError::GeoBlocked;
    }

    if lower.contains("http error 429") || lower.contains("too many requests") {
        return ExtractError::RateLimited;
    }

    if lower.contains("timed out") || lower.contains("timeout") {
        return ExtractError::NetworkTimeout;
    }

    if lower.contains("no such file or directory") || lower.contains("command not found") {
        return ExtractError::ToolNotFound(summary(stderr));
    }

    ExtractError::Unknown(summary(stderr))
}

/// First ERROR line, or the first non-empty line, capped for log hygiene
fn summary(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("unknown extractor error")
        .chars()
        .take(200)
        .collect()
}
