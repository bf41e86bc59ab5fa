// Typed extraction failures

use thiserror::Error;

/// Failure classes surfaced by the extraction backends.
///
/// The HTTP mapping lives in `crate::error`; the classified variants carry
/// fixed messages so raw yt-dlp stderr never reaches a response body.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("content is private, login required")]
    PrivateContent,

    #[error("content is unavailable or has been removed")]
    Unavailable,

    #[error("URL is not supported by the extractor")]
    UnsupportedUrl,

    #[error("content is not available in this region")]
    GeoBlocked,

    #[error("the source site is rate-limiting requests")]
    RateLimited,

    #[error("network timeout while contacting the source site")]
    NetworkTimeout,

    /// Neither yt-dlp flavor is installed, or the requested one is missing
    #[error("extraction tool not found: {0}")]
    ToolNotFound(String),

    /// yt-dlp produced output we could not understand
    #[error("failed to parse extractor output: {0}")]
    Parse(String),

    /// Subprocess could not be run to completion
    #[error("extractor execution failed: {0}")]
    Execution(String),

    #[error("extraction failed: {0}")]
    Unknown(String),
}

impl ExtractError {
    /// Content-level verdicts are final; trying another backend or client
    /// will not change them.
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            Self::PrivateContent | Self::Unavailable | Self::UnsupportedUrl | Self::GeoBlocked
        )
    }
}
