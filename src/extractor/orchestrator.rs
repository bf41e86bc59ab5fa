// Backend orchestration - automatic selection and fallback
//
// Python handles YouTube's bot detection better; the native binary is
// faster everywhere else. Whichever is tried first, the other serves as
// fallback unless the first verdict was definitive.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::cli::CliExtractor;
use super::errors::ExtractError;
use super::python::PythonExtractor;
use super::traits::{ExtractorConfig, MediaExtractor, MediaInfo};

pub struct Orchestrator {
    python: PythonExtractor,
    cli: CliExtractor,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            python: PythonExtractor::new(),
            cli: CliExtractor::new(),
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaExtractor for Orchestrator {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn is_available(&self) -> bool {
        self.python.is_available() || self.cli.is_available()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<MediaInfo, ExtractError> {
        let is_youtube = {
            let lower = url.to_lowercase();
            lower.contains("youtube.com") || lower.contains("youtu.be")
        };

        let order: [&dyn MediaExtractor; 2] = if is_youtube {
            [&self.python, &self.cli]
        } else {
            [&self.cli, &self.python]
        };

        let mut last_error = ExtractError::ToolNotFound(
            "neither the yt_dlp Python module nor the yt-dlp binary is installed".to_string(),
        );

        for backend in order {
            if !backend.is_available() {
                continue;
            }

            match backend.extract(url, config).await {
                Ok(info) => {
                    debug!(backend = backend.name(), "extraction succeeded");
                    return Ok(info);
                }
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "extraction failed");
                    if e.is_definitive() {
                        return Err(e);
                    }
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
