// CLI backend - uses the native `yt-dlp` binary
//
// Faster than the Python module and has no interpreter dependency, but
// YouTube blocks it more readily, so it rotates player clients there.

use async_trait::async_trait;
use std::process::Command as StdCommand;
use tracing::debug;

use super::diagnostics::classify_stderr;
use super::errors::ExtractError;
use super::traits::{parse_dump_json, ExtractorConfig, MediaExtractor, MediaInfo};
use crate::process::run_output_with_timeout;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

pub struct CliExtractor {
    ytdlp_path: String,
}

impl CliExtractor {
    pub fn new() -> Self {
        Self {
            ytdlp_path: Self::find_ytdlp(),
        }
    }

    /// Find the yt-dlp binary on common install paths, then PATH
    fn find_ytdlp() -> String {
        let common_paths = [
            "/usr/local/bin/yt-dlp",
            "/usr/bin/yt-dlp",
            "/opt/homebrew/bin/yt-dlp",
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    fn has_ytdlp_binary(&self) -> bool {
        match StdCommand::new(&self.ytdlp_path).arg("--version").output() {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }

    fn build_args(&self, url: &str, config: &ExtractorConfig, client: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            config.timeout_seconds.to_string(),
            "--user-agent".to_string(),
            USER_AGENT.to_string(),
        ];

        if let Some(client) = client {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", client));
        }

        if let Some(path) = &config.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.clone());
        }

        if let Some(proxy) = &config.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(url.to_string());
        args
    }

    async fn try_with_clients(
        &self,
        url: &str,
        config: &ExtractorConfig,
        clients: &[Option<&str>],
    ) -> Result<MediaInfo, ExtractError> {
        let mut last_error = ExtractError::Unknown("no extraction attempt made".to_string());

        for client in clients {
            let args = self.build_args(url, config, *client);
            debug!(
                client = client.unwrap_or("default"),
                cmd = %self.ytdlp_path,
                "running cli extractor"
            );

            match run_output_with_timeout(&self.ytdlp_path, args, config.timeout_seconds).await {
                Ok(out) if out.status.success() => {
                    return parse_dump_json(&out.stdout);
                }
                Ok(out) => {
                    let stderr = String::from_utf8_lossy(&out.stderr);
                    last_error = classify_stderr(&stderr);
                    // Definitive verdicts do not change with another client
                    if last_error.is_definitive() {
                        return Err(last_error);
                    }
                }
                Err(e) => {
                    last_error = ExtractError::Execution(e);
                }
            }
        }

        Err(last_error)
    }
}

impl Default for CliExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaExtractor for CliExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.has_ytdlp_binary()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<MediaInfo, ExtractError> {
        if !self.is_available() {
            return Err(ExtractError::ToolNotFound(
                "yt-dlp binary not found".to_string(),
            ));
        }

        let is_youtube = {
            let lower = url.to_lowercase();
            lower.contains("youtube.com") || lower.contains("youtu.be")
        };

        // YouTube blocks the web client most aggressively; android and tv
        // are worth a shot before giving up. Other sites take one attempt.
        let clients: &[Option<&str>] = if is_youtube {
            &[Some("web"), Some("android"), Some("tv")]
        } else {
            &[None]
        };

        self.try_with_clients(url, config, clients).await
    }
}
