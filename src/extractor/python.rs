// Python backend - uses `python3 -m yt_dlp`
//
// Better at bypassing bot detection than the native binary, at the cost of
// requiring Python 3 with the yt_dlp module installed.

use async_trait::async_trait;
use std::process::Command as StdCommand;
use tracing::debug;

use super::diagnostics::classify_stderr;
use super::errors::ExtractError;
use super::traits::{parse_dump_json, ExtractorConfig, MediaExtractor, MediaInfo};
use crate::process::run_output_with_timeout;

pub struct PythonExtractor {
    python_cmd: String,
}

impl PythonExtractor {
    pub fn new() -> Self {
        Self {
            python_cmd: Self::find_python(),
        }
    }

    /// Find a Python interpreter; YTDLP_PYTHON overrides (e.g. a venv)
    fn find_python() -> String {
        if let Ok(custom) = std::env::var("YTDLP_PYTHON") {
            return custom;
        }

        let candidates = ["python3", "/usr/local/bin/python3", "/opt/homebrew/bin/python3"];

        for cmd in candidates {
            if let Ok(output) = StdCommand::new(cmd).arg("--version").output() {
                if output.status.success() {
                    return cmd.to_string();
                }
            }
        }

        "python3".to_string()
    }

    fn has_ytdlp_module(&self) -> bool {
        match StdCommand::new(&self.python_cmd)
            .args(["-c", "import yt_dlp"])
            .output()
        {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }

    fn build_args(&self, url: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            "yt_dlp".to_string(),
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            config.timeout_seconds.to_string(),
        ];

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
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaExtractor for PythonExtractor {
    fn name(&self) -> &'static str {
        "python-yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.has_ytdlp_module()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<MediaInfo, ExtractError> {
        if !self.is_available() {
            return Err(ExtractError::ToolNotFound(
                "Python yt_dlp module not installed".to_string(),
            ));
        }

        let args = self.build_args(url, config);
        debug!(cmd = %self.python_cmd, args = %args.join(" "), "running python extractor");

        let output = run_output_with_timeout(&self.python_cmd, args, config.timeout_seconds)
            .await
            .map_err(ExtractError::Execution)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_stderr(&stderr));
        }

        parse_dump_json(&output.stdout)
    }
}
