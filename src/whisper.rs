//! Speech-to-text fallback for videos without captions.
//!
//! Whisper runs as an external program, like yt-dlp. MLX Whisper (through `uv run`
//! or its own executable) is preferred when present; OpenAI Whisper otherwise.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info, instrument, warn};

const INSTALL_HINT: &str = "Install options:
  - macOS (slow): brew install openai-whisper
  - macOS (faster): brew install ffmpeg uv; uv venv .venv; source .venv/bin/activate; uv pip install mlx-whisper
  - All systems: pip3 install openai-whisper";

const MLX_MODEL: &str = "mlx-community/whisper-large-v3-mlx";

/// Model size for OpenAI Whisper. MLX Whisper always uses large-v3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WhisperQuality {
    /// `small` model (~2GB)
    #[default]
    Default,
    /// `medium` model (~5GB)
    Medium,
    /// `large` model (~10GB)
    High,
}

impl WhisperQuality {
    /// OpenAI Whisper model name.
    #[must_use]
    pub const fn model(self) -> &'static str {
        match self {
            Self::Default => "small",
            Self::Medium => "medium",
            Self::High => "large",
        }
    }

    const fn download_size(self) -> &'static str {
        match self {
            Self::Default => "~2GB",
            Self::Medium => "~5GB",
            Self::High => "~10GB",
        }
    }
}

/// Which Whisper implementation was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperBackend {
    /// `uv run mlx_whisper`
    UvMlx,
    /// `mlx-whisper`
    Mlx,
    /// `whisper`
    OpenAi,
}

impl WhisperBackend {
    const fn is_mlx(self) -> bool {
        matches!(self, Self::UvMlx | Self::Mlx)
    }
}

/// Executable names tried by [`WhisperTools::detect`].
#[derive(Debug, Clone)]
pub struct WhisperTools {
    uv: String,
    mlx_whisper: String,
    whisper: String,
}

impl WhisperTools {
    /// Uses the given executables instead of `uv`, `mlx-whisper` and `whisper`.
    #[must_use]
    pub fn new(
        uv: impl Into<String>,
        mlx_whisper: impl Into<String>,
        whisper: impl Into<String>,
    ) -> Self {
        Self {
            uv: uv.into(),
            mlx_whisper: mlx_whisper.into(),
            whisper: whisper.into(),
        }
    }

    /// Finds a working Whisper, MLX variants first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolMissing`] if no variant runs.
    pub fn detect(&self) -> Result<Whisper> {
        if succeeds(&self.uv, &["-V"]) && succeeds(&self.uv, &["run", "mlx_whisper", "--help"]) {
            return Ok(Whisper::new(WhisperBackend::UvMlx, &self.uv, &["run", "mlx_whisper"]));
        }
        if succeeds(&self.mlx_whisper, &["--help"]) {
            return Ok(Whisper::new(WhisperBackend::Mlx, &self.mlx_whisper, &[]));
        }
        if succeeds(&self.whisper, &["--help"]) {
            return Ok(Whisper::new(WhisperBackend::OpenAi, &self.whisper, &[]));
        }

        Err(Error::tool_missing("Whisper", INSTALL_HINT))
    }
}

impl Default for WhisperTools {
    fn default() -> Self {
        Self::new("uv", "mlx-whisper", "whisper")
    }
}

/// A runnable Whisper command.
#[derive(Debug, Clone)]
pub struct Whisper {
    backend: WhisperBackend,
    program: String,
    prefix: Vec<String>,
}

impl Whisper {
    fn new(backend: WhisperBackend, program: &str, prefix: &[&str]) -> Self {
        Self {
            backend,
            program: program.to_string(),
            prefix: prefix.iter().map(ToString::to_string).collect(),
        }
    }

    /// Implementation in use.
    #[must_use]
    pub const fn backend(&self) -> WhisperBackend {
        self.backend
    }

    /// Transcribes `audio` into `output_dir`, returning the `.vtt` Whisper wrote
    /// (named after the audio file).
    ///
    /// # Errors
    ///
    /// Returns an error if Whisper fails or writes no VTT file.
    #[instrument(skip(self, audio, output_dir), fields(audio = %audio.display()))]
    pub fn transcribe(&self, audio: &Path, output_dir: &Path, quality: WhisperQuality) -> Result<PathBuf> {
        if self.backend.is_mlx() {
            info!("Transcribing with MLX Whisper (large-v3) - this may take a while...");
            if quality != WhisperQuality::Default {
                warn!("Quality flags are ignored with MLX Whisper (always uses large-v3)");
            }
        } else {
            info!(
                "Transcribing with OpenAI Whisper model '{}' ({}) - this may take a while...",
                quality.model(),
                quality.download_size()
            );
        }

        let args = self.args(audio, output_dir, quality);
        let output = self.run(&args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::command(self.command_line(&args), stderr.trim()));
        }

        let vtt = output_dir.join(audio.with_extension("vtt").file_name().unwrap_or_default());
        if !vtt.exists() {
            return Err(Error::command(self.command_line(&args), "VTT file not created"));
        }

        if self.backend == WhisperBackend::OpenAi && quality == WhisperQuality::Default {
            info!("If transcription quality is poor, try --mq (medium) or --hq (large)");
        }
        Ok(vtt)
    }

    fn args(&self, audio: &Path, output_dir: &Path, quality: WhisperQuality) -> Vec<String> {
        // MLX spells its flags with hyphens, OpenAI Whisper with underscores.
        let (model, format_flag, dir_flag) = if self.backend.is_mlx() {
            (MLX_MODEL, "--output-format", "--output-dir")
        } else {
            (quality.model(), "--output_format", "--output_dir")
        };

        let mut args = self.prefix.clone();
        args.extend([
            audio.to_string_lossy().into_owned(),
            "--model".to_string(),
            model.to_string(),
            format_flag.to_string(),
            "vtt".to_string(),
            dir_flag.to_string(),
            output_dir.to_string_lossy().into_owned(),
        ]);
        args
    }

    fn run(&self, args: &[String]) -> Result<Output> {
        debug!("Running {}", self.command_line(args));
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| Error::command(self.command_line(args), e.to_string()))
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }
}

fn succeeds(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .output()
        .is_ok_and(|output| output.status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "definitely-not-a-real-whisper-binary";

    #[test]
    fn test_missing_tools_report_install_hint() {
        let err = WhisperTools::new(MISSING, MISSING, MISSING)
            .detect()
            .unwrap_err();
        assert!(err.is_tool_missing());
        assert!(err.to_string().contains("pip3 install openai-whisper"));
    }

    #[test]
    fn test_quality_models() {
        assert_eq!(WhisperQuality::default().model(), "small");
        assert_eq!(WhisperQuality::Medium.model(), "medium");
        assert_eq!(WhisperQuality::High.model(), "large");
    }

    #[test]
    fn test_openai_args() {
        let whisper = Whisper::new(WhisperBackend::OpenAi, "whisper", &[]);
        let args = whisper.args(
            Path::new("out/youtube_abc_audio.mp3"),
            Path::new("out"),
            WhisperQuality::Medium,
        );
        assert_eq!(
            args,
            [
                "out/youtube_abc_audio.mp3",
                "--model",
                "medium",
                "--output_format",
                "vtt",
                "--output_dir",
                "out"
            ]
        );
    }

    #[test]
    fn test_mlx_args_ignore_quality() {
        let whisper = Whisper::new(WhisperBackend::UvMlx, "uv", &["run", "mlx_whisper"]);
        let args = whisper.args(Path::new("a.mp3"), Path::new("."), WhisperQuality::High);
        assert_eq!(
            args,
            [
                "run",
                "mlx_whisper",
                "a.mp3",
                "--model",
                MLX_MODEL,
                "--output-format",
                "vtt",
                "--output-dir",
                "."
            ]
        );
    }

    #[test]
    fn test_transcribe_with_missing_program_fails() {
        let whisper = Whisper::new(WhisperBackend::OpenAi, MISSING, &[]);
        let err = whisper
            .transcribe(Path::new("a.mp3"), Path::new("."), WhisperQuality::Default)
            .unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }
}
