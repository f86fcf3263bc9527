//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg invocations.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set seek position (before input, fast seek).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Capture exactly one frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-vframes").output_arg("1")
    }

    /// Set the JPEG quality scale (2-31, higher is smaller).
    pub fn qscale(self, q: u8) -> Self {
        self.output_arg("-q:v").output_arg(q.to_string())
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with timeout and cancellation.
pub struct FfmpegRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self {
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        self.run_program("ffmpeg", &args).await
    }

    /// Spawn a process and drive it to completion under the runner's
    /// timeout and cancellation policy. `kill_on_drop` covers the remaining
    /// exit path: a caller that drops this future mid-flight does not
    /// orphan the process.
    async fn run_program(&self, program: &str, args: &[String]) -> MediaResult<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child.stderr.take();

        let status = match self.supervise(&mut child).await {
            WaitOutcome::Exited(result) => result?,
            WaitOutcome::TimedOut => {
                let secs = self.timeout_secs.unwrap_or_default();
                warn!("{program} timed out after {secs} seconds, killing process");
                let _ = child.kill().await;
                return Err(MediaError::Timeout(secs));
            }
            WaitOutcome::Cancelled => {
                warn!("{program} cancelled, killing process");
                let _ = child.kill().await;
                return Err(MediaError::Cancelled);
            }
        };

        if status.success() {
            Ok(())
        } else {
            let stderr_text = match stderr {
                Some(mut pipe) => {
                    use tokio::io::AsyncReadExt;
                    let mut buf = String::new();
                    let _ = pipe.read_to_string(&mut buf).await;
                    let trimmed = buf.trim().to_string();
                    (!trimmed.is_empty()).then_some(trimmed)
                }
                None => None,
            };
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                stderr_text,
                status.code(),
            ))
        }
    }

    /// Wait for the child to exit, the deadline to pass, or cancellation to
    /// arrive. The child is not touched here so the caller can kill it once
    /// the wait future is released.
    async fn supervise(&self, child: &mut tokio::process::Child) -> WaitOutcome {
        let mut cancel_rx = self.cancel_rx.clone();

        let wait = child.wait();
        tokio::pin!(wait);

        let timeout = self
            .timeout_secs
            .map(std::time::Duration::from_secs)
            .unwrap_or(std::time::Duration::MAX);
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        tokio::select! {
            result = &mut wait => WaitOutcome::Exited(result),
            _ = &mut deadline, if self.timeout_secs.is_some() => WaitOutcome::TimedOut,
            _ = cancelled(&mut cancel_rx) => WaitOutcome::Cancelled,
        }
    }
}

/// How a supervised child process left the wait.
enum WaitOutcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    TimedOut,
    Cancelled,
}

/// Resolves only when the channel carries a `true` cancellation signal. No
/// channel, or a dropped sender, means cancellation can never arrive, so
/// both wait forever instead of resolving.
async fn cancelled(cancel_rx: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = cancel_rx else {
        return std::future::pending().await;
    };
    if *rx.borrow() {
        return;
    }
    loop {
        if rx.changed().await.is_err() {
            return std::future::pending().await;
        }
        if *rx.borrow() {
            return;
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("ad.mp4", "frame.jpg")
            .seek(11.5)
            .single_frame()
            .video_filter("scale=512:-2")
            .qscale(8);

        let args = cmd.build_args();
        assert!(args.contains(&"-ss".to_string()));
        assert!(args.contains(&"11.500".to_string()));
        assert!(args.contains(&"-vframes".to_string()));
        assert!(args.contains(&"-q:v".to_string()));
        assert!(args.contains(&"scale=512:-2".to_string()));
        // Seek comes before the input file
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
    }

    #[test]
    fn test_overwrite_and_log_level_defaults() {
        let args = FfmpegCommand::new("in.mp4", "out.jpg").build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"error".to_string()));
    }

    // Process supervision tests drive the runner with coreutils binaries so
    // they don't depend on ffmpeg being installed.

    #[tokio::test]
    async fn test_timeout_kills_stalled_process() {
        let runner = FfmpegRunner::new().with_timeout(1);
        let started = std::time::Instant::now();
        let err = runner
            .run_program("sleep", &["30".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Timeout(1)));
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancellation_kills_process() {
        let (tx, rx) = watch::channel(false);
        let runner = FfmpegRunner::new().with_cancel(rx);
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let started = std::time::Instant::now();
        let err = runner
            .run_program("sleep", &["30".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Cancelled));
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancellation_signalled_before_spawn() {
        let (_tx, rx) = watch::channel(true);
        let runner = FfmpegRunner::new().with_cancel(rx);
        let err = runner
            .run_program("sleep", &["30".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Cancelled));
    }

    #[tokio::test]
    async fn test_dropped_cancel_sender_is_not_cancellation() {
        let (tx, rx) = watch::channel(false);
        drop(tx);

        // A closed channel means cancellation can never arrive; the child
        // must still run to completion.
        let runner = FfmpegRunner::new().with_cancel(rx).with_timeout(10);
        runner.run_program("true", &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_failure() {
        let err = FfmpegRunner::new()
            .run_program("false", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FfmpegFailed { .. }));
    }
}
