//! Frame sampling.
//!
//! Turns a decodable video into an ordered, cost-bounded set of compressed
//! still frames at deterministic timestamps. Capture is strictly
//! sequential: the decode resource is stateful and single-threaded, so one
//! seek+capture runs at a time.

use std::path::Path;

use base64::Engine;
use tokio::sync::watch;
use tracing::debug;

use adscreen_models::{
    Creative, FrameSample, FrameSequence, MediaKind, DEFAULT_FRAME_INTERVAL_SECS,
    DEFAULT_MAX_FRAMES,
};
use adscreen_models::sampling::{FRAME_JPEG_QSCALE, FRAME_SCALE_WIDTH};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Default per-capture timeout in seconds.
const DEFAULT_CAPTURE_TIMEOUT_SECS: u64 = 30;

/// Generate candidate capture timestamps for a video of `duration` seconds.
///
/// Starts at 0 and steps by `interval`, stopping as soon as the next
/// timestamp would reach the duration or the count reaches `max_frames`.
/// End-card rule: when the video is longer than a second and the last
/// planned timestamp sits more than a second before the end, one extra
/// timestamp at `duration - 0.5` is appended (end-cards and CTAs tend to
/// live in the final second), so the plan may hold `max_frames + 1`
/// entries.
pub fn plan_timestamps(duration: f64, interval: f64, max_frames: usize) -> Vec<f64> {
    let mut timestamps = Vec::new();
    let mut t = 0.0;
    while t < duration && timestamps.len() < max_frames {
        timestamps.push(t);
        t += interval;
    }

    if duration > 1.0 {
        if let Some(&last) = timestamps.last() {
            if last < duration - 1.0 {
                timestamps.push(duration - 0.5);
            }
        }
    }

    timestamps
}

/// Samples still frames from a creative.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    interval_secs: f64,
    max_frames: usize,
    capture_timeout_secs: u64,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSampler {
    /// Create a sampler with the default interval and frame cap.
    pub fn new() -> Self {
        Self {
            interval_secs: DEFAULT_FRAME_INTERVAL_SECS,
            max_frames: DEFAULT_MAX_FRAMES,
            capture_timeout_secs: DEFAULT_CAPTURE_TIMEOUT_SECS,
            cancel_rx: None,
        }
    }

    /// Set the sampling interval. Values below 0.1s are clamped to keep the
    /// timestamp plan strictly increasing.
    pub fn with_interval(mut self, secs: f64) -> Self {
        self.interval_secs = secs.max(0.1);
        self
    }

    /// Set the sampler's own frame cap.
    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Set the per-capture timeout.
    pub fn with_capture_timeout(mut self, secs: u64) -> Self {
        self.capture_timeout_secs = secs;
        self
    }

    /// Set a cancellation signal, checked between capture steps.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Sample a creative into a frame sequence.
    ///
    /// Image creatives skip sampling entirely: the payload is wrapped as a
    /// one-element sequence at timestamp 0. Video creatives are spilled to
    /// scratch space and decoded; the scratch directory is released on every
    /// exit path.
    pub async fn sample(&self, creative: &Creative) -> MediaResult<FrameSequence> {
        match creative.kind {
            MediaKind::Image => Ok(FrameSequence::single_image(
                creative.image_mime(),
                base64::engine::general_purpose::STANDARD.encode(&creative.payload),
            )),
            MediaKind::Video => {
                let scratch = tempfile::tempdir()?;
                let input = scratch.path().join("creative.bin");
                tokio::fs::write(&input, &creative.payload).await?;
                // TempDir drops (and deletes) whether or not sampling errs
                self.sample_path(&input).await
            }
        }
    }

    /// Sample a decodable video file already on disk.
    pub async fn sample_path(&self, path: impl AsRef<Path>) -> MediaResult<FrameSequence> {
        let path = path.as_ref();
        let info = probe_video(path).await?;

        let timestamps = plan_timestamps(info.duration, self.interval_secs, self.max_frames);
        if timestamps.is_empty() {
            return Err(MediaError::invalid_video(format!(
                "No sampleable timestamps for duration {}",
                info.duration
            )));
        }

        debug!(
            duration = info.duration,
            frames = timestamps.len(),
            "Planned frame capture timestamps"
        );

        let scratch = tempfile::tempdir()?;
        let mut sequence = FrameSequence::new();

        // Strictly sequential: one seek+capture at a time.
        for (i, &ts) in timestamps.iter().enumerate() {
            self.check_cancelled()?;

            let frame_path = scratch.path().join(format!("frame_{i:03}.jpg"));
            self.capture_frame(path, &frame_path, ts).await?;

            let jpeg = tokio::fs::read(&frame_path).await?;
            let sample = FrameSample::new(
                ts,
                base64::engine::general_purpose::STANDARD.encode(&jpeg),
            );
            sequence
                .push(sample)
                .map_err(|e| MediaError::invalid_video(e.to_string()))?;
        }

        Ok(sequence)
    }

    /// Capture a single frame at `timestamp` as a bounded-size JPEG.
    async fn capture_frame(
        &self,
        input: &Path,
        output: &Path,
        timestamp: f64,
    ) -> MediaResult<()> {
        let filter = format!("scale={}:-2", FRAME_SCALE_WIDTH);

        let cmd = FfmpegCommand::new(input, output)
            .seek(timestamp)
            .single_frame()
            .video_filter(&filter)
            .qscale(FRAME_JPEG_QSCALE)
            .log_level("error");

        let mut runner = FfmpegRunner::new().with_timeout(self.capture_timeout_secs);
        if let Some(rx) = &self.cancel_rx {
            runner = runner.with_cancel(rx.clone());
        }
        runner.run(&cmd).await?;

        if !output.exists() {
            return Err(MediaError::invalid_video(format!(
                "No frame decoded at {timestamp:.3}s"
            )));
        }

        Ok(())
    }

    fn check_cancelled(&self) -> MediaResult<()> {
        if let Some(rx) = &self.cancel_rx {
            if *rx.borrow() {
                return Err(MediaError::Cancelled);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_twelve_second_video() {
        let ts = plan_timestamps(12.0, 2.0, 10);
        assert_eq!(ts, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 11.5]);
    }

    #[test]
    fn test_plan_three_second_video_no_end_card() {
        // Last grid timestamp is 2.0 which is not more than a second before
        // the 3.0s end, so no end-card sample is appended.
        let ts = plan_timestamps(3.0, 2.0, 10);
        assert_eq!(ts, vec![0.0, 2.0]);
    }

    #[test]
    fn test_plan_never_exceeds_cap_plus_end_card() {
        for duration in [0.5, 1.0, 7.3, 29.9, 61.0, 600.0] {
            for max_frames in [1, 3, 10] {
                let ts = plan_timestamps(duration, 2.0, max_frames);
                assert!(
                    ts.len() <= max_frames + 1,
                    "duration={duration} max={max_frames} got {}",
                    ts.len()
                );
                for pair in ts.windows(2) {
                    assert!(pair[0] < pair[1], "not strictly increasing: {ts:?}");
                }
            }
        }
    }

    #[test]
    fn test_plan_long_video_hits_cap_then_end_card() {
        let ts = plan_timestamps(60.0, 2.0, 10);
        assert_eq!(ts.len(), 11);
        assert_eq!(*ts.last().unwrap(), 59.5);
    }

    #[test]
    fn test_plan_sub_second_video() {
        let ts = plan_timestamps(0.8, 2.0, 10);
        assert_eq!(ts, vec![0.0]);
    }

    #[test]
    fn test_plan_zero_duration_is_empty() {
        assert!(plan_timestamps(0.0, 2.0, 10).is_empty());
    }

    #[tokio::test]
    async fn test_image_creative_is_identity_pass() {
        let creative = Creative::new("banner.png", MediaKind::Image, vec![1, 2, 3]);
        let seq = FrameSampler::new().sample(&creative).await.unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.samples()[0].timestamp_secs, 0.0);
        assert_eq!(
            seq.samples()[0].image_base64,
            base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3])
        );
        // The upload's own MIME type survives into the classifier payload.
        assert!(seq.samples()[0]
            .data_url()
            .starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_capture() {
        let (tx, rx) = watch::channel(true);
        let sampler = FrameSampler::new().with_cancel(rx);
        assert!(matches!(
            sampler.check_cancelled(),
            Err(MediaError::Cancelled)
        ));
        drop(tx);
    }
}
