//! # arcap-ffmpeg
//!
//! [`VideoEncoder`] backend that drives the system `ffmpeg` binary
//! rather than linking FFmpeg natively, avoiding dev header/lib
//! requirements. Raw frames are piped to stdin at a constant frame
//! rate; the container is finalized when stdin closes and the process
//! exits.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;

use arcap_core::traits::video_encoder::{
    FinishCompletionHandler, VideoEncoder, VideoEncoderFactory,
};
use arcap_core::PixelBuffer;

/// Whether a runnable `ffmpeg` binary is available.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Creates one [`FfmpegEncoder`] per recording.
pub struct FfmpegEncoderFactory {
    /// ffmpeg `-pix_fmt` name of the incoming raw frames.
    pub input_pixel_format: String,
}

impl FfmpegEncoderFactory {
    pub fn new(input_pixel_format: &str) -> Self {
        Self {
            input_pixel_format: input_pixel_format.to_string(),
        }
    }
}

impl Default for FfmpegEncoderFactory {
    fn default() -> Self {
        Self::new("bgra")
    }
}

impl VideoEncoderFactory for FfmpegEncoderFactory {
    fn make_encoder(&self, output_path: &Path) -> Result<Box<dyn VideoEncoder>, String> {
        Ok(Box::new(FfmpegEncoder {
            output_path: output_path.to_path_buf(),
            input_pixel_format: self.input_pixel_format.clone(),
            child: None,
            stdin: None,
        }))
    }
}

/// Streams raw frames into a spawned `ffmpeg` process.
///
/// The container gets a constant frame rate (`-r fps`), so the
/// presentation time passed to `append` is implied by frame order and
/// is not forwarded separately.
pub struct FfmpegEncoder {
    output_path: PathBuf,
    input_pixel_format: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl VideoEncoder for FfmpegEncoder {
    fn start(&mut self, width: u32, height: u32, fps: u32) -> Result<(), String> {
        if width % 2 != 0 || height % 2 != 0 {
            // yuv420p output subsamples chroma 2x2.
            return Err(format!(
                "frame dimensions {width}x{height} must be even for yuv420p output"
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err("ffmpeg is required but was not found on PATH".into());
        }
        if let Some(parent) = self.output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create output directory: {e}"))?;
        }

        log::debug!("spawning ffmpeg for {}", self.output_path.display());
        let mut child = Command::new("ffmpeg")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                &self.input_pixel_format,
                "-s",
                &format!("{width}x{height}"),
                "-r",
                &fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ])
            .arg(&self.output_path)
            .spawn()
            .map_err(|e| format!("failed to spawn ffmpeg: {e}"))?;

        self.stdin = Some(
            child
                .stdin
                .take()
                .ok_or_else(|| "failed to open ffmpeg stdin".to_string())?,
        );
        self.child = Some(child);
        Ok(())
    }

    fn append(&mut self, image: &PixelBuffer, _presentation_time: f64) -> Result<(), String> {
        use std::io::Write;

        let stdin = self.stdin.as_mut().ok_or("encoder not started")?;
        stdin
            .write_all(&image.data)
            .map_err(|e| format!("failed to pipe frame to ffmpeg: {e}"))
    }

    fn finish(&mut self, on_complete: FinishCompletionHandler) {
        // Closing stdin tells ffmpeg the stream is done.
        drop(self.stdin.take());

        let Some(mut child) = self.child.take() else {
            on_complete(Ok(()));
            return;
        };

        let spawned = thread::Builder::new()
            .name("ffmpeg-finish".into())
            .spawn(move || {
                let result = match child.wait() {
                    Ok(status) if status.success() => Ok(()),
                    Ok(status) => Err(format!("ffmpeg exited with {status}")),
                    Err(e) => Err(format!("failed to wait for ffmpeg: {e}")),
                };
                on_complete(result);
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn ffmpeg finalize thread: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn odd_dimensions_rejected_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FfmpegEncoderFactory::default();
        let mut encoder = factory.make_encoder(&dir.path().join("color.mov")).unwrap();

        let err = encoder.start(99, 50, 60).unwrap_err();
        assert!(err.contains("must be even"));
    }

    #[test]
    fn finish_without_start_completes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FfmpegEncoderFactory::default();
        let mut encoder = factory.make_encoder(&dir.path().join("color.mov")).unwrap();

        let (tx, rx) = mpsc::channel();
        encoder.finish(Box::new(move |result| tx.send(result).unwrap()));
        let result = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn encodes_a_short_clip() {
        if !is_ffmpeg_on_path() {
            eprintln!("skipping: ffmpeg not on PATH");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("color.mov");
        let factory = FfmpegEncoderFactory::new("rgba");
        let mut encoder = factory.make_encoder(&out_path).unwrap();

        encoder.start(16, 16, 30).unwrap();
        let frame = PixelBuffer::new(16, 16, vec![0x80u8; 16 * 16 * 4]);
        for i in 0..10 {
            encoder.append(&frame, i as f64 / 30.0).unwrap();
        }

        let (tx, rx) = mpsc::channel();
        encoder.finish(Box::new(move |result| tx.send(result).unwrap()));
        let result = rx.recv_timeout(Duration::from_secs(30)).unwrap();
        assert_eq!(result, Ok(()));

        let metadata = fs::metadata(&out_path).unwrap();
        assert!(metadata.len() > 0);
    }
}
