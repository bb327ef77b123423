use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::RecordError;
use crate::models::frame::PixelBuffer;
use crate::models::state::{WriterState, WriterStatus};
use crate::traits::video_encoder::VideoEncoder;
use crate::traits::writer::{FrameWriter, StreamWriter};

/// Drives the external video codec for the continuous color stream.
///
/// The encoder is started lazily from the first frame's dimensions.
/// Presentation time is `frame / fps`, so timestamps are monotonic as
/// long as frame numbers are. `stop` triggers an asynchronous container
/// finalize; `status()` flips to its final value when that completion
/// fires, which may be after the session metadata has been saved — an
/// accepted race, visible only in the logs.
pub struct VideoStreamWriter {
    encoder: Box<dyn VideoEncoder>,
    fps: u32,
    state: WriterState,
    dimensions: Option<(u32, u32)>,
    status: Arc<Mutex<WriterStatus>>,
}

impl VideoStreamWriter {
    pub fn new(encoder: Box<dyn VideoEncoder>, fps: u32) -> Self {
        Self {
            encoder,
            fps,
            state: WriterState::Uninitialized,
            dimensions: None,
            status: Arc::new(Mutex::new(WriterStatus::Healthy)),
        }
    }
}

impl StreamWriter for VideoStreamWriter {
    fn start(&mut self) -> Result<(), RecordError> {
        self.state = WriterState::Started;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RecordError> {
        if self.state.is_stopped() {
            return Ok(());
        }
        let was_started = self.state.is_started();
        self.state = WriterState::Stopped;

        if !was_started || self.dimensions.is_none() {
            return Ok(());
        }

        let status = Arc::clone(&self.status);
        self.encoder.finish(Box::new(move |result| match result {
            Ok(()) => {
                *status.lock() = WriterStatus::Healthy;
                log::info!("finished writing video container");
            }
            Err(e) => {
                *status.lock() = WriterStatus::Failed;
                log::error!("video container finalize failed: {e}");
            }
        }));
        Ok(())
    }

    fn state(&self) -> WriterState {
        self.state
    }

    fn status(&self) -> WriterStatus {
        *self.status.lock()
    }
}

impl FrameWriter for VideoStreamWriter {
    type Item = PixelBuffer;

    fn write(&mut self, image: &PixelBuffer, frame: u64) -> Result<(), RecordError> {
        if !self.state.is_started() {
            return Err(RecordError::NotStarted);
        }

        if self.dimensions.is_none() {
            self.encoder
                .start(image.width, image.height, self.fps)
                .map_err(|e| {
                    *self.status.lock() = WriterStatus::Failed;
                    RecordError::EncodingFailed(e)
                })?;
            self.dimensions = Some((image.width, image.height));
        }

        let presentation_time = frame as f64 / self.fps as f64;
        self.encoder
            .append(image, presentation_time)
            .map_err(|e| {
                *self.status.lock() = WriterStatus::Failed;
                RecordError::EncodingFailed(e)
            })
    }
}
