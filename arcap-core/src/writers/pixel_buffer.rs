use std::fs;
use std::path::{Path, PathBuf};

use crate::encoding::raw_frame;
use crate::models::error::RecordError;
use crate::models::frame::PixelBuffer;
use crate::models::state::{WriterState, WriterStatus};
use crate::traits::writer::{FrameWriter, StreamWriter};

/// Writes one uncompressed binary file per frame.
///
/// Each write creates `<session>/<frame>/` and drops `<file_name>`
/// (e.g. `depth.raw`) into it using the raw frame format. There is
/// nothing to flush: `start`/`stop` only gate the lifecycle.
pub struct PixelBufferWriter {
    session_path: PathBuf,
    file_name: String,
    state: WriterState,
    status: WriterStatus,
}

impl PixelBufferWriter {
    pub fn new(session_path: &Path, file_name: &str) -> Self {
        Self {
            session_path: session_path.to_path_buf(),
            file_name: file_name.to_string(),
            state: WriterState::Uninitialized,
            status: WriterStatus::Healthy,
        }
    }
}

impl StreamWriter for PixelBufferWriter {
    fn start(&mut self) -> Result<(), RecordError> {
        self.state = WriterState::Started;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RecordError> {
        self.state = WriterState::Stopped;
        Ok(())
    }

    fn state(&self) -> WriterState {
        self.state
    }

    fn status(&self) -> WriterStatus {
        self.status
    }
}

impl FrameWriter for PixelBufferWriter {
    type Item = PixelBuffer;

    fn write(&mut self, image: &PixelBuffer, frame: u64) -> Result<(), RecordError> {
        if !self.state.is_started() {
            return Err(RecordError::NotStarted);
        }

        let frame_dir = self.session_path.join(frame.to_string());
        fs::create_dir_all(&frame_dir).map_err(|e| {
            self.status = WriterStatus::Failed;
            RecordError::WriteFailure(format!(
                "failed to create frame directory {}: {e}",
                frame_dir.display()
            ))
        })?;

        let file_path = frame_dir.join(&self.file_name);
        fs::write(&file_path, raw_frame::encode_frame(image)).map_err(|e| {
            self.status = WriterStatus::Failed;
            RecordError::WriteFailure(format!("failed to write {}: {e}", file_path.display()))
        })?;

        Ok(())
    }
}
