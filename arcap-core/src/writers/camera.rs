use std::path::Path;

use serde::Serialize;

use crate::models::error::RecordError;
use crate::models::frame::CameraPose;
use crate::models::state::{WriterState, WriterStatus};
use crate::storage::json_document::JsonDocumentWriter;
use crate::traits::writer::{FrameWriter, StreamWriter};

#[derive(Serialize)]
struct CameraRecord {
    frame: u64,
    #[serde(rename = "viewMatrix")]
    view_matrix: [f32; 16],
    #[serde(rename = "projectionMatrix")]
    projection_matrix: [f32; 16],
    transform: [f32; 16],
    intrinsics: [f32; 9],
    orientation: u8,
}

/// Accumulates one camera pose record per frame into `camera.json`.
pub struct CameraPoseWriter {
    doc: JsonDocumentWriter<CameraRecord>,
}

impl CameraPoseWriter {
    pub fn new(session_path: &Path, name: &str) -> Self {
        Self {
            doc: JsonDocumentWriter::new(session_path.join(name)),
        }
    }
}

impl StreamWriter for CameraPoseWriter {
    fn start(&mut self) -> Result<(), RecordError> {
        self.doc.start()
    }

    fn stop(&mut self) -> Result<(), RecordError> {
        self.doc.stop()
    }

    fn state(&self) -> WriterState {
        self.doc.state()
    }

    fn status(&self) -> WriterStatus {
        WriterStatus::Healthy
    }
}

impl FrameWriter for CameraPoseWriter {
    type Item = CameraPose;

    fn write(&mut self, camera: &CameraPose, frame: u64) -> Result<(), RecordError> {
        self.doc.append(CameraRecord {
            frame,
            view_matrix: camera.view_matrix,
            projection_matrix: camera.projection_matrix,
            transform: camera.transform,
            intrinsics: camera.intrinsics,
            orientation: camera.orientation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose() -> CameraPose {
        CameraPose {
            transform: [1.0; 16],
            view_matrix: [2.0; 16],
            projection_matrix: [3.0; 16],
            intrinsics: [4.0; 9],
            orientation: 1,
        }
    }

    #[test]
    fn write_before_start_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CameraPoseWriter::new(dir.path(), "camera.json");

        assert_eq!(writer.write(&pose(), 0), Err(RecordError::NotStarted));
    }

    #[test]
    fn stop_flushes_records_with_layout_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CameraPoseWriter::new(dir.path(), "camera.json");
        writer.start().unwrap();
        writer.write(&pose(), 0).unwrap();
        writer.write(&pose(), 1).unwrap();
        writer.stop().unwrap();

        let json = std::fs::read_to_string(dir.path().join("camera.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["frame"], 1);
        assert!(records[0]["viewMatrix"].is_array());
        assert_eq!(records[0]["intrinsics"].as_array().unwrap().len(), 9);
    }
}
