use std::path::Path;

use serde::Serialize;

use crate::models::error::RecordError;
use crate::models::frame::LightEstimate;
use crate::models::state::{WriterState, WriterStatus};
use crate::storage::json_document::JsonDocumentWriter;
use crate::traits::writer::{FrameWriter, StreamWriter};

#[derive(Serialize)]
struct LightEstimateRecord {
    frame: u64,
    #[serde(rename = "ambientIntensity")]
    ambient_intensity: f64,
    #[serde(rename = "ambientColorTemperature")]
    ambient_color_temperature: f64,
}

/// Accumulates one light-estimate record per frame into
/// `lightestimation.json`.
pub struct LightEstimateWriter {
    doc: JsonDocumentWriter<LightEstimateRecord>,
}

impl LightEstimateWriter {
    pub fn new(session_path: &Path, name: &str) -> Self {
        Self {
            doc: JsonDocumentWriter::new(session_path.join(name)),
        }
    }
}

impl StreamWriter for LightEstimateWriter {
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

impl FrameWriter for LightEstimateWriter {
    type Item = LightEstimate;

    fn write(&mut self, estimate: &LightEstimate, frame: u64) -> Result<(), RecordError> {
        self.doc.append(LightEstimateRecord {
            frame,
            ambient_intensity: estimate.ambient_intensity,
            ambient_color_temperature: estimate.ambient_color_temperature,
        })
    }
}
