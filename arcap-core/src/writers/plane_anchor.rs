use std::path::Path;

use serde::Serialize;

use crate::models::anchor::{Anchor, AnchorEventStatus, AnchorKind};
use crate::models::error::RecordError;
use crate::models::state::{WriterState, WriterStatus};
use crate::storage::json_document::JsonDocumentWriter;
use crate::traits::writer::{AnchorEventWriter, StreamWriter};

#[derive(Serialize)]
struct PlaneAnchorRecord {
    frame: u64,
    name: String,
    identifier: String,
    transform: [f32; 16],
    center: [f32; 3],
    extent: [f32; 3],
    alignment: u8,
    classification: &'static str,
    status: u8,
}

/// Records detected-plane anchor events into `plane_anchor.json`.
pub struct PlaneAnchorWriter {
    doc: JsonDocumentWriter<PlaneAnchorRecord>,
}

impl PlaneAnchorWriter {
    pub fn new(session_path: &Path, name: &str) -> Self {
        Self {
            doc: JsonDocumentWriter::new(session_path.join(name)),
        }
    }
}

impl StreamWriter for PlaneAnchorWriter {
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

impl AnchorEventWriter for PlaneAnchorWriter {
    fn write(
        &mut self,
        anchor: &Anchor,
        frame: u64,
        status: AnchorEventStatus,
    ) -> Result<(), RecordError> {
        let AnchorKind::Plane(plane) = &anchor.kind else {
            return Err(RecordError::WriteFailure(format!(
                "anchor {} is not a plane anchor",
                anchor.identifier
            )));
        };

        self.doc.append(PlaneAnchorRecord {
            frame,
            name: anchor.name.clone(),
            identifier: anchor.identifier.to_string(),
            transform: anchor.transform,
            center: plane.center,
            extent: plane.extent,
            alignment: plane.alignment.code(),
            classification: plane.classification.label(),
            status: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::anchor::{PlaneAlignment, PlaneAnchorData, PlaneClassification};
    use uuid::Uuid;

    fn plane_anchor() -> Anchor {
        Anchor {
            identifier: Uuid::new_v4(),
            name: String::new(),
            transform: [1.0; 16],
            kind: AnchorKind::Plane(PlaneAnchorData {
                center: [0.0, 0.1, 0.2],
                extent: [1.5, 0.0, 2.5],
                alignment: PlaneAlignment::Horizontal,
                classification: PlaneClassification::Floor,
            }),
        }
    }

    #[test]
    fn plane_fields_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PlaneAnchorWriter::new(dir.path(), "plane_anchor.json");
        writer.start().unwrap();
        writer
            .write(&plane_anchor(), 4, AnchorEventStatus::Updated)
            .unwrap();
        writer.stop().unwrap();

        let json = std::fs::read_to_string(dir.path().join("plane_anchor.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["frame"], 4);
        assert_eq!(value[0]["alignment"], 0);
        assert_eq!(value[0]["classification"], "floor");
        assert_eq!(value[0]["extent"][2], 2.5);
        assert_eq!(value[0]["status"], 2);
    }

    #[test]
    fn rejects_non_plane_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PlaneAnchorWriter::new(dir.path(), "plane_anchor.json");
        writer.start().unwrap();

        let anchor = Anchor {
            identifier: Uuid::new_v4(),
            name: String::new(),
            transform: [0.0; 16],
            kind: AnchorKind::Generic,
        };
        assert!(writer.write(&anchor, 0, AnchorEventStatus::Added).is_err());
    }
}
