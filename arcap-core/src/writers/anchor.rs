use std::path::Path;

use serde::Serialize;

use crate::models::anchor::{Anchor, AnchorEventStatus};
use crate::models::error::RecordError;
use crate::models::state::{WriterState, WriterStatus};
use crate::storage::json_document::JsonDocumentWriter;
use crate::traits::writer::{AnchorEventWriter, StreamWriter};

#[derive(Serialize)]
struct AnchorRecord {
    frame: u64,
    name: String,
    identifier: String,
    transform: [f32; 16],
    status: u8,
}

/// Records add/update/remove events for anchors without a specialized
/// writer into `anchor.json`.
pub struct AnchorWriter {
    doc: JsonDocumentWriter<AnchorRecord>,
}

impl AnchorWriter {
    pub fn new(session_path: &Path, name: &str) -> Self {
        Self {
            doc: JsonDocumentWriter::new(session_path.join(name)),
        }
    }
}

impl StreamWriter for AnchorWriter {
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

impl AnchorEventWriter for AnchorWriter {
    fn write(
        &mut self,
        anchor: &Anchor,
        frame: u64,
        status: AnchorEventStatus,
    ) -> Result<(), RecordError> {
        self.doc.append(AnchorRecord {
            frame,
            name: anchor.name.clone(),
            identifier: anchor.identifier.to_string(),
            transform: anchor.transform,
            status: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::anchor::AnchorKind;
    use uuid::Uuid;

    fn generic_anchor() -> Anchor {
        Anchor {
            identifier: Uuid::new_v4(),
            name: "Touch anchor".to_string(),
            transform: [0.5; 16],
            kind: AnchorKind::Generic,
        }
    }

    #[test]
    fn write_before_start_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = AnchorWriter::new(dir.path(), "anchor.json");

        let result = writer.write(&generic_anchor(), 0, AnchorEventStatus::Added);
        assert_eq!(result, Err(RecordError::NotStarted));
    }

    #[test]
    fn event_status_codes_are_stable() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = AnchorWriter::new(dir.path(), "anchor.json");
        writer.start().unwrap();

        let anchor = generic_anchor();
        writer.write(&anchor, 0, AnchorEventStatus::Added).unwrap();
        writer.write(&anchor, 1, AnchorEventStatus::Updated).unwrap();
        writer.write(&anchor, 2, AnchorEventStatus::Removed).unwrap();
        writer.stop().unwrap();

        let json = std::fs::read_to_string(dir.path().join("anchor.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["status"], 0);
        assert_eq!(value[1]["status"], 2);
        assert_eq!(value[2]["status"], 1);
        assert_eq!(value[0]["identifier"], anchor.identifier.to_string());
        assert_eq!(value[0]["name"], "Touch anchor");
    }
}
