use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::error::RecordError;
use crate::models::state::WriterState;

/// Accumulates records in memory and flushes them as a single
/// pretty-printed JSON array on `stop`.
///
/// This is the engine behind every scalar metadata stream. One document
/// per stream is acceptable because record counts are bounded by session
/// length; the trade-off is that records buffered at crash time are
/// lost.
///
/// The sink file is created on `start` and written exactly once, so a
/// second `stop` leaves the document unchanged.
pub struct JsonDocumentWriter<T> {
    path: PathBuf,
    file: Option<File>,
    records: Vec<T>,
    state: WriterState,
}

impl<T: Serialize> JsonDocumentWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: None,
            records: Vec::new(),
            state: WriterState::Uninitialized,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Number of records buffered so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Open the sink file and begin accepting records.
    pub fn start(&mut self) -> Result<(), RecordError> {
        let file = File::create(&self.path).map_err(|e| {
            RecordError::StorageError(format!(
                "failed to create {}: {e}",
                self.path.display()
            ))
        })?;
        self.file = Some(file);
        self.records.clear();
        self.state = WriterState::Started;
        Ok(())
    }

    /// Append one record. Fails only when the writer is not started.
    pub fn append(&mut self, record: T) -> Result<(), RecordError> {
        if !self.state.is_started() {
            return Err(RecordError::NotStarted);
        }
        self.records.push(record);
        Ok(())
    }

    /// Flush the buffered records as one JSON array and close the sink.
    pub fn stop(&mut self) -> Result<(), RecordError> {
        if self.state.is_stopped() {
            return Ok(());
        }

        let was_started = self.state.is_started();
        self.state = WriterState::Stopped;

        if !was_started {
            return Ok(());
        }

        let mut file = match self.file.take() {
            Some(file) => file,
            None => return Ok(()),
        };

        serde_json::to_writer_pretty(&mut file, &self.records)
            .map_err(|e| RecordError::StorageError(format!("failed to serialize records: {e}")))?;
        file.flush()
            .map_err(|e| RecordError::StorageError(format!("failed to flush records: {e}")))?;
        self.records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Record {
        frame: u64,
        value: f64,
    }

    fn writer_in(dir: &tempfile::TempDir) -> JsonDocumentWriter<Record> {
        JsonDocumentWriter::new(dir.path().join("stream.json"))
    }

    #[test]
    fn append_before_start_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = writer_in(&dir);

        let result = writer.append(Record { frame: 0, value: 1.0 });
        assert_eq!(result, Err(RecordError::NotStarted));
    }

    #[test]
    fn append_after_stop_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = writer_in(&dir);
        writer.start().unwrap();
        writer.stop().unwrap();

        let result = writer.append(Record { frame: 0, value: 1.0 });
        assert_eq!(result, Err(RecordError::NotStarted));
    }

    #[test]
    fn stop_writes_single_array_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = writer_in(&dir);
        writer.start().unwrap();
        writer.append(Record { frame: 0, value: 1.5 }).unwrap();
        writer.append(Record { frame: 1, value: 2.5 }).unwrap();
        writer.stop().unwrap();

        let json = std::fs::read_to_string(dir.path().join("stream.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[1]["frame"], 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = writer_in(&dir);
        writer.start().unwrap();
        writer.append(Record { frame: 0, value: 1.0 }).unwrap();
        writer.stop().unwrap();

        let first = std::fs::read(dir.path().join("stream.json")).unwrap();
        writer.stop().unwrap();
        let second = std::fs::read(dir.path().join("stream.json")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn records_cleared_after_stop() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = writer_in(&dir);
        writer.start().unwrap();
        writer.append(Record { frame: 0, value: 1.0 }).unwrap();
        assert_eq!(writer.len(), 1);
        writer.stop().unwrap();
        assert!(writer.is_empty());
    }
}
