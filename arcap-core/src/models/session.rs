use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pixel (or point) dimensions of a captured stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Metadata and storage scope of one recording attempt.
///
/// Created by the catalog when recording starts, mutated only by the
/// coordinator (dimensions, frame count) while recording, persisted as
/// `project.json` on stop. Immutable afterwards except rename/delete
/// through the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "sessionid")]
    pub session_id: String,
    pub creation_date: DateTime<Utc>,
    /// -1 until a recording has been persisted.
    pub number_of_frames: i64,
    pub color_size: FrameSize,
    pub depth_size: FrameSize,
    pub model_name: String,
    pub viewport_size: FrameSize,
    /// SHA-256 hex digests of the finalized JSON stream documents,
    /// keyed by file name. The video container is excluded: its
    /// finalize may still be in flight when the session is saved.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checksums: BTreeMap<String, String>,
}

impl Session {
    pub fn new(model_name: &str, viewport_size: FrameSize) -> Self {
        Self {
            name: "New recording".to_string(),
            description: String::new(),
            session_id: Uuid::new_v4().to_string(),
            creation_date: Utc::now(),
            number_of_frames: -1,
            color_size: FrameSize::default(),
            depth_size: FrameSize::default(),
            model_name: model_name.to_string(),
            viewport_size,
            checksums: BTreeMap::new(),
        }
    }

    /// Directory identifier derived from the creation timestamp.
    ///
    /// ISO-8601 with millisecond precision, `:` replaced so the name is
    /// legal on every filesystem.
    pub fn identifier(&self) -> String {
        self.creation_date
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace(':', "-")
    }
}
