use std::sync::Arc;

use crate::models::session::FrameSize;
use crate::traits::video_encoder::VideoEncoderFactory;

/// Debug-overlay toggles for the capture front end.
///
/// Enumerated here so every user-facing setting travels in one explicit
/// struct; the recording core itself never reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisualizationOptions {
    pub show_feature_points: bool,
    pub show_anchor_origins: bool,
    pub show_anchor_geometry: bool,
    pub show_world_origin: bool,
    pub show_statistics: bool,
}

/// Configuration for one recording, passed to `start_recording`.
#[derive(Clone)]
pub struct RecorderConfig {
    /// Tick cadence of the capture source, used for video presentation
    /// timestamps (default: 60).
    pub fps: u32,

    /// File name of the muxed color stream inside the session directory.
    pub video_file_name: String,

    /// Factory for the external video codec driven by the video writer.
    pub encoder_factory: Arc<dyn VideoEncoderFactory>,

    /// Device model descriptor stored in the session metadata.
    pub model_name: String,

    /// Viewport dimensions stored in the session metadata.
    pub viewport_size: FrameSize,

    /// Height offset for touch-placed objects, in meters. Consumed by
    /// the capture front end, not the recording core.
    pub object_height_offset: f64,

    /// Consumed by the capture front end, not the recording core.
    pub visualization: VisualizationOptions,
}

impl RecorderConfig {
    pub fn new(encoder_factory: Arc<dyn VideoEncoderFactory>) -> Self {
        Self {
            fps: 60,
            video_file_name: "color.mov".to_string(),
            encoder_factory,
            model_name: String::new(),
            viewport_size: FrameSize::default(),
            object_height_offset: 0.0,
            visualization: VisualizationOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.fps == 0 {
            return Err("fps must be positive".into());
        }
        if self.video_file_name.is_empty() {
            return Err("video file name must not be empty".into());
        }
        Ok(())
    }
}
