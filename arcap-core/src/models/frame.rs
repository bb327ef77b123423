use crate::models::error::RecordError;

/// One uncompressed image plane handed over by the capture source.
///
/// The core never interprets the pixel contents — `data` is the raw
/// plane exactly as the producer delivered it, and `width`/`height` are
/// only carried into the binary frame header.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// Size of the raw plane in bytes.
    pub fn data_len(&self) -> usize {
        self.data.len()
    }
}

/// Ambient light estimate for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightEstimate {
    /// Ambient intensity in lumens.
    pub ambient_intensity: f64,
    /// Ambient color temperature in Kelvin.
    pub ambient_color_temperature: f64,
}

/// Camera pose and projection data for one frame.
///
/// Matrices are flattened row-major; `intrinsics` is the 3×3 pinhole
/// matrix of the color camera.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPose {
    pub transform: [f32; 16],
    pub view_matrix: [f32; 16],
    pub projection_matrix: [f32; 16],
    pub intrinsics: [f32; 9],
    /// Interface orientation code reported by the capture front end.
    pub orientation: u8,
}

/// The payload bundle delivered once per frame tick.
///
/// The color image and camera pose are always present; the depth streams
/// and light estimate depend on sensor availability and are validated by
/// the coordinator before any writer runs. An incomplete tick is a fatal
/// stream-source fault, not a skippable frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTick {
    pub color_image: PixelBuffer,
    pub depth_map: Option<PixelBuffer>,
    pub smoothed_depth_map: Option<PixelBuffer>,
    pub depth_confidence: Option<PixelBuffer>,
    pub smoothed_depth_confidence: Option<PixelBuffer>,
    pub light_estimate: Option<LightEstimate>,
    pub camera: CameraPose,
}

/// A validated view of a [`FrameTick`] with every optional stream present.
pub struct CompleteTick<'a> {
    pub color_image: &'a PixelBuffer,
    pub depth_map: &'a PixelBuffer,
    pub smoothed_depth_map: &'a PixelBuffer,
    pub depth_confidence: &'a PixelBuffer,
    pub smoothed_depth_confidence: &'a PixelBuffer,
    pub light_estimate: &'a LightEstimate,
    pub camera: &'a CameraPose,
}

impl FrameTick {
    /// Validate that every sensor stream is present.
    ///
    /// Returns a borrow-only view so the fan-out never unwraps.
    pub fn complete(&self) -> Result<CompleteTick<'_>, RecordError> {
        let depth_map = self
            .depth_map
            .as_ref()
            .ok_or(RecordError::MissingSensorData("depth map"))?;
        let smoothed_depth_map = self
            .smoothed_depth_map
            .as_ref()
            .ok_or(RecordError::MissingSensorData("smoothed depth map"))?;
        let depth_confidence = self
            .depth_confidence
            .as_ref()
            .ok_or(RecordError::MissingSensorData("depth confidence map"))?;
        let smoothed_depth_confidence = self
            .smoothed_depth_confidence
            .as_ref()
            .ok_or(RecordError::MissingSensorData("smoothed depth confidence map"))?;
        let light_estimate = self
            .light_estimate
            .as_ref()
            .ok_or(RecordError::MissingSensorData("light estimate"))?;

        Ok(CompleteTick {
            color_image: &self.color_image,
            depth_map,
            smoothed_depth_map,
            depth_confidence,
            smoothed_depth_confidence,
            light_estimate,
            camera: &self.camera,
        })
    }
}
