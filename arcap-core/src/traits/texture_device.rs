use std::sync::Arc;

use crate::models::error::RecordError;

/// Number of faces in a cubemap texture.
pub const CUBEMAP_FACES: usize = 6;

/// Pixel format of a device texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba16Float,
    Rgba8Unorm,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba16Float => 8,
            Self::Rgba8Unorm => 4,
        }
    }
}

/// Shape of a square cubemap texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Edge length of each face in pixels.
    pub size: u32,
    pub format: PixelFormat,
}

impl TextureDescriptor {
    pub fn new(size: u32, format: PixelFormat) -> Self {
        Self { size, format }
    }

    /// Byte size of one tightly packed face.
    pub fn face_byte_len(&self) -> usize {
        self.size as usize * self.size as usize * self.format.bytes_per_pixel()
    }
}

/// A device-resident cubemap.
///
/// `read_face` is only meaningful once any in-flight copy into the
/// texture has completed; the ring writer guarantees this by reading
/// exclusively from completion callbacks.
pub trait CubemapTexture: Send + Sync {
    fn descriptor(&self) -> TextureDescriptor;

    /// Raw pixel bytes of one face, row-major, tightly packed.
    fn read_face(&self, face: usize) -> Result<Vec<u8>, RecordError>;

    /// Upload raw pixel bytes into one face.
    fn write_face(&self, face: usize, data: &[u8]) -> Result<(), RecordError>;
}

/// Callback invoked when a submitted copy has completed.
pub type CopyCompletionHandler = Box<dyn FnOnce() + Send + 'static>;

/// Interface to the GPU (or software) device backing probe textures.
///
/// `copy_cubemap` submits an asynchronous device-to-device copy; the
/// submission is complete when the call returns, the copy itself is not.
/// Completions fire on a dedicated device context, exactly once per
/// submission and **in submission order**. FIFO completion is a hard
/// precondition: the ring writer's frame attribution is undefined
/// without it.
pub trait TextureDevice: Send + Sync {
    fn new_cubemap(&self, descriptor: TextureDescriptor) -> Result<Arc<dyn CubemapTexture>, RecordError>;

    fn copy_cubemap(
        &self,
        source: &Arc<dyn CubemapTexture>,
        destination: &Arc<dyn CubemapTexture>,
        on_complete: CopyCompletionHandler,
    ) -> Result<(), RecordError>;
}
