//! # arcap-core
//!
//! Platform-agnostic AR scene-capture recording core.
//!
//! Persists the streams of a real-time capture session — color video,
//! depth and confidence maps, camera poses, light estimates, and scene
//! anchors including environment-probe cubemaps — under a single
//! per-session frame index. The capture source and the GPU are external
//! collaborators behind trait seams; a software texture device ships in
//! this crate, a system-ffmpeg video encoder in `arcap-ffmpeg`.
//!
//! ## Architecture
//!
//! ```text
//! arcap-core (this crate)
//! ├── traits/    ← StreamWriter contract, TextureDevice, VideoEncoder, RecorderDelegate
//! ├── models/    ← RecordError, states, FrameTick, Anchor, RecorderConfig, Session
//! ├── encoding/  ← raw [width][height][bytes] frame format
//! ├── storage/   ← JsonDocumentWriter, SessionCatalog, checksums
//! ├── writers/   ← per-stream writers incl. the probe ring writer
//! ├── gpu/       ← SoftwareDevice (FIFO copy queue)
//! └── session/   ← RecordingCoordinator (per-tick fan-out, anchor dispatch)
//! ```

pub mod encoding;
pub mod gpu;
pub mod models;
pub mod session;
pub mod storage;
pub mod traits;
pub mod writers;

// Re-export key types at crate root for convenience.
pub use gpu::software_device::SoftwareDevice;
pub use models::anchor::{
    Anchor, AnchorEventStatus, AnchorKind, EnvironmentProbeData, PlaneAlignment, PlaneAnchorData,
    PlaneClassification,
};
pub use models::config::{RecorderConfig, VisualizationOptions};
pub use models::error::RecordError;
pub use models::frame::{CameraPose, FrameTick, LightEstimate, PixelBuffer};
pub use models::session::{FrameSize, Session};
pub use models::state::{RecorderState, WriterState, WriterStatus};
pub use session::recorder::RecordingCoordinator;
pub use storage::catalog::SessionCatalog;
pub use traits::recorder_delegate::RecorderDelegate;
pub use traits::texture_device::{
    CubemapTexture, PixelFormat, TextureDescriptor, TextureDevice, CUBEMAP_FACES,
};
pub use traits::video_encoder::{VideoEncoder, VideoEncoderFactory};
pub use traits::writer::{AnchorEventWriter, FrameWriter, StreamWriter};
