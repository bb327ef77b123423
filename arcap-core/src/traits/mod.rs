pub mod recorder_delegate;
pub mod texture_device;
pub mod video_encoder;
pub mod writer;
