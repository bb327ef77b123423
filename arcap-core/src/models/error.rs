use thiserror::Error;

/// Errors that can occur while recording a capture session.
///
/// Every writer failure is fatal for the running recording: the
/// coordinator aborts on the first error and leaves partial output on
/// disk as-is. No error is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A writer was used before `start` or after `stop`.
    #[error("writer not started")]
    NotStarted,

    /// A tick payload arrived without a required sensor stream.
    #[error("missing sensor data: {0}")]
    MissingSensorData(&'static str),

    /// A writer's I/O call failed.
    #[error("write failure: {0}")]
    WriteFailure(String),

    /// The video encoder rejected a frame or failed to start.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// The probe ring has more copies in flight than it can hold.
    ///
    /// This means the readback/disk path cannot keep up with texture
    /// arrival and is a fatal capacity fault, never silently dropped.
    #[error("ring capacity exceeded: {issued} issued, {retired} retired")]
    CapacityViolation { issued: u64, retired: u64 },

    /// Invalid recorder configuration.
    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    /// Session catalog or metadata persistence failed.
    #[error("storage error: {0}")]
    StorageError(String),
}
