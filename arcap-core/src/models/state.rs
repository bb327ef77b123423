/// Recorder state machine.
///
/// State transitions:
/// ```text
/// idle → recording → idle
/// ```
///
/// There is no pause: a recording either runs to `stop_recording` or is
/// aborted by the first writer failure, which also lands back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}

/// Lifecycle of a single stream writer.
///
/// ```text
/// uninitialized → started → stopped
/// ```
///
/// No re-start after stop; a new writer instance is required per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Uninitialized,
    Started,
    Stopped,
}

impl WriterState {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Health of a writer whose failures can surface asynchronously
/// (the video encoder finalizes on a background completion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterStatus {
    Healthy,
    Failed,
}
