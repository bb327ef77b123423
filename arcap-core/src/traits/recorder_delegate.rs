use crate::models::error::RecordError;
use crate::models::state::RecorderState;

/// Event delegate for recorder notifications.
///
/// `on_error` fires before the abort transition back to `Idle`. Methods
/// are called from the producer's tick thread; implementations should
/// marshal to the UI thread if needed.
pub trait RecorderDelegate: Send + Sync {
    /// Called when the recorder transitions between idle and recording.
    fn on_state_changed(&self, state: &RecorderState);

    /// Called when a writer failure aborts the running recording.
    fn on_error(&self, error: &RecordError);
}
