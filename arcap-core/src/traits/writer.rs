use crate::models::anchor::{Anchor, AnchorEventStatus};
use crate::models::error::RecordError;
use crate::models::state::{WriterState, WriterStatus};

/// Common lifecycle of every stream writer.
///
/// ```text
/// uninitialized → started → stopped
/// ```
///
/// `start` opens the underlying sink (file handle, encoder, in-memory
/// record list). Writing before `start` or after `stop` fails with
/// [`RecordError::NotStarted`] and must never panic or corrupt state.
/// `stop` flushes and closes the sink and is idempotent. A stopped
/// writer cannot be restarted; each session constructs fresh writers.
pub trait StreamWriter {
    fn start(&mut self) -> Result<(), RecordError>;

    fn stop(&mut self) -> Result<(), RecordError>;

    fn state(&self) -> WriterState;

    /// Health of the writer, for writers whose failure surfaces
    /// asynchronously. Synchronous writers report `Healthy` unless a
    /// write has failed.
    fn status(&self) -> WriterStatus;
}

/// A writer fed once per frame tick.
///
/// Frame numbers arrive strictly increasing from 0 for one recording;
/// writers accept them without validation — ordering is the
/// coordinator's guarantee.
pub trait FrameWriter: StreamWriter {
    type Item: ?Sized;

    fn write(&mut self, item: &Self::Item, frame: u64) -> Result<(), RecordError>;
}

/// A writer fed once per anchor add/update/remove event.
pub trait AnchorEventWriter: StreamWriter {
    fn write(
        &mut self,
        anchor: &Anchor,
        frame: u64,
        status: AnchorEventStatus,
    ) -> Result<(), RecordError>;
}
