use std::path::PathBuf;
use std::sync::Arc;

use crate::models::anchor::{Anchor, AnchorEventStatus, AnchorKind};
use crate::models::config::RecorderConfig;
use crate::models::error::RecordError;
use crate::models::frame::FrameTick;
use crate::models::session::{FrameSize, Session};
use crate::models::state::RecorderState;
use crate::storage::catalog::SessionCatalog;
use crate::storage::sha256_file;
use crate::traits::recorder_delegate::RecorderDelegate;
use crate::traits::texture_device::TextureDevice;
use crate::traits::writer::{AnchorEventWriter, FrameWriter, StreamWriter};
use crate::writers::anchor::AnchorWriter;
use crate::writers::camera::CameraPoseWriter;
use crate::writers::env_probe::EnvironmentProbeWriter;
use crate::writers::light_estimate::LightEstimateWriter;
use crate::writers::pixel_buffer::PixelBufferWriter;
use crate::writers::plane_anchor::PlaneAnchorWriter;
use crate::writers::video::VideoStreamWriter;

pub const DEPTH_FILE: &str = "depth.raw";
pub const SMOOTH_DEPTH_FILE: &str = "smooth_depth.raw";
pub const DEPTH_CONFIDENCE_FILE: &str = "depth_conf.raw";
pub const SMOOTH_DEPTH_CONFIDENCE_FILE: &str = "smooth_depth_conf.raw";
pub const CAMERA_FILE: &str = "camera.json";
pub const LIGHT_ESTIMATE_FILE: &str = "lightestimation.json";
pub const ANCHOR_FILE: &str = "anchor.json";
pub const PLANE_ANCHOR_FILE: &str = "plane_anchor.json";
pub const ENV_PROBE_FILE: &str = "env_probe.json";

/// The writers and session of one running recording.
struct ActiveRecording {
    session: Session,
    session_path: PathBuf,
    color: VideoStreamWriter,
    depth: PixelBufferWriter,
    smooth_depth: PixelBufferWriter,
    depth_confidence: PixelBufferWriter,
    smooth_depth_confidence: PixelBufferWriter,
    light_estimate: LightEstimateWriter,
    camera: CameraPoseWriter,
    env_probe: EnvironmentProbeWriter,
    plane_anchor: PlaneAnchorWriter,
    anchor: AnchorWriter,
}

impl ActiveRecording {
    fn start_all(&mut self) -> Result<(), RecordError> {
        self.color.start()?;
        self.depth.start()?;
        self.smooth_depth.start()?;
        self.depth_confidence.start()?;
        self.smooth_depth_confidence.start()?;
        self.light_estimate.start()?;
        self.camera.start()?;
        self.env_probe.start()?;
        self.plane_anchor.start()?;
        self.anchor.start()?;
        Ok(())
    }

    fn stop_all(&mut self) {
        // Independent sinks; a failing stop must not keep the rest open.
        let stops: [(&str, Result<(), RecordError>); 10] = [
            ("color", self.color.stop()),
            ("depth", self.depth.stop()),
            ("smooth depth", self.smooth_depth.stop()),
            ("depth confidence", self.depth_confidence.stop()),
            ("smooth depth confidence", self.smooth_depth_confidence.stop()),
            ("light estimate", self.light_estimate.stop()),
            ("camera", self.camera.stop()),
            ("environment probe", self.env_probe.stop()),
            ("plane anchor", self.plane_anchor.stop()),
            ("anchor", self.anchor.stop()),
        ];
        for (name, result) in stops {
            if let Err(e) = result {
                log::warn!("failed to stop {name} writer: {e}");
            }
        }
    }
}

/// Orchestrates one recording: fans every frame tick out to the stream
/// writers, dispatches anchor events, and finalizes the session.
///
/// ```text
///            on_tick ──→ [video][depth×4][light][camera]
/// producer ─ on_anchor ─→ match kind → [probe ring][plane][anchor]
///            start/stop → catalog.allocate / catalog.save
/// ```
///
/// The producer delivers ticks and anchor events serially on one call
/// path; nothing here blocks on GPU completion or the probe writer's
/// disk queue. Any writer failure aborts the recording: the session is
/// stopped and saved with the frames written so far, partial artifacts
/// stay on disk, and the caller sees the recorder back in `Idle`.
pub struct RecordingCoordinator {
    catalog: SessionCatalog,
    device: Arc<dyn TextureDevice>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
    state: RecorderState,
    frame_counter: u64,
    first_frame: bool,
    active: Option<ActiveRecording>,
}

impl RecordingCoordinator {
    pub fn new(catalog: SessionCatalog, device: Arc<dyn TextureDevice>) -> Self {
        Self {
            catalog,
            device,
            delegate: None,
            state: RecorderState::Idle,
            frame_counter: 0,
            first_frame: true,
            active: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecorderDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Frames successfully written in the running (or last) recording.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref().map(|a| &a.session)
    }

    pub fn catalog(&self) -> &SessionCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut SessionCatalog {
        &mut self.catalog
    }

    /// Allocate a session and start every writer. No-op when already
    /// recording.
    pub fn start_recording(&mut self, config: RecorderConfig) -> Result<(), RecordError> {
        if self.state.is_recording() {
            return Ok(());
        }

        config
            .validate()
            .map_err(RecordError::ConfigurationFailed)?;

        let session = self
            .catalog
            .allocate(&config.model_name, config.viewport_size)?;
        let session_path = self.catalog.session_path(&session);

        let encoder = config
            .encoder_factory
            .make_encoder(&session_path.join(&config.video_file_name))
            .map_err(RecordError::EncodingFailed)?;

        let mut active = ActiveRecording {
            session,
            session_path: session_path.clone(),
            color: VideoStreamWriter::new(encoder, config.fps),
            depth: PixelBufferWriter::new(&session_path, DEPTH_FILE),
            smooth_depth: PixelBufferWriter::new(&session_path, SMOOTH_DEPTH_FILE),
            depth_confidence: PixelBufferWriter::new(&session_path, DEPTH_CONFIDENCE_FILE),
            smooth_depth_confidence: PixelBufferWriter::new(
                &session_path,
                SMOOTH_DEPTH_CONFIDENCE_FILE,
            ),
            light_estimate: LightEstimateWriter::new(&session_path, LIGHT_ESTIMATE_FILE),
            camera: CameraPoseWriter::new(&session_path, CAMERA_FILE),
            env_probe: EnvironmentProbeWriter::new(
                &session_path,
                ENV_PROBE_FILE,
                Arc::clone(&self.device),
            ),
            plane_anchor: PlaneAnchorWriter::new(&session_path, PLANE_ANCHOR_FILE),
            anchor: AnchorWriter::new(&session_path, ANCHOR_FILE),
        };
        active.start_all()?;

        log::info!("started recording {}", active.session.identifier());
        self.active = Some(active);
        self.frame_counter = 0;
        self.first_frame = true;
        self.set_state(RecorderState::Recording);
        Ok(())
    }

    /// Feed one frame tick. Ignored when idle; an incomplete payload or
    /// any writer failure aborts the recording and returns the error.
    pub fn on_tick(&mut self, tick: &FrameTick) -> Result<(), RecordError> {
        if !self.state.is_recording() {
            return Ok(());
        }
        match self.write_tick(tick) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.abort(e)),
        }
    }

    fn write_tick(&mut self, tick: &FrameTick) -> Result<(), RecordError> {
        // An incomplete payload is a stream-source fault, not a
        // skippable frame.
        let complete = tick.complete()?;

        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };

        let frame = self.frame_counter;
        active.color.write(complete.color_image, frame)?;
        active.depth.write(complete.depth_map, frame)?;
        active.smooth_depth.write(complete.smoothed_depth_map, frame)?;
        active.depth_confidence.write(complete.depth_confidence, frame)?;
        active
            .smooth_depth_confidence
            .write(complete.smoothed_depth_confidence, frame)?;
        active.light_estimate.write(complete.light_estimate, frame)?;
        active.camera.write(complete.camera, frame)?;

        if self.first_frame {
            active.session.color_size =
                FrameSize::new(complete.color_image.width, complete.color_image.height);
            active.session.depth_size = FrameSize::new(
                complete.smoothed_depth_map.width,
                complete.smoothed_depth_map.height,
            );
            self.first_frame = false;
        }

        self.frame_counter += 1;
        Ok(())
    }

    /// Feed one anchor event, dispatched on the anchor kind. Ignored
    /// when idle; a writer failure aborts the recording.
    pub fn on_anchor_event(
        &mut self,
        anchor: &Anchor,
        status: AnchorEventStatus,
    ) -> Result<(), RecordError> {
        if !self.state.is_recording() {
            return Ok(());
        }
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };

        let frame = self.frame_counter;
        let result = match &anchor.kind {
            AnchorKind::EnvironmentProbe(_) => active.env_probe.write(anchor, frame, status),
            AnchorKind::Plane(_) => active.plane_anchor.write(anchor, frame, status),
            AnchorKind::Generic => active.anchor.write(anchor, frame, status),
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!(
                    "error saving anchor {} in frame {frame}, recording stopped",
                    anchor.identifier
                );
                Err(self.abort(e))
            }
        }
    }

    /// Stop every writer, persist the final frame count, return to idle.
    /// No-op when not recording. Does not wait for the video finalize or
    /// in-flight probe copies.
    pub fn stop_recording(&mut self) -> Result<(), RecordError> {
        if !self.state.is_recording() {
            return Ok(());
        }
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };

        active.stop_all();

        for name in [
            CAMERA_FILE,
            LIGHT_ESTIMATE_FILE,
            ANCHOR_FILE,
            PLANE_ANCHOR_FILE,
            ENV_PROBE_FILE,
        ] {
            match sha256_file(&active.session_path.join(name)) {
                Ok(checksum) => {
                    active.session.checksums.insert(name.to_string(), checksum);
                }
                Err(e) => log::warn!("no checksum for {name}: {e}"),
            }
        }

        active.session.number_of_frames = self.frame_counter as i64;
        let saved = self.catalog.save(&active.session);
        match &saved {
            Ok(()) => log::info!(
                "finished recording {} with {} frames",
                active.session.identifier(),
                self.frame_counter
            ),
            Err(e) => log::error!("failed to save session metadata: {e}"),
        }

        self.set_state(RecorderState::Idle);
        saved
    }

    fn abort(&mut self, error: RecordError) -> RecordError {
        log::error!("aborting recording after {} frames: {error}", self.frame_counter);
        if let Some(delegate) = &self.delegate {
            delegate.on_error(&error);
        }
        if let Err(e) = self.stop_recording() {
            log::error!("stop after abort failed: {e}");
        }
        error
    }

    fn set_state(&mut self, state: RecorderState) {
        self.state = state;
        if let Some(delegate) = &self.delegate {
            delegate.on_state_changed(&state);
        }
    }
}
