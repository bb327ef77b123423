use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;

use parking_lot::Mutex;
use serde::Serialize;

use crate::encoding::raw_frame;
use crate::models::anchor::{Anchor, AnchorEventStatus, AnchorKind};
use crate::models::error::RecordError;
use crate::models::state::{WriterState, WriterStatus};
use crate::storage::json_document::JsonDocumentWriter;
use crate::traits::texture_device::{CubemapTexture, TextureDevice, CUBEMAP_FACES};
use crate::traits::writer::{AnchorEventWriter, StreamWriter};

/// Number of reusable cubemap buffers kept in flight.
pub const RING_CAPACITY: usize = 4;

#[derive(Serialize)]
struct EnvironmentProbeRecord {
    frame: u64,
    name: String,
    identifier: String,
    transform: [f32; 16],
    extent: [f32; 3],
    status: u8,
    texture_update: bool,
}

struct RingCursors {
    /// Slots with a copy command submitted.
    issued: u64,
    /// Slots whose readback has completed and been handed to disk.
    retired: u64,
}

struct FaceWriteJob {
    path: PathBuf,
    bytes: Vec<u8>,
}

/// Records environment-probe anchor events and persists their cubemaps.
///
/// Two independent paths per event:
///
/// - A JSON record is appended synchronously on every call, texture or
///   not, and flushed to `env_probe.json` at `stop`.
/// - When the event carries a refreshed texture, the live cubemap is
///   copied into a ring slot **before this call returns** — the producer
///   may overwrite the source immediately afterwards. The copy
///   completion (device FIFO order) reads the six faces and hands each
///   one, header-prefixed, to a background disk thread that writes
///   `<session>/<frame>/<anchor-id>/envcubemap_{0..5}.raw`.
///
/// The ring bounds readback lag: at most `RING_CAPACITY - 1` copies may
/// be in flight, and a fourth un-retired submission fails with
/// [`RecordError::CapacityViolation`] — the disk consumer cannot keep up
/// and dropping textures silently is not an option.
///
/// The originating frame number and ring slot are captured at issuance
/// into the completion closure, so attribution holds regardless of how
/// far the cursors advance before the completion fires.
///
/// `stop` closes the metadata stream only. In-flight copies keep
/// draining afterwards and their face files land once the disk queue
/// catches up.
pub struct EnvironmentProbeWriter {
    session_path: PathBuf,
    device: Arc<dyn TextureDevice>,
    doc: JsonDocumentWriter<EnvironmentProbeRecord>,
    ring: Vec<Arc<dyn CubemapTexture>>,
    cursors: Arc<Mutex<RingCursors>>,
    face_jobs: mpsc::Sender<FaceWriteJob>,
}

impl EnvironmentProbeWriter {
    pub fn new(session_path: &Path, metadata_file: &str, device: Arc<dyn TextureDevice>) -> Self {
        let (face_jobs, receiver) = mpsc::channel::<FaceWriteJob>();

        // Detached on purpose: the thread exits once every sender (ours
        // plus the ones captured by pending completions) is gone, after
        // draining whatever is still queued.
        thread::Builder::new()
            .name("cubemap-io".into())
            .spawn(move || {
                for job in receiver {
                    if let Err(e) = fs::write(&job.path, &job.bytes) {
                        log::error!("failed writing cubemap face {}: {e}", job.path.display());
                    }
                }
            })
            .expect("failed to spawn cubemap disk thread");

        Self {
            session_path: session_path.to_path_buf(),
            device,
            doc: JsonDocumentWriter::new(session_path.join(metadata_file)),
            ring: Vec::new(),
            cursors: Arc::new(Mutex::new(RingCursors {
                issued: 0,
                retired: 0,
            })),
            face_jobs,
        }
    }

    /// Copies issued but not yet retired.
    pub fn in_flight(&self) -> u64 {
        let cursors = self.cursors.lock();
        cursors.issued - cursors.retired
    }

    fn issue_copy(
        &mut self,
        anchor: &Anchor,
        texture: &Arc<dyn CubemapTexture>,
        frame: u64,
    ) -> Result<(), RecordError> {
        // The ring is sized to the first texture ever observed.
        if self.ring.is_empty() {
            let descriptor = texture.descriptor();
            for _ in 0..RING_CAPACITY {
                self.ring.push(self.device.new_cubemap(descriptor)?);
            }
        }

        let slot = {
            let mut cursors = self.cursors.lock();
            // The slot written next must not still be awaiting readback,
            // so strictly fewer than RING_CAPACITY copies may be open
            // after this submission.
            if cursors.issued - cursors.retired >= (RING_CAPACITY - 1) as u64 {
                return Err(RecordError::CapacityViolation {
                    issued: cursors.issued,
                    retired: cursors.retired,
                });
            }
            let slot = (cursors.issued % RING_CAPACITY as u64) as usize;
            cursors.issued += 1;
            slot
        };

        let slot_texture = Arc::clone(&self.ring[slot]);
        let target_dir = self
            .session_path
            .join(frame.to_string())
            .join(anchor.identifier.to_string());
        let face_jobs = self.face_jobs.clone();
        let cursors = Arc::clone(&self.cursors);

        self.device.copy_cubemap(
            texture,
            &self.ring[slot],
            Box::new(move || {
                if let Err(e) = fs::create_dir_all(&target_dir) {
                    log::error!(
                        "failed to create cubemap directory {}: {e}",
                        target_dir.display()
                    );
                }

                let size = slot_texture.descriptor().size;
                for face in 0..CUBEMAP_FACES {
                    match slot_texture.read_face(face) {
                        Ok(data) => {
                            let job = FaceWriteJob {
                                path: target_dir.join(format!("envcubemap_{face}.raw")),
                                bytes: raw_frame::encode_plane(size, size, &data),
                            };
                            if face_jobs.send(job).is_err() {
                                log::error!("cubemap disk queue is gone, dropping face {face}");
                            }
                        }
                        Err(e) => log::error!("failed to read back cubemap face {face}: {e}"),
                    }
                }

                cursors.lock().retired += 1;
            }),
        )
    }
}

impl StreamWriter for EnvironmentProbeWriter {
    fn start(&mut self) -> Result<(), RecordError> {
        self.doc.start()
    }

    fn stop(&mut self) -> Result<(), RecordError> {
        self.doc.stop()
    }

    fn state(&self) -> WriterState {
        self.doc.state()
    }

    fn status(&self) -> WriterStatus {
        WriterStatus::Healthy
    }
}

impl AnchorEventWriter for EnvironmentProbeWriter {
    fn write(
        &mut self,
        anchor: &Anchor,
        frame: u64,
        status: AnchorEventStatus,
    ) -> Result<(), RecordError> {
        if !self.doc.state().is_started() {
            return Err(RecordError::NotStarted);
        }

        let AnchorKind::EnvironmentProbe(probe) = &anchor.kind else {
            return Err(RecordError::WriteFailure(format!(
                "anchor {} is not an environment probe",
                anchor.identifier
            )));
        };

        // A texture is only present when the probe's cubemap was
        // refreshed, not on plain add/value-change events.
        if let Some(texture) = &probe.texture {
            self.issue_copy(anchor, texture, frame)?;
        }

        self.doc.append(EnvironmentProbeRecord {
            frame,
            name: anchor.name.clone(),
            identifier: anchor.identifier.to_string(),
            transform: anchor.transform,
            extent: probe.extent,
            status: status.code(),
            texture_update: probe.texture.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::software_device::SoftwareDevice;
    use crate::models::anchor::EnvironmentProbeData;
    use crate::traits::texture_device::{PixelFormat, TextureDescriptor};
    use std::time::{Duration, Instant};
    use uuid::Uuid;

    fn descriptor() -> TextureDescriptor {
        TextureDescriptor::new(2, PixelFormat::Rgba8Unorm)
    }

    fn probe_anchor(device: &SoftwareDevice, fill: Option<u8>) -> Anchor {
        let texture = fill.map(|byte| {
            let texture = device.new_cubemap(descriptor()).unwrap();
            let face = vec![byte; descriptor().face_byte_len()];
            for i in 0..CUBEMAP_FACES {
                texture.write_face(i, &face).unwrap();
            }
            texture
        });
        Anchor {
            identifier: Uuid::new_v4(),
            name: String::new(),
            transform: [0.0; 16],
            kind: AnchorKind::EnvironmentProbe(EnvironmentProbeData {
                extent: [1.0, 1.0, 1.0],
                texture,
            }),
        }
    }

    fn wait_for(path: &Path) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if path.is_file() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn write_before_start_fails() {
        let dir = tempfile::tempdir().unwrap();
        let device = Arc::new(SoftwareDevice::paused());
        let mut writer = EnvironmentProbeWriter::new(dir.path(), "env_probe.json", device.clone());

        let anchor = probe_anchor(&device, Some(1));
        let result = writer.write(&anchor, 0, AnchorEventStatus::Added);
        assert_eq!(result, Err(RecordError::NotStarted));
        assert_eq!(device.pending(), 0);
    }

    #[test]
    fn textureless_event_only_records_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let device = Arc::new(SoftwareDevice::paused());
        let mut writer = EnvironmentProbeWriter::new(dir.path(), "env_probe.json", device.clone());
        writer.start().unwrap();

        let anchor = probe_anchor(&device, None);
        writer.write(&anchor, 2, AnchorEventStatus::Added).unwrap();
        writer.stop().unwrap();

        assert_eq!(device.pending(), 0);
        assert_eq!(writer.in_flight(), 0);

        let json = std::fs::read_to_string(dir.path().join("env_probe.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["frame"], 2);
        assert_eq!(value[0]["texture_update"], false);
        assert_eq!(value[0]["status"], 0);
    }

    #[test]
    fn fourth_unretired_copy_is_a_capacity_violation() {
        let dir = tempfile::tempdir().unwrap();
        let device = Arc::new(SoftwareDevice::paused());
        let mut writer = EnvironmentProbeWriter::new(dir.path(), "env_probe.json", device.clone());
        writer.start().unwrap();

        let anchor = probe_anchor(&device, Some(1));
        for frame in 0..3 {
            writer
                .write(&anchor, frame, AnchorEventStatus::Updated)
                .unwrap();
        }
        assert_eq!(writer.in_flight(), 3);

        let result = writer.write(&anchor, 3, AnchorEventStatus::Updated);
        assert_eq!(
            result,
            Err(RecordError::CapacityViolation {
                issued: 3,
                retired: 0
            })
        );
    }

    #[test]
    fn completions_attribute_faces_to_issuance_frames() {
        let dir = tempfile::tempdir().unwrap();
        let device = Arc::new(SoftwareDevice::paused());
        let mut writer = EnvironmentProbeWriter::new(dir.path(), "env_probe.json", device.clone());
        writer.start().unwrap();

        let first = probe_anchor(&device, Some(0xAA));
        let second = probe_anchor(&device, Some(0xBB));
        writer.write(&first, 5, AnchorEventStatus::Updated).unwrap();
        writer.write(&second, 9, AnchorEventStatus::Updated).unwrap();
        assert_eq!(writer.in_flight(), 2);

        assert!(device.step());
        assert!(device.step());

        let first_face = dir
            .path()
            .join("5")
            .join(first.identifier.to_string())
            .join("envcubemap_0.raw");
        let second_face = dir
            .path()
            .join("9")
            .join(second.identifier.to_string())
            .join("envcubemap_5.raw");
        assert!(wait_for(&first_face));
        assert!(wait_for(&second_face));
        assert_eq!(writer.in_flight(), 0);

        let bytes = fs::read(&first_face).unwrap();
        assert_eq!(raw_frame::decode_header(&bytes), Some((2, 2)));
        assert!(bytes[raw_frame::RAW_HEADER_SIZE..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn ring_accepts_new_copies_after_retirement() {
        let dir = tempfile::tempdir().unwrap();
        let device = Arc::new(SoftwareDevice::paused());
        let mut writer = EnvironmentProbeWriter::new(dir.path(), "env_probe.json", device.clone());
        writer.start().unwrap();

        let anchor = probe_anchor(&device, Some(1));
        for frame in 0..3 {
            writer
                .write(&anchor, frame, AnchorEventStatus::Updated)
                .unwrap();
        }
        assert!(device.step());

        writer.write(&anchor, 3, AnchorEventStatus::Updated).unwrap();
        assert_eq!(writer.in_flight(), 3);
    }

    #[test]
    fn stop_does_not_drain_in_flight_copies() {
        let dir = tempfile::tempdir().unwrap();
        let device = Arc::new(SoftwareDevice::new());
        let mut writer = EnvironmentProbeWriter::new(dir.path(), "env_probe.json", device.clone());
        writer.start().unwrap();

        let anchor = probe_anchor(&device, Some(7));
        writer.write(&anchor, 0, AnchorEventStatus::Added).unwrap();
        writer.stop().unwrap();

        assert!(dir.path().join("env_probe.json").is_file());
        for face in 0..CUBEMAP_FACES {
            let path = dir
                .path()
                .join("0")
                .join(anchor.identifier.to_string())
                .join(format!("envcubemap_{face}.raw"));
            assert!(wait_for(&path), "face {face} never appeared");
        }
    }
}
