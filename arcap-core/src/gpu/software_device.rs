use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use crate::models::error::RecordError;
use crate::traits::texture_device::{
    CopyCompletionHandler, CubemapTexture, TextureDescriptor, TextureDevice, CUBEMAP_FACES,
};

/// CPU-resident cubemap backing the software device.
struct SoftwareCubemap {
    descriptor: TextureDescriptor,
    faces: Mutex<Vec<Vec<u8>>>,
}

impl SoftwareCubemap {
    fn new(descriptor: TextureDescriptor) -> Self {
        let face_len = descriptor.face_byte_len();
        Self {
            descriptor,
            faces: Mutex::new(vec![vec![0u8; face_len]; CUBEMAP_FACES]),
        }
    }
}

impl CubemapTexture for SoftwareCubemap {
    fn descriptor(&self) -> TextureDescriptor {
        self.descriptor
    }

    fn read_face(&self, face: usize) -> Result<Vec<u8>, RecordError> {
        if face >= CUBEMAP_FACES {
            return Err(RecordError::WriteFailure(format!(
                "cubemap face {face} out of range"
            )));
        }
        Ok(self.faces.lock()[face].clone())
    }

    fn write_face(&self, face: usize, data: &[u8]) -> Result<(), RecordError> {
        if face >= CUBEMAP_FACES {
            return Err(RecordError::WriteFailure(format!(
                "cubemap face {face} out of range"
            )));
        }
        if data.len() != self.descriptor.face_byte_len() {
            return Err(RecordError::WriteFailure(format!(
                "cubemap face upload of {} bytes, expected {}",
                data.len(),
                self.descriptor.face_byte_len()
            )));
        }
        self.faces.lock()[face] = data.to_vec();
        Ok(())
    }
}

type CopyJob = Box<dyn FnOnce() + Send + 'static>;

struct DeviceShared {
    queue: Mutex<VecDeque<CopyJob>>,
    work_available: Condvar,
    shutdown: AtomicBool,
}

/// Software implementation of [`TextureDevice`].
///
/// Copies run on one named worker thread draining a FIFO queue, so
/// completions fire exactly once each and in submission order — the
/// ordering the ring writer requires from any real device.
///
/// A device built with [`SoftwareDevice::paused`] spawns no worker;
/// submitted copies stay queued until [`SoftwareDevice::step`] releases
/// them one at a time, which makes ring-cursor tests deterministic.
pub struct SoftwareDevice {
    shared: Arc<DeviceShared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl SoftwareDevice {
    pub fn new() -> Self {
        let mut device = Self::paused();

        let shared = Arc::clone(&device.shared);
        let worker = thread::Builder::new()
            .name("texture-copy".into())
            .spawn(move || {
                loop {
                    let job = {
                        let mut queue = shared.queue.lock();
                        loop {
                            if let Some(job) = queue.pop_front() {
                                break Some(job);
                            }
                            if shared.shutdown.load(Ordering::SeqCst) {
                                break None;
                            }
                            shared.work_available.wait(&mut queue);
                        }
                    };
                    match job {
                        Some(job) => job(),
                        None => return,
                    }
                }
            })
            .expect("failed to spawn texture copy thread");

        device.worker = Some(worker);
        device
    }

    /// A device that holds submitted copies until `step` is called.
    pub fn paused() -> Self {
        Self {
            shared: Arc::new(DeviceShared {
                queue: Mutex::new(VecDeque::new()),
                work_available: Condvar::new(),
                shutdown: AtomicBool::new(false),
            }),
            worker: None,
        }
    }

    /// Run the oldest queued copy on the calling thread.
    ///
    /// Returns `false` when the queue is empty. Only meaningful on a
    /// paused device.
    pub fn step(&self) -> bool {
        let job = self.shared.queue.lock().pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Number of submitted copies not yet executed.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SoftwareDevice {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.work_available.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl TextureDevice for SoftwareDevice {
    fn new_cubemap(
        &self,
        descriptor: TextureDescriptor,
    ) -> Result<Arc<dyn CubemapTexture>, RecordError> {
        Ok(Arc::new(SoftwareCubemap::new(descriptor)))
    }

    fn copy_cubemap(
        &self,
        source: &Arc<dyn CubemapTexture>,
        destination: &Arc<dyn CubemapTexture>,
        on_complete: CopyCompletionHandler,
    ) -> Result<(), RecordError> {
        if source.descriptor() != destination.descriptor() {
            return Err(RecordError::WriteFailure(
                "cubemap copy between mismatched descriptors".into(),
            ));
        }

        let source = Arc::clone(source);
        let destination = Arc::clone(destination);
        let job: CopyJob = Box::new(move || {
            for face in 0..CUBEMAP_FACES {
                let copied = source
                    .read_face(face)
                    .and_then(|data| destination.write_face(face, &data));
                if let Err(e) = copied {
                    log::error!("cubemap copy failed on face {face}: {e}");
                }
            }
            // The completion fires even when a face copy failed, exactly
            // once per submission.
            on_complete();
        });

        self.shared.queue.lock().push_back(job);
        self.shared.work_available.notify_one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::texture_device::PixelFormat;
    use std::sync::mpsc;
    use std::time::Duration;

    fn descriptor() -> TextureDescriptor {
        TextureDescriptor::new(2, PixelFormat::Rgba8Unorm)
    }

    fn filled_cubemap(device: &SoftwareDevice, byte: u8) -> Arc<dyn CubemapTexture> {
        let texture = device.new_cubemap(descriptor()).unwrap();
        let face = vec![byte; descriptor().face_byte_len()];
        for i in 0..CUBEMAP_FACES {
            texture.write_face(i, &face).unwrap();
        }
        texture
    }

    #[test]
    fn face_upload_round_trip() {
        let device = SoftwareDevice::paused();
        let texture = filled_cubemap(&device, 9);
        assert_eq!(texture.read_face(5).unwrap(), vec![9; 16]);
    }

    #[test]
    fn rejects_bad_face_index_and_length() {
        let device = SoftwareDevice::paused();
        let texture = device.new_cubemap(descriptor()).unwrap();

        assert!(texture.read_face(6).is_err());
        assert!(texture.write_face(0, &[0u8; 3]).is_err());
    }

    #[test]
    fn paused_copy_waits_for_step() {
        let device = SoftwareDevice::paused();
        let src = filled_cubemap(&device, 42);
        let dst = device.new_cubemap(descriptor()).unwrap();

        let (tx, rx) = mpsc::channel();
        device
            .copy_cubemap(&src, &dst, Box::new(move || tx.send(()).unwrap()))
            .unwrap();

        assert_eq!(device.pending(), 1);
        assert!(rx.try_recv().is_err());
        assert_eq!(dst.read_face(0).unwrap(), vec![0; 16]);

        assert!(device.step());
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(dst.read_face(0).unwrap(), vec![42; 16]);
        assert!(!device.step());
    }

    #[test]
    fn completions_fire_in_submission_order() {
        let device = SoftwareDevice::new();
        let src = filled_cubemap(&device, 1);

        let (tx, rx) = mpsc::channel();
        for i in 0..4u32 {
            let dst = device.new_cubemap(descriptor()).unwrap();
            let tx = tx.clone();
            device
                .copy_cubemap(&src, &dst, Box::new(move || tx.send(i).unwrap()))
                .unwrap();
        }

        let order: Vec<u32> = (0..4)
            .map(|_| rx.recv_timeout(Duration::from_secs(1)).unwrap())
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn mismatched_descriptors_rejected() {
        let device = SoftwareDevice::paused();
        let src = device.new_cubemap(descriptor()).unwrap();
        let dst = device
            .new_cubemap(TextureDescriptor::new(4, PixelFormat::Rgba16Float))
            .unwrap();

        assert!(device.copy_cubemap(&src, &dst, Box::new(|| {})).is_err());
    }
}
