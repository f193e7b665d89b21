use crate::{CoreResult, MiseError};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        {Arc, Mutex},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Maximum mono samples buffered between drains (5 minutes at 48kHz).
///
/// **Memory footprint at max capacity:**
/// - 48,000 Hz * 60s * 5 min * 4 bytes/f32 = ~58MB
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Records mono audio from the default input device.
///
/// Not `Send` once started: the cpal stream must stay on the thread that
/// built it, so capture workers create their own capturer.
pub struct AudioCapturer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Set before the stream is dropped so a late callback writes nothing.
    shutdown: Arc<AtomicBool>,
}

impl AudioCapturer {
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(MiseError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| MiseError::device(format!("Failed to get config: {}", e)))?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "AudioCapturer initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Whether the host has a default input device at all.
    pub fn input_device_present() -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);
        let channels = usize::from(self.config.channels.max(1));

        self.shutdown.store(false, Ordering::Release);
        lock_samples(&self.samples).clear();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let mut buf = lock_samples(&samples);
                    buf.extend(downmix(data, channels));
                    while buf.len() > MAX_BUFFER_SAMPLES {
                        buf.pop_front();
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| MiseError::device(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| MiseError::device(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(())
    }

    /// Drain everything recorded since the last drain.
    pub fn take_samples(&self) -> Vec<f32> {
        lock_samples(&self.samples).drain(..).collect()
    }

    /// Stop recording and return the samples not yet drained.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> Vec<f32> {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Some backends return from drop before the final callback.
            std::thread::sleep(std::time::Duration::from_millis(5));
            info!("Audio capture stopped");
        }

        let samples = self.take_samples();
        debug!(sample_count = samples.len(), "Captured audio samples");
        samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

impl Drop for AudioCapturer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
    }
}

/// Average interleaved frames down to one channel.
pub(crate) fn downmix(data: &[f32], channels: usize) -> impl Iterator<Item = f32> + '_ {
    let channels = channels.max(1);
    data.chunks(channels)
        .map(move |frame| frame.iter().sum::<f32>() / frame.len() as f32)
}

// A poisoned lock still holds valid samples.
fn lock_samples(samples: &Mutex<VecDeque<f32>>) -> std::sync::MutexGuard<'_, VecDeque<f32>> {
    samples.lock().unwrap_or_else(|e| {
        error!("Sample buffer lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}
