//! cpal output backend
//!
//! Each started tone gets a dedicated audio thread that owns the cpal
//! stream and the signal graph; the callback renders under try_lock and
//! falls back to silence on contention. Stream creation is confirmed
//! through a rendezvous channel so start() can report device failures
//! synchronously.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::backend::{ActiveTone, AudioBackend, AudioError, DETAIL_FFT_SIZE, DISPLAY_FFT_SIZE};
use crate::config::SessionConfig;
use crate::graph::ToneGraph;
use entrain_analysis::shared_tap;

/// Commands sent to the audio thread
enum EngineCommand {
    SetVolume(f32),
    Shutdown,
}

/// How long start() waits for the audio thread to confirm the stream
const START_TIMEOUT: Duration = Duration::from_secs(2);
/// Command poll period on the audio thread
const COMMAND_POLL: Duration = Duration::from_millis(100);

struct RunningTone {
    cmd_tx: Sender<EngineCommand>,
    open: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Production backend playing through the default cpal output device
#[derive(Default)]
pub struct CpalBackend {
    running: Option<RunningTone>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self, config: &SessionConfig) -> Result<ActiveTone, AudioError> {
        // Never two overlapping graphs
        self.stop();
        config.validate()?;

        let (cmd_tx, cmd_rx) = bounded(64);
        let (ready_tx, ready_rx) = bounded(1);
        let open = Arc::new(AtomicBool::new(true));

        let thread_config = *config;
        let thread_open = open.clone();
        let handle = thread::spawn(move || {
            run_output_thread(thread_config, cmd_rx, ready_tx, thread_open);
        });

        match ready_rx.recv_timeout(START_TIMEOUT) {
            Ok(Ok(tone)) => {
                self.running = Some(RunningTone {
                    cmd_tx,
                    open,
                    handle: Some(handle),
                });
                Ok(tone)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                open.store(false, Ordering::Relaxed);
                Err(AudioError::ResourceUnavailable(
                    "audio thread did not respond".into(),
                ))
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(running) = &self.running {
            let _ = running.cmd_tx.try_send(EngineCommand::SetVolume(volume));
        }
    }

    fn stop(&mut self) {
        if let Some(mut running) = self.running.take() {
            // Best-effort teardown: a wedged audio thread must not keep the
            // session from transitioning to idle
            let _ = running.cmd_tx.try_send(EngineCommand::Shutdown);
            if let Some(handle) = running.handle.take() {
                let _ = handle.join();
            }
            running.open.store(false, Ordering::Relaxed);
        }
    }

    fn is_open(&self) -> bool {
        self.running
            .as_ref()
            .map(|r| r.open.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_output_thread(
    config: SessionConfig,
    cmd_rx: Receiver<EngineCommand>,
    ready_tx: Sender<Result<ActiveTone, AudioError>>,
    open: Arc<AtomicBool>,
) {
    let host = cpal::default_host();
    let device = match host.default_output_device() {
        Some(d) => d,
        None => {
            open.store(false, Ordering::Relaxed);
            let _ = ready_tx.send(Err(AudioError::ResourceUnavailable(
                "no audio output device found".into(),
            )));
            return;
        }
    };

    let stream_config = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            open.store(false, Ordering::Relaxed);
            let _ = ready_tx.send(Err(AudioError::ResourceUnavailable(format!(
                "failed to get audio config: {e}"
            ))));
            return;
        }
    };

    let sample_rate = stream_config.sample_rate().0;
    let channels = stream_config.channels() as usize;

    let detail_tap = shared_tap(DETAIL_FFT_SIZE);
    let display_tap = shared_tap(DISPLAY_FFT_SIZE);
    let graph = Arc::new(Mutex::new(ToneGraph::new(
        &config,
        sample_rate,
        detail_tap.clone(),
        display_tap.clone(),
    )));
    let graph_for_callback = graph.clone();

    // Pre-allocated stereo buffer for non-stereo devices (no allocation in
    // the audio callback)
    let mut stereo_buf = vec![0.0f32; 16384];

    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // try_lock: on contention output silence rather than blocking
            // the real-time thread
            if let Some(mut graph) = graph_for_callback.try_lock() {
                if channels == 2 {
                    graph.process(data);
                } else {
                    let frames = data.len() / channels;
                    let stereo = &mut stereo_buf[..frames * 2];
                    graph.process(stereo);
                    for (i, frame) in data.chunks_exact_mut(channels).enumerate() {
                        let l = stereo[i * 2];
                        let r = stereo[i * 2 + 1];
                        match frame.len() {
                            1 => frame[0] = (l + r) * 0.5,
                            _ => {
                                frame[0] = l;
                                frame[1] = r;
                                for extra in frame.iter_mut().skip(2) {
                                    *extra = 0.0;
                                }
                            }
                        }
                    }
                }
            } else {
                data.fill(0.0);
            }
        },
        |err| {
            warn!("audio stream error: {err}");
        },
        None,
    );

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            open.store(false, Ordering::Relaxed);
            let _ = ready_tx.send(Err(AudioError::ResourceUnavailable(format!(
                "failed to create audio stream: {e}"
            ))));
            return;
        }
    };

    if let Err(e) = stream.play() {
        open.store(false, Ordering::Relaxed);
        let _ = ready_tx.send(Err(AudioError::ResourceUnavailable(format!(
            "failed to start audio: {e}"
        ))));
        return;
    }

    info!(sample_rate, channels, "audio output started");
    let _ = ready_tx.send(Ok(ActiveTone {
        sample_rate,
        detail_tap,
        display_tap,
    }));

    // Command loop; exits on shutdown or when the backend handle is dropped
    loop {
        match cmd_rx.recv_timeout(COMMAND_POLL) {
            Ok(EngineCommand::SetVolume(v)) => graph.lock().set_volume(v),
            Ok(EngineCommand::Shutdown) => break,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    drop(stream);
    open.store(false, Ordering::Relaxed);
    info!("audio output closed");
}
