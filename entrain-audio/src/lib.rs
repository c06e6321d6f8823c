//! Audio engine for ENTRAIN - signal graph, output backend, offline export
//!
//! This crate provides the tone-generation pipeline:
//! - ToneGraph: oscillators, analysis tap feeds, compressor, master gain
//! - CpalBackend: live playback through the default output device
//! - render/wav: offline session rendering and WAV encoding

mod backend;
mod compressor;
mod config;
mod engine;
mod graph;
mod osc;
mod render;
mod wav;

pub use backend::{
    ActiveTone, AudioBackend, AudioError, NullBackend, DETAIL_FFT_SIZE, DISPLAY_FFT_SIZE,
};
pub use compressor::DynamicsCompressor;
pub use config::{InvalidConfig, Mode, SessionConfig};
pub use engine::CpalBackend;
pub use graph::ToneGraph;
pub use osc::SineOscillator;
pub use render::{
    export_file_name, render_session, RenderedAudio, EXPORT_CHANNELS, EXPORT_SAMPLE_RATE,
};
pub use wav::{encode_wav, WavError};
