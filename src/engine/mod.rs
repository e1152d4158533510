//! Codec engine and resample adapter seams
//!
//! The driving loop talks to its collaborators only through these traits:
//! - [`CodecEngine`]: synchronous encoder consuming exactly one frame per call
//! - [`Resampler`]: packed-to-planar conversion of one frame, no rate change
//!
//! A pure-Rust [`Deinterleaver`] is always available; libavcodec and
//! libswresample backends live behind the `ffmpeg` feature.

mod deinterleave;
#[cfg(feature = "ffmpeg")]
pub mod lavc;

pub use deinterleave::Deinterleaver;

use crate::error::EngineError;
use crate::format::SampleFormat;
use crate::profile::CodecProfile;

/// One frame of PCM handed to the engine
#[derive(Debug, Clone, Copy)]
pub enum FrameRef<'a> {
    /// Interleaved samples, all channels in one buffer
    Interleaved(&'a [u8]),
    /// One buffer per channel
    Planar(&'a [Vec<u8>]),
}

/// Parameters the engine is opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    pub channels: u16,
    pub rate: u32,
    pub bit_rate: u32,
    /// Format the engine consumes, possibly planar
    pub sample_format: SampleFormat,
}

/// A synchronous frame encoder
pub trait CodecEngine {
    /// Constants of the codec family this engine produces.
    fn profile(&self) -> &'static CodecProfile;

    /// Sample formats the engine accepts, in order of preference.
    fn sample_formats(&self) -> &[SampleFormat];

    /// Open (or reopen) the encoder. Any previously open state is discarded.
    fn open(&mut self, params: &EngineParams) -> Result<(), EngineError>;

    /// Release the open encoder. Closing a closed engine is a no-op.
    fn close(&mut self);

    /// Samples per channel the open encoder consumes per call; 0 when closed.
    fn frame_size(&self) -> usize;

    /// Encode one frame of `frame_size()` samples into `dst`.
    ///
    /// Returns the payload length. `Ok(0)` means the encoder buffered the
    /// frame and has nothing to emit yet.
    fn encode(&mut self, frame: FrameRef<'_>, dst: &mut [u8]) -> Result<usize, EngineError>;
}

/// Parameters for a same-rate sample format conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleParams {
    pub channels: u16,
    pub rate: u32,
    pub in_format: SampleFormat,
    pub out_format: SampleFormat,
}

/// Converts interleaved frames into the planar layout an engine needs
pub trait Resampler {
    fn configure(&mut self, params: &ResampleParams) -> Result<(), EngineError>;

    fn close(&mut self);

    /// Convert `samples` samples per channel from `input`.
    ///
    /// Returns how many samples per channel were written to [`planes`](Self::planes).
    fn convert(&mut self, input: &[u8], samples: usize) -> Result<usize, EngineError>;

    /// Output of the last conversion, one buffer per channel.
    fn planes(&self) -> &[Vec<u8>];
}

/// Pick the format upstream must deliver for an engine.
///
/// Takes the first engine format whose interleaved form is S16 or F32.
/// Returns `(engine_format, upstream_format)`.
pub fn select_sample_format(formats: &[SampleFormat]) -> Option<(SampleFormat, SampleFormat)> {
    formats.iter().find_map(|&f| match f.packed() {
        packed @ (SampleFormat::S16 | SampleFormat::F32) => Some((f, packed)),
        _ => None,
    })
}
