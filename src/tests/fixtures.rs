//! Test fixtures
//!
//! A deterministic stand-in for the codec engine: its payload depends only on
//! the frame it is given, and it counts every call so tests can observe
//! reopen behaviour.

use crate::config::FilterConfig;
use crate::engine::{CodecEngine, Deinterleaver, EngineParams, FrameRef, ResampleParams, Resampler};
use crate::error::EngineError;
use crate::filter::EncodeFilter;
use crate::format::{InputStream, SampleFormat};
use crate::negotiate::Negotiation;
use crate::profile::{CodecProfile, AC3};

/// Counting fake encoder
#[derive(Debug, Clone)]
pub struct FakeEngine {
    pub formats: Vec<SampleFormat>,
    pub payload_len: usize,
    /// Encode calls that buffer the frame and emit nothing
    pub delay_frames: usize,
    /// Zero-based encode call that fails
    pub fail_on_frame: Option<usize>,
    pub fail_open: bool,
    /// Frame size reported after open, instead of the profile's
    pub frame_size_override: Option<usize>,

    pub opens: usize,
    pub closes: usize,
    pub encodes: usize,
    pub params: Option<EngineParams>,
    /// Bytes of the most recent frame, planes concatenated
    pub last_frame: Vec<u8>,
    pub last_was_planar: bool,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            formats: vec![SampleFormat::S16],
            payload_len: 512,
            delay_frames: 0,
            fail_on_frame: None,
            fail_open: false,
            frame_size_override: None,
            opens: 0,
            closes: 0,
            encodes: 0,
            params: None,
            last_frame: Vec::new(),
            last_was_planar: false,
        }
    }
}

/// Fold `data` into a payload of `len` bytes starting with the AC-3 sync word.
pub fn digest(data: &[u8], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if len < 2 {
        return out;
    }
    out[0] = 0x0B;
    out[1] = 0x77;
    let body = len - 2;
    if body == 0 {
        return out;
    }
    for (i, b) in data.iter().enumerate() {
        out[2 + i % body] ^= b.rotate_left((i / body) as u32 % 8);
    }
    out
}

impl CodecEngine for FakeEngine {
    fn profile(&self) -> &'static CodecProfile {
        &AC3
    }

    fn sample_formats(&self) -> &[SampleFormat] {
        &self.formats
    }

    fn open(&mut self, params: &EngineParams) -> Result<(), EngineError> {
        self.opens += 1;
        if self.fail_open {
            self.params = None;
            return Err(EngineError::EncoderOpen("refused by test".into()));
        }
        self.params = Some(*params);
        Ok(())
    }

    fn close(&mut self) {
        if self.params.take().is_some() {
            self.closes += 1;
        }
    }

    fn frame_size(&self) -> usize {
        match self.params {
            Some(_) => self.frame_size_override.unwrap_or(AC3.frame_samples),
            None => 0,
        }
    }

    fn encode(&mut self, frame: FrameRef<'_>, dst: &mut [u8]) -> Result<usize, EngineError> {
        let index = self.encodes;
        self.encodes += 1;
        if self.params.is_none() {
            return Err(EngineError::EncodeFrame("not open".into()));
        }
        if self.fail_on_frame == Some(index) {
            return Err(EngineError::EncodeFrame(format!("frame {} rejected", index)));
        }

        self.last_frame = match frame {
            FrameRef::Interleaved(data) => data.to_vec(),
            FrameRef::Planar(planes) => planes.concat(),
        };
        self.last_was_planar = matches!(frame, FrameRef::Planar(_));

        if index < self.delay_frames {
            return Ok(0);
        }
        let payload = digest(&self.last_frame, self.payload_len);
        // An oversized payload is reported but not written, like a broken engine.
        if payload.len() <= dst.len() {
            dst[..payload.len()].copy_from_slice(&payload);
        }
        Ok(payload.len())
    }
}

/// Deinterleaver that misbehaves on chosen conversion calls
#[derive(Debug, Default)]
pub struct FaultyResampler {
    pub(crate) inner: Deinterleaver,
    /// Zero-based convert call that comes up one sample short
    pub short_on_call: Option<usize>,
    /// Zero-based convert call that fails outright
    pub fail_on_call: Option<usize>,
    pub converts: usize,
}

impl Resampler for FaultyResampler {
    fn configure(&mut self, params: &ResampleParams) -> Result<(), EngineError> {
        self.inner.configure(params)
    }

    fn close(&mut self) {
        self.inner.close();
    }

    fn convert(&mut self, input: &[u8], samples: usize) -> Result<usize, EngineError> {
        let index = self.converts;
        self.converts += 1;
        if self.fail_on_call == Some(index) {
            return Err(EngineError::Convert(format!("call {} rejected", index)));
        }
        let got = self.inner.convert(input, samples)?;
        if self.short_on_call == Some(index) {
            return Ok(got.saturating_sub(1));
        }
        Ok(got)
    }

    fn planes(&self) -> &[Vec<u8>] {
        self.inner.planes()
    }
}

pub type TestFilter = EncodeFilter<FakeEngine, Deinterleaver>;

/// Deterministic PCM bytes
pub fn pcm(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u32).wrapping_mul(2_654_435_761).rotate_left(seed as u32 % 32) as u8 ^ seed)
        .collect()
}

pub fn attach(config: FilterConfig, engine: FakeEngine) -> TestFilter {
    EncodeFilter::attach(&config, engine, Deinterleaver::new()).unwrap()
}

/// A filter configured for 6-channel 48 kHz S16 input.
pub fn surround_filter(config: FilterConfig, engine: FakeEngine) -> TestFilter {
    let mut filter = attach(config, engine);
    let result = filter
        .reinit(&InputStream::pcm(6, 48000, SampleFormat::S16))
        .unwrap();
    assert!(matches!(result, Negotiation::Reconfigured(_)));
    filter
}

/// Feed `data` split at `cuts`, concatenating everything emitted.
pub fn feed_split(filter: &mut TestFilter, data: &[u8], cuts: &[usize]) -> Vec<u8> {
    let mut bounds: Vec<usize> = cuts.iter().map(|&c| c.min(data.len())).collect();
    bounds.push(0);
    bounds.push(data.len());
    bounds.sort_unstable();

    let mut out = Vec::new();
    for pair in bounds.windows(2) {
        let mut chunk = data[pair[0]..pair[1]].to_vec();
        out.extend_from_slice(filter.encode_stream(&mut chunk).unwrap());
        assert!(filter.pending_len() < filter.expect_len());
    }
    out
}
