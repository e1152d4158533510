//! Pure-Rust packed-to-planar conversion.

use super::{ResampleParams, Resampler};
use crate::error::EngineError;

/// Splits interleaved samples into per-channel buffers
///
/// Only layout changes are supported: input and output must share the same
/// sample width and rate.
#[derive(Debug, Default)]
pub struct Deinterleaver {
    params: Option<ResampleParams>,
    planes: Vec<Vec<u8>>,
}

impl Deinterleaver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resampler for Deinterleaver {
    fn configure(&mut self, params: &ResampleParams) -> Result<(), EngineError> {
        if params.in_format.is_planar()
            || !params.out_format.is_planar()
            || params.in_format != params.out_format.packed()
        {
            return Err(EngineError::ResamplerCreate(format!(
                "cannot convert {:?} to {:?} without resampling",
                params.in_format, params.out_format
            )));
        }
        if params.channels == 0 {
            return Err(EngineError::ResamplerCreate("zero channels".into()));
        }

        if self.planes.len() != params.channels as usize {
            self.planes = vec![Vec::new(); params.channels as usize];
        }
        self.params = Some(*params);
        Ok(())
    }

    fn close(&mut self) {
        self.params = None;
    }

    fn convert(&mut self, input: &[u8], samples: usize) -> Result<usize, EngineError> {
        let params = self
            .params
            .ok_or_else(|| EngineError::Convert("resampler is not configured".into()))?;
        let bps = params.in_format.bytes_per_sample();
        let channels = params.channels as usize;
        let group = bps * channels;

        let available = (input.len() / group).min(samples);
        for plane in &mut self.planes {
            plane.resize(available * bps, 0);
        }
        for (i, chunk) in input.chunks_exact(group).take(available).enumerate() {
            for (ch, plane) in self.planes.iter_mut().enumerate() {
                plane[i * bps..(i + 1) * bps].copy_from_slice(&chunk[ch * bps..(ch + 1) * bps]);
            }
        }
        Ok(available)
    }

    fn planes(&self) -> &[Vec<u8>] {
        &self.planes
    }
}
