//! Session negotiation
//!
//! Turns the stream announced by upstream into the parameters of an encoder
//! session: output channels and rate, bit rate, frame byte size and the
//! output growth factor. Opening the engine is left to the filter.

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::format::{InputStream, PcmFormat, SampleFormat, StreamEncoding};
use crate::profile::CodecProfile;

/// Outcome of a reconfiguration request
#[derive(Debug, Clone, PartialEq)]
pub enum Negotiation {
    /// Too few channels or already compressed: pass data through untouched
    Detached,
    /// A session was built; upstream must deliver `input`
    Reconfigured(NegotiatedFormat),
}

/// Formats agreed on by a successful negotiation
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiatedFormat {
    /// PCM layout the filter expects from upstream
    pub input: PcmFormat,
    /// Layout of the emitted stream: 2 channels of 16-bit words
    pub output: PcmFormat,
    /// Bit rate the engine runs at, in bps
    pub bit_rate: u32,
    /// Output bytes per input byte, worst case
    pub growth_factor: f64,
}

/// Parameters of one encoder session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub channels: u16,
    pub rate: u32,
    pub bit_rate: u32,
    pub sample_format: SampleFormat,
    /// Samples per channel per frame (N)
    pub frame_samples: usize,
    /// Bytes of upstream input per frame
    pub expect_len: usize,
    /// Output bytes reserved per frame
    pub output_unit: usize,
    pub spdif: bool,
    pub growth_factor: f64,
}

impl SessionPlan {
    pub fn format(&self) -> NegotiatedFormat {
        NegotiatedFormat {
            input: PcmFormat {
                channels: self.channels,
                rate: self.rate,
                sample_format: self.sample_format,
            },
            output: PcmFormat {
                channels: 2,
                rate: self.rate,
                sample_format: SampleFormat::S16,
            },
            bit_rate: self.bit_rate,
            growth_factor: self.growth_factor,
        }
    }
}

/// Validate a bit rate override against the profile's table.
///
/// Unsupported values are dropped with a warning so the per-channel default
/// applies instead.
pub fn resolve_bit_rate_override(profile: &CodecProfile, requested: Option<u32>) -> Option<u32> {
    let bit_rate = requested?;
    if profile.supports_bit_rate(bit_rate) {
        Some(bit_rate)
    } else {
        tracing::warn!(
            bit_rate,
            codec = profile.name,
            "unable to set unsupported bit rate, using default bit rate"
        );
        None
    }
}

/// Output sample rate for an input rate.
pub fn negotiate_rate(profile: &CodecProfile, rate: u32) -> u32 {
    if profile.sample_rates.contains(&rate) {
        rate
    } else {
        profile.fallback_sample_rate
    }
}

/// Pure negotiation over immutable inputs
#[derive(Debug, Clone)]
pub struct Negotiator {
    profile: &'static CodecProfile,
    min_channels: u16,
    bit_rate: Option<u32>,
    spdif: bool,
    sample_format: SampleFormat,
    pending_capacity: usize,
}

impl Negotiator {
    /// `sample_format` is the packed format upstream delivers.
    pub fn new(
        profile: &'static CodecProfile,
        config: &FilterConfig,
        sample_format: SampleFormat,
        pending_capacity: usize,
    ) -> Self {
        Self {
            profile,
            min_channels: config.min_channels,
            bit_rate: resolve_bit_rate_override(profile, config.bit_rate),
            spdif: config.spdif,
            sample_format,
            pending_capacity,
        }
    }

    pub fn profile(&self) -> &'static CodecProfile {
        self.profile
    }

    /// Plan a session for `input`, or `None` when the filter should detach.
    pub fn plan(&self, input: &InputStream) -> Result<Option<SessionPlan>> {
        if input.channels == 0 {
            return Err(FilterError::Config("input has no channels".into()));
        }
        if input.encoding == StreamEncoding::Ac3 || input.channels < self.min_channels {
            return Ok(None);
        }

        let profile = self.profile;
        let channels = input.channels.min(profile.max_channels);
        let rate = negotiate_rate(profile, input.rate);
        let frame_samples = profile.frame_samples;
        let expect_len = frame_samples * channels as usize * self.sample_format.bytes_per_sample();
        if expect_len > self.pending_capacity {
            return Err(FilterError::Config(format!(
                "frame of {} bytes exceeds pending buffer of {} bytes",
                expect_len, self.pending_capacity
            )));
        }

        let output_unit = profile.output_unit(self.spdif);
        let growth_factor = output_unit as f64 / expect_len as f64;
        let bit_rate = self
            .bit_rate
            .unwrap_or_else(|| profile.default_bit_rate(channels));
        if bit_rate == 0 {
            return Err(FilterError::Config(format!(
                "no bit rate available for {} channels",
                channels
            )));
        }

        Ok(Some(SessionPlan {
            channels,
            rate,
            bit_rate,
            sample_format: self.sample_format,
            frame_samples,
            expect_len,
            output_unit,
            spdif: self.spdif,
            growth_factor,
        }))
    }
}
