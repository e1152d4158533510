//! Runtime AC-3 encoding filter
//!
//! Turns a continuous stream of multichannel PCM into AC-3 frames, optionally
//! wrapped in IEC 61937 bursts so the result can travel over a PCM-only
//! S/PDIF or HDMI link.

pub mod config;
pub mod config_file;
pub mod engine;
pub mod error;
pub mod filter;
pub mod format;
pub mod layout;
pub mod logging;
pub mod negotiate;
pub mod pending;
pub mod profile;
pub mod spdif;

#[cfg(test)]
pub(crate) mod tests;

pub use config::FilterConfig;
pub use engine::{CodecEngine, Deinterleaver, Resampler};
pub use error::{EngineError, FilterError, Result};
pub use filter::EncodeFilter;
pub use format::{InputStream, PcmFormat, SampleFormat, StreamEncoding};
pub use negotiate::{NegotiatedFormat, Negotiation};
pub use profile::{CodecProfile, AC3};
