//! Sample formats and stream descriptions exchanged with upstream.

use serde::{Deserialize, Serialize};

/// PCM sample encoding, packed (interleaved) or planar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    U8,
    S16,
    S32,
    F32,
    F64,
    U8Planar,
    S16Planar,
    S32Planar,
    F32Planar,
    F64Planar,
}

impl SampleFormat {
    /// The interleaved counterpart of this format.
    pub fn packed(self) -> Self {
        match self {
            Self::U8Planar => Self::U8,
            Self::S16Planar => Self::S16,
            Self::S32Planar => Self::S32,
            Self::F32Planar => Self::F32,
            Self::F64Planar => Self::F64,
            other => other,
        }
    }

    /// The planar counterpart of this format.
    pub fn planar(self) -> Self {
        match self {
            Self::U8 => Self::U8Planar,
            Self::S16 => Self::S16Planar,
            Self::S32 => Self::S32Planar,
            Self::F32 => Self::F32Planar,
            Self::F64 => Self::F64Planar,
            other => other,
        }
    }

    pub fn is_planar(self) -> bool {
        self != self.packed()
    }

    pub fn bytes_per_sample(self) -> usize {
        match self.packed() {
            Self::U8 => 1,
            Self::S16 => 2,
            Self::S32 | Self::F32 => 4,
            _ => 8,
        }
    }
}

/// Encoding of the stream arriving from upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEncoding {
    /// Raw PCM in any sample format
    Pcm(SampleFormat),
    /// Already AC-3 compressed
    Ac3,
}

/// Parameters announced by upstream on (re)configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputStream {
    pub channels: u16,
    pub rate: u32,
    pub encoding: StreamEncoding,
}

impl InputStream {
    pub fn pcm(channels: u16, rate: u32, format: SampleFormat) -> Self {
        Self {
            channels,
            rate,
            encoding: StreamEncoding::Pcm(format),
        }
    }
}

/// A fully specified PCM layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub rate: u32,
    pub sample_format: SampleFormat,
}
