//! Codec family constants
//!
//! Everything the negotiator and the driving loop need to know about a codec
//! family lives in one immutable [`CodecProfile`]. No global mutable state.

/// Fixed per-codec-family parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecProfile {
    /// Short codec name used in log and error messages
    pub name: &'static str,
    /// Samples per channel in every encoder frame (N)
    pub frame_samples: usize,
    /// Largest payload the encoder can emit for one frame
    pub max_coded_frame_size: usize,
    /// Highest channel count the encoder accepts
    pub max_channels: u16,
    /// Supported bit rates in kbps, ascending
    pub bit_rates_kbps: &'static [u32],
    /// Default bit rate in bps, indexed by channel count (index 0 unused)
    pub default_bit_rates: &'static [u32],
    /// Sample rates accepted as-is
    pub sample_rates: &'static [u32],
    /// Rate used when the input rate is not in `sample_rates`
    pub fallback_sample_rate: u32,
    /// IEC 61937 data-type tag
    pub spdif_data_type: u8,
}

/// Upper bound on channels delivered by upstream; sizes the pending buffer.
pub const MAX_INPUT_CHANNELS: usize = 8;

/// Dolby AC-3 (A/52)
pub const AC3: CodecProfile = CodecProfile {
    name: "ac3",
    frame_samples: 6 * 256,
    max_coded_frame_size: 3840,
    max_channels: 6,
    bit_rates_kbps: &[
        32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 448, 512, 576, 640,
    ],
    default_bit_rates: &[0, 96_000, 192_000, 256_000, 384_000, 448_000, 448_000],
    sample_rates: &[32_000, 44_100, 48_000],
    fallback_sample_rate: 48_000,
    spdif_data_type: 0x01,
};

impl CodecProfile {
    /// Size of one IEC 61937 burst: one frame of 2-channel 16-bit PCM.
    pub fn burst_size(&self) -> usize {
        self.frame_samples * 2 * 2
    }

    /// Output bytes reserved per encoded frame.
    pub fn output_unit(&self, spdif: bool) -> usize {
        if spdif {
            self.burst_size()
        } else {
            self.max_coded_frame_size
        }
    }

    /// Default bit rate for `channels`, clamped to the table.
    pub fn default_bit_rate(&self, channels: u16) -> u32 {
        let last = self.default_bit_rates.len().saturating_sub(1);
        let idx = (channels as usize).min(last);
        self.default_bit_rates[idx]
    }

    /// Whether `bit_rate` (bps) is one of the supported steps.
    pub fn supports_bit_rate(&self, bit_rate: u32) -> bool {
        self.bit_rates_kbps.iter().any(|&k| k * 1000 == bit_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ac3_burst_size() {
        assert_eq!(AC3.burst_size(), 6144);
        assert_eq!(AC3.output_unit(true), 6144);
        assert_eq!(AC3.output_unit(false), 3840);
    }

    #[test]
    fn test_default_bit_rate_table() {
        let expected = [96_000, 192_000, 256_000, 384_000, 448_000, 448_000];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(AC3.default_bit_rate(i as u16 + 1), *want);
        }
    }

    #[test]
    fn test_supports_bit_rate() {
        assert!(AC3.supports_bit_rate(384_000));
        assert!(AC3.supports_bit_rate(32_000));
        assert!(!AC3.supports_bit_rate(100_000));
        assert!(!AC3.supports_bit_rate(0));
    }
}
