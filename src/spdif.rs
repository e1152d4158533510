//! IEC 61937 burst framing
//!
//! Each compressed frame is carried in a fixed-size burst that looks like
//! 2-channel 16-bit PCM to the link:
//!
//! ```text
//! offset 0  Pa  sync word 1 (0xF872, big endian)
//! offset 2  Pb  sync word 2 (0x4E1F, big endian)
//! offset 4  Pc  bitstream mode (payload byte 5 & 0x7)
//! offset 5  Pc  data type
//! offset 6  Pd  payload length in bits (big endian)
//! offset 8      payload, then zero padding up to the burst size
//! ```

use crate::error::{FilterError, Result};

pub const SYNC_WORD_1: u16 = 0xF872;
pub const SYNC_WORD_2: u16 = 0x4E1F;
pub const HEADER_LEN: usize = 8;

/// Longest payload whose bit length fits the 16-bit length field.
pub const MAX_PAYLOAD_LEN: usize = (u16::MAX as usize + 1) / 8 - 1;

/// Frame a payload that has already been written at `burst[HEADER_LEN..]`.
///
/// The whole of `burst` is the burst: the header is written in front of the
/// payload and everything after it is zeroed. Returns `burst.len()`.
pub fn finish_burst(burst: &mut [u8], payload_len: usize, data_type: u8) -> Result<usize> {
    let burst_len = burst.len();
    if payload_len > MAX_PAYLOAD_LEN || HEADER_LEN + payload_len > burst_len {
        return Err(FilterError::Packetize {
            len: payload_len,
            burst: burst_len,
        });
    }

    let payload_end = HEADER_LEN + payload_len;
    let bsmod = if payload_len > 5 {
        burst[HEADER_LEN + 5] & 0x7
    } else {
        0
    };
    let bits = (payload_len * 8) as u16;

    burst[0..2].copy_from_slice(&SYNC_WORD_1.to_be_bytes());
    burst[2..4].copy_from_slice(&SYNC_WORD_2.to_be_bytes());
    burst[4] = bsmod;
    burst[5] = data_type;
    burst[6..8].copy_from_slice(&bits.to_be_bytes());
    burst[payload_end..].fill(0);

    Ok(burst_len)
}

/// Copy `payload` into `burst` and frame it.
pub fn packetize(payload: &[u8], burst: &mut [u8], data_type: u8) -> Result<usize> {
    let end = HEADER_LEN + payload.len();
    if end > burst.len() {
        return Err(FilterError::Packetize {
            len: payload.len(),
            burst: burst.len(),
        });
    }
    burst[HEADER_LEN..end].copy_from_slice(payload);
    finish_burst(burst, payload.len(), data_type)
}
