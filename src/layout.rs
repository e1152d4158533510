//! Channel layout mapping
//!
//! Upstream delivers surround audio in the order L R Ls Rs C LFE; the AC-3
//! encoder wants L R C LFE Ls Rs. Frames are permuted in place, one sample
//! group at a time.

/// Logical speaker positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    FrontLeft,
    FrontRight,
    FrontCenter,
    LowFrequency,
    SideLeft,
    SideRight,
}

use Speaker::*;

const SOURCE_5_0: &[Speaker] = &[FrontLeft, FrontRight, SideLeft, SideRight, FrontCenter];
const SOURCE_5_1: &[Speaker] = &[
    FrontLeft,
    FrontRight,
    SideLeft,
    SideRight,
    FrontCenter,
    LowFrequency,
];
const CODEC_5_0: &[Speaker] = &[FrontLeft, FrontRight, FrontCenter, SideLeft, SideRight];
const CODEC_5_1: &[Speaker] = &[
    FrontLeft,
    FrontRight,
    FrontCenter,
    LowFrequency,
    SideLeft,
    SideRight,
];

/// Channels below this count are already in codec order.
pub const REORDER_MIN_CHANNELS: usize = 5;

/// Largest sample group handled on the stack (8 channels of 8-byte samples).
const MAX_GROUP_BYTES: usize = 64;

/// Upstream speaker order for `channels`, if it needs remapping.
pub fn source_layout(channels: usize) -> Option<&'static [Speaker]> {
    match channels {
        5 => Some(SOURCE_5_0),
        6 => Some(SOURCE_5_1),
        _ => None,
    }
}

/// Codec speaker order for `channels`, if it needs remapping.
pub fn codec_layout(channels: usize) -> Option<&'static [Speaker]> {
    match channels {
        5 => Some(CODEC_5_0),
        6 => Some(CODEC_5_1),
        _ => None,
    }
}

/// For each output position, the input position holding the same speaker.
///
/// Returns `None` when the layouts differ in length or in speaker set.
pub fn permutation(from: &[Speaker], to: &[Speaker]) -> Option<Vec<usize>> {
    if from.len() != to.len() {
        return None;
    }
    to.iter()
        .map(|s| from.iter().position(|f| f == s))
        .collect()
}

/// Reorder one interleaved frame from `from` to `to` in place.
///
/// Trailing bytes that do not form a whole sample group are left untouched.
pub fn reorder_channels(
    frame: &mut [u8],
    from: &[Speaker],
    to: &[Speaker],
    bytes_per_sample: usize,
) {
    let Some(map) = permutation(from, to) else {
        return;
    };
    if map.iter().enumerate().all(|(i, &j)| i == j) {
        return;
    }
    let group = map.len() * bytes_per_sample;
    if group == 0 || group > MAX_GROUP_BYTES {
        return;
    }

    let mut tmp = [0u8; MAX_GROUP_BYTES];
    for chunk in frame.chunks_exact_mut(group) {
        tmp[..group].copy_from_slice(chunk);
        for (dst, &src) in map.iter().enumerate() {
            let d = dst * bytes_per_sample;
            let s = src * bytes_per_sample;
            chunk[d..d + bytes_per_sample].copy_from_slice(&tmp[s..s + bytes_per_sample]);
        }
    }
}

/// Apply the upstream-to-codec mapping for `channels`, if one exists.
pub fn reorder_for_codec(frame: &mut [u8], channels: usize, bytes_per_sample: usize) {
    if channels < REORDER_MIN_CHANNELS {
        return;
    }
    if let (Some(from), Some(to)) = (source_layout(channels), codec_layout(channels)) {
        reorder_channels(frame, from, to, bytes_per_sample);
    }
}
