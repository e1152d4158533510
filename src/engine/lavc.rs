//! libavcodec / libswresample backends
//!
//! [`LavcAc3Engine`] wraps FFmpeg's AC-3 encoder; [`SwrResampler`] wraps
//! `SwrContext` for the packed-to-planar step the float encoder needs.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec;
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::{Sample, Type};

use super::{CodecEngine, EngineParams, FrameRef, ResampleParams, Resampler};
use crate::error::EngineError;
use crate::format::SampleFormat;
use crate::profile::{CodecProfile, AC3};

/// Initialize the FFmpeg library.
///
/// Call once before constructing any engine.
pub fn init() -> Result<(), EngineError> {
    ffmpeg::init()
        .map_err(|e| EngineError::InitFailed(format!("ffmpeg::init() failed: {}", e)))?;
    tracing::info!("FFmpeg initialized");
    Ok(())
}

fn to_sample(fmt: SampleFormat) -> Sample {
    let kind = if fmt.is_planar() {
        Type::Planar
    } else {
        Type::Packed
    };
    match fmt.packed() {
        SampleFormat::U8 => Sample::U8(kind),
        SampleFormat::S16 => Sample::I16(kind),
        SampleFormat::S32 => Sample::I32(kind),
        SampleFormat::F32 => Sample::F32(kind),
        _ => Sample::F64(kind),
    }
}

fn from_sample(sample: Sample) -> Option<SampleFormat> {
    let (packed, kind) = match sample {
        Sample::U8(t) => (SampleFormat::U8, t),
        Sample::I16(t) => (SampleFormat::S16, t),
        Sample::I32(t) => (SampleFormat::S32, t),
        Sample::F32(t) => (SampleFormat::F32, t),
        Sample::F64(t) => (SampleFormat::F64, t),
        _ => return None,
    };
    Some(match kind {
        Type::Packed => packed,
        Type::Planar => packed.planar(),
    })
}

/// Mutable view of one audio plane.
///
/// `Audio::data_mut(index)` stops counting planes when `linesize[1] == 0`,
/// which is how FFmpeg describes planar audio, so read `extended_data` directly.
fn plane_mut(frame: &mut ffmpeg::util::frame::Audio, index: usize) -> &mut [u8] {
    let planes = if frame.format().is_planar() {
        frame.channels() as usize
    } else {
        1
    };
    if index >= planes {
        return &mut [];
    }
    // SAFETY: `index` is bounded by the plane count above, every plane of an
    // allocated frame is `linesize[0]` bytes long, and the returned slice
    // borrows `frame` mutably so no other view can alias it.
    unsafe {
        let f = frame.as_mut_ptr();
        let ptrs = (*f).extended_data;
        if ptrs.is_null() {
            return &mut [];
        }
        let plane = *ptrs.add(index);
        if plane.is_null() {
            return &mut [];
        }
        std::slice::from_raw_parts_mut(plane, (*f).linesize[0] as usize)
    }
}

/// Read-only counterpart of [`plane_mut`].
fn plane(frame: &ffmpeg::util::frame::Audio, index: usize) -> &[u8] {
    let planes = if frame.format().is_planar() {
        frame.channels() as usize
    } else {
        1
    };
    if index >= planes {
        return &[];
    }
    // SAFETY: see `plane_mut`.
    unsafe {
        let f = frame.as_ptr();
        let ptrs = (*f).extended_data;
        if ptrs.is_null() {
            return &[];
        }
        let plane = *ptrs.add(index);
        if plane.is_null() {
            return &[];
        }
        std::slice::from_raw_parts(plane, (*f).linesize[0] as usize)
    }
}

/// AC-3 encoder backed by a real FFmpeg codec context
pub struct LavcAc3Engine {
    codec: ffmpeg::Codec,
    formats: Vec<SampleFormat>,
    encoder: Option<ffmpeg::encoder::Audio>,
    params: Option<EngineParams>,
    pts: i64,
}

impl LavcAc3Engine {
    /// Look up the AC-3 encoder and the sample formats it accepts.
    pub fn new() -> Result<Self, EngineError> {
        let codec = codec::encoder::find(codec::Id::AC3).ok_or_else(|| {
            EngineError::EncoderNotFound("AC-3 encoder not found in this FFmpeg build".into())
        })?;
        let formats: Vec<SampleFormat> = codec
            .audio()
            .map_err(|e| EngineError::EncoderNotFound(format!("not an audio codec: {}", e)))?
            .formats()
            .map(|iter| iter.filter_map(from_sample).collect())
            .unwrap_or_default();

        tracing::debug!(?formats, "AC-3 encoder found");
        Ok(Self {
            codec,
            formats,
            encoder: None,
            params: None,
            pts: 0,
        })
    }

    fn build_frame(
        &self,
        params: &EngineParams,
        frame: FrameRef<'_>,
    ) -> Result<ffmpeg::util::frame::Audio, EngineError> {
        let samples = AC3.frame_samples;
        let layout = ChannelLayout::default(params.channels as i32);
        let mut out = ffmpeg::util::frame::Audio::new(to_sample(params.sample_format), samples, layout);
        out.set_rate(params.rate);
        out.set_pts(Some(self.pts));

        match frame {
            FrameRef::Interleaved(data) => {
                let dst = plane_mut(&mut out, 0);
                if dst.len() < data.len() {
                    return Err(EngineError::EncodeFrame(format!(
                        "frame of {} bytes exceeds plane of {} bytes",
                        data.len(),
                        dst.len()
                    )));
                }
                dst[..data.len()].copy_from_slice(data);
            }
            FrameRef::Planar(planes) => {
                for (ch, data) in planes.iter().enumerate() {
                    let dst = plane_mut(&mut out, ch);
                    if dst.len() < data.len() {
                        return Err(EngineError::EncodeFrame(format!(
                            "plane {} of {} bytes exceeds {} bytes",
                            ch,
                            data.len(),
                            dst.len()
                        )));
                    }
                    dst[..data.len()].copy_from_slice(data);
                }
            }
        }
        Ok(out)
    }
}

impl CodecEngine for LavcAc3Engine {
    fn profile(&self) -> &'static CodecProfile {
        &AC3
    }

    fn sample_formats(&self) -> &[SampleFormat] {
        &self.formats
    }

    fn open(&mut self, params: &EngineParams) -> Result<(), EngineError> {
        self.close();

        let mut context = codec::Context::new_with_codec(self.codec);
        context.set_time_base(ffmpeg::Rational::new(1, params.rate as i32));

        let mut audio_enc = context.encoder().audio().map_err(|e| {
            EngineError::EncoderOpen(format!("Cannot get audio encoder handle: {}", e))
        })?;

        audio_enc.set_rate(params.rate as i32);
        audio_enc.set_format(to_sample(params.sample_format));
        audio_enc.set_channel_layout(ChannelLayout::default(params.channels as i32));
        audio_enc.set_bit_rate(params.bit_rate as usize);

        let encoder = audio_enc
            .open_as(self.codec)
            .map_err(|e| EngineError::EncoderOpen(format!("Failed to open AC-3 encoder: {}", e)))?;

        tracing::debug!(
            channels = params.channels,
            rate = params.rate,
            bit_rate = params.bit_rate,
            frame_size = encoder.frame_size(),
            "AC-3 encoder opened"
        );
        self.encoder = Some(encoder);
        self.params = Some(*params);
        self.pts = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.encoder = None;
        self.params = None;
    }

    fn frame_size(&self) -> usize {
        self.encoder
            .as_ref()
            .map(|e| e.frame_size() as usize)
            .unwrap_or(0)
    }

    fn encode(&mut self, frame: FrameRef<'_>, dst: &mut [u8]) -> Result<usize, EngineError> {
        let params = self
            .params
            .ok_or_else(|| EngineError::EncodeFrame("encoder is not open".into()))?;
        let input = self.build_frame(&params, frame)?;
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| EngineError::EncodeFrame("encoder is not open".into()))?;

        encoder
            .send_frame(&input)
            .map_err(|e| EngineError::EncodeFrame(format!("AC-3 encoder send_frame error: {}", e)))?;
        self.pts += AC3.frame_samples as i64;

        let mut packet = ffmpeg::codec::packet::Packet::empty();
        match encoder.receive_packet(&mut packet) {
            Ok(()) => {
                let data = packet.data().unwrap_or(&[]);
                if data.len() > dst.len() {
                    return Err(EngineError::EncodeFrame(format!(
                        "packet of {} bytes exceeds output space of {}",
                        data.len(),
                        dst.len()
                    )));
                }
                dst[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => Ok(0),
            Err(e) => Err(EngineError::EncodeFrame(format!(
                "AC-3 encoder receive_packet error: {}",
                e
            ))),
        }
    }
}

/// Sample format converter backed by FFmpeg's `SwrContext`
#[derive(Default)]
pub struct SwrResampler {
    context: Option<resampling::Context>,
    params: Option<ResampleParams>,
    planes: Vec<Vec<u8>>,
}

impl SwrResampler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resampler for SwrResampler {
    fn configure(&mut self, params: &ResampleParams) -> Result<(), EngineError> {
        let layout = ChannelLayout::default(params.channels as i32);
        let context = resampling::Context::get(
            to_sample(params.in_format),
            layout,
            params.rate,
            to_sample(params.out_format),
            layout,
            params.rate,
        )
        .map_err(|e| {
            EngineError::ResamplerCreate(format!("Failed to create resampling context: {}", e))
        })?;

        self.context = Some(context);
        self.params = Some(*params);
        self.planes = vec![Vec::new(); params.channels as usize];
        Ok(())
    }

    fn close(&mut self) {
        self.context = None;
        self.params = None;
    }

    fn convert(&mut self, input: &[u8], samples: usize) -> Result<usize, EngineError> {
        let (Some(context), Some(params)) = (self.context.as_mut(), self.params) else {
            return Err(EngineError::Convert("resampler is not configured".into()));
        };

        let layout = ChannelLayout::default(params.channels as i32);
        let mut src = ffmpeg::util::frame::Audio::new(to_sample(params.in_format), samples, layout);
        src.set_rate(params.rate);
        let plane0 = plane_mut(&mut src, 0);
        let n = input.len().min(plane0.len());
        plane0[..n].copy_from_slice(&input[..n]);

        // Output frame must be empty: swr allocates it from the context config.
        let mut out = ffmpeg::util::frame::Audio::empty();
        context
            .run(&src, &mut out)
            .map_err(|e| EngineError::Convert(format!("Resampling error: {}", e)))?;

        let converted = out.samples();
        let bytes = converted * params.out_format.bytes_per_sample();
        for (ch, dst) in self.planes.iter_mut().enumerate() {
            let data = plane(&out, ch);
            dst.clear();
            dst.extend_from_slice(&data[..bytes.min(data.len())]);
        }
        Ok(converted)
    }

    fn planes(&self) -> &[Vec<u8>] {
        &self.planes
    }
}
