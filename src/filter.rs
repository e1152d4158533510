//! Runtime encoding filter
//!
//! Accepts PCM in chunks of any size, cuts it into whole encoder frames and
//! pushes each frame through channel reordering, the optional resample
//! adapter, the codec engine and the optional IEC 61937 packetizer.
//!
//! Input bytes that do not complete a frame are carried over to the next
//! call. Frames that arrive whole in the caller's buffer are encoded straight
//! from it without copying; note that reordering happens in place, so the
//! caller's buffer is modified.

use crate::config::FilterConfig;
use crate::engine::{
    select_sample_format, CodecEngine, EngineParams, FrameRef, ResampleParams, Resampler,
};
use crate::error::{EngineError, FilterError, Result};
use crate::format::{InputStream, SampleFormat};
use crate::layout;
use crate::negotiate::{Negotiation, Negotiator, SessionPlan};
use crate::pending::{OutputBuffer, PendingBuffer};
use crate::profile::MAX_INPUT_CHANNELS;
use crate::spdif;

/// State of one negotiated encoder session
#[derive(Debug)]
struct EncoderSession {
    plan: SessionPlan,
    pending: PendingBuffer,
}

/// An attached encoding filter
pub struct EncodeFilter<E: CodecEngine, R: Resampler> {
    negotiator: Negotiator,
    engine: E,
    /// Present only when the engine consumes planar samples
    resampler: Option<R>,
    engine_format: SampleFormat,
    /// Parameters the engine is currently open with
    opened: Option<EngineParams>,
    session: Option<EncoderSession>,
    pending_capacity: usize,
    output: OutputBuffer,
}

impl<E: CodecEngine, R: Resampler> EncodeFilter<E, R> {
    /// Attach a filter around `engine`.
    ///
    /// Picks the sample format upstream has to deliver. `resampler` is kept
    /// only if the engine wants planar input.
    pub fn attach(config: &FilterConfig, engine: E, resampler: R) -> Result<Self> {
        let profile = engine.profile();
        let (engine_format, upstream_format) = select_sample_format(engine.sample_formats())
            .ok_or_else(|| {
                FilterError::Config(format!(
                    "{} encoder doesn't support expected sample formats",
                    profile.name
                ))
            })?;

        let pending_capacity =
            MAX_INPUT_CHANNELS * profile.frame_samples * upstream_format.bytes_per_sample();
        let negotiator = Negotiator::new(profile, config, upstream_format, pending_capacity);
        let resampler = engine_format.is_planar().then_some(resampler);

        tracing::debug!(
            codec = profile.name,
            ?engine_format,
            ?upstream_format,
            spdif = config.spdif,
            bit_rate = ?config.bit_rate,
            min_channels = config.min_channels,
            "encode filter attached"
        );

        Ok(Self {
            negotiator,
            engine,
            resampler,
            engine_format,
            opened: None,
            session: None,
            pending_capacity,
            output: OutputBuffer::new(),
        })
    }

    /// Renegotiate for a new upstream stream.
    ///
    /// Any buffered remainder is discarded. The engine is reopened only when
    /// channels, rate or bit rate actually change. On error the filter has no
    /// session until a later `reinit` succeeds.
    pub fn reinit(&mut self, input: &InputStream) -> Result<Negotiation> {
        self.session = None;

        let Some(plan) = self.negotiator.plan(input)? else {
            tracing::debug!(
                channels = input.channels,
                rate = input.rate,
                encoding = ?input.encoding,
                "encode filter detached"
            );
            return Ok(Negotiation::Detached);
        };

        tracing::debug!(
            channels = plan.channels,
            rate = plan.rate,
            growth_factor = plan.growth_factor,
            expect_len = plan.expect_len,
            "encode filter reinit"
        );

        let params = EngineParams {
            channels: plan.channels,
            rate: plan.rate,
            bit_rate: plan.bit_rate,
            sample_format: self.engine_format,
        };
        if self.opened != Some(params) {
            self.reopen(&plan, &params)?;
        }

        let frame_size = self.engine.frame_size();
        if frame_size != plan.frame_samples {
            return Err(FilterError::Config(format!(
                "unexpected {} encoder frame size {}",
                self.negotiator.profile().name,
                frame_size
            )));
        }

        let format = plan.format();
        self.session = Some(EncoderSession {
            plan,
            pending: PendingBuffer::with_capacity(self.pending_capacity),
        });
        Ok(Negotiation::Reconfigured(format))
    }

    fn reopen(&mut self, plan: &SessionPlan, params: &EngineParams) -> Result<()> {
        self.engine.close();
        self.opened = None;

        if let Some(resampler) = self.resampler.as_mut() {
            resampler.close();
            resampler
                .configure(&ResampleParams {
                    channels: plan.channels,
                    rate: plan.rate,
                    in_format: plan.sample_format,
                    out_format: self.engine_format,
                })
                .map_err(|e| FilterError::Config(format!("Error configuring resampler: {}", e)))?;
        }

        let profile = self.negotiator.profile();
        self.engine
            .open(params)
            .map_err(|source| FilterError::EngineOpen {
                codec: profile.name,
                bit_rate: params.bit_rate,
                source,
            })?;
        self.opened = Some(*params);

        tracing::debug!(
            codec = profile.name,
            channels = params.channels,
            rate = params.rate,
            bit_rate = params.bit_rate,
            "codec engine opened"
        );
        Ok(())
    }

    /// Encode as many whole frames as `input` and the carried-over bytes allow.
    ///
    /// Returns the concatenated payloads (or bursts) of this call, which may
    /// be empty. On error nothing is returned for the call and the carried
    /// over bytes are dropped.
    pub fn encode_stream(&mut self, input: &mut [u8]) -> Result<&[u8]> {
        let Self {
            engine,
            resampler,
            session,
            output,
            ..
        } = self;
        let session = session.as_mut().ok_or(FilterError::NotConfigured)?;

        match drive(session, engine, resampler.as_mut(), output, input) {
            Ok(written) => {
                output.set_len(written);
                tracing::debug!(
                    outsize = written,
                    pending = session.pending.len(),
                    "encode_stream returned"
                );
                Ok(output.as_slice())
            }
            Err(e) => {
                tracing::error!(error = %e, "encode_stream failed, dropping call output");
                session.pending.clear();
                output.set_len(0);
                Err(e)
            }
        }
    }

    /// Worst-case output size for an input of `input_len` bytes.
    pub fn max_output_len(&self, input_len: usize) -> usize {
        self.session
            .as_ref()
            .map(|s| (input_len + s.pending.len()) / s.plan.expect_len * s.plan.output_unit)
            .unwrap_or(0)
    }

    /// Output bytes per input byte, worst case; 0 without a session.
    pub fn growth_factor(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| s.plan.growth_factor)
            .unwrap_or(0.0)
    }

    /// Bytes of input per encoder frame; 0 without a session.
    pub fn expect_len(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.plan.expect_len)
            .unwrap_or(0)
    }

    pub fn pending_len(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.pending.len())
            .unwrap_or(0)
    }

    pub fn session(&self) -> Option<&SessionPlan> {
        self.session.as_ref().map(|s| &s.plan)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn resampler(&self) -> Option<&R> {
        self.resampler.as_ref()
    }
}

impl<E: CodecEngine, R: Resampler> Drop for EncodeFilter<E, R> {
    fn drop(&mut self) {
        self.engine.close();
        if let Some(resampler) = self.resampler.as_mut() {
            resampler.close();
        }
    }
}

/// Run every whole frame of this call; returns bytes written to `output`.
fn drive<E: CodecEngine, R: Resampler>(
    session: &mut EncoderSession,
    engine: &mut E,
    mut resampler: Option<&mut R>,
    output: &mut OutputBuffer,
    input: &mut [u8],
) -> Result<usize> {
    let EncoderSession { plan, pending } = session;
    let expect_len = plan.expect_len;

    let frames = (input.len() + pending.len()) / expect_len;
    output.reserve(frames * plan.output_unit)?;

    let header = if plan.spdif { spdif::HEADER_LEN } else { 0 };
    let data_type = engine.profile().spdif_data_type;
    let mut written = 0;
    let mut src: &mut [u8] = input;

    while !src.is_empty() {
        if src.len() + pending.len() < expect_len {
            pending.fill(src);
            break;
        }

        let from_pending = !pending.is_empty();
        let frame: &mut [u8] = if from_pending {
            let needs = expect_len - pending.len();
            let (head, rest) = std::mem::take(&mut src).split_at_mut(needs);
            src = rest;
            pending.fill(head);
            pending.as_mut_slice()
        } else {
            let (head, rest) = std::mem::take(&mut src).split_at_mut(expect_len);
            src = rest;
            head
        };

        let slot = &mut output.tail_mut(written)[..plan.output_unit];
        let len = encode_frame(
            plan,
            engine,
            resampler.as_deref_mut(),
            frame,
            &mut slot[header..],
        )?;
        if from_pending {
            pending.clear();
        }

        tracing::debug!(len, pending = pending.len(), "encoder frame done");
        if len == 0 {
            continue;
        }

        written += if plan.spdif {
            spdif::finish_burst(slot, len, data_type)?
        } else {
            len
        };
    }

    Ok(written)
}

/// Reorder, convert and encode one frame into `dst`.
fn encode_frame<E: CodecEngine, R: Resampler>(
    plan: &SessionPlan,
    engine: &mut E,
    resampler: Option<&mut R>,
    frame: &mut [u8],
    dst: &mut [u8],
) -> Result<usize> {
    let channels = plan.channels as usize;
    layout::reorder_for_codec(frame, channels, plan.sample_format.bytes_per_sample());

    let encoded = match resampler {
        Some(resampler) => {
            let got = resampler
                .convert(frame, plan.frame_samples)
                .map_err(FilterError::Resample)?;
            if got != plan.frame_samples {
                return Err(FilterError::ShortConversion {
                    got,
                    expected: plan.frame_samples,
                });
            }
            engine.encode(FrameRef::Planar(resampler.planes()), dst)
        }
        None => engine.encode(FrameRef::Interleaved(frame), dst),
    };
    let len = encoded.map_err(FilterError::Encode)?;

    if len > dst.len() {
        return Err(FilterError::Encode(EngineError::EncodeFrame(format!(
            "engine reported {} bytes for a {}-byte slot",
            len,
            dst.len()
        ))));
    }
    Ok(len)
}
