//! Reconfiguration behaviour of the filter

use super::fixtures::{attach, pcm, surround_filter, FakeEngine};
use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::format::{InputStream, SampleFormat, StreamEncoding};
use crate::negotiate::Negotiation;

fn s16(channels: u16, rate: u32) -> InputStream {
    InputStream::pcm(channels, rate, SampleFormat::S16)
}

#[test]
fn test_identical_reinit_does_not_reopen() {
    let mut filter = surround_filter(FilterConfig::default(), FakeEngine::default());
    assert_eq!(filter.engine().opens, 1);

    filter.reinit(&s16(6, 48000)).unwrap();
    filter.reinit(&s16(6, 48000)).unwrap();
    assert_eq!(filter.engine().opens, 1);
    assert_eq!(filter.engine().closes, 0);
}

#[test]
fn test_changed_parameters_reopen() {
    let mut filter = surround_filter(FilterConfig::default(), FakeEngine::default());

    filter.reinit(&s16(6, 44100)).unwrap();
    assert_eq!(filter.engine().opens, 2);

    filter.reinit(&s16(5, 44100)).unwrap();
    assert_eq!(filter.engine().opens, 3);
    let params = filter.engine().params.unwrap();
    assert_eq!(params.channels, 5);
    assert_eq!(params.bit_rate, 448_000);

    // 96 kHz maps to 48 kHz, and 8 channels to 6: same as the first session.
    filter.reinit(&s16(8, 96000)).unwrap();
    assert_eq!(filter.engine().opens, 4);
    filter.reinit(&s16(6, 48000)).unwrap();
    assert_eq!(filter.engine().opens, 4);
}

#[test]
fn test_reinit_reports_negotiated_format() {
    let config = FilterConfig {
        spdif: true,
        bit_rate: Some(640_000),
        ..Default::default()
    };
    let mut filter = attach(config, FakeEngine::default());
    let Negotiation::Reconfigured(format) = filter.reinit(&s16(8, 22050)).unwrap() else {
        panic!("expected a session");
    };
    assert_eq!(format.input.channels, 6);
    assert_eq!(format.input.rate, 48000);
    assert_eq!(format.input.sample_format, SampleFormat::S16);
    assert_eq!(format.output.channels, 2);
    assert_eq!(format.bit_rate, 640_000);
    assert_eq!(format.growth_factor, 6144.0 / 18432.0);
}

#[test]
fn test_reinit_discards_pending() {
    let mut filter = surround_filter(FilterConfig::default(), FakeEngine::default());
    filter.encode_stream(&mut pcm(5000, 1)).unwrap();
    assert_eq!(filter.pending_len(), 5000);

    filter.reinit(&s16(6, 48000)).unwrap();
    assert_eq!(filter.pending_len(), 0);
}

#[test]
fn test_detached_below_threshold() {
    let mut filter = attach(FilterConfig::default(), FakeEngine::default());
    assert_eq!(filter.reinit(&s16(2, 48000)).unwrap(), Negotiation::Detached);
    assert!(filter.session().is_none());
    assert_eq!(filter.engine().opens, 0);
    assert_eq!(filter.pending_len(), 0);
    assert!(matches!(
        filter.encode_stream(&mut pcm(100, 2)),
        Err(FilterError::NotConfigured)
    ));
}

#[test]
fn test_custom_threshold() {
    let config = FilterConfig::parse_options("0:0:2");
    let mut filter = attach(config, FakeEngine::default());
    assert!(matches!(
        filter.reinit(&s16(2, 48000)).unwrap(),
        Negotiation::Reconfigured(_)
    ));
    assert_eq!(filter.engine().params.unwrap().bit_rate, 192_000);
    assert_eq!(filter.reinit(&s16(1, 48000)).unwrap(), Negotiation::Detached);
}

#[test]
fn test_compressed_input_detaches() {
    let mut filter = surround_filter(FilterConfig::default(), FakeEngine::default());
    let input = InputStream {
        channels: 6,
        rate: 48000,
        encoding: StreamEncoding::Ac3,
    };
    assert_eq!(filter.reinit(&input).unwrap(), Negotiation::Detached);
    assert!(filter.session().is_none());
}

#[test]
fn test_open_failure_leaves_filter_unusable() {
    let engine = FakeEngine {
        fail_open: true,
        ..Default::default()
    };
    let mut filter = attach(FilterConfig::default(), engine);

    let err = filter.reinit(&s16(6, 48000)).unwrap_err();
    assert!(matches!(err, FilterError::EngineOpen { bit_rate: 448_000, .. }));
    assert!(filter.session().is_none());
    assert!(matches!(
        filter.encode_stream(&mut pcm(100, 3)),
        Err(FilterError::NotConfigured)
    ));

    // Nothing is recorded as open, so the next attempt tries again.
    assert!(filter.reinit(&s16(6, 48000)).is_err());
    assert_eq!(filter.engine().opens, 2);
}

#[test]
fn test_frame_size_mismatch_is_fatal() {
    let engine = FakeEngine {
        frame_size_override: Some(1024),
        ..Default::default()
    };
    let mut filter = attach(FilterConfig::default(), engine);
    let err = filter.reinit(&s16(6, 48000)).unwrap_err();
    assert!(matches!(err, FilterError::Config(_)));
    assert!(filter.session().is_none());
}

#[test]
fn test_unsupported_sample_formats() {
    let engine = FakeEngine {
        formats: vec![SampleFormat::S32, SampleFormat::F64Planar],
        ..Default::default()
    };
    let result = crate::filter::EncodeFilter::attach(
        &FilterConfig::default(),
        engine,
        crate::engine::Deinterleaver::new(),
    );
    assert!(matches!(result, Err(FilterError::Config(_))));
}
