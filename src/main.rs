//! AC-3 encoder
//!
//! Reads native-endian multichannel PCM from stdin and writes AC-3 (or
//! IEC 61937 bursts) to stdout.
//!
//! Usage: `ac3enc <channels> <rate> <s16|f32> [options] [config.toml]`
//! where `options` is `<spdif>:<bit_rate>:<min_channels>`.

use std::io::{Read, Write};

use ac3_spdif_enc::config_file::{ConfigFile, LoggingSettings};
use ac3_spdif_enc::engine::lavc::{self, LavcAc3Engine, SwrResampler};
use ac3_spdif_enc::logging::init_logging;
use ac3_spdif_enc::{
    EncodeFilter, FilterConfig, FilterError, InputStream, NegotiatedFormat, Negotiation,
    SampleFormat, StreamEncoding,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "ac3enc";

/// Bytes read from stdin per call
const READ_CHUNK: usize = 64 * 1024;

fn main() {
    if let Err(e) = run() {
        tracing::error!("{}", e);
        eprintln!("{}: {}", APP_NAME, e);
        std::process::exit(1);
    }
}

fn usage() -> FilterError {
    FilterError::Config(format!(
        "usage: {} <channels> <rate> <s16|f32> [spdif:bit_rate:min_channels] [config.toml]",
        APP_NAME
    ))
}

fn run() -> Result<(), FilterError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let channels: u16 = args.first().and_then(|a| a.parse().ok()).ok_or_else(usage)?;
    let rate: u32 = args.get(1).and_then(|a| a.parse().ok()).ok_or_else(usage)?;
    let sample_format = args
        .get(2)
        .and_then(|a| parse_sample_format(a))
        .ok_or_else(usage)?;

    // Load configuration
    let (mut config, logging) = match args.get(4) {
        Some(path) => match ConfigFile::from_file(path) {
            Ok(cf) => (cf.filter_config(), cf.logging_settings()),
            Err(e) => {
                eprintln!("Failed to load config file {}: {}. Using defaults.", path, e);
                (FilterConfig::default(), LoggingSettings::default())
            }
        },
        None => (FilterConfig::default(), LoggingSettings::default()),
    };
    if let Some(options) = args.get(3) {
        config = FilterConfig::parse_options(options);
    }

    init_logging(&logging);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    tracing::info!("Configuration loaded: {:?}", config);

    lavc::init()?;
    let engine = LavcAc3Engine::new()?;
    let mut filter = EncodeFilter::attach(&config, engine, SwrResampler::new())?;

    let input = InputStream::pcm(channels, rate, sample_format);
    let negotiated = match filter.reinit(&input)? {
        Negotiation::Detached => {
            tracing::info!(channels, "below channel threshold, passing input through");
            return passthrough();
        }
        Negotiation::Reconfigured(format) => format,
    };
    check_input(&negotiated, &input)?;
    tracing::info!(
        sample_format = ?negotiated.input.sample_format,
        bit_rate = negotiated.bit_rate,
        growth_factor = negotiated.growth_factor,
        "encoding"
    );

    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = stdin.read(&mut buf)?;
        if n == 0 {
            break;
        }
        let out = filter.encode_stream(&mut buf[..n])?;
        stdout.write_all(out)?;
    }
    stdout.flush()?;

    tracing::info!(pending = filter.pending_len(), "input exhausted");
    Ok(())
}

/// Sample formats accepted on stdin, interleaved and native-endian.
fn parse_sample_format(name: &str) -> Option<SampleFormat> {
    match name.to_ascii_lowercase().as_str() {
        "s16" => Some(SampleFormat::S16),
        "f32" => Some(SampleFormat::F32),
        _ => None,
    }
}

/// The filter reformats nothing, so stdin must already match the session.
fn check_input(negotiated: &NegotiatedFormat, input: &InputStream) -> Result<(), FilterError> {
    let want = negotiated.input;
    let matches = want.channels == input.channels
        && want.rate == input.rate
        && input.encoding == StreamEncoding::Pcm(want.sample_format);
    if matches {
        return Ok(());
    }
    let name = match want.sample_format {
        SampleFormat::F32 => "f32",
        _ => "s16",
    };
    Err(FilterError::Config(format!(
        "input must be {} channels at {} Hz in {} format",
        want.channels, want.rate, name
    )))
}

fn passthrough() -> Result<(), FilterError> {
    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    std::io::copy(&mut stdin, &mut stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac3_spdif_enc::PcmFormat;

    fn negotiated(channels: u16, rate: u32, sample_format: SampleFormat) -> NegotiatedFormat {
        NegotiatedFormat {
            input: PcmFormat {
                channels,
                rate,
                sample_format,
            },
            output: PcmFormat {
                channels: 2,
                rate,
                sample_format: SampleFormat::S16,
            },
            bit_rate: 448_000,
            growth_factor: 6144.0 / 36864.0,
        }
    }

    #[test]
    fn test_parse_sample_format() {
        assert_eq!(parse_sample_format("s16"), Some(SampleFormat::S16));
        assert_eq!(parse_sample_format("F32"), Some(SampleFormat::F32));
        assert_eq!(parse_sample_format("u8"), None);
    }

    #[test]
    fn test_check_input_rejects_wrong_sample_format() {
        let format = negotiated(6, 48000, SampleFormat::F32);
        let s16 = InputStream::pcm(6, 48000, SampleFormat::S16);
        match check_input(&format, &s16) {
            Err(FilterError::Config(msg)) => assert!(msg.contains("f32")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(check_input(&format, &InputStream::pcm(6, 48000, SampleFormat::F32)).is_ok());
    }

    #[test]
    fn test_check_input_rejects_capped_layout() {
        let format = negotiated(6, 48000, SampleFormat::S16);
        assert!(check_input(&format, &InputStream::pcm(8, 48000, SampleFormat::S16)).is_err());
        assert!(check_input(&format, &InputStream::pcm(6, 96000, SampleFormat::S16)).is_err());
    }
}
