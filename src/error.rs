use thiserror::Error;

/// Main error type for the encoding filter
#[derive(Error, Debug)]
pub enum FilterError {
    /// A collaborator failed outside of a data call
    #[error("Codec engine error: {0}")]
    Engine(#[from] EngineError),

    /// Negotiation failed; the session is unusable until the next successful `reinit`
    #[error("Configuration error: {0}")]
    Config(String),

    /// The codec engine refused the requested parameters
    #[error("Couldn't open codec {codec}, br={bit_rate}: {source}")]
    EngineOpen {
        codec: &'static str,
        bit_rate: u32,
        #[source]
        source: EngineError,
    },

    /// The output buffer could not grow to the size this call needs
    #[error("Could not allocate {requested} bytes of output")]
    Allocation { requested: usize },

    /// The codec engine failed on a frame
    #[error("Error encoding audio: {0}")]
    Encode(#[source] EngineError),

    /// The resample adapter failed on a frame
    #[error("Error converting audio sample format: {0}")]
    Resample(#[source] EngineError),

    /// The resample adapter produced fewer samples than one frame
    #[error("Not enough converted data: got {got} samples, expected {expected}")]
    ShortConversion { got: usize, expected: usize },

    /// A compressed payload does not fit the fixed burst
    #[error("S/PDIF packetization error: payload of {len} bytes does not fit a {burst}-byte burst")]
    Packetize { len: usize, burst: usize },

    /// `encode_stream` was called without a usable session
    #[error("Filter is not configured")]
    NotConfigured,

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by codec engine and resample adapter implementations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failure during global backend initialization
    #[error("Backend initialization failed: {0}")]
    InitFailed(String),

    /// The requested encoder is not available
    #[error("Failed to find encoder: {0}")]
    EncoderNotFound(String),

    /// Failure opening the encoder with the requested parameters
    #[error("Failed to open encoder: {0}")]
    EncoderOpen(String),

    /// Failure encoding a single frame into a packet
    #[error("Failed to encode frame: {0}")]
    EncodeFrame(String),

    /// Failure creating or configuring a resampler
    #[error("Failed to create resampler: {0}")]
    ResamplerCreate(String),

    /// Failure converting a single frame
    #[error("Failed to convert frame: {0}")]
    Convert(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FilterError>;
