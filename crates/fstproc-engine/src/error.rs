//! Errors raised by the engine's driver layer.

/// Errors raised while configuring or running a [`crate::Processor`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A generation-direction mode was selected without naming which
    /// generation submode (`-g`, `-n`, `-N`, `-N` …) to use.
    #[error("generation mode requires a submode")]
    MissingSubmode,

    /// The requested transducer name is not present in the loaded bundle.
    #[error("no transducer named {0:?} in the bundle")]
    UnknownTransducer(String),

    /// Underlying I/O failure while streaming input or output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for engine operations that can fail.
pub type EngineResult<T> = Result<T, EngineError>;
