//! Domain error types.

/// Top-level error type for macross.
#[derive(Debug, thiserror::Error)]
pub enum MacrossError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("malformed input for {symbol} at row {row}: {reason}")]
    MalformedInput {
        symbol: String,
        row: usize,
        reason: String,
    },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("moving average SMA({window}) was not computed")]
    MissingAverage { window: usize },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MacrossError> for std::process::ExitCode {
    fn from(err: &MacrossError) -> Self {
        let code: u8 = match err {
            MacrossError::Io(_) => 1,
            MacrossError::ConfigParse { .. } | MacrossError::ConfigInvalid { .. } => 2,
            MacrossError::DataSource { .. } | MacrossError::Csv(_) => 3,
            MacrossError::MissingAverage { .. } => 4,
            MacrossError::MalformedInput { .. } | MacrossError::NoData { .. } => 5,
            MacrossError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
