use thiserror::Error;

/// Errors raised while extracting, processing, or capturing hot box data.
#[derive(Debug, Error)]
pub enum HotboxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// a filtered line that is not a valid record, `index` counts filtered lines from 0
    #[error("record {index} could not be parsed: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {index} has no sensors[0] group")]
    MissingSensors { index: usize },

    #[error("no records found in the log")]
    EmptySeries,

    #[error("the moving average window must be at least 1")]
    ZeroWindow,

    #[error("moving average window {window} is larger than the {len} available values")]
    WindowTooLarge { window: usize, len: usize },

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}
