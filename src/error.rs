use embedded_time::{clock, ConversionError};

/// Errors from the infrastructure around the control loop.
///
/// The control path itself never fails: missing data and signal loss are
/// handled as state transitions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("clock error: {0:?}")]
    Clock(clock::Error),

    #[error("time conversion error: {0:?}")]
    Time(ConversionError),

    #[error("missing component: {0}")]
    MissingComponent(&'static str),

    #[error("invalid gain {name}: {value}")]
    InvalidGain { name: &'static str, value: f32 },

    #[error("channel {channel} mapped to raw index {index}, past the last channel")]
    InvalidChannel { channel: usize, index: usize },

    #[error("throttle mid {0} outside (0, 1)")]
    InvalidThrottleMid(f32),
}

impl From<clock::Error> for Error {
    fn from(clock_error: clock::Error) -> Self {
        Error::Clock(clock_error)
    }
}

impl From<ConversionError> for Error {
    fn from(time_error: ConversionError) -> Self {
        Error::Time(time_error)
    }
}
