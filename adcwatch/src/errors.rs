use std::path::PathBuf;

use snafu::Snafu;

pub use crate::errors::Error::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Configuration error: {info}.
    ConfigError { info: String },
    /// Channel error: {source}.
    ChannelError { source: ChannelError },
    /// Callback error: {source}.
    CallbackError { source: CallbackError },
}

impl From<ChannelError> for Error {
    fn from(value: ChannelError) -> Self {
        Self::ChannelError { source: value }
    }
}

impl From<CallbackError> for Error {
    fn from(value: CallbackError) -> Self {
        Self::CallbackError { source: value }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ChannelError {
    /// No IIO device exposes threshold events for voltage channel {channel}
    NoSuchChannel { channel: u32 },
    #[snafu(display("Cannot open {}: {}", path.display(), source))]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Reading the current value failed: {info}
    ReadFailed { info: String },
    /// Programming the {edge} threshold failed: {source}
    ThresholdFailed {
        edge: &'static str,
        source: std::io::Error,
    },
    /// Truncated event record ({received} of {expected} bytes)
    ShortRead { received: usize, expected: usize },
    /// Reading from the event descriptor failed: {source}
    EventStream { source: std::io::Error },
    /// Event stream closed
    Disconnected,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CallbackError {
    /// Failed to launch {program}: {source}
    SpawnFailed {
        program: String,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_error_display() {
        let config_error = ConfigError {
            info: "min (50) must not exceed max (10)".to_string(),
        };
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: min (50) must not exceed max (10)."
        );

        let channel_error = Error::from(ChannelError::Disconnected);
        assert_eq!(
            format!("{}", channel_error),
            "Channel error: Event stream closed."
        );

        let callback_error = Error::from(CallbackError::SpawnFailed {
            program: "/usr/bin/true".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        });
        assert_eq!(
            format!("{}", callback_error),
            "Callback error: Failed to launch /usr/bin/true: no such file."
        );
    }

    #[test]
    fn test_channel_error_display() {
        let error = ChannelError::NoSuchChannel { channel: 7 };
        assert_eq!(
            format!("{}", error),
            "No IIO device exposes threshold events for voltage channel 7"
        );

        let error = ChannelError::ShortRead {
            received: 3,
            expected: 16,
        };
        assert_eq!(
            format!("{}", error),
            "Truncated event record (3 of 16 bytes)"
        );

        let error = ChannelError::ThresholdFailed {
            edge: "upper",
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            format!("{}", error),
            "Programming the upper threshold failed: denied"
        );
    }
}
