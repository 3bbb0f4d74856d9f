use std::{error, fmt, io, string::FromUtf8Error};

use camino::FromPathBufError;

/// Error type of upmirror operations.
///
/// Nothing is retried internally: any of these aborts the run.
/// Replication being idempotent, running it again is the recovery path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Local path unreadable or vanished during traversal
    Io(String),
    /// Non UTF-8 local name
    Utf8(String),
    /// Transport, HTTP or API failure talking to the remote service
    Api(String),
    /// The remote service refused the mutation because of a conflicting state
    Conflict(String),
    /// Authorization failure
    Auth(String),
    /// Invalid configuration
    Config(String),
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Utf8(msg) => write!(f, "Non UTF-8 string: {msg}"),
            Self::Api(msg) => write!(f, "API error: {msg}"),
            Self::Conflict(msg) => write!(f, "Remote conflict: {msg}"),
            Self::Auth(msg) => write!(f, "Authorization error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl error::Error for Error {}

impl Error {
    /// Whether the error comes from the remote side
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Api(..) | Self::Conflict(..) | Self::Auth(..))
    }
}

impl From<FromUtf8Error> for Error {
    fn from(value: FromUtf8Error) -> Self {
        Self::Utf8(String::from_utf8_lossy(&value.into_bytes()).to_string())
    }
}

impl From<FromPathBufError> for Error {
    fn from(value: FromPathBufError) -> Self {
        Self::Utf8(value.as_path().as_os_str().to_string_lossy().to_string())
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Other(value.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(format!("{value:#}"))
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Self::Other(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! io_bail {
    ($($t:tt)*) => {
        return ::core::result::Result::Err($crate::Error::Io(format!($($t)*)));
    };
}

#[macro_export]
macro_rules! api_bail {
    ($($t:tt)*) => {
        return ::core::result::Result::Err($crate::Error::Api(format!($($t)*)));
    };
}

#[macro_export]
macro_rules! auth_bail {
    ($($t:tt)*) => {
        return ::core::result::Result::Err($crate::Error::Auth(format!($($t)*)));
    };
}

#[macro_export]
macro_rules! config_bail {
    ($($t:tt)*) => {
        return ::core::result::Result::Err($crate::Error::Config(format!($($t)*)));
    };
}

#[macro_export]
macro_rules! io_error {
    ($($t:tt)*) => {
        $crate::Error::Io(format!($($t)*))
    };
}

#[macro_export]
macro_rules! api_error {
    ($($t:tt)*) => {
        $crate::Error::Api(format!($($t)*))
    };
}

#[macro_export]
macro_rules! conflict_error {
    ($($t:tt)*) => {
        $crate::Error::Conflict(format!($($t)*))
    };
}

#[macro_export]
macro_rules! auth_error {
    ($($t:tt)*) => {
        $crate::Error::Auth(format!($($t)*))
    };
}

#[macro_export]
macro_rules! other_error {
    ($($t:tt)*) => {
        $crate::Error::Other(format!($($t)*))
    };
}
