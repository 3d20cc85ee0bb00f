//! Error types for netconfig.

use std::fmt;
use std::io;

/// Main error type for apply operations.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Parse(ParseError),
    Network(NetworkError),
    /// Failure of a must-succeed pipeline step. Aborts the whole apply.
    Fatal {
        step: &'static str,
        source: Box<Error>,
    },
}

/// Malformed configuration input.
#[derive(Debug)]
pub enum ParseError {
    SubnetMask { mask: String, reason: String },
    Addr { addr: String, reason: String },
    Json(serde_json::Error),
}

/// Kernel-facing operation failures, each carrying the attempted
/// operation and its arguments.
#[derive(Debug)]
pub enum NetworkError {
    LinkNotFound(String),
    Netlink { op: String, msg: String },
    Sysctl { path: String, source: io::Error },
    Sockopt { opt: &'static str, source: io::Error },
    Socket(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
            Error::Network(e) => write!(f, "Network error: {e}"),
            Error::Fatal { step, source } => write!(f, "{step}: {source}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::SubnetMask { mask, reason } => {
                write!(f, "invalid subnet mask {mask:?}: {reason}")
            }
            ParseError::Addr { addr, reason } => write!(f, "invalid address {addr:?}: {reason}"),
            ParseError::Json(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::LinkNotFound(name) => write!(f, "no such link: {name}"),
            NetworkError::Netlink { op, msg } => write!(f, "{op}: {msg}"),
            NetworkError::Sysctl { path, source } => write!(f, "sysctl({path}): {source}"),
            NetworkError::Sockopt { opt, source } => write!(f, "setsockopt({opt}): {source}"),
            NetworkError::Socket(e) => write!(f, "socket: {e}"),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for ParseError {}
impl std::error::Error for NetworkError {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Error::Network(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(ParseError::Json(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
