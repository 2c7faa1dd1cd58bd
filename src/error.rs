use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

/// Errors returned by extraction operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExtractError {
    ReadError(String),
    InvalidArgument(String),
    NotSupported(String),
    CorruptMessage(String),
}

impl Error for ExtractError {}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::ReadError(s) => write!(f, "Read error: {s}"),
            Self::InvalidArgument(s) => write!(f, "Invalid argument: {s}"),
            Self::NotSupported(s) => write!(f, "Not supported: {s}"),
            Self::CorruptMessage(s) => write!(f, "Corrupt message: {s}"),
        }
    }
}

impl From<io::Error> for ExtractError {
    fn from(e: io::Error) -> Self {
        Self::ReadError(e.to_string())
    }
}

impl From<DecodeError> for ExtractError {
    fn from(e: DecodeError) -> Self {
        Self::CorruptMessage(e.to_string())
    }
}

/// Errors returned when loading a persisted metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseError {
    ReadError(String),
    InvalidJson(String),
    ValueOutOfRange(String),
    VersionMismatch(u32),
    InvariantViolation(String),
    NoSuchMessage(usize),
}

impl Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::ReadError(s) => write!(f, "Read error: {s}"),
            Self::InvalidJson(s) => write!(f, "Invalid JSON: {s}"),
            Self::ValueOutOfRange(s) => write!(f, "Value out of range: {s}"),
            Self::VersionMismatch(v) => write!(f, "Not a version 1 metadata file: {v}"),
            Self::InvariantViolation(s) => write!(f, "Invalid metadata record: {s}"),
            Self::NoSuchMessage(i) => write!(f, "No such message: {i}"),
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        Self::ReadError(e.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidJson(e.to_string())
    }
}

/// Precondition breaches inside the bit decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DecodeError {
    WidthOutOfRange(usize),
    BufferTooShort(usize, usize),
}

impl Error for DecodeError {}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::WidthOutOfRange(w) => write!(f, "bit width {w} exceeds 64"),
            Self::BufferTooShort(needed, actual) => {
                write!(f, "buffer holds {actual} bytes but {needed} are needed")
            }
        }
    }
}
