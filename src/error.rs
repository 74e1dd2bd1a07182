use quick_xml::Error as XMLError;
use std::{str::Utf8Error, string::FromUtf8Error};

/// Wrapper around `std::Result`
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// [`std::io`] related error.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// Decoding related error.
    /// Maybe the XML declaration has an encoding value that it doesn't recognize,
    /// or it doesn't match its actual encoding,
    #[error("Cannot decode XML")]
    CannotDecode,
    /// Assorted errors while parsing XML.
    #[error("Malformed XML: {0}")]
    MalformedXML(String),
    /// A file, attribute, child or root element that was looked up doesn't exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The mutation would make an element its own child or create a cycle.
    /// The tree is left unmodified.
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
    /// Position-based access outside of `0..len`.
    #[error("Index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
}

impl From<XMLError> for Error {
    fn from(err: XMLError) -> Error {
        match err {
            XMLError::EndEventMismatch { expected, found } => Error::MalformedXML(format!(
                "Closing tag mismatch. Expected {}, found {}",
                expected, found,
            )),
            XMLError::Io(err) => Error::Io(err),
            XMLError::Utf8(_) => Error::CannotDecode,
            err => Error::MalformedXML(err.to_string()),
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_: FromUtf8Error) -> Error {
        Error::CannotDecode
    }
}

impl From<Utf8Error> for Error {
    fn from(_: Utf8Error) -> Error {
        Error::CannotDecode
    }
}
