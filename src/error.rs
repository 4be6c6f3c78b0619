use std::error;
use std::fmt;
use std::io;

use crate::processor::RuntimeError;
use crate::program::parse::ParseError;
use crate::program::scan::ScanError;

/// Any error that ends a run of the machine
#[derive(Debug)]
pub enum Error {
    Scan(ScanError),
    Parse(ParseError),
    Runtime(RuntimeError),
    /// Writing the trace failed
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Scan(err) => fmt::Display::fmt(err, f),
            Error::Parse(err) => fmt::Display::fmt(err, f),
            Error::Runtime(err) => fmt::Display::fmt(err, f),
            Error::Io(err) => write!(f, "error: {}", err),
        }
    }
}

impl error::Error for Error {}

impl From<ScanError> for Error {
    fn from(err: ScanError) -> Self {
        Error::Scan(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
