//! Error type for cidrtrie

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unparseable input, or address and mask of different widths.
    BadAddress,
    /// Insert without overwrite onto a prefix that already holds a value.
    NodeBusy,
    /// Delete target is absent.
    NotFound,
}

impl Error {
    pub fn as_str(self) -> &'static str {
        match self {
            Error::BadAddress => "Bad IP address or mask",
            Error::NodeBusy => "Node busy",
            Error::NotFound => "No such node",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for Error {}
