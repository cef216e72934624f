//! Tools for configuring SpaceWire links and streaming files across them.

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
extern crate libc;
#[macro_use]
extern crate log;
#[cfg(test)]
extern crate tempfile;

use std::fmt;
use std::path::PathBuf;

pub mod control;
pub mod link;
pub mod time;
pub mod xfer;

#[cfg(target_os = "linux")]
pub mod linux;

use link::LinkState;

#[derive(Debug)]
pub enum Error {
    /// Indicates an invalid argument or setting, found before any transfer.
    Config(String),
    /// Indicates a device or file which could not be opened.
    Open(PathBuf, std::io::Error),
    /// Indicates a transfer buffer which could not be allocated.
    Alloc(usize),
    /// Indicates a failure reported by the link layer.
    Link(link::Error),
    /// Indicates an error reading from the data source.
    Source(std::io::Error),
    /// Indicates an error writing to the data sink.
    Sink(std::io::Error),
    /// Indicates the link accepted fewer bytes than it was given.
    ShortWrite { expected: usize, written: usize },
    /// Indicates a read from the link which returned no data.
    EmptyPacket,
    /// Indicates a transfer attempted while the link was not running.
    NotRunning(LinkState),
    /// Indicates the link did not come up within the configured limits.
    LinkTimeout { polls: u64 },
}

impl Error {
    /// Returns true if the error means the link dropped mid-transfer.
    pub fn is_link_loss(&self) -> bool {
        match *self {
            Error::Link(link::Error::NoLink) => true,
            _ => false,
        }
    }
}

impl From<link::Error> for Error {
    fn from(err: link::Error) -> Self {
        Error::Link(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Config(ref msg) => write!(f, "{}", msg),
            Error::Open(ref path, ref err) => write!(f, "Failed to open {}: {}", path.display(), err),
            Error::Alloc(size) => write!(f, "Failed to allocate {} bytes", size),
            Error::Link(ref err) => write!(f, "{}", err),
            Error::Source(ref err) => write!(f, "Failed to read data from file: {}", err),
            Error::Sink(ref err) => write!(f, "Failed to write data: {}", err),
            Error::ShortWrite { expected, written } => write!(
                f,
                "Failed to write data: link took {} of {} bytes",
                written, expected
            ),
            Error::EmptyPacket => write!(f, "Failed to read data: empty packet"),
            Error::NotRunning(state) => write!(f, "Link is not running (state {})", state),
            Error::LinkTimeout { polls } => {
                write!(f, "Link did not come up after {} polls", polls)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
