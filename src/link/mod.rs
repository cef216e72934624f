//! The control and data interface of a SpaceWire link.

use std;
use std::fmt;
use std::str::FromStr;

pub mod loopback;

pub use self::loopback::Loopback;

/// Largest packet the link layer hands out on a single read.
pub const MAX_PACKET_SIZE: usize = 1024 * 1024;

/// A control request understood by the link layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    SetLink(bool),
    Reset,
    GetLinkState,
    SetTxSpeed,
    GetSpeed,
    SetMtu,
    GetMtu,
    LvdsTest,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let what = match *self {
            Request::SetLink(true) => "set link",
            Request::SetLink(false) => "disconnect the link",
            Request::Reset => "reset link",
            Request::GetLinkState => "get link state",
            Request::SetTxSpeed => "set TX speed",
            Request::GetSpeed => "get link speed",
            Request::SetMtu => "set MTU",
            Request::GetMtu => "get MTU",
            Request::LvdsTest => "start LVDS test",
        };
        write!(f, "{}", what)
    }
}

#[derive(Debug)]
pub enum Error {
    /// Indicates a control request rejected by the link layer.
    Control(Request, std::io::Error),
    /// Indicates the link dropped while a transfer was in flight.
    NoLink,
    /// Indicates a generic IO error on the data path.
    IO(std::io::Error),
    /// Indicates a miscellaneous error with a message.
    Unknown(&'static str),
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Control(request, ref err) => write!(f, "Failed to {}: {}", request, err),
            Error::NoLink => write!(f, "Link is not set"),
            Error::IO(ref err) => write!(f, "{}", err),
            Error::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// States of the link state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    ErrorReset,
    ErrorWait,
    Ready,
    Started,
    Connecting,
    Running,
}

impl LinkState {
    /// Decodes the raw state reported by the driver.
    pub fn from_raw(raw: u32) -> Option<LinkState> {
        match raw {
            0 => Some(LinkState::ErrorReset),
            1 => Some(LinkState::ErrorWait),
            2 => Some(LinkState::Ready),
            3 => Some(LinkState::Started),
            4 => Some(LinkState::Connecting),
            5 => Some(LinkState::Running),
            _ => None,
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            LinkState::ErrorReset => "ErrorReset",
            LinkState::ErrorWait => "ErrorWait",
            LinkState::Ready => "Ready",
            LinkState::Started => "Started",
            LinkState::Connecting => "Connecting",
            LinkState::Running => "Run",
        };
        write!(f, "{}", name)
    }
}

/// Transmit rate selectors, named after their rate in Mbit/s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedCode {
    Mbps2p4,
    Mbps4p8,
    Mbps72,
    Mbps120,
    Mbps168,
    Mbps216,
    Mbps264,
    Mbps312,
    Mbps360,
    Mbps408,
}

const SPEED_CODES: [SpeedCode; 10] = [
    SpeedCode::Mbps2p4,
    SpeedCode::Mbps4p8,
    SpeedCode::Mbps72,
    SpeedCode::Mbps120,
    SpeedCode::Mbps168,
    SpeedCode::Mbps216,
    SpeedCode::Mbps264,
    SpeedCode::Mbps312,
    SpeedCode::Mbps360,
    SpeedCode::Mbps408,
];

impl SpeedCode {
    /// Returns the value the driver expects for this rate.
    pub fn code(&self) -> u32 {
        match *self {
            SpeedCode::Mbps2p4 => 255,
            SpeedCode::Mbps4p8 => 0,
            SpeedCode::Mbps72 => 1,
            SpeedCode::Mbps120 => 2,
            SpeedCode::Mbps168 => 3,
            SpeedCode::Mbps216 => 4,
            SpeedCode::Mbps264 => 5,
            SpeedCode::Mbps312 => 6,
            SpeedCode::Mbps360 => 7,
            SpeedCode::Mbps408 => 8,
        }
    }

    pub fn from_code(code: u32) -> Option<SpeedCode> {
        SPEED_CODES.iter().cloned().find(|speed| speed.code() == code)
    }

    /// Nominal transmit rate in Mbit/s.
    pub fn mbps(&self) -> f64 {
        match *self {
            SpeedCode::Mbps2p4 => 2.4,
            SpeedCode::Mbps4p8 => 4.8,
            speed => (48 * (speed.code() - 1) + 72) as f64,
        }
    }

    /// The name used on the command line, e.g. "2.4" or "408".
    pub fn name(&self) -> &'static str {
        match *self {
            SpeedCode::Mbps2p4 => "2.4",
            SpeedCode::Mbps4p8 => "4.8",
            SpeedCode::Mbps72 => "72",
            SpeedCode::Mbps120 => "120",
            SpeedCode::Mbps168 => "168",
            SpeedCode::Mbps216 => "216",
            SpeedCode::Mbps264 => "264",
            SpeedCode::Mbps312 => "312",
            SpeedCode::Mbps360 => "360",
            SpeedCode::Mbps408 => "408",
        }
    }
}

impl Default for SpeedCode {
    fn default() -> SpeedCode {
        SpeedCode::Mbps408
    }
}

impl fmt::Display for SpeedCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} Mbit/s", self.name())
    }
}

impl FromStr for SpeedCode {
    type Err = Error;

    /// Parses either a rate name ("2.4", "72", ... "408") or a raw driver
    /// code ("0" ... "8", "255"). The two sets do not overlap.
    fn from_str(s: &str) -> Result<SpeedCode> {
        let s = s.trim();

        if let Some(speed) = SPEED_CODES.iter().find(|speed| speed.name() == s) {
            return Ok(*speed);
        }

        s.parse::<u32>()
            .ok()
            .and_then(SpeedCode::from_code)
            .ok_or(Error::Unknown("Unknown speed argument"))
    }
}

/// Rates last measured by the link hardware.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Speed {
    pub tx_kbps: u32,
    pub rx_kbps: u32,
}

impl Speed {
    pub fn tx_mbps(&self) -> f64 {
        self.tx_kbps as f64 / 1000.0
    }

    pub fn rx_mbps(&self) -> f64 {
        self.rx_kbps as f64 / 1000.0
    }
}

/// Counters returned by the LVDS controller self-test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LvdsReport {
    pub iters: u32,
    pub s_lvds_0: u32,
    pub s_lvds_1: u32,
    pub d_lvds_0: u32,
    pub d_lvds_1: u32,
}

impl fmt::Display for LvdsReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "LVDS test results:")?;
        writeln!(f, "\t\tLVDS test iterations: {}", self.iters)?;
        writeln!(
            f,
            "\t\tS_LVDS: \"0\" = {}, \"1\" = {}",
            self.s_lvds_0, self.s_lvds_1
        )?;
        write!(
            f,
            "\t\tD_LVDS: \"0\" = {}, \"1\" = {}",
            self.d_lvds_0, self.d_lvds_1
        )
    }
}

/// A low level interface for controlling a link and moving packets across
/// it. Every call blocks until the link layer responds.
pub trait Link {
    /// Allows (true) or disallows (false) the link to connect.
    fn set_link(&mut self, enable: bool) -> Result<()>;

    /// Resets the link and any in-flight FIFO state.
    fn reset(&mut self) -> Result<()>;

    /// Returns the current state of the link state machine.
    fn get_link_state(&self) -> Result<LinkState>;

    /// Selects the transmit rate.
    fn set_tx_speed(&mut self, speed: SpeedCode) -> Result<()>;

    /// Returns the rates last measured by the hardware.
    fn get_speed(&self) -> Result<Speed>;

    /// Sets the largest packet the link will send.
    fn set_mtu(&mut self, mtu: usize) -> Result<()>;

    /// Returns the [MTU](https://en.wikipedia.org/wiki/Maximum_transmission_unit)
    /// of the link.
    fn get_mtu(&self) -> Result<usize>;

    /// Sends one packet and returns the number of bytes the link accepted.
    fn send(&mut self, buffer: &[u8]) -> Result<usize>;

    /// Reads one packet into the buffer and returns its size. The buffer
    /// should hold at least MAX_PACKET_SIZE bytes to avoid truncation.
    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize>;
}

/// A Link extension with an LVDS controller self-test.
pub trait LvdsLink: Link {
    /// Runs the self-test for the given number of iterations.
    fn lvds_test(&mut self, iters: u32) -> Result<LvdsReport>;
}
