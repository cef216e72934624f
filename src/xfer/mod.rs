//! Streaming files across a link.
//!
//! The `xfer` module brings a link up, moves a byte stream across it in
//! MTU sized packets and accounts the time spent in the link calls.

pub mod endpoint;
mod engine;
pub mod monitor;
pub mod session;

use std::fmt;
use std::time::Duration;

use link::{
    SpeedCode,
    MAX_PACKET_SIZE,
};
use {
    Error,
    Result,
};

pub use self::endpoint::{
    Data,
    Plan,
};
pub use self::monitor::{
    Monitor,
    Report,
    ThroughputSample,
};
pub use self::session::Session;

/// Checks that an MTU is positive and that a packet of that size fits the
/// receive buffer of the peer.
pub fn check_mtu(mtu: usize) -> Result<usize> {
    if mtu == 0 || mtu > MAX_PACKET_SIZE {
        return Err(Error::Config(format!(
            "MTU must be between 1 and {} bytes, got {}",
            MAX_PACKET_SIZE, mtu
        )));
    }
    Ok(mtu)
}

/// Which way data moves across the link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Data is read from a file or stdin and sent across the link.
    ToLink,
    /// Data is received from the link and written to a file or stdout.
    FromLink,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Direction::ToLink => write!(f, "transmitter"),
            Direction::FromLink => write!(f, "receiver"),
        }
    }
}

/// How long to poll for the link to reach the running state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkWait {
    /// Pause between two polls.
    pub interval: Duration,
    /// Give up after this many polls.
    pub max_polls: Option<u64>,
    /// Give up once this much time has passed since the first poll.
    pub deadline: Option<Duration>,
}

impl Default for LinkWait {
    /// Polls every 10us, forever.
    fn default() -> LinkWait {
        LinkWait {
            interval: Duration::from_micros(10),
            max_polls: None,
            deadline: None,
        }
    }
}

/// Settings for one transfer session.
#[derive(Clone, Debug)]
pub struct Config {
    /// Transmit rate requested once the link runs.
    pub tx_speed: SpeedCode,
    /// MTU to program before transmitting; None keeps the link's MTU.
    pub mtu: Option<usize>,
    /// Stop after this many packets; None runs until the data runs out.
    pub packets: Option<u64>,
    /// Print the transfer report.
    pub verbose: bool,
    pub wait: LinkWait,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            tx_speed: SpeedCode::default(),
            mtu: None,
            packets: None,
            verbose: false,
            wait: LinkWait::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_mtu() {
        assert_eq!(check_mtu(1).unwrap(), 1);
        assert_eq!(check_mtu(MAX_PACKET_SIZE).unwrap(), MAX_PACKET_SIZE);
        assert_matches!(check_mtu(0), Err(Error::Config(_)));
        assert_matches!(check_mtu(MAX_PACKET_SIZE + 1), Err(Error::Config(_)));
    }
}
