//! Inspecting and configuring a link outside of a transfer.

use std::fmt;
use std::str::FromStr;

use link::{
    Link,
    LinkState,
    Speed,
    SpeedCode,
};
use {
    Error,
    Result,
};

/// A snapshot of the link's configuration and state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Info {
    pub state: LinkState,
    pub speed: Speed,
    pub mtu: usize,
}

impl fmt::Display for Info {
    /// Rates are printed in kbit/s, as the hardware reports them.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Link state: {}", self.state)?;
        writeln!(f, "\t\t\tTX speed: {}", self.speed.tx_kbps)?;
        writeln!(f, "\t\t\tRX speed: {}", self.speed.rx_kbps)?;
        write!(f, "\t\t\tMTU: {}", self.mtu)
    }
}

/// Queries the link state, rates and MTU.
pub fn info<L: Link>(link: &L) -> Result<Info> {
    Ok(Info {
        state: link.get_link_state()?,
        speed: link.get_speed()?,
        mtu: link.get_mtu()?,
    })
}

/// What to do with the link after the MTU and rate are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkCommand {
    /// Allows the link to connect.
    Up,
    /// Disallows the link and resets it.
    Down,
    /// Resets the link and its FIFO buffers.
    Reset,
}

impl FromStr for LinkCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<LinkCommand> {
        match s {
            "up" => Ok(LinkCommand::Up),
            "down" => Ok(LinkCommand::Down),
            "reset" => Ok(LinkCommand::Reset),
            _ => Err(Error::Config(format!("Unknown link command: {}", s))),
        }
    }
}

/// Changes requested on the command line. Nothing set means show the link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub mtu: Option<usize>,
    pub speed: Option<SpeedCode>,
    pub link: Option<LinkCommand>,
}

impl Settings {
    pub fn is_empty(&self) -> bool {
        self.mtu.is_none() && self.speed.is_none() && self.link.is_none()
    }
}

/// Applies the MTU, then the rate, then the link command. Stops at the first
/// rejected request.
pub fn apply<L: Link>(link: &mut L, settings: &Settings) -> Result<()> {
    if let Some(mtu) = settings.mtu {
        link.set_mtu(mtu)?;
        info!("MTU set to {} bytes.", mtu);
    }

    if let Some(speed) = settings.speed {
        link.set_tx_speed(speed)?;
        info!("TX speed set to {}.", speed);
    }

    match settings.link {
        Some(LinkCommand::Up) => link.set_link(true)?,
        Some(LinkCommand::Down) => link.set_link(false)?,
        Some(LinkCommand::Reset) => link.reset()?,
        None => {}
    }

    Ok(())
}
