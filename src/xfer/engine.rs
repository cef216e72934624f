use std::io::{
    self,
    Read,
    Write,
};

use link::{
    Link,
    MAX_PACKET_SIZE,
};
use time::Env;
use xfer::{
    check_mtu,
    Config,
    Direction,
    Monitor,
    Report,
};
use {
    Error,
    Result,
};

/// Drives the packet loops against a running link.
///
/// Both loops are fail fast: the first error ends the transfer, and the
/// monitor keeps only the link calls which completed before it.
pub struct Engine<'a, L: 'a + Link, E: 'a + Env> {
    link: &'a mut L,
    env: &'a E,
    monitor: Monitor,
}

impl<'a, L: Link, E: Env> Engine<'a, L, E> {
    pub fn new(link: &'a mut L, env: &'a E) -> Engine<'a, L, E> {
        Engine {
            link,
            env,
            monitor: Monitor::new(),
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Reads the source in MTU sized chunks and sends each chunk as one
    /// packet until the source is exhausted or the packet budget runs out.
    pub fn transmit<R: Read>(&mut self, source: &mut R, config: &Config) -> Result<Report> {
        if let Some(mtu) = config.mtu {
            self.link.set_mtu(check_mtu(mtu)?)?;
        }

        let mtu = check_mtu(self.link.get_mtu()?)?;

        let mut buffer = alloc(mtu)?;
        let mut budget = config.packets;

        while budget != Some(0) {
            let len = fill(source, &mut buffer).map_err(Error::Source)?;
            if len == 0 {
                break;
            }

            let start = self.env.now_instant();
            let sent = self.link.send(&buffer[..len]);
            let elapsed = self.env.now_instant().duration_since(start);

            let written = sent?;
            if written != len {
                return Err(Error::ShortWrite {
                    expected: len,
                    written,
                });
            }

            self.monitor.record(written, elapsed);
            debug!("Sent packet of {} bytes.", written);

            if let Some(ref mut left) = budget {
                *left -= 1;
            }
        }

        Ok(Report {
            direction: Direction::ToLink,
            speed: self.link.get_speed()?,
            mtu: Some(mtu),
            packets: self.monitor.operations(),
            sample: self.monitor.sample(),
        })
    }

    /// Receives packets into the sink, flushing after each one, until the
    /// packet budget runs out. Without a budget this only ends on an error.
    ///
    /// The link is taken down once the budget is used up.
    pub fn receive<W: Write>(&mut self, sink: &mut W, config: &Config) -> Result<Report> {
        let mut buffer = alloc(MAX_PACKET_SIZE)?;
        let mut budget = config.packets;

        while budget != Some(0) {
            let start = self.env.now_instant();
            let received = self.link.recv(&mut buffer);
            let elapsed = self.env.now_instant().duration_since(start);

            let len = received?;
            if len == 0 {
                return Err(Error::EmptyPacket);
            }

            self.monitor.record(len, elapsed);
            debug!("Received packet of {} bytes.", len);

            sink.write_all(&buffer[..len])
                .and_then(|_| sink.flush())
                .map_err(Error::Sink)?;

            if let Some(ref mut left) = budget {
                *left -= 1;
            }
        }

        let speed = self.link.get_speed()?;
        self.link.set_link(false)?;

        Ok(Report {
            direction: Direction::FromLink,
            speed,
            mtu: None,
            packets: self.monitor.operations(),
            sample: self.monitor.sample(),
        })
    }
}

/// Allocates a zeroed transfer buffer, failing instead of aborting.
fn alloc(len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| Error::Alloc(len))?;
    buffer.resize(len, 0);
    Ok(buffer)
}

/// Reads until the buffer is full or the source is exhausted.
fn fill<R: Read>(source: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buffer.len() {
        match source.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(filled)
}
