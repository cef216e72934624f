use std::io::{
    Read,
    Write,
};

use link::{
    Link,
    LinkState,
};
use time::{
    Env,
    SystemEnv,
};
use xfer::endpoint::Data;
use xfer::engine::Engine;
use xfer::{
    Config,
    Plan,
    Report,
};
use {
    Error,
    Result,
};

/// Owns an open link for the lifetime of a transfer.
///
/// A session brings the link up, sets the transmit rate, then runs one
/// transfer in one direction. The link is closed when the session (and the
/// link inside it) is dropped, on success and error paths alike.
pub struct Session<L: Link, E: Env = SystemEnv> {
    link: L,
    config: Config,
    env: E,
    state: Option<LinkState>,
}

impl<L: Link> Session<L, SystemEnv> {
    pub fn new(link: L, config: Config) -> Session<L, SystemEnv> {
        Session::with_env(link, config, SystemEnv::new())
    }
}

impl<L: Link, E: Env> Session<L, E> {
    pub fn with_env(link: L, config: Config, env: E) -> Session<L, E> {
        Session {
            link,
            config,
            env,
            state: None,
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The last link state observed, if the link was polled at all.
    pub fn state(&self) -> Option<LinkState> {
        self.state
    }

    pub fn into_link(self) -> L {
        self.link
    }

    /// Enables the link, waits for it to run and requests the configured
    /// transmit rate.
    pub fn bring_up(&mut self) -> Result<()> {
        self.link.set_link(true)?;
        self.wait_for_link()?;
        self.link.set_tx_speed(self.config.tx_speed)?;
        info!("Link is up, TX speed set to {}.", self.config.tx_speed);
        Ok(())
    }

    /// Polls the link state until it runs or the configured limits are hit.
    fn wait_for_link(&mut self) -> Result<()> {
        let wait = self.config.wait;
        let start = self.env.now_instant();
        let mut polls = 0;

        loop {
            let state = self.observe()?;
            polls += 1;

            if state == LinkState::Running {
                debug!("Link running after {} polls.", polls);
                return Ok(());
            }

            let out_of_polls = wait.max_polls.map_or(false, |max| polls >= max);
            let out_of_time = wait.deadline.map_or(false, |deadline| {
                self.env.now_instant().duration_since(start) >= deadline
            });

            if out_of_polls || out_of_time {
                warn!("Gave up waiting for link in state {}.", state);
                return Err(Error::LinkTimeout { polls });
            }

            self.env.sleep(wait.interval);
        }
    }

    /// Reads the link state, logging transitions.
    fn observe(&mut self) -> Result<LinkState> {
        let state = self.link.get_link_state()?;

        if self.state != Some(state) {
            debug!("Link state is {}.", state);
            self.state = Some(state);
        }

        Ok(state)
    }

    fn check_running(&mut self) -> Result<()> {
        match self.observe()? {
            LinkState::Running => Ok(()),
            state => Err(Error::NotRunning(state)),
        }
    }

    /// Sends the source across the link.
    pub fn transmit<R: Read>(&mut self, source: &mut R) -> Result<Report> {
        self.check_running()?;
        Engine::new(&mut self.link, &self.env).transmit(source, &self.config)
    }

    /// Receives from the link into the sink.
    pub fn receive<W: Write>(&mut self, sink: &mut W) -> Result<Report> {
        self.check_running()?;
        Engine::new(&mut self.link, &self.env).receive(sink, &self.config)
    }

    /// Transfers in the direction the opened data end implies.
    pub fn transfer(&mut self, data: &mut Data) -> Result<Report> {
        match *data {
            Data::Source(ref mut source) => self.transmit(source),
            Data::Sink(ref mut sink) => self.receive(sink),
        }
    }

    /// Opens the data end of the plan and transfers in the plan's direction.
    pub fn run(&mut self, plan: &Plan) -> Result<Report> {
        let mut data = plan.open()?;
        self.transfer(&mut data)
    }
}
