//! Abstractions for providing the current time.

use std::cell::Cell;
use std::fmt::Debug;
use std::rc::Rc;
use std::thread;
use std::time::{
    Duration,
    Instant,
};

/// An environment that provides the current time and a way to wait.
pub trait Env: Clone + Debug {
    /// Returns an instance corresponding to "now".
    fn now_instant(&self) -> Instant;

    /// Blocks the caller for at least the given duration.
    fn sleep(&self, duration: Duration);
}

/// An environment that provides system based time.
#[derive(Clone, Debug)]
pub struct SystemEnv;

impl SystemEnv {
    pub fn new() -> SystemEnv {
        SystemEnv {}
    }
}

impl Env for SystemEnv {
    fn now_instant(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// An environment that provides a configurable time.
///
/// Clones share the same clock, so a link under test can advance the time
/// observed by the code driving it. Sleeping advances the clock instead of
/// blocking.
#[derive(Clone, Debug)]
pub struct MockEnv {
    now: Rc<Cell<Instant>>,
}

impl MockEnv {
    pub fn new() -> MockEnv {
        MockEnv {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Env for MockEnv {
    fn now_instant(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
