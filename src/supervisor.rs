//! Bounded-retry connection establishment.
//!
//! The server uses a [`Supervisor`] exactly once at startup to reach the book
//! helper. Attempts are sequential; after [`MAX_ATTEMPTS`] failures the caller
//! receives [`Connection::Exhausted`] and is expected to keep running without
//! the connection.
use std::{
    io,
    net::{SocketAddr, TcpStream},
    thread,
    time::Duration,
};

use log::{info, warn};

pub const MAX_ATTEMPTS: usize = 3;

#[derive(Debug)]
pub enum Connection<S> {
    Connected(S),
    Exhausted,
}

impl<S> Connection<S> {
    pub fn ok(self) -> Option<S> {
        match self {
            Connection::Connected(s) => Some(s),
            Connection::Exhausted => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Supervisor {
    attempts: usize,
    delay: Option<Duration>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    /// Three attempts, back to back.
    pub fn new() -> Self {
        Self {
            attempts: MAX_ATTEMPTS,
            delay: None,
        }
    }

    /// Sleep for `delay` after every failed attempt except the last.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn connect(&self, address: SocketAddr) -> Connection<TcpStream> {
        info!("connecting to {address}");
        self.connect_with(|| TcpStream::connect(address))
    }

    pub fn connect_with<S, F>(&self, mut attempt: F) -> Connection<S>
    where
        F: FnMut() -> io::Result<S>,
    {
        for n in 1..=self.attempts {
            match attempt() {
                Ok(stream) => {
                    info!("connected after {n} attempt(s)");
                    return Connection::Connected(stream);
                }
                Err(e) => {
                    warn!("connection attempt {n}/{} failed: {e}", self.attempts);
                    if let (Some(delay), true) = (self.delay, n < self.attempts) {
                        thread::sleep(delay);
                    }
                }
            }
        }

        warn!("ran out of connection attempts ({})", self.attempts);
        Connection::Exhausted
    }
}
