//! Session management for a simulated device connection
//!
//! A session tracks:
//! - Connection state (shared "connected" flag of both loops)
//! - Frames received and packets sent

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected
    Disconnected,

    /// Transport is up
    Connected,

    /// Login packet sent (GT06 only)
    LoggedIn,
}

/// Session handle
///
/// Shared by the inbound and outbound loops. Thread-safe and can be cloned
/// cheaply (Arc internally). Clearing the connected state is how either loop
/// asks the other to stop.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Complete frames taken off the wire
    frames_received: AtomicU64,

    /// Packets written to the transport
    packets_sent: AtomicU64,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                frames_received: AtomicU64::new(0),
                packets_sent: AtomicU64::new(0),
                state: parking_lot::RwLock::new(SessionState::Disconnected),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        !matches!(self.state(), SessionState::Disconnected)
    }

    /// Check if the login packet went out
    pub fn is_logged_in(&self) -> bool {
        matches!(self.state(), SessionState::LoggedIn)
    }

    /// Mark the transport as connected
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Disconnected {
            return Err(Error::InvalidSessionState(
                format!("Cannot initialize from state: {:?}", *state)
            ));
        }

        self.inner.frames_received.store(0, Ordering::Release);
        self.inner.packets_sent.store(0, Ordering::Release);
        *state = SessionState::Connected;

        Ok(())
    }

    /// Record that the login packet was sent
    ///
    /// Repeated logins (after a restart command) are allowed.
    pub fn login(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state == SessionState::Disconnected {
            return Err(Error::InvalidSessionState(
                format!("Cannot log in from state: {:?}", *state)
            ));
        }

        *state = SessionState::LoggedIn;
        Ok(())
    }

    /// Close session
    ///
    /// Returns `true` if this call performed the transition.
    pub fn close(&self) -> bool {
        let mut state = self.inner.state.write();
        let was_connected = *state != SessionState::Disconnected;
        *state = SessionState::Disconnected;
        was_connected
    }

    pub fn record_frame(&self) {
        self.inner.frames_received.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_sent(&self) {
        self.inner.packets_sent.fetch_add(1, Ordering::AcqRel);
    }

    pub fn frames_received(&self) -> u64 {
        self.inner.frames_received.load(Ordering::Acquire)
    }

    pub fn packets_sent(&self) -> u64 {
        self.inner.packets_sent.load(Ordering::Acquire)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
