//! Command dispatch
//!
//! A [`Dispatcher`] owns the handler table of one dialect. The table is built
//! once and never changes. Each handler works on a draft copy of the device
//! state which replaces the live state only when the handler succeeds, so a
//! command rejected halfway leaves no partial mutation behind.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::debug;

use hqtrack_core::packet::TIMESTAMP_INDEX;
use hqtrack_core::{CommandCode, Dialect, Error, Packet, Result};
use hqtrack_types::wire_time;

use crate::device::DeviceState;
use crate::handlers;

/// One inbound command as seen by a handler
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// Resolved command code
    pub code: CommandCode,

    /// The inbound packet
    pub packet: &'a Packet,

    /// Response time
    pub now: NaiveDateTime,
}

impl<'a> CommandContext<'a> {
    pub fn new(code: CommandCode, packet: &'a Packet, now: NaiveDateTime) -> Self {
        Self { code, packet, now }
    }

    /// Required argument at `index`
    pub fn arg(&self, index: usize) -> Result<&'a str> {
        self.packet.require(index, self.code.as_str())
    }

    /// Optional argument at `index`
    pub fn opt(&self, index: usize) -> Option<&'a str> {
        self.packet.field(index)
    }

    /// Arguments from `index` to the end
    pub fn rest(&self, index: usize) -> &'a [String] {
        self.packet.fields_from(index)
    }

    /// Required argument at `index` parsed as `T`
    pub fn number<T>(&self, index: usize) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.packet.require_number(index, self.code.as_str())
    }

    /// Timestamp of the command, or the response time when it has none
    pub fn original_time(&self) -> String {
        self.packet
            .field(TIMESTAMP_INDEX)
            .map(str::to_owned)
            .unwrap_or_else(|| self.response_time())
    }

    /// `HHMMSS` of the response
    pub fn response_time(&self) -> String {
        wire_time(self.now)
    }

    /// Turn a field error into [`Error::InvalidField`] at `index`
    pub fn invalid(&self, index: usize, reason: impl fmt::Display) -> Error {
        Error::InvalidField {
            code: self.code.as_str().to_owned(),
            index,
            value: self.opt(index).unwrap_or_default().to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// Packet to send after a delay, once the reply is out
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUp {
    pub delay: Duration,
    pub packet: Packet,
}

/// What a handler sends back
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub packet: Packet,
    pub follow_up: Option<FollowUp>,
}

impl Reply {
    pub fn new(packet: Packet) -> Self {
        Self {
            packet,
            follow_up: None,
        }
    }

    /// Schedule `packet` to go out `delay` after this reply
    pub fn then(mut self, delay: Duration, packet: Packet) -> Self {
        self.follow_up = Some(FollowUp { delay, packet });
        self
    }
}

impl From<Packet> for Reply {
    fn from(packet: Packet) -> Self {
        Self::new(packet)
    }
}

/// Handler signature: may mutate the state and may answer
pub type Handler = fn(&CommandContext<'_>, &mut DeviceState) -> Result<Option<Reply>>;

/// Command code to handler table of one dialect
pub struct Dispatcher {
    dialect: Dialect,
    handlers: HashMap<CommandCode, Handler>,
}

impl Dispatcher {
    /// Build the handler table for `dialect`
    pub fn new(dialect: Dialect) -> Self {
        let handlers: HashMap<CommandCode, Handler> =
            handlers::table(dialect).iter().copied().collect();

        debug!("{} dispatcher with {} handlers", dialect, handlers.len());

        Self { dialect, handlers }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether a handler is registered for `code`
    pub fn handles(&self, code: CommandCode) -> bool {
        self.handlers.contains_key(&code)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `packet` against `state`
    ///
    /// Returns the reply, if the command has one. The state is only changed
    /// when the handler succeeds.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownCommand`] when no handler matches, or the handler's
    /// own error (missing or invalid field). In both cases `state` is left
    /// untouched and nothing should be sent.
    pub fn dispatch(
        &self,
        packet: &Packet,
        state: &mut DeviceState,
        now: NaiveDateTime,
    ) -> Result<Option<Reply>> {
        let code = self.dialect.resolve_code(packet)?;
        let handler = self
            .handlers
            .get(&code)
            .ok_or_else(|| Error::UnknownCommand(code.as_str().to_owned()))?;

        debug!("Dispatching {}", code);

        let ctx = CommandContext::new(code, packet, now);
        let mut draft = state.clone();
        let reply = handler(&ctx, &mut draft)?;
        *state = draft;

        Ok(reply)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("dialect", &self.dialect)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
