//! Request/response session with the module.
//!
//! A [`Session`] runs one command at a time: switch to command mode if the
//! transport is in data mode, send the line, read the reply line, consume
//! the status token, then switch back. The switch is held by a
//! [`CommandMode`] guard so the caller's mode is restored on every exit
//! path.
//!
//! Fatal conditions (non-`OK` status, transport failure, rejected
//! preconditions) raise the session's [`AlertSink`] and halt the session:
//! every later call returns [`Error::Halted`] without touching the module.

use std::ops::{Deref, DerefMut};

use tracing::{debug, info, trace, warn};

use crate::alert::{AlertSink, LogAlert};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::protocol::{Reply, Status};
use crate::transport::{ProtocolMode, Transport};

/// Scoped command mode on a transport.
///
/// Entering switches a transport that is in [`ProtocolMode::Data`] to
/// [`ProtocolMode::Command`]. Data mode is restored by [`CommandMode::exit`]
/// or, if the guard is dropped early, by `Drop`. A transport already in
/// command mode is left untouched.
pub struct CommandMode<'a, T: Transport> {
    transport: &'a mut T,
    restore: bool,
}

impl<'a, T: Transport> CommandMode<'a, T> {
    /// Enter command mode.
    pub fn enter(transport: &'a mut T) -> Result<Self> {
        let restore = transport.mode() == ProtocolMode::Data;
        if restore {
            transport.set_mode(ProtocolMode::Command)?;
        }
        Ok(Self { transport, restore })
    }

    /// Restore the prior mode, reporting a failed switch.
    pub fn exit(mut self) -> Result<()> {
        if self.restore {
            self.restore = false;
            self.transport.set_mode(ProtocolMode::Data)?;
        }
        Ok(())
    }
}

impl<T: Transport> Deref for CommandMode<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: Transport> DerefMut for CommandMode<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: Transport> Drop for CommandMode<'_, T> {
    fn drop(&mut self) {
        if self.restore {
            if let Err(e) = self.transport.set_mode(ProtocolMode::Data) {
                warn!("Failed to restore data mode: {}", e);
            }
        }
    }
}

/// One logical session with a module.
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    alert: Box<dyn AlertSink>,
    halted: bool,
}

impl<T: Transport> Session<T> {
    /// Create a session with default configuration and a logging alert.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Create a session with the given configuration.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            alert: Box::new(LogAlert),
            halted: false,
        }
    }

    /// Replace the alert sink.
    pub fn with_alert(mut self, alert: impl AlertSink + 'static) -> Self {
        self.alert = Box::new(alert);
        self
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport, e.g. to enter data mode.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Whether a fatal error has stopped this session.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Fail with [`Error::Halted`] once the session has stopped.
    pub fn ensure_running(&self) -> Result<()> {
        if self.halted {
            Err(Error::Halted)
        } else {
            Ok(())
        }
    }

    /// Run one command and return the reply with its status.
    ///
    /// A reply whose first line is already a status token has an empty
    /// payload. Otherwise the first line is the payload, capped at
    /// `max_reply_len` bytes, and the trailing status is consumed. A
    /// non-`OK` status is returned as `ok == false`; transport errors halt
    /// the session.
    pub fn exchange(&mut self, command: &[u8]) -> Result<Reply> {
        self.ensure_running()?;
        match self.run_exchange(command) {
            Ok(reply) => Ok(reply),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn run_exchange(&mut self, command: &[u8]) -> Result<Reply> {
        let verbose = self.config.verbose;
        let max_reply_len = self.config.max_reply_len;

        let mut link = CommandMode::enter(&mut self.transport)?;

        echo(verbose, "->", &String::from_utf8_lossy(command));
        link.send_line(command)?;

        let line = link.read_line()?;
        let text = String::from_utf8_lossy(&line);
        echo(verbose, "<-", &text);

        let reply = match Status::classify(&text) {
            Some(status) => Reply {
                ok: status.is_ok(),
                payload: String::new(),
                truncated: false,
            },
            None => {
                let ok = link.wait_for_status()?;
                let truncated = text.len() > max_reply_len;
                if truncated {
                    debug!(
                        "Reply truncated from {} to {} bytes",
                        text.len(),
                        max_reply_len
                    );
                }
                Reply {
                    ok,
                    payload: truncate(&text, max_reply_len),
                    truncated,
                }
            }
        };

        link.exit()?;
        Ok(reply)
    }

    /// Run a command and report only its status.
    pub fn send_command_check_ok(&mut self, command: &[u8]) -> Result<bool> {
        Ok(self.exchange(command)?.ok)
    }

    /// Run a command whose reply starts with a signed integer.
    pub fn send_command_with_int_reply(&mut self, command: &[u8]) -> Result<(bool, i32)> {
        let reply = self.exchange(command)?;
        Ok((reply.ok, reply.leading_int()))
    }

    /// Run a command and keep its whole reply payload.
    pub fn send_command_with_string_reply(&mut self, command: &[u8]) -> Result<Reply> {
        self.exchange(command)
    }

    /// Halt unless the module reported success.
    pub fn assert_ok(&mut self, ok: bool, context: &str) -> Result<()> {
        if ok {
            return Ok(());
        }
        Err(self.fail(Error::CommandFailed {
            context: context.to_string(),
        }))
    }

    /// Record a fatal error: raise the alert and halt.
    ///
    /// Returns the error for propagation.
    pub fn fail(&mut self, error: Error) -> Error {
        if error.is_fatal() && !self.halted {
            self.alert.raise(&error.to_string());
            self.halted = true;
        }
        error
    }

    /// Pass `result` through, halting the session if it is an error.
    pub fn check<V>(&mut self, result: Result<V>) -> Result<V> {
        self.ensure_running()?;
        result.map_err(|e| self.fail(e))
    }
}

fn echo(verbose: bool, direction: &str, line: &str) {
    if verbose {
        info!("{} {}", direction, line);
    } else {
        trace!("{} {}", direction, line);
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
