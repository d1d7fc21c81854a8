//! Scripted transport for deterministic testing without hardware.
//!
//! [`ScriptedTransport`] implements [`Transport`] with pre-loaded
//! command/reply pairs.
//!
//! # Example
//!
//! ```
//! use bluefruit_gatt::transport::{ScriptedTransport, Transport};
//!
//! let mut link = ScriptedTransport::new();
//! link.expect("AT+GATTCHAR=1", &["01-02", "OK"]);
//!
//! link.send_line(b"AT+GATTCHAR=1").unwrap();
//! assert_eq!(&link.read_line().unwrap()[..], b"01-02");
//! assert!(link.wait_for_status().unwrap());
//! ```

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::Status;
use crate::transport::{ProtocolMode, Transport};

/// A pre-loaded command and the lines the module answers with.
#[derive(Debug, Clone)]
struct Expectation {
    command: Vec<u8>,
    reply: Vec<Bytes>,
}

/// A [`Transport`] that replays a script.
///
/// Expectations are consumed in order. Each `send_line()` must match the
/// next expected command exactly; its reply lines are then served by
/// `read_line()` and `wait_for_status()`. Sending a command while in
/// [`ProtocolMode::Data`] is an error, as the module would treat it as
/// payload.
#[derive(Debug)]
pub struct ScriptedTransport {
    expectations: VecDeque<Expectation>,
    pending: VecDeque<Bytes>,
    mode: ProtocolMode,
    connected: bool,
    sent_log: Vec<Vec<u8>>,
    mode_log: Vec<ProtocolMode>,
}

impl ScriptedTransport {
    /// Create a connected transport in command mode.
    pub fn new() -> Self {
        Self::with_mode(ProtocolMode::Command)
    }

    /// Create a connected transport starting in `mode`.
    pub fn with_mode(mode: ProtocolMode) -> Self {
        Self {
            expectations: VecDeque::new(),
            pending: VecDeque::new(),
            mode,
            connected: true,
            sent_log: Vec::new(),
            mode_log: Vec::new(),
        }
    }

    /// Expect `command` and answer it with `reply` lines.
    pub fn expect(&mut self, command: &str, reply: &[&str]) {
        self.expectations.push_back(Expectation {
            command: command.as_bytes().to_vec(),
            reply: reply
                .iter()
                .map(|line| Bytes::copy_from_slice(line.as_bytes()))
                .collect(),
        });
    }

    /// All lines sent so far.
    pub fn sent_lines(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Every mode switch requested so far, in order.
    pub fn mode_switches(&self) -> &[ProtocolMode] {
        &self.mode_log
    }

    /// Number of expectations not yet consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Number of reply lines served by neither `read_line()` nor
    /// `wait_for_status()`.
    pub fn unread_lines(&self) -> usize {
        self.pending.len()
    }

    /// Simulate the link going away.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::Transport("not connected".to_string()))
        }
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ScriptedTransport {
    fn send_line(&mut self, line: &[u8]) -> Result<()> {
        self.ensure_connected()?;
        self.sent_log.push(line.to_vec());

        if self.mode == ProtocolMode::Data {
            return Err(Error::Transport(format!(
                "command sent in data mode: {}",
                String::from_utf8_lossy(line)
            )));
        }

        let expectation = self
            .expectations
            .pop_front()
            .ok_or_else(|| Error::Transport("no more expectations in script".to_string()))?;

        if line != expectation.command.as_slice() {
            return Err(Error::Transport(format!(
                "unexpected command: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.command),
                String::from_utf8_lossy(line)
            )));
        }

        self.pending = expectation.reply.into();
        Ok(())
    }

    fn read_line(&mut self) -> Result<Bytes> {
        self.ensure_connected()?;
        self.pending.pop_front().ok_or(Error::Timeout)
    }

    fn wait_for_status(&mut self) -> Result<bool> {
        self.ensure_connected()?;
        while let Some(line) = self.pending.pop_front() {
            if let Some(status) = Status::classify(&String::from_utf8_lossy(&line)) {
                return Ok(status.is_ok());
            }
        }
        Err(Error::Timeout)
    }

    fn mode(&self) -> ProtocolMode {
        self.mode
    }

    fn set_mode(&mut self, mode: ProtocolMode) -> Result<()> {
        self.ensure_connected()?;
        self.mode_log.push(mode);
        self.mode = mode;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_script() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GAPDEVNAME=x", &["OK"]);
        link.send_line(b"AT+GAPDEVNAME=x").unwrap();
        assert!(link.wait_for_status().unwrap());
        assert_eq!(link.remaining_expectations(), 0);
        assert_eq!(link.unread_lines(), 0);
        assert_eq!(link.sent_lines(), &[b"AT+GAPDEVNAME=x".to_vec()]);
    }

    #[test]
    fn test_unexpected_command() {
        let mut link = ScriptedTransport::new();
        link.expect("AT+GATTCHAR=1", &["OK"]);
        let result = link.send_line(b"AT+GATTCHAR=2");
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[test]
    fn test_exhausted_script() {
        let mut link = ScriptedTransport::new();
        assert!(link.send_line(b"AT").is_err());
        assert!(matches!(link.read_line(), Err(Error::Timeout)));
    }

    #[test]
    fn test_status_skips_noise() {
        let mut link = ScriptedTransport::new();
        link.expect("AT", &["noise", "ERROR"]);
        link.send_line(b"AT").unwrap();
        assert!(!link.wait_for_status().unwrap());
    }

    #[test]
    fn test_rejects_command_in_data_mode() {
        let mut link = ScriptedTransport::with_mode(ProtocolMode::Data);
        link.expect("AT", &["OK"]);
        assert!(link.send_line(b"AT").is_err());
    }

    #[test]
    fn test_mode_log() {
        let mut link = ScriptedTransport::with_mode(ProtocolMode::Data);
        link.set_mode(ProtocolMode::Command).unwrap();
        link.set_mode(ProtocolMode::Data).unwrap();
        assert_eq!(
            link.mode_switches(),
            &[ProtocolMode::Command, ProtocolMode::Data]
        );
        assert_eq!(link.mode(), ProtocolMode::Data);
    }

    #[test]
    fn test_disconnected() {
        let mut link = ScriptedTransport::new();
        link.set_connected(false);
        assert!(link.send_line(b"AT").is_err());
        assert!(link.set_mode(ProtocolMode::Data).is_err());
    }
}
