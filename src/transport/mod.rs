//! Line transport to the BLE module.
//!
//! The [`Transport`] trait abstracts the SPI or UART link to the module.
//! Framing, line buffering, status token recognition, and the COMMAND/DATA
//! mode switch all live behind it; the session only sends lines and reads
//! lines back. [`ScriptedTransport`] is an in-memory implementation for
//! tests and demos.

pub mod scripted;

use bytes::Bytes;

use crate::error::Result;

pub use scripted::ScriptedTransport;

/// How the module currently interprets incoming bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtocolMode {
    /// Incoming bytes are AT commands.
    #[default]
    Command,
    /// Incoming bytes are a raw data stream to the connected central.
    Data,
}

impl std::fmt::Display for ProtocolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command => write!(f, "Command"),
            Self::Data => write!(f, "Data"),
        }
    }
}

/// Blocking line-oriented transport to the module.
///
/// Calls block until the operation completes or the transport's own
/// timeout fires, in which case [`Error::Timeout`](crate::Error::Timeout)
/// is returned.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Transmit one line; the transport appends its line terminator.
    fn send_line(&mut self, line: &[u8]) -> Result<()>;

    /// Read one complete line, terminator excluded.
    ///
    /// The whole line is consumed from the link regardless of its length.
    fn read_line(&mut self) -> Result<Bytes>;

    /// Consume the module's trailing status token.
    ///
    /// Returns `true` for `OK` and `false` for any other status.
    fn wait_for_status(&mut self) -> Result<bool>;

    /// The current mode.
    fn mode(&self) -> ProtocolMode;

    /// Switch mode.
    fn set_mode(&mut self, mode: ProtocolMode) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_mode_default() {
        assert_eq!(ProtocolMode::default(), ProtocolMode::Command);
    }

    #[test]
    fn test_protocol_mode_display() {
        assert_eq!(format!("{}", ProtocolMode::Command), "Command");
        assert_eq!(format!("{}", ProtocolMode::Data), "Data");
    }
}
