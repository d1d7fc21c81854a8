//! Error types for the bluefruit-gatt crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The module answered a command with a status other than `OK`.
    #[error("Command failed: {context}")]
    CommandFailed {
        /// What the failing command was trying to do.
        context: String,
    },

    /// A characteristic operation was addressed to the reserved handle 0.
    #[error("Invalid characteristic handle: {handle}")]
    InvalidHandle {
        /// The rejected handle value.
        handle: i8,
    },

    /// A characteristic value of zero bytes was supplied.
    #[error("Characteristic value must not be empty")]
    EmptyValue,

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// The name of the parameter.
        name: String,
        /// The invalid value that was provided.
        value: String,
    },

    /// The module sent a reply this layer cannot interpret.
    #[error("Invalid reply: {context}")]
    InvalidReply {
        /// Description of what was wrong with the reply.
        context: String,
    },

    /// The session hit a fatal error earlier and refuses further commands.
    #[error("Session halted after a fatal error")]
    Halted,

    /// The underlying line transport failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting for a reply line.
    #[error("Timeout waiting for reply")]
    Timeout,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error leaves the module in an unknown state.
    ///
    /// Everything except [`Error::Halted`] itself is fatal the first time
    /// it is seen by a session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Halted)
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
