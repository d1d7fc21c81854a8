//! Reply line classification and payload parsing.
//!
//! A reply is an optional payload line (an integer, dash-separated hex, or
//! nothing) followed by a status line, `OK` or `ERROR` with optional detail.

/// Status token that closes every reply.
pub const STATUS_OK: &str = "OK";
/// Prefix of the failure status token.
pub const STATUS_ERROR: &str = "ERROR";

/// Classified status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command succeeded.
    Ok,
    /// The command failed; any detail after the token is discarded.
    Error,
}

impl Status {
    /// Classify a line, or `None` when the line is a payload.
    pub fn classify(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line == STATUS_OK {
            Some(Self::Ok)
        } else if line.starts_with(STATUS_ERROR) {
            Some(Self::Error)
        } else {
            None
        }
    }

    /// Whether this is the success token.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// A reply with its status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    /// Whether the module closed the reply with `OK`.
    pub ok: bool,
    /// The payload line, possibly truncated; empty when the module sent none.
    pub payload: String,
    /// Whether the payload was cut to the session's reply cap.
    pub truncated: bool,
}

impl Reply {
    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the reply carried no payload.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Leading integer of the payload, see [`parse_leading_int`].
    pub fn leading_int(&self) -> i32 {
        parse_leading_int(&self.payload)
    }
}

/// Parse the leading decimal integer of a payload.
///
/// Follows `atoi`: leading whitespace is skipped, one optional sign is
/// accepted, digits accumulate until the first non-digit, and a payload
/// without digits is 0. Out of range values saturate.
pub fn parse_leading_int(text: &str) -> i32 {
    let mut chars = text.trim_start().chars().peekable();

    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for c in chars {
        match c.to_digit(10) {
            Some(digit) => {
                value = (value * 10 + digit as i64).min(i64::from(i32::MAX) + 1);
            }
            None => break,
        }
    }

    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
