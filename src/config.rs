//! Session configuration.

/// Default cap on the reply payload kept by a session, in bytes.
///
/// Matches the module's line buffer; a 20-byte value encodes to 59
/// characters and fits.
pub const DEFAULT_MAX_REPLY_LEN: usize = 64;

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Longest reply payload returned to callers. Longer lines are still
    /// read in full from the transport.
    pub max_reply_len: usize,
    /// Echo every command and reply at `info` level instead of `trace`.
    pub verbose: bool,
}

impl SessionConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reply payload cap.
    pub fn with_max_reply_len(mut self, max_reply_len: usize) -> Self {
        self.max_reply_len = max_reply_len;
        self
    }

    /// Enable or disable the command echo.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_reply_len: DEFAULT_MAX_REPLY_LEN,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::new();
        assert_eq!(config.max_reply_len, DEFAULT_MAX_REPLY_LEN);
        assert!(!config.verbose);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new()
            .with_max_reply_len(16)
            .with_verbose(true);
        assert_eq!(config.max_reply_len, 16);
        assert!(config.verbose);
    }
}
