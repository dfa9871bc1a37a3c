// Error Types
//
// Every failure the monitor can see falls into one of four classes.
// Only NotFound and ConfigInvalid are fatal, and only during startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Transient network/API failure; the affected check is skipped this tick
    #[error("unreachable: {0}")]
    Unreachable(String),
    /// A power command was rejected; state is not advanced
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid config: {0}")]
    ConfigInvalid(String),
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        MonitorError::Unreachable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MonitorError::NotFound("device 'RTX 3080'".to_string());
        assert_eq!(err.to_string(), "not found: device 'RTX 3080'");

        let err = MonitorError::CommandFailed("STOP rejected".to_string());
        assert_eq!(err.to_string(), "command failed: STOP rejected");
    }
}
