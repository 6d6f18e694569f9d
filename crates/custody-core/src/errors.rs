use std::fmt;

/// Configuration problems that should stop the caller (exit code 2 in the CLI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Returns the config error wrapped in `e`, if any.
pub fn as_config_error(e: &anyhow::Error) -> Option<&ConfigError> {
    e.downcast_ref::<ConfigError>()
}
