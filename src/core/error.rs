use std::fmt::Display;

/// Start-up data errors. Any of these aborts start-up.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Source file missing, unreadable, not rectangular or lacking a declared column.
    #[error("data unavailable for '{name}': {reason}")]
    DataUnavailable { name: String, reason: String },
}

impl DataError {
    pub fn unavailable(name: &str, reason: impl Display) -> Self {
        DataError::DataUnavailable {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
