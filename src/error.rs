use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Tick length that is zero, negative or not finite.
    #[error("invalid time step: {0}")]
    InvalidTimeStep(f64),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] json::Error),

    #[error("lacking {0} key")]
    MissingKey(&'static str),

    /// Key present with a value of the wrong type or out of range.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

impl Error {
    pub fn invalid_value(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn display_names_the_key() {
        let err = Error::invalid_value("/Rocket/Mass", "expected a number");
        assert_eq!(err.to_string(), "invalid value for /Rocket/Mass: expected a number");
        assert_eq!(
            Error::MissingKey("/Terrain").to_string(),
            "lacking /Terrain key"
        );
    }

    #[test]
    fn json_errors_convert() {
        let err: Error = json::parse("{").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
