//! Errors raised while configuring a score script.
//!
//! The similarity engine itself is total and never fails; these errors are
//! reported before it is ever invoked.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required script parameter was not supplied
    #[error("Missing parameter [{0}]")]
    MissingParameter(String),

    /// A numeric parameter could not be parsed
    #[error("Parameter [{name}] is not a valid number: {value:?}")]
    InvalidNumber { name: String, value: String },

    /// The requested script name is not registered
    #[error("Unknown script name {0}")]
    UnknownScript(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
