//! Errors raised while reading catalogs and validating settings.

use std::error::Error;
use std::fmt;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone)]
pub enum CoreError {
    Catalog(CatalogError),
    Config(ConfigError),
    /// Reading a catalog file failed.
    Io(String),
    /// The catalog is not valid JSON for the expected shape.
    Serialization(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Catalog(e) => write!(f, "Invalid catalog: {}", e),
            CoreError::Config(e) => write!(f, "Invalid setting: {}", e),
            CoreError::Io(msg) => write!(f, "Could not read catalog: {}", msg),
            CoreError::Serialization(msg) => write!(f, "Malformed catalog JSON: {}", msg),
        }
    }
}

impl Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

#[derive(Debug, Clone)]
pub enum CatalogError {
    /// Two skills, courses or applications share an identity key.
    DuplicateKey { kind: &'static str, key: String },
    NotFound(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::DuplicateKey { kind, key } => {
                write!(f, "{} '{}' appears more than once", kind, key)
            }
            CatalogError::NotFound(path) => write!(f, "no catalog file at {}", path),
        }
    }
}

/// A rejected setting or edge weight.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "{} = {:?} is not accepted: {}", field, value, reason)
            }
            ConfigError::OutOfRange {
                field,
                min,
                max,
                value,
            } => {
                write!(f, "{} = {} is outside [{}, {}]", field, value, min, max)
            }
        }
    }
}

impl Error for ConfigError {}

impl ConfigError {
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        }
    }

    pub fn invalid(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl CoreError {
    pub fn duplicate(kind: &'static str, key: impl Into<String>) -> Self {
        CoreError::Catalog(CatalogError::DuplicateKey {
            kind,
            key: key.into(),
        })
    }
}
