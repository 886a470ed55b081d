use std::fmt;

use crate::model::{Field, Source};

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty rule list, blank header name, etc.).
    ConfigValidation(String),
    /// No column rule resolved a required field.
    Schema {
        source: Source,
        field: Field,
        headers: Vec<String>,
    },
    /// Input table unreadable or malformed.
    Parse { source: Source, message: String },
    /// IO error (file read, etc.).
    Io(String),
    /// Report could not be rendered or written.
    Write(String),
}

impl ReconError {
    pub fn parse(source: Source, message: impl Into<String>) -> Self {
        Self::Parse { source, message: message.into() }
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Schema { source, field, headers } => {
                write!(
                    f,
                    "{source}: no column found for '{field}' (headers: {})",
                    if headers.is_empty() {
                        "<none>".to_string()
                    } else {
                        headers.join(", ")
                    }
                )
            }
            Self::Parse { source, message } => write!(f, "{source}: cannot parse input: {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Write(msg) => write!(f, "cannot write report: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
