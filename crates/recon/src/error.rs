use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Plan or per-machine history is unavailable. Names the missing resource.
    NotFound { resource: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Vocabulary validation error (empty column list, conflicting spelling).
    ConfigValidation(String),
    /// The underlying store could not be read.
    Source(String),
}

impl ReconError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { resource } => write!(f, "not found: {resource}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Source(msg) => write!(f, "source error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
