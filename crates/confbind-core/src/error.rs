//! Error types for confbind
//!
//! Every error carries a kind, the dotted configuration path it refers to
//! (when there is one), the underlying cause and an actionable help message.

use std::fmt;

/// Result type alias for confbind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for confbind operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Path in the config where the error occurred (e.g., "database.port")
    pub path: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error decoding JSON/YAML/TOML
    Parse,
    /// I/O error (file not found, etc.)
    Io,
    /// The file extension does not name a supported format
    FileType { extension: String },
    /// A path cannot be traversed or created
    Path,
    /// The configuration value does not fit the target value
    Value(ValueErrorKind),
    /// The value handed to `configure` cannot be written to
    Target,
    /// A type registration was rejected
    Provider,
    /// Internal error (bug in confbind)
    Internal,
}

/// Specific mismatches between a configuration value and a target
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueErrorKind {
    #[error("field '{field}' not found in {target}")]
    UnknownField { field: String, target: String },

    #[error("field '{field}' of {target} cannot be set")]
    UnwritableField { field: String, target: String },

    #[error("{target} is shared and cannot be written through")]
    SharedHandle { target: String },

    #[error("missing the type element")]
    MissingTypeTag,

    #[error("the type element must be a string, got {found}")]
    InvalidTypeTag { found: String },

    #[error("type '{name}' is unknown")]
    UnknownRegisteredType { name: String },

    #[error("{concrete} does not implement {interface}")]
    CapabilityMismatch { concrete: String, interface: String },

    #[error("{found} cannot be used to configure {target}")]
    IncompatibleScalar { found: String, target: String },

    #[error("{value} is out of range for {target}")]
    NumericOverflow { value: String, target: String },

    #[error("a {found} cannot be used to configure {target}")]
    ShapeMismatch { found: String, target: String },

    #[error("key '{key}' cannot be converted to {target}")]
    IncompatibleKey { key: String, target: String },
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            help: None,
            cause: None,
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Parse)
        }
    }

    /// Create an I/O error for a file that could not be read
    pub fn io(file: impl Into<String>, err: &std::io::Error) -> Self {
        let file = file.into();
        Self {
            help: Some(format!("Check that '{}' exists and is readable", file)),
            cause: Some(format!("Failed to read '{}': {}", file, err)),
            ..Self::new(ErrorKind::Io)
        }
    }

    /// Create an unsupported file format error
    pub fn file_type(file: impl Into<String>) -> Self {
        let file = file.into();
        let extension = std::path::Path::new(&file)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self {
            help: Some("Use one of .json, .yaml, .yml or .toml".into()),
            cause: Some(format!("File: {}", file)),
            ..Self::new(ErrorKind::FileType { extension })
        }
    }

    /// Create a path error (a path segment cannot be traversed or created)
    pub fn path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Path)
        }
        .with_path(path)
    }

    /// Create a value error at the given path
    pub fn value(path: impl Into<String>, kind: ValueErrorKind) -> Self {
        let help = match &kind {
            ValueErrorKind::UnknownField { field, .. } => {
                Some(format!("Remove '{}' or check it for typos", field))
            }
            ValueErrorKind::MissingTypeTag => {
                Some("Add a \"type\" key naming a registered type".into())
            }
            ValueErrorKind::UnknownRegisteredType { name } => Some(format!(
                "Register '{}' with Config::register() before configuring",
                name
            )),
            ValueErrorKind::CapabilityMismatch { interface, .. } => Some(format!(
                "Declare the capability with Registration::implements::<{}>()",
                interface
            )),
            _ => None,
        };
        Self {
            help,
            ..Self::new(ErrorKind::Value(kind))
        }
        .with_path(path)
    }

    /// Create a target error (the caller handed over an unwritable value)
    pub fn target(message: impl Into<String>) -> Self {
        Self {
            help: Some("Pass a value that is uniquely owned by the caller".into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Target)
        }
    }

    /// Create a provider error (a type registration was rejected)
    pub fn provider(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Provider)
        }
    }

    /// Create an internal error (bug in confbind)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            help: Some("This is likely a bug in confbind. Please report it.".into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Internal)
        }
    }

    /// Add path context to the error. The root path is not recorded.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let p = path.into();
        self.path = if p.is_empty() { None } else { Some(p) };
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// The value mismatch, if this is a value error
    pub fn value_kind(&self) -> Option<&ValueErrorKind> {
        match &self.kind {
            ErrorKind::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::Io => write!(f, "I/O error")?,
            ErrorKind::FileType { extension } => {
                write!(f, "File format not supported: {}", extension)?
            }
            ErrorKind::Path => write!(f, "Invalid path")?,
            ErrorKind::Value(v) => write!(f, "Inappropriate configuration value: {}", v)?,
            ErrorKind::Target => write!(f, "Unable to configure target")?,
            ErrorKind::Provider => write!(f, "Invalid type provider")?,
            ErrorKind::Internal => write!(f, "Internal error")?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
