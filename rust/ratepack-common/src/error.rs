use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidFormat {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        ErrorKind::InvalidOperation { name: name.into() }.into()
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Error {
        ErrorKind::FileNotFound { path: path.into() }.into()
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }

    pub fn out_of_bounds(index: usize, len: usize) -> Error {
        ErrorKind::IndexOutOfBounds { index, len }.into()
    }

    pub fn duplicate_key(key: i64) -> Error {
        ErrorKind::DuplicateKey { key }.into()
    }

    pub fn key_not_in_domain(key: i64) -> Error {
        ErrorKind::KeyNotInDomain { key }.into()
    }

    pub fn key_unset(key: i64) -> Error {
        ErrorKind::KeyUnset { key }.into()
    }

    pub fn frozen() -> Error {
        ErrorKind::Frozen.into()
    }

    pub fn closed() -> Error {
        ErrorKind::Closed.into()
    }

    pub fn unknown_event_type(name: impl Into<String>) -> Error {
        ErrorKind::UnknownEventType { name: name.into() }.into()
    }

    /// Returns `true` if the error was raised while loading a malformed or
    /// truncated file.
    pub fn is_load_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidFormat { .. })
    }

    /// Returns `true` if the error reports a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::FileNotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("file not found: '{}'", path.display())]
    FileNotFound { path: PathBuf },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("duplicate key {key}")]
    DuplicateKey { key: i64 },

    #[error("key {key} is not in the key domain")]
    KeyNotInDomain { key: i64 },

    #[error("key {key} has no value")]
    KeyUnset { key: i64 },

    #[error("vector is frozen")]
    Frozen,

    #[error("rating store is closed")]
    Closed,

    #[error("unknown event type '{name}'")]
    UnknownEventType { name: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
