use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// The category of a [PotashError].
///
/// Callers match on the kind to decide whether an error is recoverable
/// (for example retrying after [ErrorKind::TransactionConflict]) or fatal
/// (for example [ErrorKind::Corruption]).
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // store lifecycle
    StoreClosed,
    Corruption,
    AlreadyOpen,

    // constraints and indexes
    UniqueConstraintViolation,
    IndexValidationError,
    IndexNotFound,
    IndexAlreadyExists,

    // mapping
    MappingError,

    // transactions
    TransactionConflict,

    // identity and lookups
    InvalidId,
    NotFound,

    // argument and state validation
    InvalidOperation,
    ValidationError,
    FilterError,

    // io and encoding
    IOError,
    EncodingError,

    SecurityError,
    PluginError,
    EventError,

    /// Lets plugin crates report their own error category, e.g. "spatial".
    Extension(String),

    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::StoreClosed => write!(f, "Store closed"),
            ErrorKind::Corruption => write!(f, "Corruption"),
            ErrorKind::AlreadyOpen => write!(f, "Already open"),
            ErrorKind::UniqueConstraintViolation => write!(f, "Unique constraint violation"),
            ErrorKind::IndexValidationError => write!(f, "Index validation error"),
            ErrorKind::IndexNotFound => write!(f, "Index not found"),
            ErrorKind::IndexAlreadyExists => write!(f, "Index already exists"),
            ErrorKind::MappingError => write!(f, "Mapping error"),
            ErrorKind::TransactionConflict => write!(f, "Transaction conflict"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::SecurityError => write!(f, "Security error"),
            ErrorKind::PluginError => write!(f, "Plugin error"),
            ErrorKind::EventError => write!(f, "Event error"),
            ErrorKind::Extension(name) => write!(f, "{} error", name),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// The error type of every fallible operation in potash.
///
/// Carries a message, an [ErrorKind], an optional cause and the backtrace
/// captured where the error was created.
#[derive(Clone)]
pub struct PotashError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<PotashError>>,
    backtrace: Atomic<Backtrace>,
}

impl PotashError {
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        PotashError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: PotashError) -> Self {
        PotashError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&PotashError> {
        self.cause.as_deref()
    }
}

impl Display for PotashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for PotashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{} ({})\nCaused by: {:?}", self.message, self.error_kind, cause),
            None => write!(f, "{} ({})\n{:?}", self.message, self.error_kind, self.backtrace.read()),
        }
    }
}

impl Error for PotashError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

pub type PotashResult<T> = Result<T, PotashError>;

impl de::Error for PotashError {
    fn custom<T: Display>(msg: T) -> Self {
        PotashError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl ser::Error for PotashError {
    fn custom<T: Display>(msg: T) -> Self {
        PotashError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl From<std::io::Error> for PotashError {
    fn from(err: std::io::Error) -> Self {
        PotashError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<std::string::FromUtf8Error> for PotashError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        PotashError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<regex::Error> for PotashError {
    fn from(err: regex::Error) -> Self {
        PotashError::new(
            &format!("Invalid regular expression: {}", err),
            ErrorKind::FilterError,
        )
    }
}
