//! The crate-wide [`Error`] type.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while administering the school database or generating an
/// attendance report.
#[derive(Debug)]
pub enum Error {
    /// A required input is missing or malformed. Nothing was read or written.
    Validation(String),
    /// A referenced row (class, academic year, attendance record, ...) does not exist.
    NotFound(String),
    /// The write would break a uniqueness or cardinality rule.
    Conflict(String),
    Database(diesel::result::Error),
    Connection(diesel::ConnectionError),
    Csv(csv::Error),
    Io(std::io::Error),
    Config(config::ConfigError),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(msg) => write!(f, "invalid input: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::Conflict(msg) => write!(f, "conflict: {msg}"),
            Error::Database(err) => write!(f, "database error: {err}"),
            Error::Connection(err) => write!(f, "could not connect to the database: {err}"),
            Error::Csv(err) => write!(f, "csv error: {err}"),
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Config(err) => write!(f, "configuration error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(err) => Some(err),
            Error::Connection(err) => Some(err),
            Error::Csv(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::DatabaseErrorKind;

        // Surface constraint violations the same way as the application-level checks.
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Error::Conflict(info.message().to_string())
            }
            other => Error::Database(other),
        }
    }
}

impl From<diesel::ConnectionError> for Error {
    fn from(err: diesel::ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err)
    }
}
