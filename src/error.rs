use thiserror::Error;

/// A stored date string that could not be read as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable date {value:?}")]
pub struct DateError {
    pub value: String,
}

impl DateError {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Form-level validation failures, reported back to whoever submitted the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("enter a valid 10-digit phone number starting with 6, 7, 8, or 9")]
    InvalidPhone,
    #[error("a contact with this number already exists")]
    DuplicatePhone,
    #[error("a user with this email already exists")]
    DuplicateEmail,
    #[error("time spent must be a positive number of minutes")]
    InvalidMinutes,
    #[error("time already logged for {date}")]
    AlreadyLogged { date: String },
    #[error("log time on the task before completing it")]
    NothingLogged,
    #[error("cannot move a {from} task to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Date(#[from] DateError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no user registered with email {0}")]
    UnknownUser(String),
    #[error("{email} may not change {what}")]
    NotPermitted { email: String, what: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
