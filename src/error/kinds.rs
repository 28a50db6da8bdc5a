use std::{fmt, io};

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for rowspool operations.
///
/// Every failure is fatal for the export as a whole: errors propagate
/// unrecovered to the entry point, which reports them and exits. There is
/// no retry logic anywhere in the crate.
#[derive(Debug)]
pub enum ExportError {
    /// Connection and authentication errors.
    Connection(ConnectionError),

    /// Query execution errors.
    Query(QueryError),

    /// Cursor metadata errors.
    Metadata(MetadataError),

    /// Value encoding errors.
    Encoding(EncodingError),

    /// I/O errors while writing artifacts.
    Io(io::Error),

    /// Configuration errors.
    Config(ConfigError),

    /// Interop server lifecycle errors.
    Server(ServerError),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectFailed(String),

    /// Connection attempt timed out.
    Timeout,

    /// Invalid connection URL.
    InvalidUrl(String),

    /// Authentication was rejected by the server.
    AuthFailed(String),
}

/// Query execution errors.
#[derive(Debug)]
pub enum QueryError {
    /// The statement was rejected or failed while executing.
    ExecutionFailed(String),

    /// The cursor failed while advancing through the result set.
    CursorFailed(String),
}

/// Cursor metadata errors.
#[derive(Debug)]
pub enum MetadataError {
    /// Result set metadata could not be retrieved.
    Unavailable(String),
}

/// Value encoding errors.
///
/// Raised when a driver value cannot be represented in the output
/// encoding. The whole export aborts; no row is skipped and no partial
/// row is emitted.
#[derive(Debug)]
pub enum EncodingError {
    /// The column's native type has no JSON representation.
    UnsupportedType { column: String, type_name: String },

    /// A floating point value was NaN or infinite.
    NonFiniteNumber { column: String },

    /// The driver value could not be decoded into its declared type.
    ValueDecode { column: String, message: String },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Interop server lifecycle errors.
#[derive(Debug)]
pub enum ServerError {
    /// The server process could not be spawned.
    SpawnFailed(String),

    /// The server process exited before the export finished.
    ExitedEarly(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Connection(e) => write!(f, "Connection error: {e}"),
            ExportError::Query(e) => write!(f, "Query error: {e}"),
            ExportError::Metadata(e) => write!(f, "Metadata error: {e}"),
            ExportError::Encoding(e) => write!(f, "Encoding error: {e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Server(e) => write!(f, "Interop server error: {e}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::Timeout => write!(f, "Connection timeout"),
            ConnectionError::InvalidUrl(url) => write!(f, "Invalid connection URL: {url}"),
            ConnectionError::AuthFailed(msg) => write!(f, "Authentication failed: {msg}"),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::ExecutionFailed(msg) => write!(f, "Execution failed: {msg}"),
            QueryError::CursorFailed(msg) => write!(f, "Cursor failed: {msg}"),
        }
    }
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::Unavailable(msg) => {
                write!(f, "Result set metadata unavailable: {msg}")
            }
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::UnsupportedType { column, type_name } => {
                write!(f, "Column '{column}' has unsupported type {type_name}")
            }
            EncodingError::NonFiniteNumber { column } => {
                write!(f, "Column '{column}' holds a non-finite number")
            }
            EncodingError::ValueDecode { column, message } => {
                write!(f, "Failed to decode column '{column}': {message}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::SpawnFailed(msg) => write!(f, "Failed to start server: {msg}"),
            ServerError::ExitedEarly(msg) => write!(f, "Server exited early: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for QueryError {}
impl std::error::Error for MetadataError {}
impl std::error::Error for EncodingError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ServerError {}

/* ========================= Conversions to ExportError ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<ConnectionError> for ExportError {
    fn from(err: ConnectionError) -> Self {
        ExportError::Connection(err)
    }
}

impl From<QueryError> for ExportError {
    fn from(err: QueryError) -> Self {
        ExportError::Query(err)
    }
}

impl From<MetadataError> for ExportError {
    fn from(err: MetadataError) -> Self {
        ExportError::Metadata(err)
    }
}

impl From<EncodingError> for ExportError {
    fn from(err: EncodingError) -> Self {
        ExportError::Encoding(err)
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

impl From<ServerError> for ExportError {
    fn from(err: ServerError) -> Self {
        ExportError::Server(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Io(io::Error::other(err))
    }
}
