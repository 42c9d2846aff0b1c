//! JSON-RPC error taxonomy.
//!
//! Every error code maps to exactly one [`ErrorKind`]. The protocol fixes a
//! handful of codes and reserves the band `-32768..=-32000`; every other
//! integer belongs to the application. [`RpcError`] pairs a kind with the
//! wire-level error triple so it can be raised locally and serialized for
//! the remote side.

use std::fmt;

use serde_json::Value;

use crate::error::RegistrationError;
use crate::types;

/// Invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;

/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;

/// The method does not exist or is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

/// Lower bound of the implementation-defined server error band.
pub const SERVER_ERROR_MIN: i64 = -32099;

/// Upper bound of the implementation-defined server error band.
pub const SERVER_ERROR_MAX: i64 = -32000;

/// Lower bound of the band reserved by the protocol.
pub const RESERVED_MIN: i64 = -32768;

/// Upper bound of the band reserved by the protocol.
pub const RESERVED_MAX: i64 = -32000;

/// Returns true when `code` lies in the band reserved by the protocol.
pub fn is_reserved(code: i64) -> bool {
    (RESERVED_MIN..=RESERVED_MAX).contains(&code)
}

/// A named category of error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Implementation-defined error in `-32099..=-32000`.
    ReservedServerError,
    /// Reserved code with no assigned meaning.
    ReservedError,
    /// Application-defined code. `name` is the registered kind identifier,
    /// or `None` for codes nobody registered.
    Application { name: Option<String> },
}

impl ErrorKind {
    /// Classify a code using the protocol's fixed table only.
    ///
    /// Codes outside the reserved band become the generic application kind.
    pub fn standard(code: i64) -> Self {
        match code {
            PARSE_ERROR => ErrorKind::ParseError,
            INVALID_REQUEST => ErrorKind::InvalidRequest,
            METHOD_NOT_FOUND => ErrorKind::MethodNotFound,
            INVALID_PARAMS => ErrorKind::InvalidParams,
            INTERNAL_ERROR => ErrorKind::InternalError,
            SERVER_ERROR_MIN..=SERVER_ERROR_MAX => ErrorKind::ReservedServerError,
            c if is_reserved(c) => ErrorKind::ReservedError,
            _ => ErrorKind::Application { name: None },
        }
    }

    /// Message used when none is supplied.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::ParseError => "Parse error",
            ErrorKind::InvalidRequest => "Invalid Request",
            ErrorKind::MethodNotFound => "Method not found",
            ErrorKind::InvalidParams => "Invalid params",
            ErrorKind::InternalError => "Internal error",
            ErrorKind::ReservedServerError => "Server error",
            ErrorKind::ReservedError => "Reserved error",
            ErrorKind::Application { .. } => "Application error",
        }
    }

    pub fn is_application(&self) -> bool {
        matches!(self, ErrorKind::Application { .. })
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ParseError => write!(f, "ParseError"),
            ErrorKind::InvalidRequest => write!(f, "InvalidRequestError"),
            ErrorKind::MethodNotFound => write!(f, "MethodNotFoundError"),
            ErrorKind::InvalidParams => write!(f, "InvalidParamsError"),
            ErrorKind::InternalError => write!(f, "InternalError"),
            ErrorKind::ReservedServerError => write!(f, "ReservedServerError"),
            ErrorKind::ReservedError => write!(f, "ReservedError"),
            ErrorKind::Application { name: Some(name) } => write!(f, "{}", name),
            ErrorKind::Application { name: None } => write!(f, "ApplicationError"),
        }
    }
}

/// A JSON-RPC error that can be raised, serialized and reconstructed.
///
/// # Example
///
/// ```
/// use sansio_json_rpc::{ErrorKind, RpcError};
///
/// let err = RpcError::method_not_found("Method not found: get_bar");
/// assert_eq!(err.kind(), &ErrorKind::MethodNotFound);
/// assert_eq!(err.code(), -32601);
///
/// let wire = err.to_error_object();
/// assert_eq!(wire.message, "Method not found: get_bar");
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}<code={}, message={:?}>", .error.code, .error.message)]
pub struct RpcError {
    kind: ErrorKind,
    error: types::Error,
}

impl RpcError {
    fn standard(kind: ErrorKind, code: i64, message: impl Into<String>) -> Self {
        Self {
            kind,
            error: types::Error::new(code, message, None),
        }
    }

    pub(crate) fn with_kind(kind: ErrorKind, error: types::Error) -> Self {
        Self { kind, error }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::standard(ErrorKind::ParseError, PARSE_ERROR, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::standard(ErrorKind::InvalidRequest, INVALID_REQUEST, message)
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::standard(ErrorKind::MethodNotFound, METHOD_NOT_FOUND, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::standard(ErrorKind::InvalidParams, INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::standard(ErrorKind::InternalError, INTERNAL_ERROR, message)
    }

    /// Create an implementation-defined server error.
    ///
    /// The code must be in `-32099..=-32000`.
    pub fn server_error(code: i64, message: impl Into<String>) -> Result<Self, RegistrationError> {
        if !(SERVER_ERROR_MIN..=SERVER_ERROR_MAX).contains(&code) {
            return Err(RegistrationError::OutsideServerBand(code));
        }
        Ok(Self::standard(ErrorKind::ReservedServerError, code, message))
    }

    /// Rebuild an error from its wire triple using the fixed table only.
    ///
    /// Application codes come back as the generic application kind. Use
    /// [`ErrorRegistry::error_from_object`](crate::ErrorRegistry::error_from_object)
    /// to recover registered kinds.
    pub fn from_error_object(error: types::Error) -> Self {
        Self {
            kind: ErrorKind::standard(error.code),
            error,
        }
    }

    /// Attach arbitrary JSON data to the error.
    pub fn with_data(mut self, data: Value) -> Self {
        self.error.data = Some(data);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn code(&self) -> i64 {
        self.error.code
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.error.data.as_ref()
    }

    /// The wire-level error triple for this error.
    pub fn to_error_object(&self) -> types::Error {
        self.error.clone()
    }

    pub fn into_error_object(self) -> types::Error {
        self.error
    }
}

impl From<RpcError> for types::Error {
    fn from(error: RpcError) -> Self {
        error.into_error_object()
    }
}
