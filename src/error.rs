//! Error types for the JSON-RPC implementation.
//!
//! This module defines the crate-level errors returned by operations that can
//! fail for more than one reason. Protocol errors that travel over the wire
//! are modelled by [`RpcError`](crate::taxonomy::RpcError) and the wire triple
//! in [`types::Error`](crate::types::Error).

use crate::taxonomy::RpcError;
use crate::validation::ValidationFailure;

/// Errors that can occur while building, encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A JSON-RPC taxonomy error, such as a parse error or an invalid request.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// An error kind could not be registered.
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// JSON encoding error.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Every request id this peer can issue has been used.
    #[error("request ids are exhausted")]
    IdsExhausted,
}

impl Error {
    /// Returns the taxonomy error, if this is one.
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationFailure> for Error {
    fn from(failure: ValidationFailure) -> Self {
        Error::Rpc(failure.into())
    }
}

/// Errors raised while setting up the error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Application codes may not use the band reserved by the protocol.
    #[error("code {0} is inside the reserved range [-32768, -32000]")]
    ReservedCode(i64),

    /// The code is already taken by another application kind.
    #[error("code {code} is already registered as `{existing}`")]
    DuplicateCode { code: i64, existing: String },

    /// Server errors must use the implementation-defined band.
    #[error("code {0} is outside the server error range [-32099, -32000]")]
    OutsideServerBand(i64),
}
