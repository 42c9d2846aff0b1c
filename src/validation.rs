//! Structural validation of decoded JSON values.
//!
//! Each `validate_*` function turns a `serde_json::Value` into a typed
//! message or reports the first offending field. Failures are values, not
//! panics; the codec decides whether they abort parsing or become error
//! responses inside a batch.

use serde_json::{Map, Value};
use tracing::trace;

use crate::taxonomy::RpcError;
use crate::types::{self, JSONRPC_VERSION, Notification, Params, Request, RequestId, Response};

/// Prefix of method names reserved for protocol extensions.
pub const RESERVED_METHOD_PREFIX: &str = "rpc.";

/// Describes why a value is not a valid message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{field}` {reason}")]
pub struct ValidationFailure {
    field: &'static str,
    reason: String,
}

impl ValidationFailure {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// The first field that failed validation.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<ValidationFailure> for RpcError {
    fn from(failure: ValidationFailure) -> Self {
        RpcError::invalid_request(failure.to_string())
    }
}

/// Validation rules, configurable per codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    allow_reserved_methods: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit method names starting with `rpc.`.
    pub fn allow_reserved_methods(mut self, allow: bool) -> Self {
        self.allow_reserved_methods = allow;
        self
    }

    pub fn allows_reserved_methods(&self) -> bool {
        self.allow_reserved_methods
    }

    /// Check a method name for use in a request or notification.
    pub fn check_method(&self, method: &str) -> Result<(), ValidationFailure> {
        if method.is_empty() {
            return Err(ValidationFailure::new("method", "must be a non-empty string"));
        }
        if !self.allow_reserved_methods && method.starts_with(RESERVED_METHOD_PREFIX) {
            return Err(ValidationFailure::new(
                "method",
                format!("must not start with the reserved prefix {RESERVED_METHOD_PREFIX:?}"),
            ));
        }
        Ok(())
    }

    /// Validate an object carrying an `id` as a [`Request`].
    pub fn request(&self, value: &Value) -> Result<Request, ValidationFailure> {
        let object = as_object(value)?;
        check_version(object)?;
        let method = self.method(object)?;
        let params = params(object)?;
        let id = match object.get("id") {
            None => return Err(ValidationFailure::new("id", "is required for a request")),
            Some(Value::Null) => return Err(ValidationFailure::new("id", "must not be null")),
            Some(id) => parse_id(id)?,
        };
        trace!(%id, method = %method, "validated request");
        Ok(Request::from_parts(id, method, params))
    }

    /// Validate an object without an `id` as a [`Notification`].
    pub fn notification(&self, value: &Value) -> Result<Notification, ValidationFailure> {
        let object = as_object(value)?;
        if object.contains_key("id") {
            return Err(ValidationFailure::new(
                "id",
                "is present, so the message is a request",
            ));
        }
        check_version(object)?;
        let method = self.method(object)?;
        let params = params(object)?;
        trace!(method = %method, "validated notification");
        Ok(Notification::from_parts(method, params))
    }

    /// Validate an object as a [`Response`].
    pub fn response(&self, value: &Value) -> Result<Response, ValidationFailure> {
        let object = as_object(value)?;
        check_version(object)?;

        let outcome = match (object.get("result"), object.get("error")) {
            (Some(_), Some(_)) => {
                return Err(ValidationFailure::new(
                    "result",
                    "must not appear together with `error`",
                ));
            }
            (None, None) => {
                return Err(ValidationFailure::new(
                    "result",
                    "or `error` is required for a response",
                ));
            }
            (Some(result), None) => Ok(result.clone()),
            (None, Some(error)) => Err(error_object(error)?),
        };

        let id = match object.get("id") {
            None => return Err(ValidationFailure::new("id", "is required for a response")),
            Some(Value::Null) => None,
            Some(id) => Some(parse_id(id)?),
        };

        match (id, outcome) {
            (Some(id), Ok(result)) => Ok(Response::success(id, result)),
            (None, Ok(_)) => Err(ValidationFailure::new(
                "id",
                "must not be null on a success response",
            )),
            (id, Err(error)) => Ok(Response::error(id, error)),
        }
    }

    fn method(&self, object: &Map<String, Value>) -> Result<String, ValidationFailure> {
        match object.get("method") {
            Some(Value::String(method)) => {
                self.check_method(method)?;
                Ok(method.clone())
            }
            Some(_) => Err(ValidationFailure::new("method", "must be a string")),
            None => Err(ValidationFailure::new("method", "is required")),
        }
    }
}

/// Validate with the default rules. See [`Validator::request`].
pub fn validate_request(value: &Value) -> Result<Request, ValidationFailure> {
    Validator::default().request(value)
}

/// Validate with the default rules. See [`Validator::notification`].
pub fn validate_notification(value: &Value) -> Result<Notification, ValidationFailure> {
    Validator::default().notification(value)
}

/// Validate with the default rules. See [`Validator::response`].
pub fn validate_response(value: &Value) -> Result<Response, ValidationFailure> {
    Validator::default().response(value)
}

/// Read a request id.
///
/// Strings and integers that fit in an `i64` are accepted. A number with a
/// zero fractional part (`1.0`) is read as the integer it represents;
/// booleans are not numbers. Larger integers such as `u64::MAX` are rejected
/// as out of range.
pub fn parse_id(value: &Value) -> Result<RequestId, ValidationFailure> {
    match value {
        Value::String(s) => Ok(RequestId::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(RequestId::Number(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(RequestId::Number(f as i64))
                }
                Some(f) if f.fract() != 0.0 => Err(ValidationFailure::new(
                    "id",
                    "number cannot have a fractional part",
                )),
                _ => Err(ValidationFailure::new("id", "number is out of range")),
            }
        }
        _ => Err(ValidationFailure::new("id", "must be a number, string, or null")),
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ValidationFailure> {
    value
        .as_object()
        .ok_or_else(|| ValidationFailure::new("message", "must be a JSON object"))
}

fn check_version(object: &Map<String, Value>) -> Result<(), ValidationFailure> {
    match object.get("jsonrpc") {
        Some(Value::String(v)) if v == JSONRPC_VERSION => Ok(()),
        _ => Err(ValidationFailure::new("jsonrpc", "must be \"2.0\"")),
    }
}

fn params(object: &Map<String, Value>) -> Result<Option<Params>, ValidationFailure> {
    match object.get("params") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Params::try_from(value.clone()).map(Some),
    }
}

fn error_object(value: &Value) -> Result<types::Error, ValidationFailure> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationFailure::new("error", "must be an object"))?;
    let code = object
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| ValidationFailure::new("error.code", "must be an integer"))?;
    let message = object
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationFailure::new("error.message", "must be a string"))?;
    Ok(types::Error::new(code, message, object.get("data").cloned()))
}
