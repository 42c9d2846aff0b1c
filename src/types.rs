//! JSON-RPC 2.0 message types.
//!
//! This module defines JSON-RPC 2.0 message types as specified in:
//! https://www.jsonrpc.org/specification
//!
//! Values are immutable once built. Constructors check the invariants that
//! cannot be expressed in the types themselves; decoding untrusted JSON goes
//! through [`crate::validation`].

use std::fmt;

use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::taxonomy::RpcError;
use crate::validation::{ValidationFailure, Validator};

/// The protocol version string carried by every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// Serializes as the `"jsonrpc": "2.0"` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Version;

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

/// A request identifier: an integer or a string.
///
/// The wire format also allows `null`, which only ever appears on error
/// responses and is modelled as `Option<RequestId>` there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

/// Method parameters: by position or by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Params {
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl Params {
    /// Serialize any value into params. It must encode as an array or object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, crate::Error> {
        let value = serde_json::to_value(value)?;
        Ok(Self::try_from(value)?)
    }

    pub fn as_value(&self) -> Value {
        match self {
            Params::Array(items) => Value::Array(items.clone()),
            Params::Object(map) => Value::Object(map.clone()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Params::Array(items) => Value::Array(items),
            Params::Object(map) => Value::Object(map),
        }
    }
}

impl TryFrom<Value> for Params {
    type Error = ValidationFailure;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(Params::Array(items)),
            Value::Object(map) => Ok(Params::Object(map)),
            _ => Err(ValidationFailure::new("params", "must be an array or an object")),
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(items: Vec<Value>) -> Self {
        Params::Array(items)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params::Object(map)
    }
}

/// A call that expects a correlated [`Response`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    jsonrpc: Version,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
    id: RequestId,
}

impl Request {
    /// Build a request.
    ///
    /// Fails when `method` is empty or uses the reserved `rpc.` prefix.
    pub fn new(
        id: RequestId,
        method: impl Into<String>,
        params: Option<Params>,
    ) -> Result<Self, ValidationFailure> {
        let method = method.into();
        Validator::default().check_method(&method)?;
        Ok(Self::from_parts(id, method, params))
    }

    pub(crate) fn from_parts(id: RequestId, method: String, params: Option<Params>) -> Self {
        Self {
            jsonrpc: Version,
            method,
            params,
            id,
        }
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn into_parts(self) -> (RequestId, String, Option<Params>) {
        (self.id, self.method, self.params)
    }
}

/// A call that is never answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    jsonrpc: Version,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
}

impl Notification {
    /// Build a notification.
    ///
    /// Fails when `method` is empty or uses the reserved `rpc.` prefix.
    pub fn new(method: impl Into<String>, params: Option<Params>) -> Result<Self, ValidationFailure> {
        let method = method.into();
        Validator::default().check_method(&method)?;
        Ok(Self::from_parts(method, params))
    }

    pub(crate) fn from_parts(method: String, params: Option<Params>) -> Self {
        Self {
            jsonrpc: Version,
            method,
            params,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn into_parts(self) -> (String, Option<Params>) {
        (self.method, self.params)
    }
}

/// The wire-level error object: `{"code", "message", "data"?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Error {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Error {
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// The answer to a [`Request`]: a result or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    id: Option<RequestId>,
    outcome: Result<Value, Error>,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            id: Some(id),
            outcome: Ok(result),
        }
    }

    /// An error response. `id` is `None` when the request could not be parsed
    /// far enough to recover its id.
    pub fn error(id: Option<RequestId>, error: Error) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn result(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    pub fn error_object(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    pub fn outcome(&self) -> Result<&Value, &Error> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Result<Value, Error> {
        self.outcome
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 3)?;
        state.serialize_field("jsonrpc", &Version)?;
        match &self.outcome {
            Ok(result) => state.serialize_field("result", result)?,
            Err(error) => state.serialize_field("error", error)?,
        }
        state.serialize_field("id", &self.id)?;
        state.end()
    }
}

/// Any single JSON-RPC message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    Request(Request),
    Notification(Notification),
    Response(Response),
}

impl Message {
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            Message::Request(req) => Some(req.id()),
            Message::Response(res) => res.id(),
            Message::Notification(_) => None,
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Message::Request(req) => Some(req.method()),
            Message::Notification(notif) => Some(notif.method()),
            Message::Response(_) => None,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, Message::Notification(_))
    }
}

impl From<Request> for Message {
    fn from(req: Request) -> Self {
        Message::Request(req)
    }
}

impl From<Notification> for Message {
    fn from(notif: Notification) -> Self {
        Message::Notification(notif)
    }
}

impl From<Response> for Message {
    fn from(res: Response) -> Self {
        Message::Response(res)
    }
}

/// A non-empty, ordered group of messages sent as one JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Batch(Vec<Message>);

impl Batch {
    /// Fails with an invalid request error when `messages` is empty.
    pub fn new(messages: Vec<Message>) -> Result<Self, RpcError> {
        if messages.is_empty() {
            return Err(RpcError::invalid_request("batch must not be empty"));
        }
        Ok(Self(messages))
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }
}

impl IntoIterator for Batch {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
