//! Conversion between byte payloads and messages.
//!
//! The codec takes exactly one complete JSON document per call. It does not
//! buffer partial input; that is the transport's job.
//!
//! # Parsing
//!
//! Decoding happens in two stages. Bytes that are not UTF-8 or not JSON fail
//! with a parse error (`-32700`) before any structural check runs. Valid
//! JSON is then classified and validated:
//!
//! - an object with `method` is a request (with `id`) or a notification;
//! - an object with `result` or `error` is a response;
//! - an array is a batch, validated element by element.
//!
//! A single invalid object fails with an invalid request error (`-32600`).
//! Inside a batch an invalid element does not abort parsing; it is replaced
//! by an error response at the same position. Those responses are made up
//! by the codec, not received, and [`Messages::is_synthesized`] tells them
//! apart from responses that arrived on the wire.
//!
//! ```
//! use sansio_json_rpc::codec;
//!
//! let messages = codec::parse(br#"{"jsonrpc":"2.0","method":"ping"}"#)?;
//! assert_eq!(messages.len(), 1);
//!
//! let err = codec::parse(b"not valid json").unwrap_err();
//! assert_eq!(err.code(), -32700);
//! # Ok::<(), sansio_json_rpc::RpcError>(())
//! ```

use std::iter::{FusedIterator, Zip};
use std::vec;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::Error;
use crate::taxonomy::RpcError;
use crate::types::{Batch, Message, Response};
use crate::validation::{Validator, parse_id};

/// Messages produced by one call to [`Codec::parse`].
///
/// A finite sequence that can be consumed once, in source order.
#[derive(Debug)]
pub struct Messages {
    inner: vec::IntoIter<Message>,
    synthesized: vec::IntoIter<bool>,
    batch: bool,
}

impl Messages {
    fn single(message: Message) -> Self {
        Self {
            inner: vec![message].into_iter(),
            synthesized: vec![false].into_iter(),
            batch: false,
        }
    }

    fn batch(messages: Vec<Message>, synthesized: Vec<bool>) -> Self {
        Self {
            inner: messages.into_iter(),
            synthesized: synthesized.into_iter(),
            batch: true,
        }
    }

    /// True when the payload was a JSON array.
    ///
    /// Replies to a batch are expected to be sent back as a batch.
    pub fn is_batch(&self) -> bool {
        self.batch
    }

    /// The messages not yet yielded.
    pub fn as_slice(&self) -> &[Message] {
        self.inner.as_slice()
    }

    /// True when the message at `index` of [`as_slice`](Self::as_slice) is an
    /// error response the codec built for an invalid batch element.
    ///
    /// Such a response answers the remote side's malformed request and
    /// should be sent back; it never answers one of the caller's requests.
    pub fn is_synthesized(&self, index: usize) -> bool {
        self.synthesized.as_slice().get(index).copied().unwrap_or(false)
    }

    /// Pair every remaining message with its [`is_synthesized`](Self::is_synthesized) flag.
    pub fn with_origin(self) -> Zip<vec::IntoIter<Message>, vec::IntoIter<bool>> {
        self.inner.zip(self.synthesized)
    }
}

impl Iterator for Messages {
    type Item = Message;

    fn next(&mut self) -> Option<Self::Item> {
        self.synthesized.next();
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Messages {}

impl FusedIterator for Messages {}

/// JSON-RPC codec.
///
/// # Example
///
/// ```
/// use sansio_json_rpc::Codec;
///
/// let codec = Codec::new().allow_reserved_methods(true);
/// let mut messages = codec.parse(br#"{"jsonrpc":"2.0","method":"rpc.discover","id":1}"#)?;
/// assert_eq!(messages.next().unwrap().method(), Some("rpc.discover"));
/// # Ok::<(), sansio_json_rpc::RpcError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    validator: Validator,
}

impl Codec {
    /// Create a codec with the default validation rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit method names starting with the reserved `rpc.` prefix.
    pub fn allow_reserved_methods(mut self, allow: bool) -> Self {
        self.validator = self.validator.allow_reserved_methods(allow);
        self
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Parse one complete payload.
    ///
    /// # Errors
    ///
    /// - parse error for invalid UTF-8 or invalid JSON;
    /// - invalid request error for a structurally invalid single message,
    ///   an empty batch, or a top-level value that is neither object nor array.
    pub fn parse(&self, payload: &[u8]) -> Result<Messages, RpcError> {
        let text = std::str::from_utf8(payload).map_err(|e| {
            debug!("Payload is not valid UTF-8: {}", e);
            RpcError::parse_error("Invalid UTF-8 encoding")
        })?;

        let value: Value = serde_json::from_str(text).map_err(|e| {
            debug!("Failed to parse JSON payload: {}", e);
            RpcError::parse_error("Invalid JSON format")
        })?;
        trace!("Parsed JSON value: {:?}", value);

        match value {
            Value::Array(items) => self.parse_batch(&items),
            Value::Object(_) => Ok(Messages::single(self.parse_single(&value)?)),
            _ => Err(RpcError::invalid_request(
                "`message` must be a JSON object or array",
            )),
        }
    }

    fn parse_batch(&self, items: &[Value]) -> Result<Messages, RpcError> {
        if items.is_empty() {
            return Err(RpcError::invalid_request("batch must not be empty"));
        }
        debug!("Parsing batch of {} messages", items.len());
        let (messages, synthesized): (Vec<Message>, Vec<bool>) =
            items.iter().map(|item| self.parse_batch_item(item)).unzip();
        Ok(Messages::batch(messages, synthesized))
    }

    fn parse_batch_item(&self, item: &Value) -> (Message, bool) {
        match self.parse_single(item) {
            Ok(msg) => (msg, false),
            Err(e) => {
                debug!("Invalid batch element: {}", e);
                // Echo the element's id when it is usable.
                let id = item.get("id").and_then(|id| parse_id(id).ok());
                (Message::Response(Response::error(id, e.into_error_object())), true)
            }
        }
    }

    fn parse_single(&self, value: &Value) -> Result<Message, RpcError> {
        let object = value
            .as_object()
            .ok_or_else(|| RpcError::invalid_request("`message` must be a JSON object"))?;

        if object.contains_key("method") {
            if object.contains_key("id") {
                Ok(Message::Request(self.validator.request(value)?))
            } else {
                Ok(Message::Notification(self.validator.notification(value)?))
            }
        } else if object.contains_key("result") || object.contains_key("error") {
            Ok(Message::Response(self.validator.response(value)?))
        } else {
            Err(RpcError::invalid_request(
                "`method` is required for a request, `result` or `error` for a response",
            ))
        }
    }

    /// Serialize a single message to UTF-8 JSON bytes.
    pub fn serialize(&self, message: &Message) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(message)?)
    }

    /// Serialize a batch to a UTF-8 JSON array.
    pub fn serialize_batch(&self, batch: &Batch) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(batch)?)
    }
}

/// Parse with the default codec. See [`Codec::parse`].
pub fn parse(payload: &[u8]) -> Result<Messages, RpcError> {
    Codec::default().parse(payload)
}

/// Serialize with the default codec. See [`Codec::serialize`].
pub fn serialize(message: &Message) -> Result<Vec<u8>, Error> {
    Codec::default().serialize(message)
}

/// Serialize with the default codec. See [`Codec::serialize_batch`].
pub fn serialize_batch(batch: &Batch) -> Result<Vec<u8>, Error> {
    Codec::default().serialize_batch(batch)
}
