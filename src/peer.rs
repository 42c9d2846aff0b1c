//! Role-agnostic JSON-RPC endpoint.
//!
//! A [`Peer`] builds outgoing requests, notifications and responses, and
//! parses incoming payloads. The same value works as a client, a server, or
//! both at once; the role is only a matter of which methods the caller uses.
//!
//! The peer never touches a socket. Every method returns bytes for the
//! transport to send, or takes bytes the transport received.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::{Codec, Messages};
use crate::error::Error;
use crate::registry::ErrorRegistry;
use crate::taxonomy::RpcError;
use crate::types::{self, Batch, Message, Notification, Params, Request, RequestId, Response};

/// Monotonic integer id source. Never reuses an id.
///
/// `None` once `i64::MAX` has been handed out.
#[derive(Debug)]
struct IdGenerator {
    next: Option<i64>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: Some(0) }
    }
}

impl IdGenerator {
    fn next_id(&mut self) -> Option<RequestId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(RequestId::Number(id))
    }
}

/// A JSON-RPC client and server in one.
///
/// # Example
///
/// ```
/// use sansio_json_rpc::{Message, Params, Peer};
/// use serde_json::json;
///
/// let mut client = Peer::new();
/// let mut server = Peer::new();
///
/// let params = Params::try_from(json!({"employee": "Mark", "pin": 1234}))?;
/// let (id, bytes) = client.request("open_vault_door", Some(params))?;
///
/// let request = match server.parse(&bytes)?.next() {
///     Some(Message::Request(request)) => request,
///     other => panic!("unexpected message: {:?}", other),
/// };
/// let reply = server.respond_with_result(&request, json!({"vault_status": "open"}))?;
///
/// let response = match client.parse(&reply)?.next() {
///     Some(Message::Response(response)) => response,
///     other => panic!("unexpected message: {:?}", other),
/// };
/// assert_eq!(response.id(), Some(&id));
/// assert_eq!(response.result(), Some(&json!({"vault_status": "open"})));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct Peer {
    codec: Codec,
    registry: Arc<ErrorRegistry>,
    ids: IdGenerator,
    pending: HashMap<RequestId, String>,
}

impl Peer {
    /// Create a peer with the default codec and an empty error registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom codec configuration.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Use a shared error registry to reconstruct application errors.
    pub fn with_registry(mut self, registry: impl Into<Arc<ErrorRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn registry(&self) -> &ErrorRegistry {
        &self.registry
    }

    /// Build a request with a fresh id and record the id as pending.
    ///
    /// Fails with [`Error::IdsExhausted`] after `i64::MAX` has been issued.
    pub fn build_request(
        &mut self,
        method: impl Into<String>,
        params: Option<Params>,
    ) -> Result<Request, Error> {
        let method = method.into();
        self.codec.validator().check_method(&method)?;

        let id = self.ids.next_id().ok_or(Error::IdsExhausted)?;
        debug!(%id, method = %method, "issued request id");
        self.pending.insert(id.clone(), method.clone());
        Ok(Request::from_parts(id, method, params))
    }

    /// Build a notification.
    pub fn build_notification(
        &self,
        method: impl Into<String>,
        params: Option<Params>,
    ) -> Result<Notification, Error> {
        let method = method.into();
        self.codec.validator().check_method(&method)?;
        Ok(Notification::from_parts(method, params))
    }

    /// Create a request and return its id along with the bytes to send.
    ///
    /// Keep the id to match it against the eventual response.
    pub fn request(
        &mut self,
        method: impl Into<String>,
        params: Option<Params>,
    ) -> Result<(RequestId, Vec<u8>), Error> {
        let request = self.build_request(method, params)?;
        let id = request.id().clone();
        let bytes = self.codec.serialize(&Message::Request(request))?;
        Ok((id, bytes))
    }

    /// Create a notification and return the bytes to send.
    pub fn notify(
        &self,
        method: impl Into<String>,
        params: Option<Params>,
    ) -> Result<Vec<u8>, Error> {
        let notification = self.build_notification(method, params)?;
        self.codec.serialize(&Message::Notification(notification))
    }

    /// A success response echoing `request`'s id.
    pub fn success_response(&self, request: &Request, result: Value) -> Response {
        Response::success(request.id().clone(), result)
    }

    /// An error response. Pass `None` when the request could not be parsed;
    /// the id is then sent as `null`.
    pub fn error_response(&self, request: Option<&Request>, error: types::Error) -> Response {
        Response::error(request.map(|r| r.id().clone()), error)
    }

    /// Serialize a success response to `request`.
    pub fn respond_with_result(&self, request: &Request, result: Value) -> Result<Vec<u8>, Error> {
        let response = self.success_response(request, result);
        self.codec.serialize(&Message::Response(response))
    }

    /// Serialize an error response to `request`, or to an unparsable request
    /// when `request` is `None`.
    pub fn respond_with_error(
        &self,
        request: Option<&Request>,
        error: types::Error,
    ) -> Result<Vec<u8>, Error> {
        let response = self.error_response(request, error);
        self.codec.serialize(&Message::Response(response))
    }

    /// Serialize a batch, for example several requests or the replies to an
    /// incoming batch.
    pub fn serialize_batch(&self, batch: &Batch) -> Result<Vec<u8>, Error> {
        self.codec.serialize_batch(batch)
    }

    /// Parse an incoming payload.
    ///
    /// Responses to ids issued by this peer are removed from the pending set.
    /// Responses for ids this peer does not know are still returned. Error
    /// responses the codec built for invalid batch elements are replies to
    /// send back and leave the pending set alone; see
    /// [`Messages::is_synthesized`].
    pub fn parse(&mut self, payload: &[u8]) -> Result<Messages, RpcError> {
        let messages = self.codec.parse(payload)?;
        for (index, message) in messages.as_slice().iter().enumerate() {
            match message {
                Message::Response(_) if messages.is_synthesized(index) => {
                    debug!(index, "invalid batch element answered locally")
                }
                Message::Response(response) => self.settle(response),
                _ => {}
            }
        }
        Ok(messages)
    }

    fn settle(&mut self, response: &Response) {
        match response.id() {
            Some(id) => match self.pending.remove(id) {
                Some(method) => debug!(%id, method = %method, "response settled pending request"),
                None => warn!(%id, "response for an id that is not pending"),
            },
            None => debug!("response without id"),
        }
    }

    /// Reconstruct a typed error from a wire error using this peer's registry.
    pub fn rpc_error(&self, error: types::Error) -> RpcError {
        self.registry.error_from_object(error)
    }

    /// True while `id` was issued by this peer and has not been answered.
    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.pending.contains_key(id)
    }

    /// The method of a pending request.
    pub fn pending_method(&self, id: &RequestId) -> Option<&str> {
        self.pending.get(id).map(String::as_str)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Stop waiting for `id`, for example after a transport timeout.
    ///
    /// Returns the method of the abandoned request.
    pub fn forget(&mut self, id: &RequestId) -> Option<String> {
        self.pending.remove(id)
    }
}
