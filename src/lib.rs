//! A transport-agnostic JSON-RPC 2.0 codec, validator and peer.
//!
//! This library turns complete byte payloads into typed JSON-RPC messages and
//! back, enforcing the structural rules of the protocol along the way. It
//! performs no I/O: bytes come from and go to a transport that you own. The
//! same [`Peer`] type serves as client, server, or both at once.
//!
//! # Design Goals
//!
//! The library follows the "sans-I/O" style. Every operation is a pure,
//! synchronous computation over its input, so it works the same inside a
//! blocking loop, an async task, or a test. Connection management, framing of
//! byte streams, timeouts and request dispatch are left to the caller.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! [`types`] contains the JSON-RPC 2.0 message types: Request, Notification,
//! Response, the wire Error object and Batch. Values are immutable once built.
//!
//! [`validation`] checks decoded JSON against the protocol and reports the
//! first offending field.
//!
//! [`codec`] parses byte payloads into messages and serializes messages back
//! into bytes.
//!
//! [`peer`] provides the Peer: id generation, message construction and
//! tracking of requests that are still waiting for a response.
//!
//! [`taxonomy`] defines the error kinds of the protocol and [`RpcError`],
//! the error value raised locally and sent over the wire.
//!
//! [`registry`] holds application-defined error kinds so that error codes
//! received from the remote side can be turned back into typed errors.
//!
//! [`error`] defines the crate-level error type.
//!
//! # Quick Start
//!
//! Send a request and read the reply:
//!
//! ```
//! use sansio_json_rpc::{Message, Params, Peer};
//! use serde_json::json;
//!
//! let mut peer = Peer::new();
//!
//! let params = Params::try_from(json!({"employee": "Mark", "pin": 1234}))?;
//! let (id, bytes) = peer.request("open_vault_door", Some(params))?;
//! assert_eq!(
//!     bytes,
//!     br#"{"jsonrpc":"2.0","method":"open_vault_door","params":{"employee":"Mark","pin":1234},"id":0}"#
//! );
//!
//! // ... the transport sends `bytes` and receives a reply ...
//! let reply = br#"{"jsonrpc":"2.0","result":{"vault_status":"open"},"id":0}"#;
//!
//! for message in peer.parse(reply)? {
//!     if let Message::Response(response) = message {
//!         assert_eq!(response.id(), Some(&id));
//!         assert_eq!(response.result(), Some(&json!({"vault_status": "open"})));
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Error Handling
//!
//! Parsing fails with a parse error (`-32700`) for bytes that are not JSON and
//! with an invalid request error (`-32600`) for JSON that is not a valid
//! message. Either way the caller still owes the remote side an answer:
//!
//! ```
//! use sansio_json_rpc::Peer;
//!
//! let mut server = Peer::new();
//!
//! let err = server.parse(b"not valid json").unwrap_err();
//! assert_eq!(err.code(), -32700);
//!
//! let reply = server.respond_with_error(None, err.into_error_object())?;
//! assert_eq!(
//!     reply,
//!     br#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"Invalid JSON format"},"id":null}"#
//! );
//! # Ok::<(), sansio_json_rpc::Error>(())
//! ```
//!
//! # Application Errors
//!
//! Codes outside the reserved band `-32768..=-32000` belong to the
//! application. Register them once at start-up and share the registry:
//!
//! ```
//! use std::sync::Arc;
//! use sansio_json_rpc::{ErrorRegistry, Peer, types};
//!
//! let registry = Arc::new(
//!     ErrorRegistry::new().with_application_error(42, "Vault is locked", "VaultLockedError")?,
//! );
//! let peer = Peer::new().with_registry(Arc::clone(&registry));
//!
//! let err = peer.rpc_error(types::Error::new(42, "Vault is locked", None));
//! assert_eq!(err.kind().to_string(), "VaultLockedError");
//! # Ok::<(), sansio_json_rpc::Error>(())
//! ```
//!
//! # Batches
//!
//! A JSON array is a batch. Each element is validated on its own; an invalid
//! element becomes an error response at its position while the others parse
//! normally. An empty array is an invalid request.

pub use codec::{Codec, Messages};
pub use error::{Error, RegistrationError};
pub use peer::Peer;
pub use registry::{ApplicationKind, ErrorRegistry};
pub use taxonomy::{ErrorKind, RpcError};
pub use types::{Batch, Message, Notification, Params, Request, RequestId, Response};
pub use validation::{ValidationFailure, Validator};

pub mod codec;
pub mod error;
pub mod peer;
pub mod registry;
pub mod taxonomy;
pub mod types;
pub mod validation;
