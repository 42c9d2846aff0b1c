//! A client and a server peer talking through an in-process byte queue.
//!
//! This demo shows how a transport drives two `Peer`s: the client issues
//! requests and a notification, the server answers them (including an
//! application error and a parse error), and the client correlates the
//! replies with its pending ids.
//!
//! Usage:
//!
//! ```bash
//! RUST_LOG=debug cargo run --example vault_door
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use sansio_json_rpc::{ErrorRegistry, Message, Params, Peer, Request, RpcError};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

const VAULT_LOCKED: i64 = 1;

/// The application-handler side: returns a result or raises a taxonomy error.
fn handle(registry: &ErrorRegistry, request: &Request) -> Result<Value, RpcError> {
    match request.method() {
        "open_vault_door" => {
            let pin = request
                .params()
                .map(|p| p.as_value())
                .and_then(|p| p.get("pin").and_then(Value::as_i64));
            match pin {
                Some(1234) => Ok(json!({"vault_status": "open"})),
                Some(_) => Err(registry.application_error(VAULT_LOCKED, None, None)),
                None => Err(RpcError::invalid_params("`pin` is required")),
            }
        }
        other => Err(RpcError::method_not_found(format!("Method not found: {}", other))),
    }
}

/// Feed one payload to the server and queue whatever it replies.
fn serve(server: &mut Peer, payload: &[u8], wire: &mut VecDeque<Vec<u8>>) -> Result<()> {
    let messages = match server.parse(payload) {
        Ok(messages) => messages,
        Err(e) => {
            info!("Server could not parse payload: {}", e);
            wire.push_back(server.respond_with_error(None, e.into_error_object())?);
            return Ok(());
        }
    };

    for (message, synthesized) in messages.with_origin() {
        match message {
            Message::Response(response) if synthesized => {
                info!("Server rejecting invalid batch element");
                wire.push_back(server.codec().serialize(&Message::Response(response))?);
            }
            Message::Request(request) => {
                let reply = match handle(server.registry(), &request) {
                    Ok(result) => server.respond_with_result(&request, result)?,
                    Err(e) => server.respond_with_error(Some(&request), e.into_error_object())?,
                };
                wire.push_back(reply);
            }
            Message::Notification(notification) => {
                info!("Server received notification: {}", notification.method());
            }
            Message::Response(response) => {
                info!("Server ignoring response: {:?}", response);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let registry = Arc::new(ErrorRegistry::new().with_application_error(
        VAULT_LOCKED,
        "The vault is locked",
        "VaultLockedError",
    )?);

    let mut client = Peer::new().with_registry(Arc::clone(&registry));
    let mut server = Peer::new().with_registry(Arc::clone(&registry));

    let mut to_server: VecDeque<Vec<u8>> = VecDeque::new();
    let mut to_client: VecDeque<Vec<u8>> = VecDeque::new();

    let good = Params::try_from(json!({"employee": "Mark", "pin": 1234}))?;
    let bad = Params::try_from(json!({"employee": "Mark", "pin": 1111}))?;

    let (open_id, bytes) = client.request("open_vault_door", Some(good))?;
    to_server.push_back(bytes);
    let (locked_id, bytes) = client.request("open_vault_door", Some(bad))?;
    to_server.push_back(bytes);
    to_server.push_back(client.notify("shift_started", None)?);
    to_server.push_back(b"not valid json".to_vec());

    info!("Client waiting on ids {} and {}", open_id, locked_id);

    while let Some(payload) = to_server.pop_front() {
        info!("-> {}", String::from_utf8_lossy(&payload));
        serve(&mut server, &payload, &mut to_client)?;
    }

    while let Some(payload) = to_client.pop_front() {
        info!("<- {}", String::from_utf8_lossy(&payload));
        for message in client.parse(&payload)? {
            let Message::Response(response) = message else {
                continue;
            };
            let id = response.id().cloned();
            match response.into_outcome() {
                Ok(result) => println!("{:?}: {}", id, result),
                Err(error) => println!("{:?}: {}", id, client.rpc_error(error)),
            }
        }
    }

    info!("{} requests still pending", client.pending_len());
    Ok(())
}
