//! Integration tests for the peer.
//!
//! These tests drive two peers against each other through plain byte
//! buffers, the way a transport would, and check id generation, pending
//! request tracking and response construction.

mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use sansio_json_rpc::{
        Batch, Codec, ErrorKind, ErrorRegistry, Message, Params, Peer, Request, RequestId,
        RpcError, types,
    };
    use serde_json::{Value, json};

    fn parse_bytes(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).expect("peer produced invalid JSON")
    }

    fn receive_request(peer: &mut Peer, bytes: &[u8]) -> Request {
        match peer.parse(bytes).unwrap().next() {
            Some(Message::Request(request)) => request,
            other => panic!("expected a request, got {:?}", other),
        }
    }

    #[test]
    fn open_vault_door() {
        let mut client = Peer::new();
        let params = Params::try_from(json!({"employee": "Mark", "pin": 1234})).unwrap();
        let (id, bytes) = client.request("open_vault_door", Some(params)).unwrap();

        let expected = format!(
            r#"{{"jsonrpc":"2.0","method":"open_vault_door","params":{{"employee":"Mark","pin":1234}},"id":{}}}"#,
            id
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
        assert!(client.is_pending(&id));
        assert_eq!(client.pending_method(&id), Some("open_vault_door"));

        let reply = json!({"jsonrpc": "2.0", "result": {"vault_status": "open"}, "id": id});
        let messages: Vec<Message> = client.parse(reply.to_string().as_bytes()).unwrap().collect();
        assert_eq!(messages.len(), 1);
        let Message::Response(response) = &messages[0] else {
            panic!("expected a response, got {:?}", messages[0]);
        };
        assert_eq!(response.id(), Some(&id));
        assert_eq!(response.result(), Some(&json!({"vault_status": "open"})));
        assert!(!client.is_pending(&id));
    }

    #[test]
    fn ids_are_integers_from_zero() {
        let mut client = Peer::new();
        let (first, _) = client.request("a", None).unwrap();
        let (second, _) = client.request("b", None).unwrap();
        assert_eq!(first, RequestId::Number(0));
        assert_eq!(second, RequestId::Number(1));
    }

    #[test]
    fn ten_thousand_distinct_ids() {
        let mut client = Peer::new();
        let ids: HashSet<RequestId> = (0..10_000)
            .map(|_| client.request("tick", None).unwrap().0)
            .collect();
        assert_eq!(ids.len(), 10_000);
        assert_eq!(client.pending_len(), 10_000);
    }

    #[test]
    fn ids_are_not_reused_after_response() {
        let mut client = Peer::new();
        let (first, _) = client.request("a", None).unwrap();
        let reply = json!({"jsonrpc": "2.0", "result": null, "id": first});
        client.parse(reply.to_string().as_bytes()).unwrap();
        let (second, _) = client.request("b", None).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn notify() {
        let client = Peer::new();
        let params = Params::try_from(json!({"foo": "bar"})).unwrap();
        let bytes = client.notify("hello_world", Some(params)).unwrap();
        assert_eq!(
            parse_bytes(&bytes),
            json!({"method": "hello_world", "params": {"foo": "bar"}, "jsonrpc": "2.0"})
        );
        assert_eq!(client.pending_len(), 0);
    }

    #[test]
    fn server_handles_request() {
        let mut client = Peer::new();
        let mut server = Peer::new();

        let (_, bytes) = client.request("get_foo", None).unwrap();
        let req = receive_request(&mut server, &bytes);
        assert_eq!(req.method(), "get_foo");
        assert!(req.params().is_none());

        let bytes = server.respond_with_result(&req, json!({"foo": 1})).unwrap();
        assert_eq!(
            parse_bytes(&bytes),
            json!({"id": 0, "result": {"foo": 1}, "jsonrpc": "2.0"})
        );
    }

    #[test]
    fn server_responds_with_error() {
        let mut server = Peer::new();
        let req = receive_request(
            &mut server,
            br#"{"id": 0, "method": "get_bar", "jsonrpc": "2.0"}"#,
        );

        let err = RpcError::method_not_found("Method not found: get_bar");
        let bytes = server.respond_with_error(Some(&req), err.to_error_object()).unwrap();
        assert_eq!(
            parse_bytes(&bytes),
            json!({
                "id": 0,
                "error": {"code": -32601, "message": "Method not found: get_bar"},
                "jsonrpc": "2.0"
            })
        );
    }

    #[test]
    fn parse_error_response_has_null_id() {
        let mut server = Peer::new();
        let err = server.parse(b"{").unwrap_err();
        assert_eq!(err.code(), -32700);

        let bytes = server.respond_with_error(None, err.to_error_object()).unwrap();
        let reply = parse_bytes(&bytes);
        assert_eq!(reply["id"], Value::Null);
        assert_eq!(reply["error"]["code"], -32700);
        assert!(String::from_utf8(bytes).unwrap().contains(r#""id":null"#));
    }

    #[test]
    fn unknown_response_id_is_kept() {
        let mut client = Peer::new();
        let messages: Vec<Message> = client
            .parse(br#"{"id": 0, "result": {"foo": "bar"}, "jsonrpc": "2.0"}"#)
            .unwrap()
            .collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_response());
    }

    #[test]
    fn invalid_inbound_request_keeps_own_id_pending() {
        let mut peer = Peer::new();
        let (id, _) = peer.request("slow", None).unwrap();
        assert_eq!(id, RequestId::Number(0));

        // A malformed request from the other side that reuses our id.
        let messages = peer.parse(br#"[{"jsonrpc":"2.0","method":5,"id":0}]"#).unwrap();
        assert!(messages.is_synthesized(0));
        assert!(peer.is_pending(&id));
        assert_eq!(peer.pending_method(&id), Some("slow"));

        let replies: Vec<(Message, bool)> = messages.with_origin().collect();
        let (Message::Response(reply), true) = &replies[0] else {
            panic!("expected a synthesized error response, got {:?}", replies);
        };
        assert_eq!(reply.id(), Some(&id));
        assert_eq!(reply.error_object().unwrap().code, -32600);

        // The real answer still settles it.
        let messages = peer
            .parse(br#"[{"jsonrpc":"2.0","result":"done","id":0}]"#)
            .unwrap();
        assert!(!messages.is_synthesized(0));
        assert!(!peer.is_pending(&id));
    }

    #[test]
    fn out_of_order_responses() {
        let mut client = Peer::new();
        let (first, _) = client.request("hello_world", None).unwrap();
        let (second, _) = client.request("goodbye_world", None).unwrap();

        client
            .parse(br#"{"id":1, "result": {"goodbye": "farewell"}, "jsonrpc": "2.0"}"#)
            .unwrap();
        assert!(client.is_pending(&first));
        assert!(!client.is_pending(&second));

        let messages: Vec<Message> = client
            .parse(br#"{"id":0, "error": {"code": -32700, "message": "Error"}, "jsonrpc": "2.0"}"#)
            .unwrap()
            .collect();
        let Message::Response(resp) = &messages[0] else {
            panic!("expected a response, got {:?}", messages[0]);
        };
        assert!(!resp.is_success());
        assert_eq!(resp.error_object().unwrap().message, "Error");
        assert_eq!(client.pending_len(), 0);
    }

    #[test]
    fn forget_pending() {
        let mut client = Peer::new();
        let (id, _) = client.request("slow", None).unwrap();
        assert_eq!(client.forget(&id), Some("slow".to_string()));
        assert!(!client.is_pending(&id));
        assert_eq!(client.forget(&id), None);
    }

    #[test]
    fn reserved_methods_outbound() {
        let mut client = Peer::new();
        let err = client.request("rpc.discover", None).unwrap_err();
        assert_eq!(err.as_rpc().map(RpcError::code), Some(-32600));
        assert!(client.notify("", None).is_err());
        assert_eq!(client.pending_len(), 0);

        let mut client = Peer::new().with_codec(Codec::new().allow_reserved_methods(true));
        assert!(client.request("rpc.discover", None).is_ok());
    }

    #[test]
    fn batch_round_trip() {
        let mut client = Peer::new();
        let mut server = Peer::new();

        let batch = Batch::new(vec![
            client.build_request("sum", Some(Params::from(vec![json!(1), json!(2)]))).unwrap().into(),
            client.build_notification("log", None).unwrap().into(),
            client.build_request("missing", None).unwrap().into(),
        ])
        .unwrap();
        let bytes = client.serialize_batch(&batch).unwrap();

        let incoming = server.parse(&bytes).unwrap();
        assert!(incoming.is_batch());
        let mut replies: Vec<Message> = Vec::new();
        for message in incoming {
            if let Message::Request(req) = message {
                let reply = match req.method() {
                    "sum" => server.success_response(&req, json!(3)),
                    _ => server.error_response(
                        Some(&req),
                        RpcError::method_not_found("Method not found").into(),
                    ),
                };
                replies.push(reply.into());
            }
        }
        let bytes = server.serialize_batch(&Batch::new(replies).unwrap()).unwrap();

        assert_eq!(client.pending_len(), 2);
        let responses: Vec<Message> = client.parse(&bytes).unwrap().collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(client.pending_len(), 0);
    }

    #[test]
    fn reconstruct_application_error() {
        let registry = Arc::new(
            ErrorRegistry::new()
                .with_application_error(1, "Default message", "MyAppError")
                .unwrap(),
        );
        let mut client = Peer::new().with_registry(Arc::clone(&registry));
        let (id, _) = client.request("open", None).unwrap();

        let reply = json!({
            "jsonrpc": "2.0",
            "error": {"code": 1, "message": "Application error", "data": {"door": 3}},
            "id": id
        });
        let response = match client.parse(reply.to_string().as_bytes()).unwrap().next() {
            Some(Message::Response(response)) => response,
            other => panic!("expected a response, got {:?}", other),
        };
        let wire: types::Error = response.into_outcome().unwrap_err();
        let err = client.rpc_error(wire);
        assert_eq!(
            err.kind(),
            &ErrorKind::Application {
                name: Some("MyAppError".to_string())
            }
        );
        assert_eq!(err.message(), "Application error");
        assert_eq!(err.data(), Some(&json!({"door": 3})));

        let unknown = client.rpc_error(types::Error::new(2, "Who knows", None));
        assert_eq!(unknown.kind(), &ErrorKind::Application { name: None });
        assert_eq!(unknown.code(), 2);
    }
}
