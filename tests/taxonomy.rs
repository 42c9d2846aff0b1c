//! Integration tests for the error taxonomy and registry.
//!
//! Covers the fixed code table, the reserved band, application registration
//! and the reconstruction of typed errors from wire error objects.

mod tests {
    use sansio_json_rpc::{
        Error, ErrorKind, ErrorRegistry, RegistrationError, RpcError, taxonomy, types,
    };
    use serde_json::json;

    #[test]
    fn standard_kinds_round_trip() {
        let registry = ErrorRegistry::new();
        for err in [
            RpcError::parse_error("Parse error"),
            RpcError::invalid_request("Invalid Request"),
            RpcError::method_not_found("Method not found"),
            RpcError::invalid_params("Invalid params"),
            RpcError::internal_error("Internal error"),
        ] {
            let rebuilt = registry.error_from_object(err.to_error_object());
            assert_eq!(rebuilt, err);
        }
    }

    #[test]
    fn internal_error_code() {
        assert_eq!(RpcError::internal_error("x").code(), taxonomy::INTERNAL_ERROR);
        assert_eq!(taxonomy::INTERNAL_ERROR, -32603);
        assert_ne!(taxonomy::INTERNAL_ERROR, taxonomy::INVALID_PARAMS);
    }

    #[test]
    fn reserved_band_collision() {
        let mut registry = ErrorRegistry::new();
        let err = registry
            .register_application_error(-32050, "Too busy", "BusyError")
            .unwrap_err();
        assert_eq!(err, RegistrationError::ReservedCode(-32050));
        assert_eq!(registry.resolve(-32050), ErrorKind::ReservedServerError);
    }

    #[test]
    fn registration_errors_convert() {
        let err: Error = ErrorRegistry::new()
            .with_application_error(-32768, "m", "E")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Registration(RegistrationError::ReservedCode(-32768))));
        assert_eq!(
            err.to_string(),
            "Registration error: code -32768 is inside the reserved range [-32768, -32000]"
        );
    }

    #[test]
    fn unregistered_application_code_is_preserved() {
        let registry = ErrorRegistry::new();
        let wire = types::Error::new(4004, "Not here", Some(json!({"path": "/vault"})));
        let err = registry.error_from_object(wire.clone());
        assert_eq!(err.kind(), &ErrorKind::Application { name: None });
        assert_eq!(err.kind().to_string(), "ApplicationError");
        assert_eq!(err.into_error_object(), wire);
    }

    #[test]
    fn registered_application_code() {
        let registry = ErrorRegistry::new()
            .with_application_error(1, "Default message", "MyAppError")
            .unwrap();
        let err = registry.error_from_object(types::Error::new(1, "Application error", None));
        assert_eq!(err.kind().to_string(), "MyAppError");
        assert_eq!(err.code(), 1);
        assert_eq!(err.message(), "Application error");
        assert!(err.kind().is_application());

        let names: Vec<&str> = registry.application_kinds().map(|k| k.name()).collect();
        assert_eq!(names, vec!["MyAppError"]);
    }

    #[test]
    fn reserved_without_meaning() {
        let err = RpcError::from_error_object(types::Error::new(-32300, "Odd", None));
        assert_eq!(err.kind(), &ErrorKind::ReservedError);
        assert_eq!(err.kind().default_message(), "Reserved error");
    }

    #[test]
    fn rpc_error_display() {
        let err = RpcError::parse_error("Parse error").with_data(json!({"foo": "bar"}));
        assert_eq!(
            err.to_string(),
            r#"ParseError<code=-32700, message="Parse error">"#
        );
        let err: Error = err.into();
        assert_eq!(err.as_rpc().map(RpcError::code), Some(-32700));
    }
}
