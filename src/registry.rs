//! Registration table for application-defined error kinds.
//!
//! The protocol fixes the meaning of the reserved band; everything else is
//! up to the application. Applications describe their own kinds once, at
//! start-up, and share the resulting [`ErrorRegistry`] (usually behind an
//! `Arc`) with every peer that needs to turn wire errors back into typed
//! errors.
//!
//! ```
//! use sansio_json_rpc::{ErrorKind, ErrorRegistry, types};
//!
//! let registry = ErrorRegistry::new()
//!     .with_application_error(1, "Vault is locked", "VaultLockedError")?;
//!
//! assert_eq!(
//!     registry.resolve(1),
//!     ErrorKind::Application { name: Some("VaultLockedError".to_string()) }
//! );
//!
//! let err = registry.error_from_object(types::Error::new(1, "Try later", None));
//! assert_eq!(err.kind().to_string(), "VaultLockedError");
//! # Ok::<(), sansio_json_rpc::RegistrationError>(())
//! ```

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::error::RegistrationError;
use crate::taxonomy::{self, ErrorKind, RpcError};
use crate::types;

/// A registered application error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationKind {
    code: i64,
    message: String,
    name: String,
}

impl ApplicationKind {
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Default message used when an error of this kind is raised without one.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The kind identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Application {
            name: Some(self.name.clone()),
        }
    }
}

/// Code to kind lookup table.
///
/// Standard and reserved codes are always resolved by the fixed protocol
/// table; only codes outside the reserved band can be registered.
#[derive(Debug, Clone, Default)]
pub struct ErrorRegistry {
    application: BTreeMap<i64, ApplicationKind>,
}

impl ErrorRegistry {
    /// Create a registry with no application kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application error kind.
    ///
    /// Fails when `code` is inside `-32768..=-32000` or already registered.
    pub fn register_application_error(
        &mut self,
        code: i64,
        message: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<&ApplicationKind, RegistrationError> {
        if taxonomy::is_reserved(code) {
            return Err(RegistrationError::ReservedCode(code));
        }
        if let Some(existing) = self.application.get(&code) {
            return Err(RegistrationError::DuplicateCode {
                code,
                existing: existing.name.clone(),
            });
        }

        let kind = ApplicationKind {
            code,
            message: message.into(),
            name: name.into(),
        };
        debug!(code, name = %kind.name, "registered application error kind");
        Ok(self.application.entry(code).or_insert(kind))
    }

    /// Builder form of [`register_application_error`](Self::register_application_error).
    pub fn with_application_error(
        mut self,
        code: i64,
        message: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, RegistrationError> {
        self.register_application_error(code, message, name)?;
        Ok(self)
    }

    /// Look up the best-fit kind for `code`. Never fails.
    pub fn resolve(&self, code: i64) -> ErrorKind {
        match self.application.get(&code) {
            Some(kind) => kind.kind(),
            None => ErrorKind::standard(code),
        }
    }

    /// The registration for `code`, if any.
    pub fn get(&self, code: i64) -> Option<&ApplicationKind> {
        self.application.get(&code)
    }

    /// Registered application kinds, ordered by code.
    pub fn application_kinds(&self) -> impl Iterator<Item = &ApplicationKind> {
        self.application.values()
    }

    /// Rebuild a typed error from a wire error triple.
    ///
    /// Code, message and data are preserved exactly; unregistered application
    /// codes come back as the generic application kind.
    pub fn error_from_object(&self, error: types::Error) -> RpcError {
        RpcError::with_kind(self.resolve(error.code), error)
    }

    /// Raise a registered application error.
    ///
    /// Without a `message` the registered default is used. Unregistered codes
    /// produce the generic application kind with the generic default message.
    pub fn application_error(
        &self,
        code: i64,
        message: Option<String>,
        data: Option<Value>,
    ) -> RpcError {
        let kind = self.resolve(code);
        let message = message.unwrap_or_else(|| match self.application.get(&code) {
            Some(registered) => registered.message.clone(),
            None => kind.default_message().to_string(),
        });
        RpcError::with_kind(kind, types::Error::new(code, message, data))
    }
}
