// SPDX-License-Identifier: MIT OR Apache-2.0
//! erpl-error
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Unified error taxonomy for the ADT/BW client. Every fallible operation in
//! this workspace returns `Result<T, Error>` — no exception-like control
//! flow crosses a module boundary. [`ErrorKind`] is a closed set with a
//! stable mapping to a process exit code (§6.4 of the specification).

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of error kinds a client operation can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport-level failure (DNS, TCP, TLS).
    Connection,
    /// Authentication rejected persistently (after the single CSRF retry).
    Authentication,
    /// CSRF token could not be obtained or kept failing after retry.
    CsrfToken,
    /// Requested resource does not exist.
    NotFound,
    /// ABAP package-related failure.
    PackageError,
    /// abapGit clone failed.
    CloneError,
    /// abapGit pull failed.
    PullError,
    /// Activation (ABAP or BW) failed.
    ActivationError,
    /// Lock could not be acquired (409/423).
    LockConflict,
    /// ABAP Unit test run reported failures.
    TestFailure,
    /// ATC check run reported findings.
    CheckError,
    /// Transport management operation failed.
    TransportError,
    /// An async operation did not complete within its deadline.
    Timeout,
    /// Anything else, including BW-modeling failures that cannot be placed
    /// in a more specific kind.
    Internal,
}

impl ErrorKind {
    /// The stable process exit code for this error kind (§6.4).
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Connection | ErrorKind::Authentication | ErrorKind::CsrfToken => 1,
            ErrorKind::NotFound | ErrorKind::PackageError => 2,
            ErrorKind::CloneError => 3,
            ErrorKind::PullError => 4,
            ErrorKind::ActivationError => 5,
            ErrorKind::LockConflict => 6,
            ErrorKind::TestFailure => 7,
            ErrorKind::CheckError => 8,
            ErrorKind::TransportError => 9,
            ErrorKind::Timeout => 10,
            ErrorKind::Internal => 99,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Authentication => "authentication",
            ErrorKind::CsrfToken => "csrf_token",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PackageError => "package_error",
            ErrorKind::CloneError => "clone_error",
            ErrorKind::PullError => "pull_error",
            ErrorKind::ActivationError => "activation_error",
            ErrorKind::LockConflict => "lock_conflict",
            ErrorKind::TestFailure => "test_failure",
            ErrorKind::CheckError => "check_error",
            ErrorKind::TransportError => "transport_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A single structured error, carrying everything §3/§7 require for
/// diagnostics and for the stable human/JSON error rendering.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub struct Error {
    /// Symbolic operation name, e.g. `"CloneRepo"`.
    pub operation: String,
    /// The endpoint path involved, if any.
    pub endpoint: String,
    /// HTTP status code, if the failure came from an HTTP response.
    pub status: Option<u16>,
    /// Free-text diagnostic message.
    pub message: String,
    /// Short text extracted from the SAP response body, if present.
    pub sap_error: Option<String>,
    /// The error's kind (drives the exit code).
    pub kind: ErrorKind,
    /// Optional remediation hint (e.g. the list of Accept headers tried).
    pub hint: Option<String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {} [{}]", self.operation, self.endpoint)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(sap) = &self.sap_error {
            write!(f, " — SAP: {sap}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Construct a new error with the given operation, endpoint, message and kind.
    pub fn new(
        operation: impl Into<String>,
        endpoint: impl Into<String>,
        message: impl Into<String>,
        kind: ErrorKind,
    ) -> Self {
        Self {
            operation: operation.into(),
            endpoint: endpoint.into(),
            status: None,
            message: message.into(),
            sap_error: None,
            kind,
            hint: None,
        }
    }

    /// Attach an HTTP status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a SAP-extracted short error text.
    pub fn with_sap_error(mut self, sap_error: impl Into<String>) -> Self {
        self.sap_error = Some(sap_error.into());
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The stable process exit code for this error (§6.4).
    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    /// Map a non-2xx HTTP response to an `Error` using the operation-name
    /// dispatch table in §7: clone→CloneError, pull→PullError,
    /// activation→ActivationError, lock→LockConflict (409/423),
    /// timeouts→Timeout, everything else falls back to the caller-supplied
    /// default kind.
    pub fn from_http_status(
        operation: impl Into<String>,
        endpoint: impl Into<String>,
        status: u16,
        body: impl Into<String>,
        default_kind: ErrorKind,
    ) -> Self {
        let kind = match status {
            401 | 403 => ErrorKind::Authentication,
            404 => ErrorKind::NotFound,
            409 | 423 => ErrorKind::LockConflict,
            _ => default_kind,
        };
        Self::new(operation, endpoint, body, kind).with_status(status)
    }

    /// Render as the JSON object described in §7 (adds `exit_code`).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "operation": self.operation,
                "endpoint": self.endpoint,
                "status": self.status,
                "message": self.message,
                "sap_error": self.sap_error,
                "kind": self.kind,
                "hint": self.hint,
                "exit_code": self.exit_code(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_spec_table() {
        assert_eq!(ErrorKind::Connection.exit_code(), 1);
        assert_eq!(ErrorKind::Authentication.exit_code(), 1);
        assert_eq!(ErrorKind::CsrfToken.exit_code(), 1);
        assert_eq!(ErrorKind::NotFound.exit_code(), 2);
        assert_eq!(ErrorKind::PackageError.exit_code(), 2);
        assert_eq!(ErrorKind::CloneError.exit_code(), 3);
        assert_eq!(ErrorKind::PullError.exit_code(), 4);
        assert_eq!(ErrorKind::ActivationError.exit_code(), 5);
        assert_eq!(ErrorKind::LockConflict.exit_code(), 6);
        assert_eq!(ErrorKind::TestFailure.exit_code(), 7);
        assert_eq!(ErrorKind::CheckError.exit_code(), 8);
        assert_eq!(ErrorKind::TransportError.exit_code(), 9);
        assert_eq!(ErrorKind::Timeout.exit_code(), 10);
        assert_eq!(ErrorKind::Internal.exit_code(), 99);
    }

    #[test]
    fn lock_conflict_on_409_and_423() {
        let e = Error::from_http_status("LockObject", "/x", 409, "", ErrorKind::Internal);
        assert_eq!(e.kind, ErrorKind::LockConflict);
        let e = Error::from_http_status("LockObject", "/x", 423, "", ErrorKind::Internal);
        assert_eq!(e.kind, ErrorKind::LockConflict);
    }

    #[test]
    fn display_format_matches_spec() {
        let e = Error::new("Activate", "/sap/bc/adt/activation", "boom", ErrorKind::ActivationError)
            .with_status(500)
            .with_sap_error("Object X could not be activated");
        let rendered = e.to_string();
        assert!(rendered.starts_with("Error: Activate [/sap/bc/adt/activation] (HTTP 500): boom"));
        assert!(rendered.ends_with("— SAP: Object X could not be activated"));
    }
}
