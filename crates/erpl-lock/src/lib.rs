// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lock/edit kernel: the LOCK/UNLOCK contract and a move-only lock guard
//! that releases on every exit path (§4.4).

use erpl_error::{Error, ErrorKind};
use erpl_session::AdtSession;
use erpl_types::CiHeaders;

const LOCK_RESULT_ACCEPT: &str = "application/*";

/// Acquire a lock on `uri`. 409/423 map to `LockConflict` via the
/// session's HTTP-status classification; a missing `LOCK_HANDLE` in an
/// otherwise-200 body is also `LockConflict` (§4.4, §4.2).
pub async fn lock_object(session: &AdtSession, uri: &str) -> Result<erpl_xml::LockResult, Error> {
    let path = format!("{uri}?_action=LOCK&accessMode=MODIFY");
    let mut headers = CiHeaders::new();
    headers.set("Accept", LOCK_RESULT_ACCEPT);

    let response = session.post(&path, None, None, &headers).await?;
    if response.status_code == 409 || response.status_code == 423 {
        return Err(Error::new("LockObject", uri, "object is already locked", ErrorKind::LockConflict)
            .with_status(response.status_code));
    }
    if !response.is_success() {
        return Err(Error::from_http_status(
            "LockObject",
            uri,
            response.status_code,
            &response.body,
            ErrorKind::LockConflict,
        ));
    }
    erpl_xml::parse_lock_response(&response.body, &response.headers, uri)
}

/// Release a lock previously obtained via [`lock_object`]. 200/204 are
/// both accepted terminal statuses (§4.4).
pub async fn unlock_object(session: &AdtSession, uri: &str, lock_handle: &str) -> Result<(), Error> {
    let path = format!("{uri}?_action=UNLOCK&lockHandle={lock_handle}");
    let response = session.post(&path, None, None, &CiHeaders::new()).await?;
    if response.status_code == 200 || response.status_code == 204 {
        Ok(())
    } else {
        Err(Error::from_http_status(
            "UnlockObject",
            uri,
            response.status_code,
            &response.body,
            ErrorKind::LockConflict,
        ))
    }
}

/// A scoped lock: acquiring sets the session stateful, acquiring the
/// lock; releasing (explicit or on drop) best-effort unlocks and clears
/// stateful mode.
///
/// The guard is move-only by ordinary Rust ownership. Because releasing
/// requires a network round trip, `Drop` cannot perform it — matching the
/// source design note that a finalizer-based release is unsound; callers
/// MUST call [`LockGuard::release`] on every exit path. `Drop` only warns
/// if that contract was not honored, so an early return or a `?` never
/// silently leaks a held lock without at least being logged.
pub struct LockGuard<'a> {
    session: &'a AdtSession,
    uri: String,
    lock_handle: Option<String>,
}

impl<'a> LockGuard<'a> {
    /// `SetStateful(true)` + `LockObject(uri)` (§4.4).
    pub async fn acquire(session: &'a AdtSession, uri: &str) -> Result<Self, Error> {
        session.set_stateful(true).await;
        let result = lock_object(session, uri).await;
        match result {
            Ok(lock) => Ok(Self { session, uri: uri.to_string(), lock_handle: Some(lock.lock_handle) }),
            Err(e) => {
                session.set_stateful(false).await;
                Err(e)
            }
        }
    }

    pub fn lock_handle(&self) -> &str {
        self.lock_handle.as_deref().expect("lock guard already released")
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Best-effort `UnlockObject` + `SetStateful(false)`. Consumes the
    /// guard so a second release is a compile error, not a runtime one.
    pub async fn release(mut self) -> Result<(), Error> {
        self.release_inner().await
    }

    async fn release_inner(&mut self) -> Result<(), Error> {
        let Some(handle) = self.lock_handle.take() else {
            return Ok(());
        };
        let result = unlock_object(self.session, &self.uri, &handle).await;
        self.session.set_stateful(false).await;
        result
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if self.lock_handle.is_some() {
            tracing::warn!(
                uri = %self.uri,
                "lock guard dropped without release; server-side lock may still be held"
            );
        }
    }
}

/// Derive the object URI a `.../source/main` source URI belongs to, by
/// stripping the trailing `/source/...` segment (§4.4).
pub fn object_uri_from_source(source_uri: &str) -> &str {
    source_uri.find("/source/").map(|idx| &source_uri[..idx]).unwrap_or(source_uri)
}

/// Write `content` to `source_uri`. When `lock_handle` is `None`, the
/// object URI is derived and a lock is acquired and released around the
/// write (auto-lock write, §4.4) — the unlock MUST run even if the write
/// itself fails.
pub async fn write_source_with_auto_lock(
    session: &AdtSession,
    source_uri: &str,
    content: &str,
    lock_handle: Option<&str>,
    transport: Option<&str>,
) -> Result<String, Error> {
    match lock_handle {
        Some(handle) => {
            put_source(session, source_uri, content, handle, transport).await?;
            Ok(object_uri_from_source(source_uri).to_string())
        }
        None => {
            let object_uri = object_uri_from_source(source_uri).to_string();
            let guard = LockGuard::acquire(session, &object_uri).await?;
            let handle = guard.lock_handle().to_string();
            let write_result = put_source(session, source_uri, content, &handle, transport).await;
            let release_result = guard.release().await;
            write_result?;
            release_result?;
            Ok(object_uri)
        }
    }
}

async fn put_source(
    session: &AdtSession,
    source_uri: &str,
    content: &str,
    lock_handle: &str,
    transport: Option<&str>,
) -> Result<(), Error> {
    let mut path = format!("{source_uri}?lockHandle={lock_handle}");
    if let Some(transport) = transport {
        path.push_str(&format!("&corrNr={transport}"));
    }
    let response = session.put(&path, Some(content), Some("text/plain"), &CiHeaders::new()).await?;
    if response.status_code == 200 || response.status_code == 204 {
        Ok(())
    } else {
        Err(Error::from_http_status(
            "WriteSource",
            source_uri,
            response.status_code,
            &response.body,
            ErrorKind::Internal,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_object_uri_from_source_main() {
        assert_eq!(
            object_uri_from_source("/sap/bc/adt/oo/classes/zcl_test/source/main"),
            "/sap/bc/adt/oo/classes/zcl_test"
        );
    }

    #[test]
    fn leaves_non_source_uri_unchanged() {
        assert_eq!(object_uri_from_source("/sap/bc/adt/oo/classes/zcl_test"), "/sap/bc/adt/oo/classes/zcl_test");
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use erpl_session::SessionConfig;
    use erpl_types::SapClient;
    use std::time::Duration;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> AdtSession {
        let authority = server.uri().trim_start_matches("http://").to_string();
        let (host, port) = authority.split_once(':').unwrap();
        let mut config = SessionConfig::new(host.to_string(), port.parse().unwrap(), false, SapClient::parse("100").unwrap());
        config.poll_interval = Duration::from_millis(5);
        AdtSession::new(config).unwrap()
    }

    #[tokio::test]
    async fn write_with_mid_failure_still_unlocks_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/sap/bc/adt/discovery$"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "tok"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/sap/bc/adt/oo/classes/zcl_test$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<DATA><LOCK_HANDLE>lock_handle_abc123</LOCK_HANDLE></DATA>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/sap/bc/adt/oo/classes/zcl_test/source/main$"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let result =
            write_source_with_auto_lock(&session, "/sap/bc/adt/oo/classes/zcl_test/source/main", "X", None, None)
                .await;
        assert!(result.is_err());
        assert!(!session.is_stateful().await);

        let requests = server.received_requests().await.unwrap();
        let lock_posts = requests
            .iter()
            .filter(|r| r.url.path() == "/sap/bc/adt/oo/classes/zcl_test" && r.url.query().unwrap_or("").contains("_action=LOCK"))
            .count();
        let unlock_posts = requests
            .iter()
            .filter(|r| r.url.path() == "/sap/bc/adt/oo/classes/zcl_test" && r.url.query().unwrap_or("").contains("_action=UNLOCK"))
            .count();
        assert_eq!(lock_posts, 1);
        assert_eq!(unlock_posts, 1);
    }
}
