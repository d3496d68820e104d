// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stateful ADT HTTP session: CSRF handling, cookie jar, and the single
//! retry-once-on-403 contract every verb shares (§4.1).

use std::path::Path;
use std::time::{Duration, Instant};

use erpl_error::{Error, ErrorKind};
use erpl_types::{CiHeaders, HttpResponse, SapClient};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::poll::PollResult;
use crate::state::SessionState;

const REDACTED: &str = "<redacted>";
const REDACTED_HEADERS: &[&str] = &["cookie", "authorization", "sap-contextid", "x-csrf-token"];
const BODY_LOG_LIMIT: usize = 2048;

/// HTTP verbs the session issues. `PollGet` is the no-body GET the poller
/// uses to avoid re-triggering the CSRF-fetch contract on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

/// A stateful session mediating all HTTP calls to one SAP server.
pub struct AdtSession {
    client: reqwest::Client,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl AdtSession {
    pub fn new(config: SessionConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|e| Error::new("NewSession", config.base_url(), e.to_string(), ErrorKind::Connection))?;
        Ok(Self { client, config, state: Mutex::new(SessionState::default()) })
    }

    pub fn sap_client(&self) -> &SapClient {
        &self.config.sap_client
    }

    pub async fn is_stateful(&self) -> bool {
        self.state.lock().await.stateful
    }

    /// Enable or disable stateful mode. Disabling clears the captured
    /// context id (§4.1).
    pub async fn set_stateful(&self, on: bool) {
        let mut state = self.state.lock().await;
        state.stateful = on;
        if !on {
            state.context_id = None;
        }
    }

    pub async fn save_session(&self, path: &Path) -> Result<(), Error> {
        self.state.lock().await.save(path)
    }

    pub async fn load_session(&self, path: &Path) -> Result<(), Error> {
        let loaded = SessionState::load(path)?;
        *self.state.lock().await = loaded;
        Ok(())
    }

    /// `GET /sap/bc/adt/discovery` with `x-csrf-token: fetch`; captures the
    /// token, cookies, and context id from the response (§4.1).
    pub async fn fetch_csrf_token(&self) -> Result<(), Error> {
        let url = format!("{}/sap/bc/adt/discovery", self.config.base_url());
        let mut headers = CiHeaders::new();
        headers.set("x-csrf-token", "fetch");

        let built = self.build_headers(&headers).await;
        info!(method = "GET", path = "/sap/bc/adt/discovery", "fetching csrf token");
        self.log_request_headers(&built);

        let response = self
            .execute_raw(Verb::Get, &url, None, None, &built)
            .await
            .map_err(|e| Error::new("FetchCsrfToken", url.clone(), e.to_string(), ErrorKind::Connection))?;

        let parsed = to_http_response(response).await?;
        self.capture_response(&parsed).await;

        let token = parsed.headers.get("x-csrf-token").map(str::to_string);
        match token {
            Some(token) if parsed.is_success() => {
                self.state.lock().await.csrf_token = Some(token);
                Ok(())
            }
            _ => Err(Error::new(
                "FetchCsrfToken",
                url,
                "server did not return an x-csrf-token header",
                ErrorKind::CsrfToken,
            )
            .with_status(parsed.status_code)),
        }
    }

    pub async fn get(&self, path: &str, extra_headers: &CiHeaders) -> Result<HttpResponse, Error> {
        self.request(Verb::Get, path, None, None, extra_headers).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Option<&str>,
        content_type: Option<&str>,
        extra_headers: &CiHeaders,
    ) -> Result<HttpResponse, Error> {
        self.ensure_csrf().await?;
        self.request(Verb::Post, path, body, content_type, extra_headers).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Option<&str>,
        content_type: Option<&str>,
        extra_headers: &CiHeaders,
    ) -> Result<HttpResponse, Error> {
        self.ensure_csrf().await?;
        self.request(Verb::Put, path, body, content_type, extra_headers).await
    }

    pub async fn delete(&self, path: &str, extra_headers: &CiHeaders) -> Result<HttpResponse, Error> {
        self.ensure_csrf().await?;
        self.request(Verb::Delete, path, None, None, extra_headers).await
    }

    /// `GET` a BW query component with Accept-header fallback (§4.2): try
    /// the primary vendor media type for `component_type`, then one minor
    /// version down, then plain `application/xml`. A 415 response means
    /// "retry with the next Accept"; exhausting all three yields an
    /// `Internal` error whose hint lists every Accept tried.
    pub async fn get_bw_component(&self, path: &str, component_type: &str) -> Result<HttpResponse, Error> {
        let kind = component_type.to_ascii_lowercase();
        let accepts = [
            format!("application/vnd.sap.bw.modeling.{kind}-v1_10_0+xml"),
            format!("application/vnd.sap.bw.modeling.{kind}-v1_9_0+xml"),
            "application/xml".to_string(),
        ];
        let mut tried = Vec::with_capacity(accepts.len());
        let mut last = None;
        for accept in &accepts {
            let mut headers = CiHeaders::new();
            headers.set("Accept", accept.clone());
            let response = self.get(path, &headers).await?;
            tried.push(accept.clone());
            if response.status_code != 415 {
                return Ok(response);
            }
            last = Some(response);
        }
        Err(Error::new(
            "GetQueryComponent",
            path,
            "server returned 415 for every Accept media type tried",
            ErrorKind::Internal,
        )
        .with_status(last.map(|r| r.status_code).unwrap_or(415))
        .with_hint(format!("Accept types tried: {}", tried.join(", "))))
    }

    async fn ensure_csrf(&self) -> Result<(), Error> {
        let missing = self.state.lock().await.csrf_token.is_none();
        if missing {
            self.fetch_csrf_token().await?;
        }
        Ok(())
    }

    /// Issue one request, auto-retrying exactly once on 403 after
    /// re-fetching the CSRF token (§4.1, §8 invariant).
    async fn request(
        &self,
        verb: Verb,
        path: &str,
        body: Option<&str>,
        content_type: Option<&str>,
        extra_headers: &CiHeaders,
    ) -> Result<HttpResponse, Error> {
        let url = format!("{}{path}", self.config.base_url());
        let response = self.attempt(verb, &url, body, content_type, extra_headers).await?;

        if response.status_code == 403 {
            warn!(method = verb.as_str(), path, "got 403, re-fetching csrf token and retrying once");
            self.fetch_csrf_token().await?;
            let retried = self.attempt(verb, &url, body, content_type, extra_headers).await?;
            if retried.status_code == 403 {
                return Err(Error::new(
                    "Request",
                    url,
                    "persistent 403 after csrf retry",
                    ErrorKind::Authentication,
                )
                .with_status(403));
            }
            return Ok(retried);
        }
        Ok(response)
    }

    async fn attempt(
        &self,
        verb: Verb,
        url: &str,
        body: Option<&str>,
        content_type: Option<&str>,
        extra_headers: &CiHeaders,
    ) -> Result<HttpResponse, Error> {
        let built = self.build_headers(extra_headers).await;
        info!(method = verb.as_str(), url, "sending request");
        self.log_request_headers(&built);

        let raw = self
            .execute_raw(verb, url, body, content_type, &built)
            .await
            .map_err(|e| classify_transport_error(verb, url, &e))?;
        let parsed = to_http_response(raw).await?;
        self.capture_response(&parsed).await;

        if parsed.status_code >= 400 {
            let truncated: String = parsed.body.chars().take(BODY_LOG_LIMIT).collect();
            debug!(status = parsed.status_code, body = %truncated, "error response body");
        }
        Ok(parsed)
    }

    async fn execute_raw(
        &self,
        verb: Verb,
        url: &str,
        body: Option<&str>,
        content_type: Option<&str>,
        headers: &CiHeaders,
    ) -> reqwest::Result<reqwest::Response> {
        let mut builder = match verb {
            Verb::Get => self.client.get(url),
            Verb::Post => self.client.post(url),
            Verb::Put => self.client.put(url),
            Verb::Delete => self.client.delete(url),
        };
        if let Some(creds) = &self.config.credentials {
            builder = builder.basic_auth(&creds.username, Some(&creds.password));
        }
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(ct) = content_type {
            builder = builder.header("Content-Type", ct);
        }
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }
        builder.send().await
    }

    /// Build the standard header set (§4.1): `sap-client`,
    /// `Accept-Language`, known CSRF token, accumulated cookies (sorted
    /// by name), session-type iff stateful, then caller extras override
    /// built-ins on duplicate keys.
    async fn build_headers(&self, extra: &CiHeaders) -> CiHeaders {
        let state = self.state.lock().await;
        let mut headers = CiHeaders::new();
        headers.set("sap-client", self.config.sap_client.as_str());
        headers.set("Accept-Language", "en");
        if let Some(token) = &state.csrf_token {
            headers.set("x-csrf-token", token.clone());
        }
        if !state.cookies.is_empty() {
            let mut names: Vec<&String> = state.cookies.keys().collect();
            names.sort();
            let cookie_header = names
                .iter()
                .map(|n| format!("{n}={}", state.cookies[*n]))
                .collect::<Vec<_>>()
                .join("; ");
            headers.set("Cookie", cookie_header);
        }
        if state.stateful {
            headers.set("X-sap-adt-sessiontype", "stateful");
        }
        drop(state);
        for (name, value) in extra.iter() {
            headers.set(name, value.to_string());
        }
        headers
    }

    fn log_request_headers(&self, headers: &CiHeaders) {
        for (name, value) in headers.iter() {
            let shown = if REDACTED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                REDACTED
            } else {
                value
            };
            debug!(header = name, value = shown, "outgoing header");
        }
    }

    /// Capture `Set-Cookie` (name/value before the first `;`, later
    /// overriding earlier) and `sap-contextid` iff stateful (§4.1).
    async fn capture_response(&self, response: &HttpResponse) {
        let mut state = self.state.lock().await;
        for value in response.headers.get_all("Set-Cookie") {
            if let Some((name, rest)) = value.split_once('=') {
                let value = rest.split(';').next().unwrap_or("").to_string();
                state.cookies.insert(name.trim().to_string(), value);
            }
        }
        if state.stateful {
            if let Some(ctx) = response.headers.get("sap-contextid") {
                state.context_id = Some(ctx.to_string());
            }
        }
    }

    /// Poll `location` at `poll_interval` until it returns a terminal
    /// status or `timeout` elapses (§4.3). A deadline reached while still
    /// seeing 202 is surfaced as `Timeout`, never as a value.
    pub async fn poll_until_complete(&self, location: &str, timeout: Duration) -> Result<PollResult, Error> {
        let url = if location.starts_with("http") {
            location.to_string()
        } else {
            format!("{}{location}", self.config.base_url())
        };
        let deadline = Instant::now() + timeout;
        let empty = CiHeaders::new();

        loop {
            let response = self.get_raw(&url, &empty).await?;
            match response.status_code {
                200 => return Ok(PollResult::Completed(response.body)),
                202 => {
                    if Instant::now() >= deadline {
                        return Err(Error::new("PollUntilComplete", url, "poll deadline reached", ErrorKind::Timeout));
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                _ => return Ok(PollResult::Failed(response.body)),
            }
        }
    }

    /// Plain GET bypassing the session's path-prefixing, used by the
    /// poller since `location` is already a full or absolute URL.
    async fn get_raw(&self, url: &str, extra_headers: &CiHeaders) -> Result<HttpResponse, Error> {
        let built = self.build_headers(extra_headers).await;
        let raw = self
            .execute_raw(Verb::Get, url, None, None, &built)
            .await
            .map_err(|e| classify_transport_error(Verb::Get, url, &e))?;
        let parsed = to_http_response(raw).await?;
        self.capture_response(&parsed).await;
        Ok(parsed)
    }
}

fn classify_transport_error(verb: Verb, url: &str, e: &reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::new("Request", url, e.to_string(), ErrorKind::Timeout)
    } else {
        Error::new(verb.as_str(), url, e.to_string(), ErrorKind::Connection)
    }
}

async fn to_http_response(response: reqwest::Response) -> Result<HttpResponse, Error> {
    let status_code = response.status().as_u16();
    let mut headers = CiHeaders::new();
    for (name, value) in response.headers().iter() {
        if let Ok(value) = value.to_str() {
            headers.append(name.as_str(), value);
        }
    }
    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| Error::new("ReadBody", url, e.to_string(), ErrorKind::Connection))?;
    Ok(HttpResponse { status_code, headers, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> AdtSession {
        let authority = server.uri().trim_start_matches("http://").to_string();
        let (host, port) = authority.split_once(':').unwrap();
        let mut config = SessionConfig::new(host.to_string(), port.parse().unwrap(), false, SapClient::parse("100").unwrap());
        config.poll_interval = Duration::from_millis(5);
        AdtSession::new(config).unwrap()
    }

    #[tokio::test]
    async fn fetch_csrf_token_captures_header_and_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/discovery"))
            .and(header("x-csrf-token", "fetch"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-csrf-token", "tok-abc")
                    .insert_header("Set-Cookie", "sap-usercontext=sap-client=100; path=/"),
            )
            .mount(&server)
            .await;

        let session = session_for(&server);
        session.fetch_csrf_token().await.unwrap();
        let state = session.state.lock().await;
        assert_eq!(state.csrf_token.as_deref(), Some("tok-abc"));
        assert_eq!(state.cookies.get("sap-usercontext").map(String::as_str), Some("sap-client=100"));
    }

    #[tokio::test]
    async fn retries_once_on_403_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/discovery"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "tok-1"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/x"))
            .and(header("x-csrf-token", "tok-1"))
            .respond_with(ResponseTemplate::new(403))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/x"))
            .and(header("x-csrf-token", "tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/discovery"))
            .and(header("x-csrf-token", "fetch"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "tok-2"))
            .mount(&server)
            .await;

        let session = session_for(&server);
        session.fetch_csrf_token().await.unwrap();
        let response = session.get("/x", &CiHeaders::new()).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn poll_returns_timeout_when_deadline_reached_on_202() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/poll/1"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let result = session.poll_until_complete("/poll/1", Duration::from_millis(20)).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn poll_returns_completed_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/poll/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let result = session.poll_until_complete("/poll/2", Duration::from_secs(1)).await.unwrap();
        assert_eq!(result, PollResult::Completed("done".to_string()));
    }

    #[tokio::test]
    async fn bw_component_accept_fallback_retries_415_down_to_plain_xml() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sap/bw/modeling/query/zvar_fiscyear/a"))
            .and(header("Accept", "application/vnd.sap.bw.modeling.variable-v1_10_0+xml"))
            .respond_with(ResponseTemplate::new(415))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sap/bw/modeling/query/zvar_fiscyear/a"))
            .and(header("Accept", "application/vnd.sap.bw.modeling.variable-v1_9_0+xml"))
            .respond_with(ResponseTemplate::new(415))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sap/bw/modeling/query/zvar_fiscyear/a"))
            .and(header("Accept", "application/xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<variable component_type="VARIABLE"/>"#))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let response = session.get_bw_component("/sap/bw/modeling/query/zvar_fiscyear/a", "variable").await.unwrap();
        assert_eq!(response.status_code, 200);
        assert!(response.body.contains(r#"component_type="VARIABLE""#));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn bw_component_accept_fallback_errors_with_hint_when_all_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sap/bw/modeling/query/zvar_fiscyear/a"))
            .respond_with(ResponseTemplate::new(415))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let err = session.get_bw_component("/sap/bw/modeling/query/zvar_fiscyear/a", "variable").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.status, Some(415));
        let hint = err.hint.unwrap();
        assert!(hint.contains("v1_10_0"));
        assert!(hint.contains("v1_9_0"));
        assert!(hint.contains("application/xml"));
    }
}
