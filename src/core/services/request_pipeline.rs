use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::errors::{Result, VerseError};
use crate::core::models::request::{HttpResponse, OutboundRequest};
use crate::core::traits::navigator::Navigator;
use crate::core::traits::session::SessionProvider;
use crate::core::traits::transport::Transport;

/// Where the user is sent when the backend rejects the session.
pub const LOGIN_PATH: &str = "/login";

const AUTHORIZATION: &str = "Authorization";

/// Single gateway for every backend call.
///
/// Adds the bearer credential when one is stored, forwards the request
/// once, and reacts to a 401 by erasing the credential and redirecting to
/// [`LOGIN_PATH`]. The caller still receives the failure.
pub struct RequestPipeline<T: Transport> {
    transport: T,
    session: Arc<dyn SessionProvider>,
    navigator: Arc<dyn Navigator>,
    /// Set once the current session's expiry has been handled, so that a
    /// burst of 401s produces one redirect. Cleared by `establish_session`.
    expiry_handled: AtomicBool,
}

impl<T: Transport> RequestPipeline<T> {
    pub fn new(
        transport: T,
        session: Arc<dyn SessionProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            expiry_handled: AtomicBool::new(false),
        }
    }

    /// Send `request` and classify the outcome.
    ///
    /// - status below 400: the response, untouched
    /// - 401: `SessionExpired`, after erasing the credential and redirecting
    /// - other 4xx/5xx: `HttpStatus`
    /// - no response at all: the transport's error
    pub async fn send(&self, mut request: OutboundRequest) -> Result<HttpResponse> {
        if let Some(token) = self.session.credential() {
            request.set_header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.call(request).await?;

        if response.is_unauthorized() {
            let erase_error = self.expire_session();
            return Err(VerseError::SessionExpired {
                method: method.to_string(),
                path,
                erase_error,
            });
        }

        if !response.is_success() {
            return Err(VerseError::HttpStatus {
                method: method.to_string(),
                path,
                status: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }

    /// Erase the credential and redirect once. Returns the erase failure,
    /// if any, so the caller can surface it.
    fn expire_session(&self) -> Option<String> {
        let erase_error = self.session.clear().err().map(|e| e.to_string());
        if !self.expiry_handled.swap(true, Ordering::SeqCst) {
            self.navigator.redirect_to(LOGIN_PATH);
        }
        erase_error
    }

    /// Store a credential obtained from a successful login.
    pub fn establish_session(&self, token: &str) -> Result<()> {
        self.session.store(token)?;
        self.expiry_handled.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Explicit logout.
    pub fn end_session(&self) -> Result<()> {
        self.session.clear()
    }

    /// Whether a credential is currently stored. Used as the guard for
    /// commands that need a session.
    pub fn has_session(&self) -> bool {
        self.session.credential().is_some()
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::request::Method;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct MemorySession {
        token: Mutex<Option<String>>,
        read_only: bool,
    }

    impl MemorySession {
        fn with_token(token: &str) -> Self {
            Self {
                token: Mutex::new(Some(token.to_string())),
                read_only: false,
            }
        }

        fn read_only(token: &str) -> Self {
            Self {
                read_only: true,
                ..Self::with_token(token)
            }
        }
    }

    impl SessionProvider for MemorySession {
        fn credential(&self) -> Option<String> {
            self.token.lock().unwrap().clone()
        }

        fn store(&self, token: &str) -> Result<()> {
            *self.token.lock().unwrap() = Some(token.to_string());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            if self.read_only {
                return Err(VerseError::Storage {
                    key: "token".into(),
                    detail: "remove failed: permission denied".into(),
                });
            }
            *self.token.lock().unwrap() = None;
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingNavigator {
        redirects: AtomicUsize,
        last: Mutex<Option<String>>,
    }

    impl Navigator for CountingNavigator {
        fn redirect_to(&self, path: &str) {
            self.redirects.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(path.to_string());
        }
    }

    /// Replies with a fixed status and records every request it sees.
    struct ScriptedTransport {
        status: u16,
        seen: Mutex<Vec<OutboundRequest>>,
        fail: bool,
    }

    impl ScriptedTransport {
        fn replying(status: u16) -> Self {
            Self {
                status,
                seen: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn unreachable() -> Self {
            Self {
                status: 0,
                seen: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    impl Transport for ScriptedTransport {
        async fn call(&self, request: OutboundRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            tokio::task::yield_now().await;
            if self.fail {
                return Err(VerseError::Transport {
                    reason: "connection refused".into(),
                });
            }
            Ok(HttpResponse::new(self.status, "{\"code\":200}"))
        }
    }

    fn pipeline(
        transport: ScriptedTransport,
        session: MemorySession,
    ) -> (
        RequestPipeline<ScriptedTransport>,
        Arc<MemorySession>,
        Arc<CountingNavigator>,
    ) {
        let session = Arc::new(session);
        let navigator = Arc::new(CountingNavigator::default());
        let pipeline = RequestPipeline::new(transport, session.clone(), navigator.clone());
        (pipeline, session, navigator)
    }

    #[tokio::test]
    async fn injects_bearer_token_when_present() {
        let (p, _, _) = pipeline(ScriptedTransport::replying(200), MemorySession::with_token("T"));

        p.send(OutboundRequest::get("/auth/me")).await.unwrap();

        let seen = p.transport.seen.lock().unwrap();
        assert_eq!(seen[0].header("authorization"), Some("Bearer T"));
    }

    #[tokio::test]
    async fn no_header_without_credential() {
        let (p, _, _) = pipeline(ScriptedTransport::replying(200), MemorySession::default());

        p.send(OutboundRequest::post("/auth/login")).await.unwrap();

        let seen = p.transport.seen.lock().unwrap();
        assert_eq!(seen[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn request_is_forwarded_unchanged_apart_from_auth() {
        let (p, _, _) = pipeline(ScriptedTransport::replying(200), MemorySession::with_token("T"));
        let body = serde_json::json!({"query": "明月", "top_k": 3});
        let request = OutboundRequest::post("/poetry/search")
            .with_body(body.clone())
            .with_header("X-Trace", "abc")
            .with_header("authorization", "Bearer stale");

        p.send(request).await.unwrap();

        let seen = p.transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].path, "/poetry/search");
        assert_eq!(seen[0].body, Some(body));
        assert_eq!(seen[0].header("x-trace"), Some("abc"));
        assert_eq!(seen[0].header("authorization"), Some("Bearer T"));
        assert_eq!(seen[0].headers.len(), 2);
    }

    #[tokio::test]
    async fn credential_is_reread_on_every_call() {
        let (p, session, _) = pipeline(ScriptedTransport::replying(200), MemorySession::default());

        p.send(OutboundRequest::get("/agent/1")).await.unwrap();
        session.store("fresh").unwrap();
        p.send(OutboundRequest::get("/agent/1")).await.unwrap();

        let seen = p.transport.seen.lock().unwrap();
        assert_eq!(seen[0].header("authorization"), None);
        assert_eq!(seen[1].header("authorization"), Some("Bearer fresh"));
    }

    #[tokio::test]
    async fn unauthorized_clears_credential_and_redirects() {
        let (p, session, nav) =
            pipeline(ScriptedTransport::replying(401), MemorySession::with_token("T"));

        let err = p.send(OutboundRequest::get("/auth/me")).await.unwrap_err();

        assert!(err.is_session_expired());
        assert!(session.credential().is_none());
        assert_eq!(nav.redirects.load(Ordering::SeqCst), 1);
        assert_eq!(nav.last.lock().unwrap().as_deref(), Some(LOGIN_PATH));
    }

    #[tokio::test]
    async fn failed_erase_is_reported_with_the_expiry() {
        let (p, session, nav) =
            pipeline(ScriptedTransport::replying(401), MemorySession::read_only("T"));

        let err = p.send(OutboundRequest::get("/auth/me")).await.unwrap_err();

        match &err {
            VerseError::SessionExpired { erase_error, .. } => {
                assert!(erase_error.as_deref().unwrap().contains("permission denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("could not be removed"));
        assert_eq!(session.credential().as_deref(), Some("T"));
        assert_eq!(nav.redirects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_erase_carries_no_error() {
        let (p, _, _) = pipeline(ScriptedTransport::replying(401), MemorySession::with_token("T"));

        let err = p.send(OutboundRequest::get("/auth/me")).await.unwrap_err();

        assert!(matches!(err, VerseError::SessionExpired { erase_error: None, .. }));
        assert!(err.to_string().contains("has been removed"));
    }

    #[tokio::test]
    async fn unauthorized_without_credential_still_redirects() {
        let (p, _, nav) = pipeline(ScriptedTransport::replying(401), MemorySession::default());

        assert!(p.send(OutboundRequest::get("/auth/me")).await.is_err());
        assert_eq!(nav.redirects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_unauthorized_redirects_once() {
        let (p, session, nav) =
            pipeline(ScriptedTransport::replying(401), MemorySession::with_token("T"));

        let (a, b, c) = tokio::join!(
            p.send(OutboundRequest::get("/auth/me")),
            p.send(OutboundRequest::post("/agent/list")),
            p.send(OutboundRequest::get("/message/9")),
        );

        assert!(a.unwrap_err().is_session_expired());
        assert!(b.unwrap_err().is_session_expired());
        assert!(c.unwrap_err().is_session_expired());
        assert!(session.credential().is_none());
        assert_eq!(nav.redirects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn new_session_rearms_the_redirect() {
        let (p, _, nav) = pipeline(ScriptedTransport::replying(401), MemorySession::with_token("T"));

        let _ = p.send(OutboundRequest::get("/auth/me")).await;
        p.establish_session("T2").unwrap();
        let _ = p.send(OutboundRequest::get("/auth/me")).await;

        assert_eq!(nav.redirects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_failures_propagate_without_side_effects() {
        let (p, session, nav) =
            pipeline(ScriptedTransport::replying(500), MemorySession::with_token("T"));

        let err = p.send(OutboundRequest::get("/agent/1")).await.unwrap_err();

        assert!(matches!(err, VerseError::HttpStatus { status: 500, .. }));
        assert_eq!(session.credential().as_deref(), Some("T"));
        assert_eq!(nav.redirects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn forbidden_is_not_session_expiry() {
        let (p, session, nav) =
            pipeline(ScriptedTransport::replying(403), MemorySession::with_token("T"));

        let err = p.send(OutboundRequest::get("/agent/1")).await.unwrap_err();

        assert!(matches!(err, VerseError::HttpStatus { status: 403, .. }));
        assert!(session.credential().is_some());
        assert_eq!(nav.redirects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_errors_are_not_retried() {
        let (p, session, _) = pipeline(ScriptedTransport::unreachable(), MemorySession::with_token("T"));

        let err = p.send(OutboundRequest::get("/agent/1")).await.unwrap_err();

        assert!(matches!(err, VerseError::Transport { .. }));
        assert_eq!(p.transport.seen.lock().unwrap().len(), 1);
        assert!(session.credential().is_some());
    }

    #[tokio::test]
    async fn session_helpers() {
        let (p, _, _) = pipeline(ScriptedTransport::replying(200), MemorySession::default());
        assert!(!p.has_session());
        p.establish_session("abc").unwrap();
        assert!(p.has_session());
        p.end_session().unwrap();
        assert!(!p.has_session());
    }
}
