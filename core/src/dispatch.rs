//! Async request dispatch.
//!
//! # Design
//! `Dispatcher` drives one logical call: build the request, execute it
//! through a `Transport`, classify the response and, for paginated calls,
//! follow `Links.Next` until the cursor converges. The page loop is a
//! `Stream` built with `futures::stream::unfold`, so a call that never
//! converges is bounded by the cursor and not by stack depth.
//!
//! The response handler is captured once from the builder before the first
//! request; every page decodes against the same resource and count flag.
//! The access token is read from the `TokenStore` before every request.

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use once_cell::sync::OnceCell;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn, Instrument, Span};

use crate::auth::TokenStore;
use crate::builder::EndpointBuilder;
use crate::error::ApiError;
use crate::http::{BodyEncoding, HeaderContext};
use crate::pagination::{Cursor, PageStep};
use crate::response::{Handled, Payload, ResponseHandler};
use crate::transport::Transport;

static DEFAULT_RUNTIME: OnceCell<Runtime> = OnceCell::new();

#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    languages: Vec<String>,
    handle: Option<Handle>,
}

enum PageState {
    Fetch {
        builder: EndpointBuilder,
        cursor: Cursor,
    },
    Complete,
    Done,
}

struct Pager {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    languages: Vec<String>,
    encoding: BodyEncoding,
    handler: ResponseHandler,
    state: PageState,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            transport,
            tokens,
            languages,
            handle: None,
        }
    }

    /// Spawn `run` tasks on this runtime instead of the ambient or default one.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Payloads of one logical call, in order. The stream ends after the
    /// first error, after a single non-paginated payload, or after
    /// `PaginationComplete`.
    pub fn pages(
        &self,
        builder: EndpointBuilder,
        encoding: BodyEncoding,
    ) -> impl Stream<Item = Result<Payload, ApiError>> + Send + 'static {
        let pager = Pager {
            transport: Arc::clone(&self.transport),
            tokens: Arc::clone(&self.tokens),
            languages: self.languages.clone(),
            encoding,
            handler: ResponseHandler::for_request(&builder),
            state: PageState::Fetch {
                builder,
                cursor: Cursor::new(),
            },
        };
        stream::unfold(pager, Pager::next_item)
    }

    /// Run the whole call and gather its payloads, stopping at the first error.
    #[instrument(skip_all, fields(resource = %builder.active_resource()))]
    pub async fn collect(
        &self,
        builder: EndpointBuilder,
        encoding: BodyEncoding,
    ) -> Result<Vec<Payload>, ApiError> {
        self.pages(builder, encoding).try_collect().await
    }

    /// Run the call in the background. `on_payload` sees every payload in
    /// order; `on_failure` fires at most once and ends the call.
    #[instrument(skip_all, fields(resource = %builder.active_resource()))]
    pub fn run<P, F>(
        &self,
        builder: EndpointBuilder,
        encoding: BodyEncoding,
        mut on_payload: P,
        on_failure: F,
    ) -> Result<JoinHandle<()>, ApiError>
    where
        P: FnMut(Payload) + Send + 'static,
        F: FnOnce(ApiError) + Send + 'static,
    {
        let handle = self.runtime_handle()?;
        let pages = self.pages(builder, encoding);
        let call = async move {
            futures::pin_mut!(pages);
            while let Some(item) = pages.next().await {
                match item {
                    Ok(payload) => on_payload(payload),
                    Err(err) => {
                        warn!(error = %err, "request failed");
                        return on_failure(err);
                    }
                }
            }
        };
        Ok(handle.spawn(call.instrument(Span::current())))
    }

    fn runtime_handle(&self) -> Result<Handle, ApiError> {
        if let Some(handle) = &self.handle {
            return Ok(handle.clone());
        }
        if let Ok(handle) = Handle::try_current() {
            return Ok(handle);
        }
        DEFAULT_RUNTIME
            .get_or_try_init(|| {
                tokio::runtime::Builder::new_multi_thread()
                    .thread_name("mojio-dispatch")
                    .enable_all()
                    .build()
            })
            .map(|runtime| runtime.handle().clone())
            .map_err(|e| ApiError::Config(format!("could not start runtime: {e}")))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("languages", &self.languages)
            .field("handle", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}

impl Pager {
    async fn next_item(mut self) -> Option<(Result<Payload, ApiError>, Self)> {
        match std::mem::replace(&mut self.state, PageState::Done) {
            PageState::Done => None,
            PageState::Complete => Some((Ok(Payload::PaginationComplete), self)),
            PageState::Fetch {
                mut builder,
                mut cursor,
            } => {
                let outcome = self.fetch(&builder).await;
                let handled = match outcome {
                    Ok(handled) => handled,
                    Err(err) => return Some((Err(err), self)),
                };
                self.state = match cursor.step(&mut builder, &handled) {
                    PageStep::Finished => PageState::Done,
                    PageStep::Follow(next) => {
                        debug!(%next, "following next page");
                        PageState::Fetch { builder, cursor }
                    }
                    PageStep::Complete => PageState::Complete,
                };
                Some((Ok(handled.payload), self))
            }
        }
    }

    async fn fetch(&self, builder: &EndpointBuilder) -> Result<Handled, ApiError> {
        let context = HeaderContext::new(self.tokens.access_token(), self.languages.clone());
        let request = builder.build_request(&self.encoding, &context)?;
        let response = self.transport.execute(request).await?;
        self.handler.handle(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::auth::{NoToken, StaticToken};
    use crate::environment::ClientEnvironment;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::query::QueryOptions;

    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::default(),
            })
        }

        fn dispatched(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ApiError::Transport("script exhausted".into()))
        }
    }

    struct CountingTokens(AtomicUsize);

    impl TokenStore for CountingTokens {
        fn access_token(&self) -> Option<String> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Some(format!("token-{n}"))
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> HttpResponse {
        let data: Vec<_> = ids.iter().map(|id| json!({"Id": id})).collect();
        let mut body = json!({"Data": data, "TotalCount": 9});
        if let Some(next) = next {
            body["Links"] = json!({"Next": next});
        }
        HttpResponse::new(200, body.to_string())
    }

    fn environment() -> ClientEnvironment {
        ClientEnvironment::custom("http://h/v2", "http://h/v1", "ws://h/v2")
    }

    fn dispatcher(transport: Arc<ScriptedTransport>) -> Dispatcher {
        Dispatcher::new(transport, Arc::new(NoToken), vec!["en-US".into()])
    }

    #[tokio::test]
    async fn repeated_next_terminates_with_completion() {
        let transport = ScriptedTransport::new(vec![
            page(&["a", "b"], Some("http%3A%2F%2Fh%2Fv2%2Fvehicles%2F%3Fskip%3D2")),
            page(&["c"], Some("http%3A%2F%2Fh%2Fv2%2Fvehicles%2F%3Fskip%3D2")),
        ]);
        let builder = EndpointBuilder::new(&environment()).vehicles(None).continue_next();
        let payloads = dispatcher(transport.clone())
            .collect(builder, BodyEncoding::Query)
            .await
            .unwrap();

        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[0].entities().len(), 2);
        assert_eq!(payloads[1].entities().len(), 1);
        assert_eq!(payloads[2], Payload::PaginationComplete);

        let requests = transport.dispatched();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url, "http://h/v2/vehicles/?skip=2");
    }

    #[tokio::test]
    async fn absent_next_completes_after_one_page() {
        let transport = ScriptedTransport::new(vec![page(&["a"], None)]);
        let builder = EndpointBuilder::new(&environment()).trips(None).continue_next();
        let payloads = dispatcher(transport.clone())
            .collect(builder, BodyEncoding::Query)
            .await
            .unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[1], Payload::PaginationComplete);
        assert_eq!(transport.dispatched().len(), 1);
    }

    #[tokio::test]
    async fn unpaginated_call_delivers_one_payload() {
        let transport = ScriptedTransport::new(vec![page(&["a"], Some("http://h/v2/vehicles/?skip=1"))]);
        let builder = EndpointBuilder::new(&environment()).vehicles(None);
        let payloads = dispatcher(transport.clone())
            .collect(builder, BodyEncoding::Query)
            .await
            .unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(transport.dispatched().len(), 1);
    }

    #[tokio::test]
    async fn count_flag_survives_following_pages() {
        let transport = ScriptedTransport::new(vec![
            page(&["a"], Some("http://h/v2/vehicles/?skip=1&includeCount=true")),
            page(&["b"], None),
        ]);
        let builder = EndpointBuilder::new(&environment())
            .vehicles(None)
            .query(QueryOptions::new().top(1).count(true))
            .continue_next();
        let payloads = dispatcher(transport)
            .collect(builder, BodyEncoding::Query)
            .await
            .unwrap();
        assert!(matches!(payloads[0], Payload::Counted(_)));
        assert!(matches!(payloads[1], Payload::Counted(_)));
    }

    #[tokio::test]
    async fn token_is_read_before_every_request() {
        let transport = ScriptedTransport::new(vec![
            page(&["a"], Some("http://h/v2/vehicles/?skip=1")),
            page(&["b"], None),
        ]);
        let tokens = Arc::new(CountingTokens(AtomicUsize::new(0)));
        let builder = EndpointBuilder::new(&environment()).vehicles(None).continue_next();
        Dispatcher::new(transport.clone(), tokens, Vec::new())
            .collect(builder, BodyEncoding::Query)
            .await
            .unwrap();

        let requests = transport.dispatched();
        assert_eq!(requests[0].header("Authorization"), Some("Bearer token-0"));
        assert_eq!(requests[1].header("Authorization"), Some("Bearer token-1"));
    }

    #[tokio::test]
    async fn missing_endpoint_fails_without_dispatch() {
        let transport = ScriptedTransport::new(Vec::new());
        let builder = EndpointBuilder::new(&ClientEnvironment::default()).vehicles(None);
        let err = dispatcher(transport.clone())
            .collect(builder, BodyEncoding::Query)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoEndpoint));
        assert!(transport.dispatched().is_empty());
    }

    #[tokio::test]
    async fn run_reports_failure_exactly_once() {
        let transport = ScriptedTransport::new(vec![
            page(&["a"], Some("http://h/v2/vehicles/?skip=1")),
            HttpResponse::new(500, "boom"),
        ]);
        let builder = EndpointBuilder::new(&environment()).vehicles(None).continue_next();

        let payloads = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(AtomicUsize::new(0));
        let (p, f) = (payloads.clone(), failures.clone());
        let task = dispatcher(transport.clone())
            .run(
                builder,
                BodyEncoding::Query,
                move |_| {
                    p.fetch_add(1, Ordering::SeqCst);
                },
                move |err| {
                    assert!(err.is_generic_failure());
                    f.fetch_add(1, Ordering::SeqCst);
                },
            )
            .unwrap();
        task.await.unwrap();

        assert_eq!(payloads.load(Ordering::SeqCst), 1);
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert_eq!(transport.dispatched().len(), 2);
    }

    #[tokio::test]
    async fn run_keeps_the_call_span_in_the_spawned_task() {
        let _subscriber = tracing::subscriber::set_default(tracing_subscriber::registry());
        let transport = ScriptedTransport::new(vec![HttpResponse::new(500, "boom")]);
        let builder = EndpointBuilder::new(&environment()).vehicles(Some("v1"));
        let (tx, rx) = std::sync::mpsc::channel();
        dispatcher(transport)
            .run(builder, BodyEncoding::Query, |_| {}, move |_| {
                let span = Span::current();
                tx.send(span.metadata().map(|m| m.name())).unwrap();
            })
            .unwrap()
            .await
            .unwrap();
        assert_eq!(rx.recv().unwrap(), Some("run"));
    }

    #[test]
    fn run_without_ambient_runtime_uses_default() {
        let transport = ScriptedTransport::new(vec![HttpResponse::new(200, r#"{"Id":"u1"}"#)]);
        let (tx, rx) = std::sync::mpsc::channel();
        let builder = EndpointBuilder::new(&environment()).me();
        Dispatcher::new(transport, Arc::new(StaticToken("t".into())), Vec::new())
            .run(builder, BodyEncoding::Query, move |payload| tx.send(payload).unwrap(), |_| {})
            .unwrap();
        let payload = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert!(payload.entities().is_empty());
        assert!(matches!(payload, Payload::Entity(_)));
    }
}
