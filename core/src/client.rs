//! Top-level client handle.

use std::sync::Arc;

use futures::Stream;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::auth::{KeychainTokenStore, TokenStore};
use crate::builder::EndpointBuilder;
use crate::dispatch::Dispatcher;
use crate::environment::{preferred_languages_from_env, ClientEnvironment};
use crate::error::ApiError;
use crate::http::BodyEncoding;
use crate::response::Payload;
use crate::transport::{ReqwestTransport, Transport};

/// Everything a `MojioClient` needs.
pub struct ClientConfig {
    pub environment: ClientEnvironment,
    pub languages: Vec<String>,
    pub tokens: Arc<dyn TokenStore>,
    pub transport: Arc<dyn Transport>,
    pub runtime: Option<Handle>,
}

impl ClientConfig {
    /// Endpoints from `MOJIO_*` variables, languages from the locale, the
    /// token from the platform keychain and a reqwest transport.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self {
            environment: ClientEnvironment::from_env()?,
            languages: preferred_languages_from_env(),
            tokens: Arc::new(KeychainTokenStore::default()),
            transport: Arc::new(ReqwestTransport::new()?),
            runtime: None,
        })
    }

    pub fn with_environment(mut self, environment: ClientEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

/// Hands out endpoint builders and runs them.
///
/// ```no_run
/// # async fn demo() -> Result<(), mojio_core::ApiError> {
/// use mojio_core::{BodyEncoding, ClientConfig, MojioClient, QueryOptions};
///
/// let client = MojioClient::new(ClientConfig::from_env()?);
/// let request = client
///     .endpoint()
///     .vehicles(None)
///     .query(QueryOptions::new().top(20))
///     .continue_next();
/// for payload in client.collect(request, BodyEncoding::Query).await? {
///     println!("{} vehicles", payload.entities().len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MojioClient {
    environment: ClientEnvironment,
    dispatcher: Dispatcher,
}

impl MojioClient {
    pub fn new(config: ClientConfig) -> Self {
        let mut dispatcher = Dispatcher::new(config.transport, config.tokens, config.languages);
        if let Some(handle) = config.runtime {
            dispatcher = dispatcher.with_handle(handle);
        }
        Self {
            environment: config.environment,
            dispatcher,
        }
    }

    pub fn environment(&self) -> &ClientEnvironment {
        &self.environment
    }

    /// A fresh builder rooted at the configured endpoints.
    pub fn endpoint(&self) -> EndpointBuilder {
        EndpointBuilder::new(&self.environment)
    }

    pub fn pages(
        &self,
        builder: EndpointBuilder,
        encoding: BodyEncoding,
    ) -> impl Stream<Item = Result<Payload, ApiError>> + Send + 'static {
        self.dispatcher.pages(builder, encoding)
    }

    pub async fn collect(
        &self,
        builder: EndpointBuilder,
        encoding: BodyEncoding,
    ) -> Result<Vec<Payload>, ApiError> {
        self.dispatcher.collect(builder, encoding).await
    }

    pub fn run<P, F>(
        &self,
        builder: EndpointBuilder,
        encoding: BodyEncoding,
        on_payload: P,
        on_failure: F,
    ) -> Result<JoinHandle<()>, ApiError>
    where
        P: FnMut(Payload) + Send + 'static,
        F: FnOnce(ApiError) + Send + 'static,
    {
        self.dispatcher.run(builder, encoding, on_payload, on_failure)
    }
}
