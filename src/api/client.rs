//! Purpose: Asynchronous HTTP client facade with a bounded pool of request workers.
//! Exports: `ClientConfig`, `Client`, `Pending`.
//! Role: Turns `RequestSpec`s into `Response`s; JSON bodies go through the value contract.
//! Invariants: At most `max_in_flight` requests execute concurrently; the rest queue.
//! Invariants: Configuration is immutable once the client is built and shared by all requests.
//! Invariants: Non-2xx statuses resolve to responses; transport failures resolve to `Io` errors.
#![allow(clippy::result_large_err)]

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use url::Url;

use super::headers::CONTENT_TYPE;
use super::transport::{Prepared, Transport, UreqTransport};
use super::{Body, Headers, RequestSpec, Response};
use crate::core::error::{Error, ErrorKind};
use crate::json::Json;

type ApiResult<T> = Result<T, Error>;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    keepalive: Option<Duration>,
    headers: Headers,
    user_agent: String,
    max_in_flight: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            keepalive: Some(Duration::from_secs(60)),
            headers: Headers::new(),
            user_agent: format!("xson/{}", env!("CARGO_PKG_VERSION")),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `None` disables connection reuse.
    pub fn with_keepalive(mut self, keepalive: Option<Duration>) -> Self {
        self.keepalive = keepalive;
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn keepalive(&self) -> Option<Duration> {
        self.keepalive
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Reads a configuration object; every field except `base_url` is optional.
    ///
    /// Numeric fields are coerced, so `"timeout_ms": "1500"` is accepted.
    /// A `null` or `0` `keepalive_ms` disables connection reuse.
    pub fn from_json<J: Json>(json: &J) -> ApiResult<Self> {
        let base_url: String = json.at("base_url")?.coerce()?;
        let mut config = Self::new(base_url);
        if let Some(value) = json.field("timeout_ms") {
            config.timeout = Duration::from_millis(value.coerce()?);
        }
        if let Some(value) = json.field("keepalive_ms") {
            let millis = if value.is_null() { 0 } else { value.coerce::<u64>()? };
            config.keepalive = (millis > 0).then(|| Duration::from_millis(millis));
        }
        if let Some(value) = json.field("headers") {
            config.headers = Headers::from_json(value)?;
        }
        if let Some(value) = json.field("user_agent") {
            config.user_agent = value.coerce()?;
        }
        if let Some(value) = json.field("max_in_flight") {
            config.max_in_flight = value.coerce()?;
        }
        Ok(config)
    }
}

/// Handle for issuing requests. Cloning is cheap and clones share the worker pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    base_url: Url,
    transport: Arc<dyn Transport>,
    runtime: Arc<Runtime>,
}

impl Client {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let transport = UreqTransport::new(&config);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> ApiResult<Self> {
        if config.max_in_flight == 0 {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("max_in_flight must be at least 1"));
        }
        let base_url = normalize_base_url(&config.base_url)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.max_in_flight)
            .thread_name("xson-client")
            .enable_all()
            .build()
            .map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to start client workers")
                    .with_source(err)
            })?;
        tracing::debug!(
            base_url = %base_url,
            max_in_flight = config.max_in_flight,
            "client ready"
        );
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                base_url,
                transport: Arc::new(transport),
                runtime: Arc::new(runtime),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Queues a request and returns immediately.
    ///
    /// The returned [`Pending`] can be awaited or blocked on with [`Pending::wait`].
    pub fn request(&self, spec: RequestSpec) -> Pending {
        let queued_at = Instant::now();
        let prepared = self.prepare(&spec);
        let transport = Arc::clone(&self.inner.transport);
        let handle = self.inner.runtime.spawn_blocking(move || {
            let prepared = prepared?;
            let started_at = Instant::now();
            tracing::debug!(method = %prepared.method, url = %prepared.url, "sending request");
            let reply = transport.execute(&prepared).inspect_err(|err| {
                tracing::warn!(
                    method = %prepared.method,
                    url = %prepared.url,
                    error = %err,
                    "request failed"
                );
            })?;
            let finished_at = Instant::now();
            tracing::debug!(
                status = reply.status.code(),
                elapsed_ms = finished_at.duration_since(started_at).as_millis() as u64,
                "request finished"
            );
            Ok(Response {
                method: spec.method,
                path: spec.path,
                status: reply.status,
                headers: reply.headers,
                body: reply.body,
                queued_at,
                started_at,
                finished_at,
            })
        });
        Pending {
            handle,
            runtime: Arc::clone(&self.inner.runtime),
        }
    }

    pub fn get(&self, path: impl Into<String>) -> Pending {
        self.request(RequestSpec::get(path))
    }

    pub fn post_json<J: Json>(&self, path: impl Into<String>, document: &J) -> Pending {
        self.request(RequestSpec::post(path).with_body(Body::json(document)))
    }

    fn prepare(&self, spec: &RequestSpec) -> ApiResult<Prepared> {
        let url = build_url(&self.inner.base_url, spec)?;
        let mut headers = self.inner.config.headers.clone();
        if let Some(extra) = &spec.headers {
            headers.merge(extra);
        }
        if let Some(content_type) = spec.body.as_ref().and_then(|body| body.content_type.as_ref()) {
            if !headers.contains(CONTENT_TYPE) {
                headers.set_content_type(content_type.as_str());
            }
        }
        Ok(Prepared {
            method: spec.method,
            url,
            headers,
            body: spec.body.clone(),
        })
    }
}

/// A request in flight.
///
/// When awaited from async code, keep the originating [`Client`] alive until it resolves.
pub struct Pending {
    handle: JoinHandle<ApiResult<Response>>,
    runtime: Arc<Runtime>,
}

impl Pending {
    /// Blocks the calling thread until the response arrives.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait(self) -> ApiResult<Response> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(self)
    }
}

impl Future for Pending {
    type Output = ApiResult<Response>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(err)) => Poll::Ready(Err(Error::new(ErrorKind::Internal)
                .with_message("request worker stopped")
                .with_source(err))),
        }
    }
}

fn normalize_base_url(raw: &str) -> ApiResult<Url> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_input(raw)
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("base url must use http or https scheme"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, spec: &RequestSpec) -> ApiResult<Url> {
    let mut url = base_url.join(spec.path.trim_start_matches('/')).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid request path")
            .with_input(spec.path.as_str())
            .with_source(err)
    })?;
    if let Some(params) = spec.params.as_ref().filter(|params| !params.is_empty()) {
        url.set_query(Some(&params.encode()));
    }
    Ok(url)
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
