//! Request gateway for the upstream statistics API.
//!
//! Every outbound call goes through a single FIFO queue drained by one worker
//! task. The worker keeps a minimum spacing between issued requests and
//! absorbs throttling (HTTP 429) by waiting a fixed penalty and re-issuing the
//! same request. Transport failures are returned to the caller, never retried.

mod resources;
mod transport;

pub use transport::HttpTransport;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use url::Url;

/// Default upstream base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.opendota.com/api/";

/// Errors that can occur while talking to the upstream API.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Still throttled after {retries} retries: {url}")]
    Throttled { url: String, retries: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Gateway worker has shut down")]
    Closed,
}

/// Configuration for the request gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL every resource path is resolved against
    pub base_url: String,

    /// Minimum time between two issued requests
    pub min_request_interval: Duration,

    /// Wait before re-issuing a throttled request
    pub throttle_penalty: Duration,

    /// Give up after this many throttle retries (None = retry forever)
    pub max_throttle_retries: Option<u32>,

    /// Per-request timeout for the HTTP transport
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Number of recent matches requested per player
    pub recent_match_limit: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            // ~60 requests/min upstream quota; 250ms keeps bursts short
            min_request_interval: Duration::from_millis(250),
            throttle_penalty: Duration::from_secs(5),
            max_throttle_retries: None,
            timeout: Duration::from_secs(30),
            user_agent: concat!("party-tracker/", env!("CARGO_PKG_VERSION")).to_string(),
            recent_match_limit: 50,
        }
    }
}

/// A single outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
}

/// Status and raw body of an upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-2xx response into an error.
    pub fn into_success(self) -> Result<Self, GatewayError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GatewayError::HttpStatus {
                status: self.status.as_u16(),
                message: self
                    .status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            })
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Something that can put a request on the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue the request once. Errors mean no response could be obtained.
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, GatewayError>;
}

type Reply = oneshot::Sender<Result<UpstreamResponse, GatewayError>>;

struct Job {
    request: UpstreamRequest,
    reply: Reply,
}

/// Handle to the serialized request queue.
///
/// Clones share the same queue and worker. The worker exits once every handle
/// has been dropped.
#[derive(Clone)]
pub struct RequestGateway {
    base_url: Url,
    recent_match_limit: u32,
    jobs: UnboundedSender<Job>,
}

impl RequestGateway {
    /// Create a gateway backed by the reqwest transport.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let transport = HttpTransport::new(&config.user_agent, config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a gateway on top of any transport.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_transport(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, GatewayError> {
        let base_url = parse_base_url(&config.base_url)?;
        let (jobs, queue) = unbounded_channel();

        let worker = Worker {
            transport,
            min_interval: config.min_request_interval,
            penalty: config.throttle_penalty,
            max_retries: config.max_throttle_retries,
            last_issued: None,
        };
        tokio::spawn(worker.run(queue));

        Ok(Self {
            base_url,
            recent_match_limit: config.recent_match_limit,
            jobs,
        })
    }

    /// Base URL resource paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a resource path (optionally with a query string).
    pub fn resolve(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Queue a request and wait for its response.
    ///
    /// Throttled responses never come back from here; any other status does.
    pub async fn fetch_resource(
        &self,
        path: &str,
        method: Method,
    ) -> Result<UpstreamResponse, GatewayError> {
        let receiver = self.enqueue(UpstreamRequest {
            method,
            url: self.resolve(path)?,
        })?;
        receiver.await.map_err(|_| GatewayError::Closed)?
    }

    /// Put a request on the queue without waiting.
    fn enqueue(
        &self,
        request: UpstreamRequest,
    ) -> Result<oneshot::Receiver<Result<UpstreamResponse, GatewayError>>, GatewayError> {
        let (reply, receiver) = oneshot::channel();
        self.jobs
            .send(Job { request, reply })
            .map_err(|_| GatewayError::Closed)?;
        Ok(receiver)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", raw, e)))
}

/// Single consumer of the request queue.
struct Worker {
    transport: Arc<dyn Transport>,
    min_interval: Duration,
    penalty: Duration,
    max_retries: Option<u32>,
    last_issued: Option<Instant>,
}

impl Worker {
    async fn run(mut self, mut queue: UnboundedReceiver<Job>) {
        while let Some(job) = queue.recv().await {
            let result = self.execute(&job.request).await;
            if job.reply.send(result).is_err() {
                debug!("Caller for {} went away before the response", job.request.url);
            }
        }
        debug!("Request queue closed, gateway worker exiting");
    }

    async fn execute(&mut self, request: &UpstreamRequest) -> Result<UpstreamResponse, GatewayError> {
        let mut retries = 0;
        loop {
            self.wait_for_slot().await;
            debug!("{} {}", request.method, request.url);

            let response = match self.transport.send(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Network error requesting {}: {}", request.url, e);
                    return Err(e);
                }
            };

            if response.status != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            if let Some(max) = self.max_retries {
                if retries >= max {
                    return Err(GatewayError::Throttled {
                        url: request.url.to_string(),
                        retries,
                    });
                }
            }
            retries += 1;

            warn!(
                "Rate limited on {} (retry {}), backing off {:?}",
                request.url, retries, self.penalty
            );
            sleep(self.penalty).await;
        }
    }

    /// Hold until the minimum spacing since the last issued request has passed.
    async fn wait_for_slot(&mut self) {
        if let Some(last) = self.last_issued {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_issued = Some(Instant::now());
    }
}
