//! HTTP probe logic.
//!
//! Issues a GET against a target address and records how long the
//! response headers took to arrive, along with the status code and
//! content type.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{HeaderValue, Method, Request, Uri};
use http_body_util::Empty;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use tracing::debug;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// Errors building a prober.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid user agent {0:?}")]
    UserAgent(String),
}

/// What a single probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The target answered; any status code counts as an answer.
    Response { status: u16, content_type: String },
    /// The probe could not complete (bad address, connect error, timeout).
    Failed { reason: String },
}

/// Result of a single probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Time from request start until response headers (or failure).
    pub elapsed: Duration,
    pub outcome: ProbeOutcome,
}

impl ProbeReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Response { .. })
    }
}

/// Shared HTTP(S) client for probing targets.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct Prober {
    client: HttpsClient,
    timeout: Duration,
    user_agent: HeaderValue,
}

impl Prober {
    /// Create a prober with the given per-probe timeout.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ProbeError> {
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|_| ProbeError::UserAgent(user_agent.to_string()))?;

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            timeout,
            user_agent,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe an address once.
    ///
    /// Never fails: problems are reported as `ProbeOutcome::Failed`.
    pub async fn probe(&self, address: &str) -> ProbeReport {
        let start = Instant::now();

        let req = match self.build_request(address) {
            Ok(req) => req,
            Err(reason) => {
                debug!(%address, %reason, "probe request rejected");
                return ProbeReport {
                    elapsed: start.elapsed(),
                    outcome: ProbeOutcome::Failed { reason },
                };
            }
        };

        let outcome = match tokio::time::timeout(self.timeout, self.client.request(req)).await {
            Ok(Ok(resp)) => {
                let content_type = resp
                    .headers()
                    .get(CONTENT_TYPE)
                    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                    .unwrap_or_default();
                ProbeOutcome::Response {
                    status: resp.status().as_u16(),
                    content_type,
                }
            }
            Ok(Err(e)) => {
                let reason = error_chain(&e);
                debug!(%address, %reason, "probe request failed");
                ProbeOutcome::Failed { reason }
            }
            Err(_) => {
                debug!(%address, timeout = ?self.timeout, "probe timed out");
                ProbeOutcome::Failed {
                    reason: format!("timed out after {:?}", self.timeout),
                }
            }
        };

        ProbeReport {
            elapsed: start.elapsed(),
            outcome,
        }
    }

    fn build_request(&self, address: &str) -> Result<Request<Empty<Bytes>>, String> {
        let uri: Uri = address
            .parse()
            .map_err(|e| format!("invalid address: {e}"))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err("address must be an absolute http(s) URL".to_string());
        }

        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(USER_AGENT, self.user_agent.clone())
            .body(Empty::<Bytes>::new())
            .map_err(|e| e.to_string())
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
