//! HTTP GET with bounded retry.
//!
//! Each request gets its own curl multi handle carrying a single Easy2
//! transfer. `fetch` drives the transfer until the final response has
//! produced its first body byte (or finished), so the caller sees the status
//! before deciding what to do with the body; the rest of the body is pulled
//! lazily through [`ResponseBody`]'s `Read` impl.

mod body;
mod handler;

pub use body::ResponseBody;

use std::time::Duration;

use url::Url;

use crate::config::HttpConfig;
use crate::control::CancelToken;
use crate::retry::{run_with_retry, RetryPolicy, TransportError};

use handler::BodyHandler;

/// Per-request curl settings.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Hard wall-clock limit for a whole transfer.
    pub timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` B/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub max_redirections: u32,
    pub user_agent: Option<String>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for CurlOptions {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            low_speed_limit: cfg.low_speed_limit,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            max_redirections: cfg.max_redirections,
            user_agent: cfg.user_agent.clone(),
        }
    }
}

/// A response whose status line has arrived. Non-2xx responses are returned
/// as-is; judging the status is the caller's job.
pub struct HttpResponse {
    status: u32,
    content_length: Option<u64>,
    body: ResponseBody,
}

impl HttpResponse {
    pub fn status(&self) -> u32 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `Content-Length` of the final response, when the server sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// GET with retry on transport failure. Cheap to clone; the producer thread
/// and the archive builder each hold their own copy.
#[derive(Debug, Clone, Default)]
pub struct RetryingFetcher {
    policy: RetryPolicy,
    curl: CurlOptions,
    cancel: Option<CancelToken>,
}

impl RetryingFetcher {
    pub fn new(policy: RetryPolicy, curl: CurlOptions) -> Self {
        Self {
            policy,
            curl,
            cancel: None,
        }
    }

    /// Abort in-flight transfers when `token` fires.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    /// GET `url`, retrying transport failures per the policy. Returns the
    /// last transport error once attempts are exhausted. Only `http` and
    /// `https` are spoken; anything else fails before a connection is made.
    pub fn fetch(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        if !is_http(url) {
            return Err(TransportError::UnsupportedScheme(url.scheme().to_string()));
        }
        run_with_retry(&self.policy, |attempt| {
            tracing::debug!(url = %url, attempt, "GET");
            open(url, &self.curl, self.cancel.clone())
        })
    }
}

pub(crate) fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Start one transfer and drive it until the response has started.
fn open(url: &Url, opts: &CurlOptions, cancel: Option<CancelToken>) -> Result<HttpResponse, TransportError> {
    let mut easy = curl::easy::Easy2::new(BodyHandler::default());
    easy.url(url.as_str())?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.timeout(opts.timeout)?;
    if let Some(ref ua) = opts.user_agent {
        easy.useragent(ua)?;
    }

    let multi = curl::multi::Multi::new();
    let handle = multi.add2(easy)?;
    let mut body = ResponseBody::new(multi, handle, cancel);

    while !body.started() {
        if body.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        body.pump()?;
    }
    if let Some(e) = body.early_failure() {
        return Err(TransportError::Curl(e));
    }

    let handler = body.handler();
    let status = handler.status.unwrap_or(0);
    let content_length = handler.content_length;
    Ok(HttpResponse {
        status,
        content_length,
        body,
    })
}
