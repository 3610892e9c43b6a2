//! HTTP access used by [`Markdown::load_url`](crate::Markdown::load_url).

use std::sync::Arc;
use std::time::Duration;

use ureq::Agent;

use crate::error::MarkdownError;

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Response of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

/// Blocking HTTP client.
///
/// Implementations return every response, whatever its status; only
/// transport failures are errors.
pub trait HttpClient: Send + Sync {
    /// Issue a GET request.
    fn get(&self, url: &str) -> Result<HttpResponse, MarkdownError>;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn get(&self, url: &str) -> Result<HttpResponse, MarkdownError> {
        (**self).get(url)
    }
}

/// [`HttpClient`] backed by a ureq agent.
pub struct UreqClient {
    agent: Agent,
}

impl UreqClient {
    /// Create a client whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str) -> Result<HttpResponse, MarkdownError> {
        tracing::debug!(url, "fetching remote markdown");
        let mut response = self.agent.get(url).call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpResponse { status, body })
    }
}
