//! Mock HTTP client for testing.
//!
//! Provides [`MockHttpClient`] for exercising remote loading without network
//! access.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::MarkdownError;
use crate::http::{HttpClient, HttpResponse};

/// Mock HTTP client for testing.
///
/// Serves canned responses by URL and records every request. Unknown URLs
/// answer `404` with an empty body.
///
/// # Example
///
/// ```ignore
/// use md_service::{HttpClient, MockHttpClient};
///
/// let http = MockHttpClient::new().with_response("https://example.com/a.md", 200, "# A");
/// assert_eq!(http.get("https://example.com/a.md").unwrap().status, 200);
/// assert_eq!(http.requests(), vec!["https://example.com/a.md"]);
/// ```
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: RwLock<HashMap<String, HttpResponse>>,
    requests: RwLock<Vec<String>>,
}

impl MockHttpClient {
    /// Create a client without canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with `status` for `url`.
    #[must_use]
    pub fn with_response(self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                url.to_owned(),
                HttpResponse {
                    status,
                    body: body.to_owned(),
                },
            );
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, MarkdownError> {
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());

        let response = self
            .responses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .unwrap_or(HttpResponse {
                status: 404,
                body: String::new(),
            });
        Ok(response)
    }
}
