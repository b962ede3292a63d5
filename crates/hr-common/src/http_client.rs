//! Blocking HTTP client shared by the OpenAI-compatible collaborators.

use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

/// Bearer-authenticated `reqwest::blocking` client, built on first use.
///
/// `reqwest::blocking` starts and drops a runtime while it is constructed, which panics
/// on an async worker thread. Collaborators are created on the server's runtime but only
/// called through `spawn_blocking`, so deferring construction to the first call keeps
/// every client on a blocking thread.
pub(crate) struct LazyClient {
    headers: HeaderMap,
    timeout: Duration,
    client: OnceCell<Client>,
}

impl LazyClient {
    pub(crate) fn bearer(api_key: &str, timeout: Duration) -> Result<Self, String> {
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| "invalid OpenAI API key".to_string())?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            headers,
            timeout,
            client: OnceCell::new(),
        })
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The client, built on this call if needed. Must run off the async runtime.
    pub(crate) fn get(&self) -> Result<&Client, String> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .timeout(self.timeout)
                .default_headers(self.headers.clone())
                .build()
                .map_err(|err| format!("failed to build HTTP client: {err}"))
        })
    }

    pub(crate) fn is_built(&self) -> bool {
        self.client.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_keys_that_are_not_header_safe() {
        assert!(LazyClient::bearer("sk-\ntest", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn creation_on_the_runtime_defers_the_client() {
        let lazy = LazyClient::bearer("sk-test", Duration::from_secs(1)).unwrap();
        assert!(!lazy.is_built());

        let built = tokio::task::spawn_blocking(move || {
            let ok = lazy.get().is_ok();
            ok && lazy.is_built()
        })
        .await
        .unwrap();
        assert!(built);
    }
}
