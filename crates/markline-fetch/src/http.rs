//! HTTP release fetcher
//!
//! `GET {api_base}/organizations/{org}/releases/stats/` with the canonical
//! query as parameters, plus `cursor` on follow-up pages.

use crate::error::{FetchError, FetchResult};
use crate::fetcher::{ReleaseFetcher, ReleasePage};
use crate::link::next_cursor;
use async_trait::async_trait;
use markline_model::{CanonicalQuery, Release};
use reqwest::{header, Client};
use std::time::Duration;

/// Release fetcher backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpReleaseFetcher {
    client: Client,
    api_base: String,
    auth_token: Option<String>,
}

impl HttpReleaseFetcher {
    /// Create fetcher for an API base such as `https://sentry.example.com/api/0`
    ///
    /// # Errors
    /// `FetchError::Request` if the HTTP client cannot be built
    pub fn new(api_base: impl Into<String>, timeout: Option<Duration>) -> FetchResult<Self> {
        let mut builder = Client::builder().user_agent(concat!("markline/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Endpoint URL for an organization
    #[must_use]
    pub fn endpoint(&self, organization: &str) -> String {
        format!(
            "{}/organizations/{}/releases/stats/",
            self.api_base,
            urlencoding::encode(organization)
        )
    }
}

#[async_trait]
impl ReleaseFetcher for HttpReleaseFetcher {
    async fn fetch_page(
        &self,
        organization: &str,
        query: &CanonicalQuery,
        cursor: Option<String>,
    ) -> FetchResult<ReleasePage> {
        if organization.trim().is_empty() {
            return Err(FetchError::InvalidOrganization);
        }

        let mut params = query.to_params();
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }

        let url = self.endpoint(organization);
        tracing::debug!(%url, ?params, "requesting releases");

        let mut request = self.client.get(&url).query(&params);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::status(status.as_u16(), body));
        }

        let next = response
            .headers()
            .get(header::LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_cursor);

        let body = response.bytes().await?;
        let releases: Vec<Release> = serde_json::from_slice(&body)?;

        Ok(ReleasePage {
            releases,
            next_cursor: next,
        })
    }
}
