use std::time::Duration;

use anyhow::Context;
use log::debug;
use reqwest::{Client, ClientBuilder, Response};
use url::Url;

use crate::ratelimit::RateLimiter;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Something that can hand back the HTML behind a URL.
#[allow(async_fn_in_trait)]
pub trait HtmlFetcher {
    async fn fetch_html(&self, url: &Url) -> anyhow::Result<String>;
}

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl RequestClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        let rate_limiter = RateLimiter::new()?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    pub async fn fetch_url_response(&self, url: &Url) -> anyhow::Result<Response> {
        // Wait (non-blocking) until we're allowed to make a request according
        // to our self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        debug!("GET {url}");
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        Ok(response)
    }

    pub async fn fetch_url_body(&self, url: &Url) -> anyhow::Result<String> {
        let response = self.fetch_url_response(url).await?;
        let body = response.text().await?;
        Ok(body)
    }
}

impl HtmlFetcher for RequestClient {
    async fn fetch_html(&self, url: &Url) -> anyhow::Result<String> {
        self.fetch_url_body(url)
            .await
            .with_context(|| format!("failed to fetch {url}"))
    }
}
