use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::*;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = "adprobe/0.1";

/// Thin client over the listings service. Every call hands back the raw
/// status and body so callers can assert on rejections as well as successes.
#[derive(Clone)]
pub struct ListingsClient {
    http: Client,
    base_url: Url,
}

/// A completed exchange with the service, success or not.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    request_id: Option<String>,
    body: String,
}

impl ListingsClient {
    pub fn new(config: Config) -> Result<Self> {
        let mut base = config
            .base_url
            .parse::<Url>()
            .map_err(|err| Error::InvalidConfig(format!("invalid base url: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "base url cannot carry a path: {base}"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| Error::InvalidConfig(format!("failed to build client: {err}")))?;

        Ok(Self {
            http,
            base_url: base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /api/items`. Generic over the body so incomplete or invalid
    /// payloads can be sent as-is.
    pub async fn create_item<B>(&self, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, &["api", "items"], None, Some(body))
            .await
    }

    pub async fn get_item(&self, id: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, &["api", "items", id], None, None)
            .await
    }

    pub async fn items_by_seller(&self, seller_id: i64) -> Result<ApiResponse> {
        let query = vec![("sellerId".to_string(), seller_id.to_string())];
        self.request::<()>(Method::GET, &["api", "items"], Some(query), None)
            .await
    }

    pub async fn item_stats(&self, id: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, &["api", "items", id, "stats"], None, None)
            .await
    }

    /// Base url with `segments` appended, each one percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidConfig("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    #[tracing::instrument(level = "debug", skip(self, query, body))]
    async fn request<B>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<Vec<(String, String)>>,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let mut url = self.endpoint(segments)?;
        if let Some(q) = &query {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in q {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut req = self.http.request(method, url.clone()).headers(headers);
        if let Some(b) = body {
            req = req.json(b);
        }

        tracing::debug!(%url, "sending request");
        let response = req.send().await?;
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;
        tracing::debug!(%status, bytes = body.len(), "received response");

        Ok(ApiResponse {
            status,
            request_id,
            body,
        })
    }
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            request_id: None,
            body: body.into(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body regardless of status.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The service's error envelope, if the body is one.
    pub fn api_error(&self) -> Option<ApiError> {
        serde_json::from_str(&self.body).ok()
    }
}
