use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use crate::{
    client::CoinMarketCap,
    error::{ApiErrorResponse, ClientError, DataError},
    paths::API_KEY_HEADER,
};

pub struct HttpRequest {
    method: Method,
    path: String,
    query_params: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query_params: Vec::new(),
        }
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((key.into(), value.to_string()));
        self
    }

    fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if self.query_params.is_empty() {
            return format!("{base}{}", self.path);
        }
        let params: Vec<String> = self
            .query_params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{base}{}?{}", self.path, params.join("&"))
    }
}

// Extension trait to add HTTP methods to CoinMarketCap
#[async_trait::async_trait]
pub trait HttpClient {
    async fn request<T: DeserializeOwned>(&self, req: HttpRequest) -> Result<T, ClientError>;
}

#[async_trait::async_trait]
impl HttpClient for CoinMarketCap {
    async fn request<T: DeserializeOwned>(&self, req: HttpRequest) -> Result<T, ClientError> {
        let body = self.execute_request(req).await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            error!("Response body does not match the expected structure: {}", e);
            ClientError::MalformedResponse(DataError::Json(e))
        })
    }
}

impl CoinMarketCap {
    /// Single attempt; errors go straight back to the caller.
    #[instrument(skip(self, req), fields(method = %req.method, path = %req.path))]
    async fn execute_request(&self, req: HttpRequest) -> Result<String, ClientError> {
        match self.execute_single_request(&req).await {
            Ok(body) => {
                debug!("HTTP request completed successfully");
                Ok(body)
            }
            Err(e) => {
                error!("HTTP request failed: {}", e);
                Err(e)
            }
        }
    }

    async fn execute_single_request(&self, req: &HttpRequest) -> Result<String, ClientError> {
        let url = req.url(&self.base_url);
        debug!("Built request URL: {}", url);

        let request_builder = self
            .http_client
            .request(req.method.clone(), &url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(header::ACCEPT, "application/json");

        debug!("Sending HTTP request");
        let res = request_builder.send().await.map_err(|e| {
            warn!("Network error occurred: {}", e);
            ClientError::Network(e)
        })?;

        let status = res.status();
        let body = res.text().await?;

        if status.is_success() {
            debug!("HTTP request completed with status: {}", status);
            return Ok(body);
        }

        let api_status = serde_json::from_str::<ApiErrorResponse>(&body)
            .ok()
            .map(|r| r.status)
            .filter(|s| !s.is_ok());
        let describe = || match &api_status {
            Some(s) => s.to_string(),
            None => format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            ),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Received {} from API, key rejected", status.as_u16());
                Err(ClientError::Auth(describe()))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Received 429 Too Many Requests, API quota exhausted");
                Err(ClientError::RateLimit(describe()))
            }
            _ => {
                error!(
                    "Received HTTP error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                );
                match &api_status {
                    Some(s) => Err(ClientError::from_api_status(s)),
                    None => Err(ClientError::HttpStatus { status, body }),
                }
            }
        }
    }
}
