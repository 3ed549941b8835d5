use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, header};
use std::fmt::Debug;
use std::time::Duration;

use crate::errors::{ApiError, ApiResult};
use crate::session::BearerToken;

/// A fully resolved request. `bearer` is the only place credentials travel.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<BearerToken>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }
}

/// Seam between the API client and the network.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    /// Send one request. Non-2xx statuses are returned as responses; only
    /// transport failures are errors.
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse>;
}

/// Production transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.as_str()),
            );
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
