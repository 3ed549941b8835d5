use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, warn};
use userdesk_config::{Config, Endpoints};

use crate::errors::{ApiError, ApiResult};
use crate::infra::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::session::{BearerToken, SessionStore};

/// Credential policy for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Never send a bearer, even while a session is held.
    Public,
    /// Send the session bearer. Missing session fails locally; a 401 rejects
    /// the session.
    Session,
    /// Send this token. A 401 leaves the session alone.
    Token(BearerToken),
}

/// API client bound to one base URL, endpoint table and session store.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    endpoints: Endpoints,
    session: SessionStore,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.session.is_active())
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: &Config,
        session: SessionStore,
    ) -> Self {
        // The loader normalizes the URL; a hand-built Config may still carry
        // a trailing slash.
        let base_url =
            config.api.base_url.trim().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
            endpoints: config.endpoints.clone(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        access: Access,
    ) -> ApiResult<T> {
        let response = self.execute(Method::GET, path, None, access).await?;
        decode(&response)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        access: Access,
    ) -> ApiResult<T> {
        let body = encode(body)?;
        let response =
            self.execute(Method::POST, path, Some(body), access).await?;
        decode(&response)
    }

    /// POST where the success body may be empty or free-form.
    pub async fn post_optional<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        access: Access,
    ) -> ApiResult<Option<T>> {
        let body = encode(body)?;
        let response =
            self.execute(Method::POST, path, Some(body), access).await?;
        if response.is_empty() {
            return Ok(None);
        }
        match serde_json::from_slice(&response.body) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                debug!("ignoring undecodable success body: {}", err);
                Ok(None)
            }
        }
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        access: Access,
    ) -> ApiResult<T> {
        let body = encode(body)?;
        let response =
            self.execute(Method::PUT, path, Some(body), access).await?;
        decode(&response)
    }

    pub async fn delete(&self, path: &str, access: Access) -> ApiResult<()> {
        self.execute(Method::DELETE, path, None, access).await?;
        Ok(())
    }

    /// Send a request and return the response if it was 2xx.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        access: Access,
    ) -> ApiResult<HttpResponse> {
        let rejects_session = access == Access::Session;
        let bearer = match access {
            Access::Public => None,
            Access::Session => {
                Some(self.session.token().ok_or(ApiError::NotAuthenticated)?)
            }
            Access::Token(token) => Some(token),
        };

        let url = self.build_url(path);
        debug!(
            %method,
            %url,
            authenticated = bearer.is_some(),
            "sending request"
        );
        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                bearer: bearer.clone(),
                body,
            })
            .await?;

        let status = response.status;
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(&response);
        debug!(%status, %message, "request failed");
        if status == StatusCode::UNAUTHORIZED
            && rejects_session
            && let Some(sent) = &bearer
        {
            self.session.reject(sent);
            return Err(ApiError::Unauthorized { message });
        }
        if status.is_server_error() {
            warn!(%status, "server error: {}", message);
        }
        Err(ApiError::Status { status, message })
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ApiResult<serde_json::Value> {
    serde_json::to_value(body).map_err(ApiError::Encode)
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> ApiResult<T> {
    serde_json::from_slice(&response.body)
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Prefer a JSON `message` or `title` field, then the raw body, then the
/// status reason phrase.
fn error_message(response: &HttpResponse) -> String {
    if let Ok(serde_json::Value::Object(map)) =
        serde_json::from_slice::<serde_json::Value>(&response.body)
    {
        for key in ["message", "title"] {
            if let Some(serde_json::Value::String(text)) = map.get(key)
                && !text.trim().is_empty()
            {
                return text.trim().to_string();
            }
        }
    }
    let text = response.text();
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    response
        .status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(
            error_message(&response(400, r#"{"message":"bad email"}"#)),
            "bad email"
        );
        assert_eq!(
            error_message(&response(
                400,
                r#"{"title":"One or more validation errors occurred."}"#
            )),
            "One or more validation errors occurred."
        );
        assert_eq!(error_message(&response(500, "boom")), "boom");
        assert_eq!(error_message(&response(404, "")), "Not Found");
    }
}
