//! Shared fixtures: a scripted transport that records requests, a store
//! that can be told to fail, and a fully wired client.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use userdesk_config::Config;
use userdesk_model::User;

use crate::auth::AuthGateway;
use crate::errors::{ApiError, ApiResult, StorageError};
use crate::infra::{ApiClient, HttpRequest, HttpResponse, HttpTransport};
use crate::session::{BearerToken, SessionStore};
use crate::storage::{KeyValueStore, MemoryKeyValueStore, StorageResult};
use crate::users::UserDirectory;

pub const BASE_URL: &str = "http://api.test";

#[derive(Debug, Clone)]
enum Reply {
    Respond(StatusCode, Vec<u8>),
    Fail(String),
}

/// Replies are queued per (method, path). The last reply for a route is
/// sticky so repeated calls keep getting it.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn on_json(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: Value,
    ) {
        self.push(
            method,
            path,
            Reply::Respond(status_code(status), body.to_string().into_bytes()),
        );
    }

    pub fn on_text(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(
            method,
            path,
            Reply::Respond(status_code(status), body.as_bytes().to_vec()),
        );
    }

    pub fn on_network_error(&self, method: Method, path: &str) {
        self.push(method, path, Reply::Fail("connection refused".into()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| path_of(&r.url) == path)
            .collect()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let key = (request.method.clone(), path_of(&request.url).to_string());
        self.requests.lock().push(request);

        let reply = {
            let mut routes = self.routes.lock();
            let queue = routes.get_mut(&key);
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match reply {
            Some(Reply::Respond(status, body)) => {
                Ok(HttpResponse { status, body })
            }
            Some(Reply::Fail(message)) => Err(ApiError::Network(message)),
            None => Ok(HttpResponse {
                status: StatusCode::NOT_FOUND,
                body: format!("no scripted route for {} {}", key.0, key.1)
                    .into_bytes(),
            }),
        }
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).expect("valid status code")
}

fn path_of(url: &str) -> &str {
    url.strip_prefix(BASE_URL).unwrap_or(url)
}

/// Memory store whose writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                path: "flaky".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.remove(key)
    }

    fn set_all(&self, entries: Vec<(&str, String)>) -> StorageResult<()> {
        self.check()?;
        self.inner.set_all(entries)
    }
}

/// Everything wired against one scripted transport.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<FlakyStore>,
    pub session: SessionStore,
    pub gateway: AuthGateway,
    pub users: UserDirectory,
}

impl Harness {
    pub fn new() -> Self {
        let transport = Arc::new(ScriptedTransport::default());
        let store = Arc::new(FlakyStore::default());
        let session = SessionStore::new(store.clone());

        let mut config = Config::default();
        config.api.base_url = BASE_URL.to_string();
        let api = ApiClient::new(transport.clone(), &config, session.clone());

        Self {
            transport,
            store,
            session,
            gateway: AuthGateway::new(api.clone()),
            users: UserDirectory::new(api),
        }
    }

    /// Harness with a session already active for `user`.
    pub fn signed_in(token: &str, user: Value) -> Self {
        let harness = Self::new();
        harness
            .session
            .set(BearerToken::new(token), user_from(user))
            .expect("seed session");
        harness
    }

    pub fn persisted(&self, key: &str) -> Option<String> {
        self.store.get(key).expect("read store")
    }
}

pub fn user_from(value: Value) -> User {
    serde_json::from_value(value).expect("user fixture")
}

pub fn admin_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Admin",
        "email": "admin@example.com",
        "isActive": true,
        "isAdministrator": true
    })
}

pub fn member_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Member",
        "email": "member@example.com",
        "isActive": true,
        "isAdministrator": false
    })
}

pub fn bearer_of(request: &HttpRequest) -> Option<&str> {
    request.bearer.as_ref().map(BearerToken::as_str)
}
