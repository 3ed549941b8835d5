//! Session store with change notifications
//!
//! The store owns the only copy of the current session inside a
//! `tokio::sync::watch` channel. Mutations persist first and publish
//! second, so observers never see a session the disk does not have.
//! A [`Session`] always carries both token and user, which makes a
//! half-populated session unrepresentable.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use userdesk_model::{Role, User, UserId};

use crate::errors::StorageError;
use crate::storage::{KeyValueStore, StorageResult};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Opaque bearer credential. Never printed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// User profile with its cached role.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub user: User,
    pub role: Role,
}

impl SessionUser {
    /// Derive the role from the record. Used whenever a session is set.
    pub fn derive(user: User) -> Self {
        let role = user.derived_role();
        Self { user, role }
    }
}

/// On-disk form of [`SessionUser`]: the user fields plus `role`.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedUser {
    #[serde(flatten)]
    user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

impl From<&SessionUser> for PersistedUser {
    fn from(value: &SessionUser) -> Self {
        Self {
            user: value.user.clone(),
            role: Some(value.role),
        }
    }
}

impl From<PersistedUser> for SessionUser {
    fn from(value: PersistedUser) -> Self {
        // Snapshots written without a role fall back to the admin flag.
        let role = value.role.unwrap_or_else(|| value.user.derived_role());
        Self {
            user: value.user,
            role,
        }
    }
}

/// An authenticated identity: token and user, always together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: BearerToken,
    pub user: SessionUser,
}

impl Session {
    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn user_id(&self) -> UserId {
        self.user.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }
}

/// Injectable, cloneable session store.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    sender: Arc<watch::Sender<Option<Session>>>,
    /// Serializes persist-then-publish sequences across clones.
    mutation: Arc<Mutex<()>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("storage", &self.storage)
            .field("active", &self.is_active())
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl SessionStore {
    /// New, inactive store. Call [`Self::restore`] to pick up a persisted
    /// session.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            storage,
            sender: Arc::new(sender),
            mutation: Arc::new(Mutex::new(())),
        }
    }

    /// Load the persisted session, if a complete one exists.
    ///
    /// A partial or undecodable snapshot is removed so the token/user
    /// pairing also holds on disk.
    pub fn restore(&self) -> StorageResult<Option<Session>> {
        let _guard = self.mutation.lock();
        let token = self.storage.get(TOKEN_KEY)?;
        let raw_user = self.storage.get(USER_KEY)?;

        let restored = match (token, raw_user) {
            (None, None) => None,
            (Some(token), Some(raw_user)) if !token.trim().is_empty() => {
                match serde_json::from_str::<PersistedUser>(&raw_user) {
                    Ok(persisted) => Some(Session {
                        token: BearerToken::new(token),
                        user: persisted.into(),
                    }),
                    Err(err) => {
                        warn!("discarding undecodable persisted user: {}", err);
                        self.discard_snapshot();
                        None
                    }
                }
            }
            _ => {
                warn!("discarding partial persisted session");
                self.discard_snapshot();
                None
            }
        };

        if let Some(session) = &restored {
            info!(
                user_id = session.user_id(),
                role = %session.role(),
                "restored persisted session"
            );
        }
        self.sender.send_replace(restored.clone());
        Ok(restored)
    }

    /// Populate the session from a fresh login.
    ///
    /// The role is derived here, once. Persistence happens before the new
    /// session is published; on a storage failure the previous session stays
    /// in place.
    pub fn set(
        &self,
        token: BearerToken,
        user: User,
    ) -> StorageResult<Session> {
        let session = Session {
            token,
            user: SessionUser::derive(user),
        };

        let _guard = self.mutation.lock();
        if let Err(err) = self.persist(&session) {
            warn!("failed to persist session: {}", err);
            self.restore_previous_snapshot();
            return Err(err);
        }

        info!(
            user_id = session.user_id(),
            role = %session.role(),
            "session established"
        );
        self.sender.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Drop the session. Idempotent; storage failures are logged and the
    /// in-memory session is cleared regardless.
    pub fn clear(&self) {
        let _guard = self.mutation.lock();
        self.clear_locked();
    }

    /// Global handler for an authentication rejection (HTTP 401).
    ///
    /// Only the session that owns `sent` is cleared. A rejection that lands
    /// after a newer login leaves the newer session alone. Returns whether
    /// the session was cleared.
    pub fn reject(&self, sent: &BearerToken) -> bool {
        let _guard = self.mutation.lock();
        let owns_token = self
            .sender
            .borrow()
            .as_ref()
            .is_some_and(|s| &s.token == sent);
        if !owns_token {
            debug!("ignoring rejection of a token that is no longer held");
            return false;
        }
        warn!("server rejected the session token; logging out");
        self.clear_locked();
        true
    }

    fn clear_locked(&self) {
        if let Err(err) = self.storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
            warn!("failed to remove persisted session: {}", err);
        }
        let previous = self.sender.send_replace(None);
        if previous.is_some() {
            info!("session cleared");
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    pub fn token(&self) -> Option<BearerToken> {
        self.sender.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn is_active(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Access the session without cloning.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Option<&Session>) -> R,
    {
        f(self.sender.borrow().as_ref())
    }

    /// Subscribe to session changes. Every mutation is visible to all
    /// receivers as soon as the mutating call returns.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    fn persist(&self, session: &Session) -> StorageResult<()> {
        let encoded =
            serde_json::to_string(&PersistedUser::from(&session.user))
                .map_err(StorageError::Encode)?;
        self.storage.set_all(vec![
            (TOKEN_KEY, session.token.as_str().to_string()),
            (USER_KEY, encoded),
        ])
    }

    fn discard_snapshot(&self) {
        if let Err(err) = self.storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
            warn!("failed to discard persisted session: {}", err);
        }
    }

    /// Put the currently published session back on disk after a failed
    /// write, or clear the keys if none is active.
    fn restore_previous_snapshot(&self) {
        let outcome = match self.current() {
            Some(session) => self.persist(&session),
            None => self.storage.remove_all(&[TOKEN_KEY, USER_KEY]),
        };
        if let Err(err) = outcome {
            warn!("failed to roll back persisted session: {}", err);
        }
    }
}
