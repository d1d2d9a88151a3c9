// Session token ownership and the login handshake.
//
// The controller issues an opaque `CID` at login and expects it on every
// later call. This module holds exactly one live token, performs the login
// form POST, and serializes re-authentication so concurrent callers that
// see expiry at the same time trigger a single login.

use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, preview};
use crate::request::{LoginRequest, LoginResponse};
use crate::transport::{Transport, Verb};

/// Username/password pair used for every login.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Holds the current session token and knows how to obtain a new one.
#[derive(Debug)]
pub struct Session {
    credentials: Credentials,
    login_url: Url,
    token: RwLock<Option<String>>,
    /// Held across the read-token / login / write-token sequence.
    refresh_lock: Mutex<()>,
}

impl Session {
    /// Create a session that has not logged in yet.
    pub fn new(credentials: Credentials, login_url: Url) -> Self {
        Self {
            credentials,
            login_url,
            token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Create a session around a token obtained elsewhere.
    pub fn with_token(credentials: Credentials, login_url: Url, token: String) -> Self {
        let session = Self::new(credentials, login_url);
        session.store(token);
        session
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// The current token. Fails fast before the first successful login.
    pub fn token(&self) -> Result<String, Error> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::NotAuthenticated)
    }

    /// Whether a token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn store(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Log in with the stored credentials and keep the issued token.
    ///
    /// `POST {base}` with `action=login&username=..&password=..`. The
    /// response is decoded directly; this call is never retried.
    pub async fn login(&self, transport: &Transport) -> Result<(), Error> {
        let token = self.request_token(transport).await?;
        self.store(token);
        Ok(())
    }

    /// Replace a token the controller rejected as expired.
    ///
    /// `stale` is the token the failed request carried. If another caller
    /// already refreshed it, the newer token is returned without a second
    /// login.
    pub async fn refresh(&self, transport: &Transport, stale: &str) -> Result<String, Error> {
        let _guard = self.refresh_lock.lock().await;

        if let Ok(current) = self.token() {
            if current != stale {
                debug!("session token already refreshed by another caller");
                return Ok(current);
            }
        }

        debug!(username = %self.credentials.username, "re-authenticating (expired CID)");
        let token = self.request_token(transport).await?;
        self.store(token.clone());
        Ok(token)
    }

    async fn request_token(&self, transport: &Transport) -> Result<String, Error> {
        debug!(username = %self.credentials.username, "logging in at {}", self.login_url);

        let form = LoginRequest {
            action: "login",
            username: &self.credentials.username,
            password: self.credentials.password.expose_secret(),
        };
        trace!(?form, "login form");

        let resp = transport
            .execute(Verb::Post, self.login_url.clone(), Some(&form))
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = readable_body(resp.text().await);
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        if !login.success {
            return Err(Error::Authentication {
                message: if login.reason.is_empty() {
                    "controller rejected login without a reason".into()
                } else {
                    login.reason
                },
            });
        }
        if login.cid.is_empty() {
            return Err(Error::Authentication {
                message: "controller accepted login but issued no CID".into(),
            });
        }

        debug!("login successful");
        Ok(login.cid)
    }
}

/// Body text for an error message; a read failure is reported in its place.
fn readable_body<E: std::fmt::Display>(body: Result<String, E>) -> String {
    body.unwrap_or_else(|e| format!("<body unreadable: {e}>"))
}
