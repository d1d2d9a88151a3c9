// Controller client: construction and the request orchestrator.
//
// `Client::execute` is the one path every entity call goes through. It
// stamps the session token, encodes the request (query string for reads,
// form body for writes), decodes the `{return, reason, results}` envelope,
// and re-authenticates once when the controller reports the token expired
// inside an HTTP 200 body. Entity endpoints live in sibling modules as
// inherent methods.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, preview};
use crate::request::{Envelope, SessionToken};
use crate::session::{Credentials, Session};
use crate::transport::{self, TlsMode, Transport, TransportConfig, Verb};

/// Reason string the controller uses for an invalid or expired `CID`.
pub const SESSION_EXPIRED_REASON: &str = "CID is invalid or expired.";

/// Bounds for the two independent retry loops of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total send attempts on transient transport failures (not retries).
    pub transport_attempts: u32,
    /// Re-login cycles allowed when the controller reports an expired CID.
    pub reauth_attempts: u32,
    /// Pause before re-logging in.
    pub relogin_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            transport_attempts: 3,
            reauth_attempts: 1,
            relogin_delay: Duration::from_millis(500),
        }
    }
}

/// Builder for [`Client`].
///
/// The controller address may be an IP or a hostname; hostnames are
/// resolved once and the base URL is formed from the IP.
pub struct ClientBuilder {
    username: String,
    password: SecretString,
    controller: String,
    base_url: Option<Url>,
    http: Option<reqwest::Client>,
    transport: TransportConfig,
    retry: RetryPolicy,
}

impl ClientBuilder {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<SecretString>,
        controller: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            controller: controller.into(),
            base_url: None,
            http: None,
            transport: TransportConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API endpoint (defaults to `https://{ip}/v1/api`).
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Use a pre-built HTTP client. TLS and timeout settings are ignored.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn tls(mut self, tls: TlsMode) -> Self {
        self.transport.tls = tls;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport.user_agent = user_agent.into();
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolve the controller and build the client without logging in.
    pub async fn build(self) -> Result<Client, Error> {
        if self.username.is_empty() {
            return Err(Error::Config {
                message: "username must not be empty".into(),
            });
        }

        let controller_ip = resolve_controller(&self.controller).await?;
        let base_url = match self.base_url {
            Some(url) => url,
            None => default_base_url(controller_ip)?,
        };

        let transport = match self.http {
            Some(http) => Transport::new(http),
            None => Transport::from_config(&self.transport)?,
        };

        let session = Session::new(
            Credentials {
                username: self.username,
                password: self.password,
            },
            base_url.clone(),
        );

        Ok(Client {
            transport,
            session,
            base_url,
            controller_ip,
            retry: self.retry,
        })
    }

    /// Resolve, build, and log in. No client is returned if login fails.
    pub async fn connect(self) -> Result<Client, Error> {
        let client = self.build().await?;
        client.login().await?;
        Ok(client)
    }
}

/// Resolve an IP literal or hostname to a single address.
async fn resolve_controller(controller: &str) -> Result<IpAddr, Error> {
    let controller = controller.trim();
    if controller.is_empty() {
        return Err(Error::Config {
            message: "controller address must not be empty".into(),
        });
    }
    if let Ok(ip) = controller.parse::<IpAddr>() {
        return Ok(ip);
    }

    debug!(controller, "resolving controller hostname");
    let addrs: Vec<IpAddr> = tokio::net::lookup_host((controller, 443))
        .await
        .map_err(|e| Error::Config {
            message: format!("controller '{controller}' not found: {e}"),
        })?
        .map(|addr| addr.ip())
        .collect();

    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| Error::Config {
            message: format!("controller '{controller}' resolved to no addresses"),
        })
}

fn default_base_url(ip: IpAddr) -> Result<Url, Error> {
    let host = match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    };
    Ok(Url::parse(&format!("https://{host}/v1/api"))?)
}

/// Async client for the controller management API.
///
/// `Send + Sync`; share it behind an `Arc` for concurrent callers.
#[derive(Debug)]
pub struct Client {
    transport: Transport,
    session: Session,
    base_url: Url,
    controller_ip: IpAddr,
    retry: RetryPolicy,
}

impl Client {
    /// Shorthand for `ClientBuilder::new(..).connect()`.
    pub async fn connect(
        username: impl Into<String>,
        password: impl Into<SecretString>,
        controller: impl Into<String>,
    ) -> Result<Self, Error> {
        ClientBuilder::new(username, password, controller)
            .connect()
            .await
    }

    pub fn builder(
        username: impl Into<String>,
        password: impl Into<SecretString>,
        controller: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(username, password, controller)
    }

    /// The API endpoint every action is sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The resolved controller address.
    pub fn controller_ip(&self) -> IpAddr {
        self.controller_ip
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The current session token (`CID`).
    pub fn session_token(&self) -> Result<String, Error> {
        self.session.token()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Log in and store the issued session token.
    pub async fn login(&self) -> Result<(), Error> {
        self.session.login(&self.transport).await
    }

    // ── Orchestrator ─────────────────────────────────────────────────

    /// Run one controller action and decode its envelope.
    ///
    /// Stamps `req` with the current token, sends it, and returns the
    /// envelope when `return` is true. An expired-CID answer triggers at
    /// most [`RetryPolicy::reauth_attempts`] re-logins; the refreshed token
    /// is written back into `req` before resending. Any other `return=false`
    /// becomes [`Error::Api`] carrying the controller's reason.
    pub async fn execute<R, T>(&self, verb: Verb, req: &mut R) -> Result<Envelope<T>, Error>
    where
        R: Serialize + SessionToken + Send + Sync,
        T: DeserializeOwned,
    {
        req.set_session_token(self.session.token()?);
        let mut reauth_left = self.retry.reauth_attempts;

        loop {
            let resp = self.send(verb, req).await?;
            let status = resp.status();
            debug!("{verb} {}: {status}", self.base_url);

            if status != StatusCode::OK {
                return Err(Error::UnexpectedStatus {
                    status: status.as_u16(),
                });
            }

            let body = resp.text().await.map_err(Error::Transport)?;
            let envelope: Envelope = decode(&body)?;

            if envelope.success {
                return typed(envelope, &body);
            }

            if envelope.reason == SESSION_EXPIRED_REASON && reauth_left > 0 {
                reauth_left -= 1;
                warn!("controller rejected CID as expired; logging in again");
                if !self.retry.relogin_delay.is_zero() {
                    tokio::time::sleep(self.retry.relogin_delay).await;
                }
                let fresh = self
                    .session
                    .refresh(&self.transport, req.session_token())
                    .await?;
                req.set_session_token(fresh);
                continue;
            }

            return Err(Error::Api {
                reason: if envelope.reason.is_empty() {
                    "controller reported failure without a reason".into()
                } else {
                    envelope.reason
                },
            });
        }
    }

    /// Run an action and return its `results` payload.
    pub async fn call<R, T>(&self, verb: Verb, req: &mut R) -> Result<T, Error>
    where
        R: Serialize + SessionToken + Send + Sync,
        T: DeserializeOwned,
    {
        self.execute(verb, req)
            .await?
            .results
            .ok_or_else(|| Error::Deserialization {
                message: "successful response carried no results".into(),
                body: String::new(),
            })
    }

    /// Run an action whose payload the caller does not need.
    pub async fn perform<R>(&self, verb: Verb, req: &mut R) -> Result<(), Error>
    where
        R: Serialize + SessionToken + Send + Sync,
    {
        let _: Envelope = self.execute(verb, req).await?;
        Ok(())
    }

    /// Send with bounded retries on transient transport failures.
    async fn send<R: Serialize + Sync>(&self, verb: Verb, req: &R) -> Result<reqwest::Response, Error> {
        let attempts = self.retry.transport_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = if verb.is_read() {
                let url = transport::with_query(&self.base_url, req)?;
                self.transport.execute(verb, url, None::<&R>).await
            } else {
                self.transport
                    .execute(verb, self.base_url.clone(), Some(req))
                    .await
            };

            match result {
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(attempt, attempts, error = %e, "transport error; retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// Linear scan for the entry matching `matches`.
///
/// A miss (including an empty list) is [`Error::NotFound`], never
/// [`Error::Api`], so callers can tell "absent" from "request failed".
pub(crate) fn find_entry<T>(
    items: impl IntoIterator<Item = T>,
    entity: &'static str,
    key: &str,
    matches: impl Fn(&T) -> bool,
) -> Result<T, Error> {
    items
        .into_iter()
        .find(|item| matches(item))
        .ok_or_else(|| {
            debug!(entity, key, "no matching entry");
            Error::NotFound {
                entity,
                key: key.to_owned(),
            }
        })
}

fn decode(body: &str) -> Result<Envelope, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn typed<T: DeserializeOwned>(envelope: Envelope, body: &str) -> Result<Envelope<T>, Error> {
    let Envelope {
        success,
        reason,
        results,
    } = envelope;
    let results = match results {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(serde_json::from_value(value).map_err(|e| {
            Error::Deserialization {
                message: format!("unexpected results shape: {e}"),
                body: body.to_owned(),
            }
        })?),
    };
    Ok(Envelope {
        success,
        reason,
        results,
    })
}
