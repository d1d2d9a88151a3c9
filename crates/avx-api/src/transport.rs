// Raw HTTP verb execution against the controller.
//
// Builds one request, form-encodes an optional payload, and executes it on
// a `reqwest::Client`. No envelope handling and no retries here -- those
// belong to the orchestrator in `client.rs`.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP verbs understood by the controller API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    /// The controller expects deletions as `GET` with the action in the
    /// query string, so this never reaches the wire as `DELETE`.
    Delete,
}

impl Verb {
    /// Read-style verbs carry their parameters in the query string.
    pub fn is_read(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }

    /// The method actually sent on the wire.
    pub fn wire_method(self) -> reqwest::Method {
        match self {
            Self::Get | Self::Delete => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (controllers ship self-signed by default).
    #[default]
    DangerAcceptInvalid,
}

/// Settings for building the HTTP client when none is injected.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("avx-api/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Executes single HTTP calls against the controller.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
}

impl Transport {
    /// Wrap an existing HTTP client (injected for tests or custom TLS).
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Build a transport from config.
    pub fn from_config(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::new(config.build_client()?))
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send one request.
    ///
    /// With a payload, the body is the form encoding of `payload` and the
    /// content type is `application/x-www-form-urlencoded`. Without one the
    /// request is bodyless and `url` is sent as-is.
    pub async fn execute<P>(
        &self,
        verb: Verb,
        url: Url,
        payload: Option<&P>,
    ) -> Result<reqwest::Response, Error>
    where
        P: Serialize + ?Sized,
    {
        debug!("{verb} {}", redact_query(&url));

        let mut builder = self.http.request(verb.wire_method(), url);
        if let Some(payload) = payload {
            let body = encode_form(payload)?;
            trace!(bytes = body.len(), "form body encoded");
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
                .body(body);
        }

        builder.send().await.map_err(Error::Transport)
    }
}

/// Form-encode a payload using its serde field names.
pub fn encode_form<P: Serialize + ?Sized>(payload: &P) -> Result<String, Error> {
    serde_urlencoded::to_string(payload).map_err(|e| Error::Encoding(e.to_string()))
}

/// Copy of `url` with the query string replaced by `payload`'s encoding.
pub fn with_query<P: Serialize + ?Sized>(url: &Url, payload: &P) -> Result<Url, Error> {
    let query = encode_form(payload)?;
    let mut url = url.clone();
    url.set_query(if query.is_empty() { None } else { Some(&query) });
    Ok(url)
}

/// Strip credential-bearing query values before the URL hits the logs.
fn redact_query(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if matches!(k.as_ref(), "CID" | "password") {
                "***".to_owned()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Probe<'a> {
        #[serde(rename = "CID")]
        cid: &'a str,
        action: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<&'a str>,
    }

    #[test]
    fn delete_goes_out_as_get() {
        assert_eq!(Verb::Delete.wire_method(), reqwest::Method::GET);
        assert!(Verb::Delete.is_read());
        assert!(!Verb::Put.is_read());
        assert_eq!(Verb::Delete.to_string(), "DELETE");
    }

    #[test]
    fn form_encoding_uses_serde_names() {
        let body = encode_form(&Probe {
            cid: "abc",
            action: "list accounts",
            note: None,
        })
        .unwrap();
        insta::assert_snapshot!(body, @"CID=abc&action=list+accounts");
    }

    #[test]
    fn query_replaces_existing_query() {
        let base = Url::parse("https://10.0.0.1/v1/api?stale=1").unwrap();
        let url = with_query(
            &base,
            &Probe {
                cid: "abc",
                action: "x",
                note: Some("a&b"),
            },
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://10.0.0.1/v1/api?CID=abc&action=x&note=a%26b"
        );
    }

    #[test]
    fn logged_urls_hide_the_session_token() {
        let url = Url::parse("https://10.0.0.1/v1/api?CID=secret&action=list").unwrap();
        let shown = redact_query(&url);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("action=list"));
    }
}
