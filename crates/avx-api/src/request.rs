// Request and response envelope types shared by every controller action.
//
// Every request the orchestrator sends carries the session token in a field
// serialized as `CID`. The `SessionToken` trait exposes that field so the
// orchestrator can re-stamp it after a re-login without knowing the type.

use serde::{Deserialize, Deserializer, Serialize};

/// Access to the session token field of a request object.
///
/// Implement with [`impl_session_token!`](crate::impl_session_token) for any
/// struct with a `cid: String` field.
pub trait SessionToken {
    fn session_token(&self) -> &str;
    fn set_session_token(&mut self, token: String);
}

/// Implement [`SessionToken`] for structs that store the token in `cid`.
#[macro_export]
macro_rules! impl_session_token {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::SessionToken for $ty {
                fn session_token(&self) -> &str {
                    &self.cid
                }

                fn set_session_token(&mut self, token: String) {
                    self.cid = token;
                }
            }
        )+
    };
}

/// The minimal request: just a token and an action name.
///
/// Used directly by list-style calls that take no parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiRequest {
    #[serde(rename = "CID")]
    pub cid: String,
    pub action: String,
}

impl ApiRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            cid: String::new(),
            action: action.into(),
        }
    }
}

impl_session_token!(ApiRequest);

/// The uniform `{ return, reason, results }` wrapper around every response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Envelope<T = serde_json::Value> {
    #[serde(rename = "return")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reason: String,
    pub results: Option<T>,
}

impl<T> Envelope<T> {
    /// Map the payload, keeping the status fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            reason: self.reason,
            results: self.results.map(f),
        }
    }
}

/// Login form: `action=login&username=..&password=..`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub action: &'static str,
    pub username: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("action", &self.action)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Login response; the token arrives in `CID`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(rename = "return")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reason: String,
    #[serde(rename = "CID", default, deserialize_with = "null_as_empty")]
    pub cid: String,
}

/// Controllers send `"reason": null` on some successful replies.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
