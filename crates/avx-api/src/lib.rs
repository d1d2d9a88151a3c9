//! Async client for the Aviatrix controller management API.
//!
//! The controller speaks a small RPC-over-HTTP dialect: every call names an
//! `action`, carries the session token as `CID`, and answers with a JSON
//! envelope `{ "return": bool, "reason": string, "results": any }`. Failures,
//! including an expired session, arrive inside HTTP 200 bodies.
//!
//! [`Client`] owns the session, re-authenticates transparently when the
//! controller reports the token expired, and exposes typed entity calls:
//!
//! - cloud accounts ([`Client::create_account`], [`Client::list_accounts`], ..)
//! - account users ([`Client::create_account_user`], [`Client::get_account_user`], ..)
//! - admin email ([`Client::set_admin_email`], [`Client::admin_email`])
//!
//! ```no_run
//! # async fn demo() -> Result<(), avx_api::Error> {
//! let client = avx_api::Client::connect("admin", "secret".to_string(), "10.0.0.5").await?;
//! for account in client.list_accounts().await? {
//!     println!("{}", account.account_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod account_users;
pub mod accounts;
pub mod admin;
pub mod client;
pub mod error;
pub mod request;
pub mod session;
pub mod transport;

pub use account_users::{AccountUser, AccountUserEdit};
pub use accounts::Account;
pub use admin::AdminEmailInfo;
pub use client::{Client, ClientBuilder, RetryPolicy, SESSION_EXPIRED_REASON};
pub use error::Error;
pub use request::{ApiRequest, Envelope, SessionToken};
pub use session::{Credentials, Session};
pub use transport::{TlsMode, Transport, TransportConfig, Verb};
