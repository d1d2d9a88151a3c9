// Admin email endpoints

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, preview};
use crate::impl_session_token;
use crate::transport::Verb;

#[derive(Debug, Serialize)]
struct AdminEmailRequest {
    #[serde(rename = "CID")]
    cid: String,
    action: &'static str,
    admin_email: String,
}

impl_session_token!(AdminEmailRequest);

/// Form for the setup backend; it authenticates with credentials, not a CID.
#[derive(Serialize)]
struct LoginProcRequest<'a> {
    action: &'static str,
    username: &'a str,
    password: &'a str,
}

/// Setup state reported by the controller's `login_proc` backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEmailInfo {
    #[serde(default)]
    pub admin_email: String,
    #[serde(default)]
    pub initial_setup: bool,
}

impl Client {
    /// Set the controller's admin email address.
    ///
    /// `GET ?action=add_admin_email_addr&admin_email=..`
    pub async fn set_admin_email(&self, email: &str) -> Result<(), Error> {
        debug!(email, "setting admin email");
        let mut req = AdminEmailRequest {
            cid: String::new(),
            action: "add_admin_email_addr",
            admin_email: email.to_owned(),
        };
        self.perform(Verb::Get, &mut req).await
    }

    /// Read the admin email address via the setup backend.
    ///
    /// Posts `action=login_proc` with the given credentials to the
    /// `backend1` endpoint next to the API path. The answer is a bare JSON
    /// object rather than the usual envelope, so this bypasses the
    /// orchestrator and does not need a session.
    pub async fn admin_email(&self, username: &str, password: &str) -> Result<AdminEmailInfo, Error> {
        let url = self.base_url().join("backend1")?;
        debug!("getting admin email from {url}");

        let form = LoginProcRequest {
            action: "login_proc",
            username,
            password,
        };
        let resp = self.transport().execute(Verb::Post, url, Some(&form)).await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        match serde_json::from_str(&body) {
            Ok(info) => Ok(info),
            Err(e) => Err(Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body,
            }),
        }
    }
}
