// Cloud account endpoints
//
// Account profiles are created and edited with form POSTs, listed with
// `list_accounts`, and deleted with a GET carrying the account name in the
// query string.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{Client, find_entry};
use crate::error::Error;
use crate::impl_session_token;
use crate::request::ApiRequest;
use crate::transport::Verb;

/// A cloud account profile.
///
/// Form field names (sent) and JSON field names (received from
/// `list_accounts`) differ for several fields; both are encoded here.
/// Empty fields are left out of the form body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(
        rename(serialize = "CID"),
        skip_deserializing,
        skip_serializing_if = "String::is_empty"
    )]
    pub cid: String,
    #[serde(skip_deserializing, skip_serializing_if = "String::is_empty")]
    pub action: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_type: Option<u32>,

    // ── AWS ──
    #[serde(
        rename(serialize = "aws_account_number", deserialize = "account_number"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aws_account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_iam: Option<String>,
    #[serde(
        rename(serialize = "aws_access_key", deserialize = "account_access_key"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aws_access_key: Option<String>,
    #[serde(
        rename(serialize = "aws_secret_key", deserialize = "account_secret_access_key"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aws_secret_key: Option<String>,
    #[serde(
        rename = "aws_role_arn",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aws_role_app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_role_ec2: Option<String>,

    // ── Azure ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_subscription_id: Option<String>,
    #[serde(
        rename(serialize = "arm_application_endpoint", deserialize = "arm_ad_tenant_id"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub arm_application_endpoint: Option<String>,
    #[serde(
        rename(serialize = "arm_application_client_id", deserialize = "arm_ad_client_id"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub arm_application_client_id: Option<String>,
    #[serde(
        rename(
            serialize = "arm_application_client_secret",
            deserialize = "arm_ad_client_secret"
        ),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub arm_application_client_secret: Option<String>,

    // ── AWS GovCloud ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awsgov_account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awsgov_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awsgov_secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awsgov_cloudtrail_bucket: Option<String>,

    // ── China regions ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azurechina_subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awschina_account_number: Option<String>,
    #[serde(
        rename(serialize = "awschina_access_key", deserialize = "awschinacloud_access_key"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub awschina_access_key: Option<String>,
    #[serde(
        rename(serialize = "awschina_secret_key", deserialize = "awschinacloud_secret_key"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub awschina_secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_china_subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_china_application_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_china_application_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_china_application_client_secret: Option<String>,
}

impl Account {
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            ..Self::default()
        }
    }
}

/// `results` of `list_accounts`.
#[derive(Debug, Default, Deserialize)]
struct AccountList {
    #[serde(default)]
    account_list: Vec<Account>,
}

#[derive(Debug, Serialize)]
struct DeleteAccountRequest {
    #[serde(rename = "CID")]
    cid: String,
    action: &'static str,
    account_name: String,
}

impl_session_token!(Account, DeleteAccountRequest);

impl Client {
    /// Provision a cloud account profile.
    ///
    /// `POST action=setup_account_profile`
    pub async fn create_account(&self, account: &mut Account) -> Result<(), Error> {
        account.action = "setup_account_profile".into();
        debug!(account_name = %account.account_name, "creating account");
        self.perform(Verb::Post, account).await
    }

    /// List all cloud account profiles.
    ///
    /// `GET ?action=list_accounts`
    pub async fn list_accounts(&self) -> Result<Vec<Account>, Error> {
        let mut req = ApiRequest::new("list_accounts");
        let list: AccountList = self
            .execute(Verb::Get, &mut req)
            .await?
            .results
            .unwrap_or_default();
        Ok(list.account_list)
    }

    /// Find the account profile named `account_name`.
    ///
    /// Returns [`Error::NotFound`] when no profile has that name.
    pub async fn get_account(&self, account_name: &str) -> Result<Account, Error> {
        let accounts = self.list_accounts().await?;
        let account = find_entry(accounts, "account", account_name, |a| {
            a.account_name == account_name
        })?;
        debug!(account_name, "found account");
        Ok(account)
    }

    /// Edit an existing account profile.
    ///
    /// `POST action=edit_account_profile`
    pub async fn update_account(&self, account: &mut Account) -> Result<(), Error> {
        account.action = "edit_account_profile".into();
        debug!(account_name = %account.account_name, "updating account");
        self.perform(Verb::Post, account).await
    }

    /// Delete an account profile by name.
    ///
    /// `GET ?action=delete_account_profile&account_name=..`
    pub async fn delete_account(&self, account_name: &str) -> Result<(), Error> {
        debug!(account_name, "deleting account");
        let mut req = DeleteAccountRequest {
            cid: String::new(),
            action: "delete_account_profile",
            account_name: account_name.to_owned(),
        };
        self.perform(Verb::Delete, &mut req).await
    }
}
