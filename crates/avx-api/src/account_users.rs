// Account user endpoints
//
// Users are attached to one cloud account profile. Edits name the field to
// change in `what`; the helpers on `AccountUserEdit` build the three shapes
// the controller accepts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{Client, find_entry};
use crate::error::Error;
use crate::impl_session_token;
use crate::request::ApiRequest;
use crate::transport::Verb;

/// A controller user bound to a cloud account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    #[serde(
        rename(serialize = "CID"),
        skip_deserializing,
        skip_serializing_if = "String::is_empty"
    )]
    pub cid: String,
    #[serde(skip_deserializing, skip_serializing_if = "String::is_empty")]
    pub action: String,

    #[serde(
        rename(serialize = "username", deserialize = "user_name"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub username: String,
    #[serde(
        rename(serialize = "account_name", deserialize = "acct_names"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub account_name: String,
    #[serde(
        rename(serialize = "email", deserialize = "user_email"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl AccountUser {
    pub fn new(
        username: impl Into<String>,
        account_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            account_name: account_name.into(),
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }
}

/// Edit request for an existing user. `what` names the field being changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountUserEdit {
    #[serde(rename = "CID", skip_serializing_if = "String::is_empty")]
    pub cid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub what: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub old_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub new_password: String,
}

impl AccountUserEdit {
    /// Move a user to another account.
    pub fn account_name(username: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            account_name: account_name.into(),
            what: "account_name".into(),
            ..Self::default()
        }
    }

    /// Change a user's email address.
    pub fn email(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            what: "email".into(),
            ..Self::default()
        }
    }

    /// Change a user's password.
    pub fn password(
        username: impl Into<String>,
        old_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            old_password: old_password.into(),
            new_password: new_password.into(),
            what: "password".into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct DeleteAccountUserRequest {
    #[serde(rename = "CID")]
    cid: String,
    action: &'static str,
    username: String,
}

impl_session_token!(AccountUser, AccountUserEdit, DeleteAccountUserRequest);

impl Client {
    /// Add a user to the controller.
    ///
    /// `POST action=add_account_user`
    pub async fn create_account_user(&self, user: &mut AccountUser) -> Result<(), Error> {
        user.action = "add_account_user".into();
        debug!(username = %user.username, account = %user.account_name, "creating account user");
        self.perform(Verb::Post, user).await
    }

    /// List every user on the controller.
    ///
    /// `GET ?action=list_account_users`
    pub async fn list_account_users(&self) -> Result<Vec<AccountUser>, Error> {
        let mut req = ApiRequest::new("list_account_users");
        Ok(self
            .execute(Verb::Get, &mut req)
            .await?
            .results
            .unwrap_or_default())
    }

    /// Find a user by name, optionally restricted to one account.
    ///
    /// Both keys must match exactly. Returns [`Error::NotFound`] when no
    /// user matches.
    pub async fn get_account_user(
        &self,
        username: &str,
        account_name: Option<&str>,
    ) -> Result<AccountUser, Error> {
        let users = self.list_account_users().await?;
        let user = find_entry(users, "account user", username, |u| {
            u.username == username && account_name.is_none_or(|a| u.account_name == a)
        })?;
        debug!(username, "found account user");
        Ok(user)
    }

    /// Apply an edit to an existing user.
    ///
    /// `POST action=edit_account_user`
    pub async fn update_account_user(&self, edit: &mut AccountUserEdit) -> Result<(), Error> {
        edit.action = "edit_account_user".into();
        debug!(username = %edit.username, what = %edit.what, "updating account user");
        self.perform(Verb::Post, edit).await
    }

    /// Remove a user by name.
    ///
    /// `GET ?action=delete_account_user&username=..`
    pub async fn delete_account_user(&self, username: &str) -> Result<(), Error> {
        debug!(username, "deleting account user");
        let mut req = DeleteAccountUserRequest {
            cid: String::new(),
            action: "delete_account_user",
            username: username.to_owned(),
        };
        self.perform(Verb::Delete, &mut req).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::transport::encode_form;

    #[test]
    fn list_entries_use_json_field_names() {
        let users: Vec<AccountUser> = serde_json::from_value(json!([
            { "user_name": "user1", "acct_names": "acct1", "user_email": "user1@example.com" },
            { "user_name": "user2", "acct_names": "acct1", "user_email": "user2@example.com" }
        ]))
        .unwrap();
        assert_eq!(users[1].username, "user2");
        assert_eq!(users[1].account_name, "acct1");
        assert_eq!(users[1].email, "user2@example.com");
    }

    #[test]
    fn create_form_uses_form_field_names() {
        let mut user = AccountUser::new("api_user1", "devtest", "api_user1@test.com", "test123!");
        user.cid = "57e098ed708a8".into();
        user.action = "add_account_user".into();
        assert_eq!(
            encode_form(&user).unwrap(),
            "CID=57e098ed708a8&action=add_account_user&username=api_user1\
             &account_name=devtest&email=api_user1%40test.com&password=test123%21"
        );
    }

    #[test]
    fn edit_helpers_set_what() {
        let edit = AccountUserEdit::account_name("api_user1", "devtest");
        assert_eq!(edit.what, "account_name");
        assert_eq!(
            encode_form(&edit).unwrap(),
            "username=api_user1&account_name=devtest&what=account_name"
        );

        let edit = AccountUserEdit::password("api_user1", "old", "new");
        assert_eq!(edit.what, "password");
        assert_eq!(edit.new_password, "new");
    }
}
