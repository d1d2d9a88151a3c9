//! Account user command handlers.

use avx_api::{AccountUser, AccountUserEdit, Client};
use tabled::Tabled;

use crate::cli::{GlobalOpts, UserUpdateArgs, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&AccountUser> for UserRow {
    fn from(u: &AccountUser) -> Self {
        Self {
            username: u.username.clone(),
            account: u.account_name.clone(),
            email: u.email.clone(),
        }
    }
}

fn detail(u: &AccountUser) -> String {
    [
        format!("Username: {}", u.username),
        format!("Account:  {}", util::or_dash(Some(u.account_name.as_str()))),
        format!("Email:    {}", util::or_dash(Some(u.email.as_str()))),
    ]
    .join("\n")
}

fn edit_from_args(args: UserUpdateArgs) -> Result<AccountUserEdit, CliError> {
    if let Some(account) = args.account {
        return Ok(AccountUserEdit::account_name(args.username, account));
    }
    if let Some(email) = args.email {
        return Ok(AccountUserEdit::email(args.username, email));
    }
    let old = util::prompt_secret("Current password: ", "password")?;
    let new = util::prompt_secret("New password: ", "password")?;
    Ok(AccountUserEdit::password(args.username, old, new))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &Client,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List { account } => {
            let mut users = client.list_account_users().await?;
            if let Some(ref account) = account {
                users.retain(|u| &u.account_name == account);
            }
            let out = output::render_list(
                &global.output,
                &users,
                |u| UserRow::from(u),
                |u| u.username.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Get { username, account } => {
            let user = client
                .get_account_user(&username, account.as_deref())
                .await?;
            let out =
                output::render_single(&global.output, &user, detail, |u| u.username.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Create {
            username,
            account,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => util::prompt_secret("Password for new user: ", "password")?,
            };
            let mut user = AccountUser::new(username, account, email, password);
            client.create_account_user(&mut user).await?;
            output::status(
                &format!("User '{}' added to account '{}'", user.username, user.account_name),
                global.quiet,
            );
            Ok(())
        }

        UsersCommand::Update(update) => {
            let mut edit = edit_from_args(update)?;
            client.update_account_user(&mut edit).await?;
            output::status(
                &format!("User '{}' updated ({})", edit.username, edit.what),
                global.quiet,
            );
            Ok(())
        }

        UsersCommand::Delete { username } => {
            if !util::confirm(
                &format!("Delete user '{username}'?"),
                "users delete",
                global.yes,
            )? {
                return Ok(());
            }
            client.delete_account_user(&username).await?;
            output::status(&format!("User '{username}' deleted"), global.quiet);
            Ok(())
        }
    }
}
