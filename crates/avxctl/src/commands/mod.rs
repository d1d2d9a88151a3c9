//! Command dispatch: bridges CLI args -> client calls -> output formatting.

pub mod accounts;
pub mod admin_email;
pub mod config_cmd;
pub mod users;
pub mod util;

use avx_api::Client;

use crate::cli::{Command, GlobalOpts};
use crate::config::ControllerSettings;
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
///
/// The client arrives unauthenticated; handlers that need a session log in
/// here so `admin-email get` can run without one.
pub async fn dispatch(
    cmd: Command,
    client: &Client,
    settings: &ControllerSettings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Accounts(args) => {
            client.login().await?;
            accounts::handle(client, args, global).await
        }
        Command::Users(args) => {
            client.login().await?;
            users::handle(client, args, global).await
        }
        Command::AdminEmail(args) => admin_email::handle(client, settings, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
