//! Admin email command handlers.

use avx_api::{AdminEmailInfo, Client};
use secrecy::ExposeSecret;

use crate::cli::{AdminEmailArgs, AdminEmailCommand, GlobalOpts};
use crate::config::ControllerSettings;
use crate::error::CliError;
use crate::output;

fn detail(info: &AdminEmailInfo) -> String {
    format!(
        "Admin email:   {}\nInitial setup: {}",
        if info.admin_email.is_empty() {
            "(not set)"
        } else {
            &info.admin_email
        },
        if info.initial_setup { "pending" } else { "done" },
    )
}

/// `get` authenticates with the profile's credentials on the setup backend
/// and needs no session; `set` goes through the normal session.
pub async fn handle(
    client: &Client,
    settings: &ControllerSettings,
    args: AdminEmailArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AdminEmailCommand::Set { email } => {
            client.login().await?;
            client.set_admin_email(&email).await?;
            output::status(&format!("Admin email set to {email}"), global.quiet);
            Ok(())
        }

        AdminEmailCommand::Get => {
            let info = client
                .admin_email(&settings.username, settings.password.expose_secret())
                .await?;
            let out = output::render_single(&global.output, &info, detail, |i| {
                i.admin_email.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
