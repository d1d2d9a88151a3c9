//! Cloud account command handlers.

use avx_api::{Account, Client};
use tabled::Tabled;

use crate::cli::{AccountCreateArgs, AccountsArgs, AccountsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Cloud")]
    cloud: String,
    #[tabled(rename = "Account")]
    number: String,
}

impl From<&Account> for AccountRow {
    fn from(a: &Account) -> Self {
        Self {
            name: a.account_name.clone(),
            cloud: cloud_name(a.cloud_type).into(),
            number: cloud_account_id(a).unwrap_or("-").into(),
        }
    }
}

fn cloud_name(cloud_type: Option<u32>) -> &'static str {
    match cloud_type {
        Some(1) => "AWS",
        Some(4) => "GCP",
        Some(8) => "Azure",
        Some(16) => "OCI",
        Some(256) => "AWS GovCloud",
        Some(1024) => "AWS China",
        Some(2048) => "Azure China",
        Some(_) => "other",
        None => "-",
    }
}

fn cloud_account_id(a: &Account) -> Option<&str> {
    a.aws_account_number
        .as_deref()
        .or(a.arm_subscription_id.as_deref())
        .or(a.awsgov_account_number.as_deref())
        .or(a.awschina_account_number.as_deref())
        .or(a.azurechina_subscription_id.as_deref())
}

fn detail(a: &Account) -> String {
    let mut lines = vec![
        format!("Name:       {}", a.account_name),
        format!("Cloud:      {}", cloud_name(a.cloud_type)),
        format!("Account:    {}", util::or_dash(cloud_account_id(a))),
    ];
    if let Some(ref iam) = a.aws_iam {
        lines.push(format!("IAM roles:  {iam}"));
    }
    if let Some(ref arn) = a.aws_role_app {
        lines.push(format!("App role:   {arn}"));
    }
    if let Some(ref arn) = a.aws_role_ec2 {
        lines.push(format!("EC2 role:   {arn}"));
    }
    if let Some(ref key) = a.aws_access_key {
        lines.push(format!("Access key: {key}"));
    }
    lines.join("\n")
}

// ── Create ──────────────────────────────────────────────────────────

fn account_from_args(args: AccountCreateArgs) -> Result<Account, CliError> {
    let mut aws_secret_key = args.aws_secret_key;
    if args.aws_access_key.is_some() && aws_secret_key.is_none() {
        aws_secret_key = Some(util::prompt_secret("AWS secret key: ", "aws-secret-key")?);
    }

    // The controller reads aws_iam as "true"/"false" for AWS accounts only.
    let aws_iam = args
        .aws_account_number
        .is_some()
        .then(|| args.aws_iam.to_string());

    Ok(Account {
        cloud_type: Some(args.cloud_type),
        aws_account_number: args.aws_account_number,
        aws_iam,
        aws_access_key: args.aws_access_key,
        aws_secret_key,
        aws_role_app: args.aws_role_arn,
        aws_role_ec2: args.aws_role_ec2,
        arm_subscription_id: args.arm_subscription_id,
        arm_application_endpoint: args.arm_tenant_id,
        arm_application_client_id: args.arm_client_id,
        arm_application_client_secret: args.arm_client_secret,
        ..Account::new(args.name)
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &Client,
    args: AccountsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AccountsCommand::List => {
            let accounts = client.list_accounts().await?;
            let out = output::render_list(
                &global.output,
                &accounts,
                |a| AccountRow::from(a),
                |a| a.account_name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AccountsCommand::Get { name } => {
            let account = client.get_account(&name).await?;
            let out = output::render_single(&global.output, &account, detail, |a| {
                a.account_name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AccountsCommand::Create(create) => {
            let mut account = account_from_args(create)?;
            client.create_account(&mut account).await?;
            output::status(
                &format!("Account '{}' created", account.account_name),
                global.quiet,
            );
            Ok(())
        }

        AccountsCommand::Delete { name } => {
            if !util::confirm(
                &format!("Delete account '{name}'? Gateways using it must be removed first."),
                "accounts delete",
                global.yes,
            )? {
                return Ok(());
            }
            client.delete_account(&name).await?;
            output::status(&format!("Account '{name}' deleted"), global.quiet);
            Ok(())
        }
    }
}
