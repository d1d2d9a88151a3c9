//! Clap derive structures for the `avxctl` CLI.
//!
//! Defines the command tree, global flags, and shared types. This file is
//! also compiled by `build.rs` for man page generation, so it may only use
//! `clap` and `clap_complete`.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// avxctl -- manage Aviatrix controllers from the command line
#[derive(Debug, Parser)]
#[command(
    name = "avxctl",
    version,
    about = "Manage Aviatrix controller accounts and users from the command line",
    long_about = "A CLI for administering Aviatrix cloud-networking controllers.\n\n\
        Sessions are established with username/password and refreshed\n\
        automatically when the controller expires them.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "AVX_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller IP address or hostname (overrides profile)
    #[arg(long, short = 'c', env = "AVX_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Login username (overrides profile)
    #[arg(long, short = 'u', env = "AVX_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AVX_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "AVX_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "AVX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage cloud account profiles
    #[command(alias = "acct", alias = "a")]
    Accounts(AccountsArgs),

    /// Manage account users
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Set or read the controller admin email
    AdminEmail(AdminEmailArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AccountsArgs {
    #[command(subcommand)]
    pub command: AccountsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// List cloud account profiles
    #[command(alias = "ls")]
    List,

    /// Show one account profile
    Get {
        /// Account name
        name: String,
    },

    /// Create a cloud account profile
    Create(AccountCreateArgs),

    /// Delete an account profile
    #[command(alias = "rm")]
    Delete {
        /// Account name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct AccountCreateArgs {
    /// Account name
    pub name: String,

    /// Cloud type (1 = AWS, 8 = Azure ARM, 256 = AWS GovCloud)
    #[arg(long, default_value = "1")]
    pub cloud_type: u32,

    /// AWS account number
    #[arg(long)]
    pub aws_account_number: Option<String>,

    /// Use IAM roles instead of access keys
    #[arg(long)]
    pub aws_iam: bool,

    /// AWS access key (when not using IAM roles)
    #[arg(long)]
    pub aws_access_key: Option<String>,

    /// AWS secret key (prompted when an access key is given without it)
    #[arg(long, hide_env_values = true, env = "AVX_AWS_SECRET_KEY")]
    pub aws_secret_key: Option<String>,

    /// AWS app role ARN
    #[arg(long)]
    pub aws_role_arn: Option<String>,

    /// AWS EC2 role ARN
    #[arg(long)]
    pub aws_role_ec2: Option<String>,

    /// Azure ARM subscription ID
    #[arg(long)]
    pub arm_subscription_id: Option<String>,

    /// Azure directory (tenant) ID
    #[arg(long)]
    pub arm_tenant_id: Option<String>,

    /// Azure application client ID
    #[arg(long)]
    pub arm_client_id: Option<String>,

    /// Azure application client secret
    #[arg(long, hide_env_values = true, env = "AVX_ARM_CLIENT_SECRET")]
    pub arm_client_secret: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List account users
    #[command(alias = "ls")]
    List {
        /// Only show users of this account
        #[arg(long, short = 'a')]
        account: Option<String>,
    },

    /// Show one user
    Get {
        /// Username
        username: String,

        /// Account the user belongs to
        #[arg(long, short = 'a')]
        account: Option<String>,
    },

    /// Add a user to an account
    Create {
        /// Username
        username: String,

        /// Account the user belongs to
        #[arg(long, short = 'a')]
        account: String,

        /// User email address
        #[arg(long, short = 'e')]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, hide_env_values = true, env = "AVX_USER_PASSWORD")]
        password: Option<String>,
    },

    /// Change a user's account, email, or password
    Update(UserUpdateArgs),

    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        /// Username
        username: String,
    },
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("change").required(true).multiple(false)))]
pub struct UserUpdateArgs {
    /// Username
    pub username: String,

    /// Move the user to this account
    #[arg(long, short = 'a', group = "change")]
    pub account: Option<String>,

    /// Set a new email address
    #[arg(long, short = 'e', group = "change")]
    pub email: Option<String>,

    /// Change the password (prompts for old and new)
    #[arg(long, group = "change")]
    pub password: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ADMIN EMAIL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AdminEmailArgs {
    #[command(subcommand)]
    pub command: AdminEmailCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminEmailCommand {
    /// Set the admin email address
    Set {
        /// Email address
        email: String,
    },

    /// Show the admin email address
    Get,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
