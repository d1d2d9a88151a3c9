mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let output_from_config = matches!(
        matches.value_source("output"),
        Some(ValueSource::DefaultValue) | None
    );

    init_tracing(cli.global.verbose);

    if let Err(err) = start(cli, output_from_config).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `[defaults] output` applies when neither `--output` nor `AVX_OUTPUT` is set.
fn apply_default_output(cli: &mut Cli) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    cli.global.output = config::default_output(&cfg)?;
    Ok(())
}

async fn start(mut cli: Cli, output_from_config: bool) -> Result<(), CliError> {
    if output_from_config {
        apply_default_output(&mut cli)?;
    }
    run(cli).await
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a controller connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "avxctl", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let settings = config::resolve_settings(&cli.global)?;
            tracing::debug!(controller = %settings.controller, "resolved controller settings");

            let client = settings.clone().into_builder().build().await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &client, &settings, &cli.global).await
        }
    }
}
