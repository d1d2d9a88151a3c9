//! CLI configuration: thin wrapper around `avx_config`.
//!
//! Adds the resolution that respects `GlobalOpts` flag overrides
//! (--controller, --username, --insecure, --timeout).

use std::time::Duration;

use avx_api::TlsMode;
use clap::ValueEnum;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from the config crate ────────────────────────────────

pub use avx_config::{
    Config, ControllerSettings, Defaults, Profile, config_path, load_config_or_default,
    save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Output format from `[defaults] output`, used when `--output` is not given.
pub fn default_output(config: &Config) -> Result<OutputFormat, CliError> {
    OutputFormat::from_str(&config.defaults.output, true).map_err(|reason| {
        CliError::Validation {
            field: "defaults.output".into(),
            reason,
        }
    })
}

/// Build `ControllerSettings` from the config file, profile, and flags.
///
/// Without a matching profile, `--controller` and `--username` (or their
/// env vars) must be given and the password comes from `AVX_PASSWORD`.
pub fn resolve_settings(global: &GlobalOpts) -> Result<ControllerSettings, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut settings = match cfg.profiles.get(&profile_name) {
        Some(profile) => {
            let merged = Profile {
                controller: global
                    .controller
                    .clone()
                    .unwrap_or_else(|| profile.controller.clone()),
                username: global.username.clone().or_else(|| profile.username.clone()),
                password: profile.password.clone(),
                password_env: profile.password_env.clone(),
                ca_cert: profile.ca_cert.clone(),
                insecure: profile.insecure,
                timeout: profile.timeout,
            };
            avx_config::profile_to_settings(&merged, &profile_name, &cfg.defaults)?
        }
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            let controller = global.controller.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let adhoc = Profile {
                controller,
                username: global.username.clone(),
                ..Profile::default()
            };
            avx_config::profile_to_settings(&adhoc, &profile_name, &cfg.defaults)?
        }
    };

    if global.insecure {
        settings.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        settings.timeout = Duration::from_secs(secs);
    }

    Ok(settings)
}
