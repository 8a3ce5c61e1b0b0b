//! CLI configuration: thin layer over `flock_config` that applies
//! `GlobalOpts` flag overrides (--url, --token, --insecure, --timeout).

use std::time::Duration;

use flock_api::TlsMode;
use flock_config::{Config, ConfigError};
use flock_core::ServiceConfig;
use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

fn parse_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `ServiceConfig` from the loaded config, profile, and CLI flags.
///
/// Flags take priority over profile values. With no matching profile a
/// bare `--url` is enough for a one-off query.
pub fn resolve_service_config(cfg: &Config, global: &GlobalOpts) -> Result<ServiceConfig, CliError> {
    let mut service = match cfg.profile(global.profile.as_deref()) {
        Ok((name, profile)) => flock_config::profile_to_service_config(profile, name, &cfg.defaults)?,
        Err(ConfigError::UnknownProfile { profile }) => {
            if global.profile.is_some() {
                return Err(CliError::ProfileNotFound {
                    name: profile,
                    available: available_profiles(cfg),
                });
            }
            let Some(raw) = global.url.as_deref() else {
                return Err(CliError::NoConfig {
                    path: flock_config::config_path().display().to_string(),
                });
            };
            let mut service = ServiceConfig::new(parse_url(raw)?);
            service.timeout = Duration::from_secs(cfg.defaults.timeout);
            service
        }
        Err(other) => return Err(other.into()),
    };

    if let Some(ref raw) = global.url {
        service.url = parse_url(raw)?;
    }
    if let Some(ref token) = global.token {
        service.token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        service.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        service.timeout = Duration::from_secs(secs);
    }
    Ok(service)
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
