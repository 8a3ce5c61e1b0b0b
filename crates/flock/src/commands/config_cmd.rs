//! Config subcommand handlers.

use flock_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
    cfg
}

fn render_config(cfg: &Config, format: &OutputFormat) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string_pretty(cfg)
            .map_err(|e| CliError::Internal(format!("JSON serialization failed: {e}")))?,
        OutputFormat::Yaml => serde_yaml::to_string(cfg)
            .map_err(|e| CliError::Internal(format!("YAML serialization failed: {e}")))?,
        OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(cfg)
            .map_err(|e| CliError::Internal(format!("TOML serialization failed: {e}")))?,
    };
    Ok(rendered)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = render_config(&redacted(&cfg), &global.output)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_config(&Config::starter())?;
            if !global.quiet {
                eprintln!("Wrote starter config to {}", written.display());
                eprintln!("Set FLOCK_TOKEN or store a token in the system keyring to authenticate.");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_masked() {
        let mut cfg = Config::starter();
        if let Some(p) = cfg.profiles.get_mut("default") {
            p.token = Some("s3cret".into());
        }

        let out = render_config(&redacted(&cfg), &OutputFormat::Table).unwrap();

        assert!(!out.contains("s3cret"));
        assert!(out.contains(REDACTED));
    }
}
