//! Command dispatch.

pub mod config_cmd;
pub mod fellowships;
pub mod list;
pub mod members;
pub mod opportunities;

use flock_core::ServiceConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a list command to its handler.
pub async fn dispatch(
    cmd: Command,
    service: &ServiceConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Members(args) => members::handle(service, args, global).await,
        Command::Fellowships(args) => fellowships::handle(service, args, global).await,
        Command::Opportunities(args) => opportunities::handle(service, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before connecting".into(),
        )),
    }
}
