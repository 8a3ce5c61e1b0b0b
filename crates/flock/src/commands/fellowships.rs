//! Fellowship command handlers.

use std::sync::Arc;

use tabled::Tabled;

use flock_core::{Fellowship, ServiceConfig};

use crate::cli::{GlobalOpts, ResourceArgs, ResourceCommand};
use crate::error::CliError;

use super::list;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FellowshipRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Meets")]
    meeting_day: String,
    #[tabled(rename = "Leader")]
    leader: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&Arc<Fellowship>> for FellowshipRow {
    fn from(f: &Arc<Fellowship>) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            meeting_day: f.meeting_day.clone().unwrap_or_default(),
            leader: f.leader_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            active: if f.active { "yes" } else { "no" }.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    service: &ServiceConfig,
    args: ResourceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResourceCommand::List(list_args) => {
            list::run::<Fellowship, _>(
                service,
                list_args,
                global,
                |f| FellowshipRow::from(f),
                |f| f.id.to_string(),
            )
            .await
        }
    }
}
