//! Volunteer opportunity command handlers.

use std::sync::Arc;

use tabled::Tabled;

use flock_core::{ServiceConfig, VolunteerOpportunity};

use crate::cli::{GlobalOpts, ResourceArgs, ResourceCommand};
use crate::error::CliError;

use super::list;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Ministry")]
    ministry: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "Starts")]
    starts: String,
}

impl From<&Arc<VolunteerOpportunity>> for OpportunityRow {
    fn from(o: &Arc<VolunteerOpportunity>) -> Self {
        Self {
            id: o.id.to_string(),
            title: o.title.clone(),
            ministry: o.ministry.clone().unwrap_or_default(),
            open: format!("{}/{}", o.open_slots(), o.slots_needed),
            starts: o.starts_on.map(|d| d.to_string()).unwrap_or_default(),
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
            list::run::<VolunteerOpportunity, _>(
                service,
                list_args,
                global,
                |o| OpportunityRow::from(o),
                |o| o.id.to_string(),
            )
            .await
        }
    }
}
