//! Member command handlers.

use std::sync::Arc;

use tabled::Tabled;

use flock_core::{Member, ServiceConfig};

use crate::cli::{GlobalOpts, ResourceArgs, ResourceCommand};
use crate::error::CliError;

use super::list;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Envelope")]
    envelope: String,
    #[tabled(rename = "Joined")]
    joined: String,
}

impl From<&Arc<Member>> for MemberRow {
    fn from(m: &Arc<Member>) -> Self {
        Self {
            id: m.id.to_string(),
            name: m.display_name(),
            status: m.status.to_string(),
            email: m.email.clone().unwrap_or_default(),
            envelope: m.envelope_number.map(|n| n.to_string()).unwrap_or_default(),
            joined: m.joined_on.map(|d| d.to_string()).unwrap_or_default(),
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
            list::run::<Member, _>(
                service,
                list_args,
                global,
                |m| MemberRow::from(m),
                |m| m.id.to_string(),
            )
            .await
        }
    }
}
