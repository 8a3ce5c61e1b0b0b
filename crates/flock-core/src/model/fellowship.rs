use serde::{Deserialize, Serialize};

use super::{EntityId, ResourceKind, Row};

/// A small group (Bible study, choir, men's breakfast, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fellowship {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub leader_id: Option<EntityId>,
    #[serde(default)]
    pub meeting_day: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Row for Fellowship {
    const KIND: ResourceKind = ResourceKind::Fellowships;

    fn id(&self) -> &EntityId {
        &self.id
    }
}
