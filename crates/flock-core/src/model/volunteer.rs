use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EntityId, ResourceKind, Row};

/// A posted need for volunteers (nursery rota, food pantry shift, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerOpportunity {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub ministry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slots_needed: u32,
    #[serde(default)]
    pub slots_filled: u32,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub active: bool,
}

impl VolunteerOpportunity {
    pub fn open_slots(&self) -> u32 {
        self.slots_needed.saturating_sub(self.slots_filled)
    }
}

impl Row for VolunteerOpportunity {
    const KIND: ResourceKind = ResourceKind::VolunteerOpportunities;

    fn id(&self) -> &EntityId {
        &self.id
    }
}
