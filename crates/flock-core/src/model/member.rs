use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::{EntityId, ResourceKind, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
    Visitor,
}

/// A person on the membership roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    /// Offering envelope number, if one is assigned.
    #[serde(default)]
    pub envelope_number: Option<u32>,
    #[serde(default)]
    pub fellowship_id: Option<EntityId>,
    #[serde(default)]
    pub joined_on: Option<NaiveDate>,
}

impl Member {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

impl Row for Member {
    const KIND: ResourceKind = ResourceKind::Members;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_member() {
        let m: Member = serde_json::from_str(
            r#"{ "id": 3, "firstName": "Grace", "lastName": "Lee", "envelopeNumber": 118 }"#,
        )
        .unwrap();
        assert_eq!(m.id, EntityId::Numeric(3));
        assert_eq!(m.status, MemberStatus::Active);
        assert_eq!(m.envelope_number, Some(118));
        assert_eq!(m.display_name(), "Grace Lee");
    }
}
