// ── Row identity ──
//
// EntityId is the only field of a row the list core ever looks at.
// The membership service hands out integer keys for most tables, UUIDs
// for newer ones, and opaque strings for imported records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical identifier for any list row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(i64),
    Uuid(Uuid),
    Key(String),
}

impl EntityId {
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Key(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        if let Ok(n) = s.parse::<i64>() {
            return Self::Numeric(n);
        }
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Key(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_from_numeric_string() {
        let id = EntityId::from("42");
        assert_eq!(id.as_numeric(), Some(42));
    }

    #[test]
    fn entity_id_from_uuid_string() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000");
        assert!(id.as_uuid().is_some());
    }

    #[test]
    fn entity_id_from_opaque_key() {
        let id: EntityId = "legacy-0007a".parse().unwrap();
        assert_eq!(id, EntityId::Key("legacy-0007a".into()));
    }

    #[test]
    fn entity_id_display_round_trips_text() {
        assert_eq!(EntityId::Numeric(7).to_string(), "7");
        assert_eq!(EntityId::Key("abc".into()).to_string(), "abc");
    }

    #[test]
    fn entity_id_deserializes_untagged() {
        let n: EntityId = serde_json::from_str("12").unwrap();
        let u: EntityId = serde_json::from_str("\"550e8400-e29b-41d4-a716-446655440000\"").unwrap();
        let k: EntityId = serde_json::from_str("\"m-12\"").unwrap();
        assert_eq!(n, EntityId::Numeric(12));
        assert!(u.as_uuid().is_some());
        assert_eq!(k, EntityId::Key("m-12".into()));
    }
}
