// ── List resource kinds ──
//
// Every list screen is backed by exactly one resource kind. The kind names
// the endpoint, the capability needed to view it, and its default filters.

use std::collections::BTreeMap;

use strum::{Display, EnumString, IntoStaticStr};

use super::EntityId;
use crate::store::FilterValue;

/// Which remote list a row type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Members,
    Fellowships,
    VolunteerOpportunities,
}

impl ResourceKind {
    /// Endpoint path relative to the API base URL.
    pub fn path(self) -> &'static str {
        self.into()
    }

    /// Human-readable plural, for status messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::Fellowships => "fellowships",
            Self::VolunteerOpportunities => "volunteer opportunities",
        }
    }

    pub fn required_capability(self) -> Capability {
        match self {
            Self::Members => Capability::ViewMembers,
            Self::Fellowships => Capability::ViewFellowships,
            Self::VolunteerOpportunities => Capability::ViewVolunteerOpportunities,
        }
    }

    /// Filter values a freshly mounted list starts with.
    ///
    /// Opportunities hide closed postings unless the user asks for them.
    pub fn default_filters(self) -> BTreeMap<String, FilterValue> {
        let mut defaults = BTreeMap::new();
        if self == Self::VolunteerOpportunities {
            defaults.insert("active".to_owned(), FilterValue::Flag(true));
        }
        defaults
    }
}

/// A permission the auth layer can grant or withhold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Capability {
    #[strum(serialize = "members:view")]
    ViewMembers,
    #[strum(serialize = "fellowships:view")]
    ViewFellowships,
    #[strum(serialize = "volunteer-opportunities:view")]
    ViewVolunteerOpportunities,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A record that can live in a paginated list.
///
/// The list core is generic over rows and only ever reads `id()`.
pub trait Row: Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> &EntityId;
}
