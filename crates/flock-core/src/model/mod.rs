// ── Domain model ──
//
// Row types for each list screen plus the identity and kind types the
// list core is generic over.

pub mod entity_id;
pub mod fellowship;
pub mod kind;
pub mod member;
pub mod volunteer;

pub use entity_id::EntityId;
pub use fellowship::Fellowship;
pub use kind::{Capability, ResourceKind, Row};
pub use member::{Member, MemberStatus};
pub use volunteer::VolunteerOpportunity;
