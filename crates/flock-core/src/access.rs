// ── Capability checks ──
//
// Permission evaluation lives in the auth layer; the list core only asks
// one yes/no question before fetching.

use std::collections::HashSet;
use std::sync::Arc;

use crate::model::Capability;

/// Boolean capability check consumed by list screens.
pub trait CapabilityCheck: Send + Sync + 'static {
    fn has(&self, capability: Capability) -> bool;
}

impl<C: CapabilityCheck + ?Sized> CapabilityCheck for Arc<C> {
    fn has(&self, capability: Capability) -> bool {
        (**self).has(capability)
    }
}

/// Grants everything. For sessions where the server enforces access.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl CapabilityCheck for AllowAll {
    fn has(&self, _capability: Capability) -> bool {
        true
    }
}

/// A fixed set of granted capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Granted(HashSet<Capability>);

impl Granted {
    /// Parse capability codes such as `members:view`; unknown codes are skipped.
    pub fn from_codes<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        codes.into_iter().filter_map(|c| c.parse().ok()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Capability> for Granted {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl CapabilityCheck for Granted {
    fn has(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }
}
