// ── Runtime service configuration ──
//
// Describes *how* to reach the membership service and how large each
// list's pages are. Never touches disk; the CLI resolves profiles and
// credentials and hands a `ServiceConfig` in.

use std::num::NonZeroUsize;
use std::time::Duration;

use flock_api::{ApiClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;
use crate::model::ResourceKind;

const DEFAULT_PAGE_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(24);

/// Fixed page size for each list type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub members: NonZeroUsize,
    pub fellowships: NonZeroUsize,
    pub volunteer_opportunities: NonZeroUsize,
}

impl PageSizes {
    pub fn uniform(size: NonZeroUsize) -> Self {
        Self {
            members: size,
            fellowships: size,
            volunteer_opportunities: size,
        }
    }

    pub fn for_kind(&self, kind: ResourceKind) -> NonZeroUsize {
        match kind {
            ResourceKind::Members => self.members,
            ResourceKind::Fellowships => self.fellowships,
            ResourceKind::VolunteerOpportunities => self.volunteer_opportunities,
        }
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        Self::uniform(DEFAULT_PAGE_SIZE)
    }
}

/// Connection settings for one membership service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// API base URL, e.g. `https://church.example.org/api/v1`.
    pub url: Url,
    /// Bearer token. `None` for servers that allow anonymous reads.
    pub token: Option<SecretString>,
    pub tls: TlsMode,
    pub timeout: Duration,
    pub page_sizes: PageSizes,
}

impl ServiceConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            page_sizes: PageSizes::default(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    pub fn build_client(&self) -> Result<ApiClient, CoreError> {
        ApiClient::new(self.url.as_str(), &self.transport(), self.token.as_ref())
            .map_err(CoreError::from)
    }
}
