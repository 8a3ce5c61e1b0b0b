// flock-api: async client for the membership service's list endpoints

pub mod client;
pub mod error;
pub mod query;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use query::{ListQuery, ListResponse};
pub use transport::{TlsMode, TransportConfig};
