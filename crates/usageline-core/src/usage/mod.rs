//! Usage quota telemetry: cached snapshot, remote fetch, and the provider
//! that decides between them.

pub mod cache;
pub mod credentials;
pub mod fetcher;
pub mod provider;
pub mod transport;
pub mod types;

pub use cache::{CacheStore, FileCacheStore};
pub use credentials::{default_credentials, CredentialSource, FileCredentials};
pub use fetcher::{parse_usage_response, UsageFetcher};
pub use provider::UsageProvider;
pub use transport::{HttpTransport, UsageTransport, DEFAULT_TIMEOUT, DEFAULT_USAGE_ENDPOINT};
pub use types::{ModelFamily, Tier, UsageSnapshot};
