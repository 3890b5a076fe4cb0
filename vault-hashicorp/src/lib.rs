//! HashiCorp Vault secret resolver.
//!
//! Reads and writes single-value secrets in a KV v2 mount. Requests are
//! retried and guarded by a circuit breaker; recently read values are served
//! from memory while Vault is unreachable. Tokens come from configuration or
//! a Kubernetes login and are renewed in the background.

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod renewal;
pub mod secrets;

pub use client::{VaultClient, validate_key};
pub use config::{VaultAuth, VaultSettings};
pub use error::{VaultError, VaultResult};
pub use provider::{SecretMetadata, Vault};
pub use renewal::TokenRenewTask;
pub use secrets::{HealthResponse, HealthStatus, TokenLookupData};
