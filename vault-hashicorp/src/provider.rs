//! Secret store abstraction.

use crate::error::VaultResult;
use crate::secrets::KvVersionMetadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Metadata about a retrieved or written secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMetadata {
    /// Lease ID for renewable secrets
    pub lease_id: Option<String>,
    /// Time-to-live for the secret
    pub ttl: Duration,
    /// Whether the secret is renewable
    pub renewable: bool,
    /// Version number (for KV v2)
    pub version: Option<u64>,
    /// When this version was written
    pub created_time: Option<DateTime<Utc>>,
}

impl SecretMetadata {
    pub(crate) fn from_version(metadata: &KvVersionMetadata) -> Self {
        Self {
            lease_id: None,
            ttl: Duration::ZERO,
            renewable: false,
            version: Some(metadata.version),
            created_time: DateTime::parse_from_rfc3339(&metadata.created_time)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
        }
    }

    pub(crate) fn with_lease(mut self, lease_id: String, lease_duration: u64, renewable: bool) -> Self {
        self.lease_id = (!lease_id.is_empty()).then_some(lease_id);
        self.ttl = Duration::from_secs(lease_duration);
        self.renewable = renewable;
        self
    }
}

/// Key-value secret store holding one string value per key.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Latest value of `key`, `None` if it does not exist.
    async fn resolve_secret(&self, key: &str) -> VaultResult<Option<String>>;

    /// Write a new version of `key`.
    async fn store_secret(&self, key: &str, value: &str) -> VaultResult<SecretMetadata>;

    /// Delete `key` with all its versions.
    async fn delete_secret(&self, key: &str) -> VaultResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_version() {
        let metadata = SecretMetadata::from_version(&KvVersionMetadata {
            version: 3,
            created_time: "2024-01-15T10:30:00.000000Z".to_string(),
            deletion_time: String::new(),
            destroyed: false,
        })
        .with_lease(String::new(), 0, false);

        assert_eq!(metadata.version, Some(3));
        assert_eq!(metadata.lease_id, None);
        assert_eq!(
            metadata.created_time.map(|t| t.to_rfc3339()),
            Some("2024-01-15T10:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_unparseable_created_time() {
        let metadata = SecretMetadata::from_version(&KvVersionMetadata {
            version: 1,
            created_time: String::new(),
            deletion_time: String::new(),
            destroyed: false,
        });
        assert_eq!(metadata.created_time, None);
    }
}
