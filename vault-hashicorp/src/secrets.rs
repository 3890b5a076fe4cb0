//! Vault wire types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Field of a KV entry holding the secret value.
pub const CONTENT_FIELD: &str = "content";

/// KV v2 read response.
#[derive(Debug, Deserialize)]
pub struct KvResponse<T> {
    /// Payload and version metadata
    pub data: KvData<T>,
    /// Lease, empty for KV secrets
    #[serde(default)]
    pub lease_id: String,
    /// Lease duration in seconds
    #[serde(default)]
    pub lease_duration: u64,
    /// Whether the lease is renewable
    #[serde(default)]
    pub renewable: bool,
}

/// KV v2 payload.
#[derive(Debug, Deserialize)]
pub struct KvData<T> {
    /// Secret data map
    pub data: T,
    /// Version metadata
    pub metadata: KvVersionMetadata,
}

/// Metadata of one KV v2 version.
#[derive(Debug, Clone, Deserialize)]
pub struct KvVersionMetadata {
    /// Version number
    pub version: u64,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_time: String,
    /// RFC 3339 deletion time, empty when live
    #[serde(default)]
    pub deletion_time: String,
    /// Whether the version was destroyed
    #[serde(default)]
    pub destroyed: bool,
}

/// KV v2 write response.
#[derive(Debug, Deserialize)]
pub struct KvWriteResponse {
    /// Metadata of the written version
    pub data: KvVersionMetadata,
}

/// KV v2 write body.
#[derive(Debug, Serialize)]
pub struct KvWriteRequest<'a> {
    /// Secret data map
    pub data: KvContent<'a>,
}

/// Single-value secret payload.
#[derive(Debug, Serialize)]
pub struct KvContent<'a> {
    /// Secret value
    pub content: &'a str,
}

/// Token lookup-self response.
#[derive(Debug, Deserialize)]
pub struct TokenLookupResponse {
    /// Token details
    pub data: TokenLookupData,
}

/// Token details returned by lookup-self.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenLookupData {
    /// Remaining TTL in seconds
    pub ttl: u64,
    /// Whether renew-self is allowed
    #[serde(default)]
    pub renewable: bool,
    /// Hard TTL cap in seconds, 0 when none
    #[serde(default)]
    pub explicit_max_ttl: u64,
    /// Attached policies
    #[serde(default)]
    pub policies: Vec<String>,
}

impl TokenLookupData {
    /// Remaining TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }
}

/// Token renew-self body.
#[derive(Debug, Serialize)]
pub struct TokenRenewRequest {
    /// Requested TTL, e.g. `300s`
    pub increment: String,
}

/// Auth response of login and renew-self.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    /// Issued token
    pub auth: AuthData,
}

/// Issued token details.
#[derive(Deserialize)]
pub struct AuthData {
    /// The token
    pub client_token: String,
    /// Token lifetime in seconds
    pub lease_duration: u64,
    /// Whether the token is renewable
    #[serde(default)]
    pub renewable: bool,
    /// Attached policies
    #[serde(default)]
    pub policies: Vec<String>,
}

impl std::fmt::Debug for AuthData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthData")
            .field("client_token", &"[REDACTED]")
            .field("lease_duration", &self.lease_duration)
            .field("renewable", &self.renewable)
            .field("policies", &self.policies)
            .finish()
    }
}

/// Kubernetes login body.
#[derive(Serialize)]
pub struct KubernetesLoginRequest<'a> {
    /// Vault role
    pub role: &'a str,
    /// Service-account JWT
    pub jwt: &'a str,
}

/// `sys/health` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    /// Whether Vault is initialized
    #[serde(default)]
    pub initialized: bool,
    /// Whether Vault is sealed
    #[serde(default)]
    pub sealed: bool,
    /// Whether the node is a standby
    #[serde(default)]
    pub standby: bool,
    /// Whether the node is a performance standby
    #[serde(default)]
    pub performance_standby: bool,
    /// Server version
    #[serde(default)]
    pub version: Option<String>,
    /// Cluster name
    #[serde(default)]
    pub cluster_name: Option<String>,
}

/// Result of a health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    /// HTTP status answered by Vault
    pub status: u16,
    /// Parsed body, if the body was JSON
    pub body: Option<HealthStatus>,
    standby_ok: bool,
}

impl HealthResponse {
    pub(crate) const fn new(status: u16, body: Option<HealthStatus>, standby_ok: bool) -> Self {
        Self {
            status,
            body,
            standby_ok,
        }
    }

    /// `200`, or a standby code when standby nodes are accepted.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        match self.status {
            200 => true,
            429 | 473 => self.standby_ok,
            _ => false,
        }
    }
}
