//! Test fixtures with sample data.

use dataplane_spi::{DataAddress, DataFlowStartMessage, DataPlaneInstance, FlowType, TransferType};
use serde_json::{Value, json};
use url::Url;

/// HTTP source address.
#[must_use]
pub fn http_source() -> DataAddress {
    DataAddress::new("HttpData")
        .with_property("baseUrl", "http://provider.example.com/api/data")
        .with_property("method", "GET")
}

/// HTTP destination address.
#[must_use]
pub fn http_destination() -> DataAddress {
    DataAddress::new("HttpData").with_property("baseUrl", "http://consumer.example.com/sink")
}

/// Instance accepting `HttpData` sources for PUSH and PULL.
///
/// # Panics
///
/// If `id` is not a valid host name.
#[must_use]
pub fn instance(id: &str) -> DataPlaneInstance {
    let url = Url::parse(&format!("http://{id}:8183/v1/dataflows"))
        .unwrap_or_else(|e| panic!("invalid instance id {id}: {e}"));
    instance_at(id, url)
}

/// Instance accepting `HttpData` sources for PUSH and PULL, at `url`.
#[must_use]
pub fn instance_at(id: &str, url: Url) -> DataPlaneInstance {
    DataPlaneInstance::new(id, url)
        .with_allowed_source_type("HttpData")
        .with_allowed_transfer_type("HttpData-PUSH")
        .with_allowed_transfer_type("HttpData-PULL")
}

/// PUSH start message from [`http_source`] to [`http_destination`].
#[must_use]
pub fn push_start_message(process_id: &str) -> DataFlowStartMessage {
    DataFlowStartMessage::new(process_id, http_source())
        .with_asset_id("asset-1")
        .with_agreement_id("agreement-1")
        .with_participant_id("consumer")
        .with_destination(http_destination())
        .with_transfer_type(TransferType::new("HttpData", FlowType::Push))
}

/// PULL start message from [`http_source`].
#[must_use]
pub fn pull_start_message(process_id: &str) -> DataFlowStartMessage {
    DataFlowStartMessage::new(process_id, http_source())
        .with_asset_id("asset-1")
        .with_agreement_id("agreement-1")
        .with_participant_id("consumer")
        .with_transfer_type(TransferType::new("HttpData", FlowType::Pull))
}

/// Vault KV v2 read response holding `content`.
#[must_use]
pub fn vault_kv_response(content: &str, version: u64) -> Value {
    json!({
        "request_id": "f1b2c3d4-0000-0000-0000-000000000000",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "data": { "content": content },
            "metadata": {
                "created_time": "2024-01-15T10:30:00.000000Z",
                "custom_metadata": null,
                "deletion_time": "",
                "destroyed": false,
                "version": version
            }
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

/// Vault KV v2 write response.
#[must_use]
pub fn vault_write_response(version: u64) -> Value {
    json!({
        "data": {
            "created_time": "2024-01-15T10:30:00.000000Z",
            "custom_metadata": null,
            "deletion_time": "",
            "destroyed": false,
            "version": version
        }
    })
}

/// Vault token lookup-self response.
#[must_use]
pub fn vault_token_lookup_response(ttl_secs: u64, renewable: bool) -> Value {
    json!({
        "data": {
            "accessor": "8609694a-cdbc-db9b-d345-e782dbb562ed",
            "creation_ttl": 2_764_800,
            "display_name": "token",
            "explicit_max_ttl": 0,
            "id": "redacted",
            "num_uses": 0,
            "orphan": false,
            "path": "auth/token/create",
            "policies": ["default", "connector"],
            "renewable": renewable,
            "ttl": ttl_secs,
            "type": "service"
        }
    })
}

/// Vault token renew-self (or login) response.
#[must_use]
pub fn vault_auth_response(client_token: &str, lease_secs: u64) -> Value {
    json!({
        "auth": {
            "client_token": client_token,
            "accessor": "0e9e354a-520f-df04-6867-ee81cae3d42d",
            "policies": ["default", "connector"],
            "token_policies": ["default", "connector"],
            "lease_duration": lease_secs,
            "renewable": true
        }
    })
}

/// Vault health response body.
#[must_use]
pub fn vault_health_response(sealed: bool, standby: bool) -> Value {
    json!({
        "initialized": true,
        "sealed": sealed,
        "standby": standby,
        "performance_standby": false,
        "replication_performance_mode": "disabled",
        "replication_dr_mode": "disabled",
        "server_time_utc": 1_705_312_200,
        "version": "1.15.4",
        "cluster_name": "vault-cluster-1",
        "cluster_id": "c6ae3d1e-1f4e-4fd1-8b3a-ecd8b5b0a1e2"
    })
}
