//! Data-flow control messages.

use crate::{DataAddress, FlowType, TransferType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;
use uuid::Uuid;

/// Asks a data plane to start a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowStartMessage {
    /// Message id
    pub id: String,
    /// Transfer process the flow belongs to
    pub process_id: String,
    /// Transferred asset
    pub asset_id: Option<String>,
    /// Counter-party participant
    pub participant_id: Option<String>,
    /// Contract agreement covering the transfer
    pub agreement_id: Option<String>,
    /// Where the data comes from
    pub source_data_address: DataAddress,
    /// Where the data goes; PULL flows have none
    pub destination_data_address: Option<DataAddress>,
    /// Destination type and direction
    pub transfer_type: TransferType,
    /// Where the data plane reports progress
    pub callback_address: Option<Url>,
    /// Additional properties
    pub properties: BTreeMap<String, String>,
}

impl DataFlowStartMessage {
    /// Create a start message with a fresh id.
    #[must_use]
    pub fn new(process_id: impl Into<String>, source_data_address: DataAddress) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            process_id: process_id.into(),
            asset_id: None,
            participant_id: None,
            agreement_id: None,
            source_data_address,
            destination_data_address: None,
            transfer_type: TransferType::default(),
            callback_address: None,
            properties: BTreeMap::new(),
        }
    }

    /// Set the message id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the asset id.
    #[must_use]
    pub fn with_asset_id(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = Some(asset_id.into());
        self
    }

    /// Set the participant id.
    #[must_use]
    pub fn with_participant_id(mut self, participant_id: impl Into<String>) -> Self {
        self.participant_id = Some(participant_id.into());
        self
    }

    /// Set the agreement id.
    #[must_use]
    pub fn with_agreement_id(mut self, agreement_id: impl Into<String>) -> Self {
        self.agreement_id = Some(agreement_id.into());
        self
    }

    /// Set the destination address.
    #[must_use]
    pub fn with_destination(mut self, destination: DataAddress) -> Self {
        self.destination_data_address = Some(destination);
        self
    }

    /// Set the transfer type.
    #[must_use]
    pub fn with_transfer_type(mut self, transfer_type: TransferType) -> Self {
        self.transfer_type = transfer_type;
        self
    }

    /// Set the callback address.
    #[must_use]
    pub fn with_callback_address(mut self, callback: Url) -> Self {
        self.callback_address = Some(callback);
        self
    }

    /// Add a property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Flow direction.
    #[must_use]
    pub const fn flow_type(&self) -> FlowType {
        self.transfer_type.flow_type
    }
}

/// Asks a data plane to suspend a flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowSuspendMessage {
    /// Why the flow is suspended
    pub reason: Option<String>,
}

/// Asks a data plane to terminate a flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowTerminateMessage {
    /// Why the flow is terminated
    pub reason: Option<String>,
}

/// Data plane's answer to a start message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowResponseMessage {
    /// Endpoint data reference for PULL flows
    pub data_address: Option<DataAddress>,
}

impl DataFlowResponseMessage {
    /// Response carrying a data address.
    #[must_use]
    pub const fn with_data_address(data_address: DataAddress) -> Self {
        Self {
            data_address: Some(data_address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_start_message_has_uuid_id() {
        let a = DataFlowStartMessage::new("p1", DataAddress::new("HttpData"));
        let b = DataFlowStartMessage::new("p1", DataAddress::new("HttpData"));
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_start_message_builders() {
        let message = DataFlowStartMessage::new("p1", DataAddress::new("HttpData"))
            .with_id("m1")
            .with_asset_id("asset")
            .with_agreement_id("agreement")
            .with_participant_id("participant")
            .with_transfer_type(TransferType::new("HttpData", FlowType::Pull))
            .with_property("foo", "bar");

        assert_eq!(message.id, "m1");
        assert_eq!(message.asset_id.as_deref(), Some("asset"));
        assert_eq!(message.flow_type(), FlowType::Pull);
        assert_eq!(message.properties.get("foo").map(String::as_str), Some("bar"));
        assert!(message.destination_data_address.is_none());
    }
}
