//! Signaling message transformers.
//!
//! Converts the data-plane signaling messages to and from their compact
//! JSON-LD wire form. [`register_signaling_transformers`] installs every
//! transformer in a registry.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod control;
pub mod start;
pub mod state;

pub use address::{DataAddressFromJson, DataAddressToJson};
pub use control::{
    ResponseMessageFromJson, ResponseMessageToJson, SuspendMessageFromJson, SuspendMessageToJson,
    TerminateMessageFromJson, TerminateMessageToJson,
};
pub use start::{StartMessageFromJson, StartMessageToJson};
pub use state::{FlowStateFromJson, FlowStateToJson};

use dataplane_spi::{
    DataAddress, DataFlowResponseMessage, DataFlowStartMessage, DataFlowState,
    DataFlowSuspendMessage, DataFlowTerminateMessage,
};
use transform_core::{JsonObject, TypeTransformerRegistry};

/// `@type` names used on the wire.
pub mod types {
    /// Start message type.
    pub const DATA_FLOW_START_MESSAGE: &str = "DataFlowStartMessage";
    /// Suspend message type.
    pub const DATA_FLOW_SUSPEND_MESSAGE: &str = "DataFlowSuspendMessage";
    /// Terminate message type.
    pub const DATA_FLOW_TERMINATE_MESSAGE: &str = "DataFlowTerminateMessage";
    /// Start response type.
    pub const DATA_FLOW_RESPONSE_MESSAGE: &str = "DataFlowResponseMessage";
    /// Data address type.
    pub const DATA_ADDRESS: &str = "DataAddress";
    /// Flow state type.
    pub const DATA_FLOW_STATE: &str = "DataFlowState";
}

/// Vocabulary-relative property names used on the wire.
pub mod properties {
    /// Transfer process id.
    pub const PROCESS_ID: &str = "processId";
    /// Asset id.
    pub const ASSET_ID: &str = "assetId";
    /// Participant id.
    pub const PARTICIPANT_ID: &str = "participantId";
    /// Agreement id.
    pub const AGREEMENT_ID: &str = "agreementId";
    /// `PUSH` or `PULL`.
    pub const FLOW_TYPE: &str = "flowType";
    /// Destination type of the transfer type.
    pub const TRANSFER_TYPE_DESTINATION: &str = "transferTypeDestination";
    /// Source address.
    pub const SOURCE_DATA_ADDRESS: &str = "sourceDataAddress";
    /// Destination address.
    pub const DESTINATION_DATA_ADDRESS: &str = "destinationDataAddress";
    /// Callback URL.
    pub const CALLBACK_ADDRESS: &str = "callbackAddress";
    /// Free-form string properties.
    pub const PROPERTIES: &str = "properties";
    /// Suspension or termination reason.
    pub const REASON: &str = "reason";
    /// Data address in a start response.
    pub const DATA_ADDRESS: &str = "dataAddress";
    /// Flow state name.
    pub const STATE: &str = "state";
}

/// Register every signaling transformer.
pub fn register_signaling_transformers(registry: &mut TypeTransformerRegistry) {
    registry.register::<DataAddress, JsonObject, _>(DataAddressToJson);
    registry.register::<JsonObject, DataAddress, _>(DataAddressFromJson);
    registry.register::<DataFlowStartMessage, JsonObject, _>(StartMessageToJson);
    registry.register::<JsonObject, DataFlowStartMessage, _>(StartMessageFromJson);
    registry.register::<DataFlowSuspendMessage, JsonObject, _>(SuspendMessageToJson);
    registry.register::<JsonObject, DataFlowSuspendMessage, _>(SuspendMessageFromJson);
    registry.register::<DataFlowTerminateMessage, JsonObject, _>(TerminateMessageToJson);
    registry.register::<JsonObject, DataFlowTerminateMessage, _>(TerminateMessageFromJson);
    registry.register::<DataFlowResponseMessage, JsonObject, _>(ResponseMessageToJson);
    registry.register::<JsonObject, DataFlowResponseMessage, _>(ResponseMessageFromJson);
    registry.register::<DataFlowState, JsonObject, _>(FlowStateToJson);
    registry.register::<JsonObject, DataFlowState, _>(FlowStateFromJson);
}

/// New registry holding the signaling transformers.
#[must_use]
pub fn signaling_transformer_registry() -> TypeTransformerRegistry {
    let mut registry = TypeTransformerRegistry::new();
    register_signaling_transformers(&mut registry);
    registry
}

/// Reports an unexpected `@type`; an absent type is accepted.
fn check_type(
    object: &JsonObject,
    expected: &str,
    context: &mut transform_core::TransformerContext<'_>,
) -> bool {
    match transform_core::jsonld::type_of(object) {
        Some(actual) if actual != expected => {
            context.unexpected_type(expected, Some(actual));
            false
        }
        _ => true,
    }
}
