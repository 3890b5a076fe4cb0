//! Suspend, terminate and start-response transformers.

use crate::properties::{DATA_ADDRESS, REASON};
use crate::{check_type, types};
use dataplane_spi::{
    DataAddress, DataFlowResponseMessage, DataFlowSuspendMessage, DataFlowTerminateMessage,
};
use serde_json::Value;
use transform_core::jsonld;
use transform_core::{JsonObject, TransformerContext, TypeTransformer};

fn reason_object(type_name: &str, reason: Option<&String>) -> JsonObject {
    let mut object = jsonld::compact_object(type_name);
    if let Some(reason) = reason {
        object.insert(REASON.into(), reason.clone().into());
    }
    object
}

/// `DataFlowSuspendMessage` to JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuspendMessageToJson;

impl TypeTransformer<DataFlowSuspendMessage, JsonObject> for SuspendMessageToJson {
    fn transform(
        &self,
        message: &DataFlowSuspendMessage,
        _context: &mut TransformerContext<'_>,
    ) -> Option<JsonObject> {
        Some(reason_object(
            types::DATA_FLOW_SUSPEND_MESSAGE,
            message.reason.as_ref(),
        ))
    }
}

/// JSON to `DataFlowSuspendMessage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuspendMessageFromJson;

impl TypeTransformer<JsonObject, DataFlowSuspendMessage> for SuspendMessageFromJson {
    fn transform(
        &self,
        object: &JsonObject,
        context: &mut TransformerContext<'_>,
    ) -> Option<DataFlowSuspendMessage> {
        check_type(object, types::DATA_FLOW_SUSPEND_MESSAGE, context).then(|| {
            DataFlowSuspendMessage {
                reason: jsonld::string_property(object, REASON),
            }
        })
    }
}

/// `DataFlowTerminateMessage` to JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminateMessageToJson;

impl TypeTransformer<DataFlowTerminateMessage, JsonObject> for TerminateMessageToJson {
    fn transform(
        &self,
        message: &DataFlowTerminateMessage,
        _context: &mut TransformerContext<'_>,
    ) -> Option<JsonObject> {
        Some(reason_object(
            types::DATA_FLOW_TERMINATE_MESSAGE,
            message.reason.as_ref(),
        ))
    }
}

/// JSON to `DataFlowTerminateMessage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminateMessageFromJson;

impl TypeTransformer<JsonObject, DataFlowTerminateMessage> for TerminateMessageFromJson {
    fn transform(
        &self,
        object: &JsonObject,
        context: &mut TransformerContext<'_>,
    ) -> Option<DataFlowTerminateMessage> {
        check_type(object, types::DATA_FLOW_TERMINATE_MESSAGE, context).then(|| {
            DataFlowTerminateMessage {
                reason: jsonld::string_property(object, REASON),
            }
        })
    }
}

/// `DataFlowResponseMessage` to JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseMessageToJson;

impl TypeTransformer<DataFlowResponseMessage, JsonObject> for ResponseMessageToJson {
    fn transform(
        &self,
        message: &DataFlowResponseMessage,
        context: &mut TransformerContext<'_>,
    ) -> Option<JsonObject> {
        let mut object = jsonld::compact_object(types::DATA_FLOW_RESPONSE_MESSAGE);
        if let Some(address) = &message.data_address {
            let address: JsonObject = context.transform(address)?;
            object.insert(DATA_ADDRESS.into(), Value::Object(address));
        }
        Some(object)
    }
}

/// JSON to `DataFlowResponseMessage`.
///
/// Data planes answer either with a response message or with the bare
/// endpoint data reference; both are accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseMessageFromJson;

impl TypeTransformer<JsonObject, DataFlowResponseMessage> for ResponseMessageFromJson {
    fn transform(
        &self,
        object: &JsonObject,
        context: &mut TransformerContext<'_>,
    ) -> Option<DataFlowResponseMessage> {
        if let Some(address) = jsonld::object_property(object, DATA_ADDRESS) {
            let address: DataAddress = context.transform(address)?;
            return Some(DataFlowResponseMessage::with_data_address(address));
        }

        let bare_address = jsonld::has_type(object, types::DATA_ADDRESS)
            || jsonld::property(object, DataAddress::TYPE).is_some();
        if bare_address {
            let address: DataAddress = context.transform(object)?;
            return Some(DataFlowResponseMessage::with_data_address(address));
        }

        check_type(object, types::DATA_FLOW_RESPONSE_MESSAGE, context)
            .then(DataFlowResponseMessage::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use transform_core::TypeTransformerRegistry;

    fn registry() -> TypeTransformerRegistry {
        crate::signaling_transformer_registry()
    }

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_terminate_message_with_reason() {
        let message = DataFlowTerminateMessage {
            reason: Some("contract expired".into()),
        };

        let json: JsonObject = registry().transform(&message).unwrap();
        assert_eq!(
            Value::Object(json.clone()),
            json!({
                "@context": {"@vocab": "https://w3id.org/edc/v0.0.1/ns/"},
                "@type": "DataFlowTerminateMessage",
                "reason": "contract expired"
            })
        );

        let back: DataFlowTerminateMessage = registry().transform(&json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_suspend_message_without_reason() {
        let json: JsonObject = registry()
            .transform(&DataFlowSuspendMessage::default())
            .unwrap();
        assert!(!json.contains_key("reason"));

        let back: DataFlowSuspendMessage = registry().transform(&object(json!({}))).unwrap();
        assert!(back.reason.is_none());
    }

    #[test]
    fn test_control_message_type_mismatch() {
        let json = object(json!({"@type": "DataFlowSuspendMessage", "reason": "x"}));
        assert!(
            registry()
                .transform::<_, DataFlowTerminateMessage>(&json)
                .is_err()
        );
    }

    #[test]
    fn test_response_with_data_address() {
        let message = DataFlowResponseMessage::with_data_address(
            DataAddress::new("https://w3id.org/idsa/v4.1/HTTP")
                .with_property("endpoint", "http://dp/public"),
        );

        let json: JsonObject = registry().transform(&message).unwrap();
        assert_eq!(json["dataAddress"]["endpoint"], json!("http://dp/public"));

        let back: DataFlowResponseMessage = registry().transform(&json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_response_from_bare_address() {
        let json = object(json!({
            "@context": {"@vocab": "https://w3id.org/edc/v0.0.1/ns/"},
            "@type": "DataAddress",
            "type": "https://w3id.org/idsa/v4.1/HTTP",
            "authorization": "token"
        }));

        let response: DataFlowResponseMessage = registry().transform(&json).unwrap();

        let address = response.data_address.unwrap();
        assert_eq!(address.address_type(), "https://w3id.org/idsa/v4.1/HTTP");
        assert_eq!(address.string_property("authorization"), Some("token"));
    }

    #[test]
    fn test_empty_response() {
        let response: DataFlowResponseMessage = registry()
            .transform(&object(json!({"@type": "DataFlowResponseMessage"})))
            .unwrap();
        assert!(response.data_address.is_none());
    }
}
