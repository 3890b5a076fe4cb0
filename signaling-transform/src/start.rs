//! Start message transformers.

use crate::properties::{
    AGREEMENT_ID, ASSET_ID, CALLBACK_ADDRESS, DESTINATION_DATA_ADDRESS, FLOW_TYPE,
    PARTICIPANT_ID, PROCESS_ID, PROPERTIES, SOURCE_DATA_ADDRESS, TRANSFER_TYPE_DESTINATION,
};
use crate::{check_type, types};
use dataplane_spi::{DataAddress, DataFlowStartMessage, FlowType, TransferType};
use serde_json::Value;
use std::collections::BTreeMap;
use transform_core::jsonld::{self, ID};
use transform_core::{JsonObject, TransformerContext, TypeTransformer};
use url::Url;

/// `DataFlowStartMessage` to JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct StartMessageToJson;

impl TypeTransformer<DataFlowStartMessage, JsonObject> for StartMessageToJson {
    fn transform(
        &self,
        message: &DataFlowStartMessage,
        context: &mut TransformerContext<'_>,
    ) -> Option<JsonObject> {
        let mut object = jsonld::compact_object(types::DATA_FLOW_START_MESSAGE);
        object.insert(ID.into(), message.id.clone().into());
        object.insert(PROCESS_ID.into(), message.process_id.clone().into());

        let optional = [
            (ASSET_ID, &message.asset_id),
            (PARTICIPANT_ID, &message.participant_id),
            (AGREEMENT_ID, &message.agreement_id),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                object.insert(key.into(), value.clone().into());
            }
        }

        object.insert(
            FLOW_TYPE.into(),
            message.transfer_type.flow_type.as_str().into(),
        );
        object.insert(
            TRANSFER_TYPE_DESTINATION.into(),
            message.transfer_type.destination_type.clone().into(),
        );

        let source: JsonObject = context.transform(&message.source_data_address)?;
        object.insert(SOURCE_DATA_ADDRESS.into(), Value::Object(source));

        if let Some(destination) = &message.destination_data_address {
            let destination: JsonObject = context.transform(destination)?;
            object.insert(DESTINATION_DATA_ADDRESS.into(), Value::Object(destination));
        }

        if let Some(callback) = &message.callback_address {
            object.insert(CALLBACK_ADDRESS.into(), callback.as_str().into());
        }

        let properties: JsonObject = message
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        object.insert(PROPERTIES.into(), Value::Object(properties));

        Some(object)
    }
}

/// JSON to `DataFlowStartMessage`.
///
/// A missing `@id` gets a fresh one; a missing `flowType` means `PUSH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StartMessageFromJson;

impl TypeTransformer<JsonObject, DataFlowStartMessage> for StartMessageFromJson {
    fn transform(
        &self,
        object: &JsonObject,
        context: &mut TransformerContext<'_>,
    ) -> Option<DataFlowStartMessage> {
        const TYPE: &str = types::DATA_FLOW_START_MESSAGE;

        if !check_type(object, TYPE, context) {
            return None;
        }

        let process_id = jsonld::string_property(object, PROCESS_ID);
        if process_id.is_none() {
            context.missing_mandatory_property(TYPE, PROCESS_ID);
        }
        let source = jsonld::object_property(object, SOURCE_DATA_ADDRESS);
        if source.is_none() {
            context.missing_mandatory_property(TYPE, SOURCE_DATA_ADDRESS);
        }
        let flow_type = read_flow_type(object, context);
        let callback = read_callback(object, context);

        let (Some(process_id), Some(source), Some(flow_type), Some(callback)) =
            (process_id, source, flow_type, callback)
        else {
            return None;
        };

        let source: DataAddress = context.transform(source)?;
        let destination = match jsonld::object_property(object, DESTINATION_DATA_ADDRESS) {
            Some(destination) => Some(context.transform::<JsonObject, DataAddress>(destination)?),
            None => None,
        };

        let destination_type = jsonld::string_property(object, TRANSFER_TYPE_DESTINATION)
            .or_else(|| {
                destination
                    .as_ref()
                    .map(|d| d.address_type().to_string())
            })
            .unwrap_or_default();

        let mut message = DataFlowStartMessage::new(process_id, source)
            .with_transfer_type(TransferType::new(destination_type, flow_type));
        if let Some(id) = jsonld::id_of(object) {
            message.id = id.to_string();
        }
        message.asset_id = jsonld::string_property(object, ASSET_ID);
        message.participant_id = jsonld::string_property(object, PARTICIPANT_ID);
        message.agreement_id = jsonld::string_property(object, AGREEMENT_ID);
        message.destination_data_address = destination;
        message.callback_address = callback;
        message.properties = read_properties(object);

        Some(message)
    }
}

fn read_flow_type(object: &JsonObject, context: &mut TransformerContext<'_>) -> Option<FlowType> {
    let Some(raw) = jsonld::string_property(object, FLOW_TYPE) else {
        return Some(FlowType::Push);
    };
    match raw.parse() {
        Ok(flow_type) => Some(flow_type),
        Err(e) => {
            context.invalid_property(types::DATA_FLOW_START_MESSAGE, FLOW_TYPE, &raw, e);
            None
        }
    }
}

/// Outer `None` on failure; inner `None` when absent.
#[allow(clippy::option_option)]
fn read_callback(
    object: &JsonObject,
    context: &mut TransformerContext<'_>,
) -> Option<Option<Url>> {
    let Some(raw) = jsonld::string_property(object, CALLBACK_ADDRESS) else {
        return Some(None);
    };
    match Url::parse(&raw) {
        Ok(url) => Some(Some(url)),
        Err(e) => {
            context.invalid_property(types::DATA_FLOW_START_MESSAGE, CALLBACK_ADDRESS, &raw, e);
            None
        }
    }
}

fn read_properties(object: &JsonObject) -> BTreeMap<String, String> {
    let Some(properties) = jsonld::object_property(object, PROPERTIES) else {
        return BTreeMap::new();
    };
    properties
        .iter()
        .filter(|(key, _)| !jsonld::is_keyword(key))
        .filter(|(key, _)| {
            let compact = jsonld::compact_key(key);
            compact == key.as_str() || !properties.contains_key(compact)
        })
        .filter_map(|(key, value)| {
            let text = match jsonld::unwrap_value(value) {
                Value::String(s) => s.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            Some((jsonld::compact_key(key).to_string(), text))
        })
        .collect()
}
