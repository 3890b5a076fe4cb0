//! Data address transformers.
//!
//! A data address is written as a flat object: `type` plus every property.

use crate::types;
use dataplane_spi::DataAddress;
use serde_json::Value;
use transform_core::jsonld::{self, TYPE};
use transform_core::{JsonObject, TransformerContext, TypeTransformer};

/// `DataAddress` to JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataAddressToJson;

impl TypeTransformer<DataAddress, JsonObject> for DataAddressToJson {
    fn transform(
        &self,
        address: &DataAddress,
        _context: &mut TransformerContext<'_>,
    ) -> Option<JsonObject> {
        let mut object = jsonld::nested_object(types::DATA_ADDRESS);
        object.insert(DataAddress::TYPE.into(), address.address_type().into());
        for (key, value) in address.properties() {
            object.insert(key.clone(), value.clone());
        }
        Some(object)
    }
}

/// JSON to `DataAddress`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataAddressFromJson;

impl TypeTransformer<JsonObject, DataAddress> for DataAddressFromJson {
    fn transform(
        &self,
        object: &JsonObject,
        context: &mut TransformerContext<'_>,
    ) -> Option<DataAddress> {
        let Some(type_value) = jsonld::property(object, DataAddress::TYPE) else {
            context.missing_mandatory_property(types::DATA_ADDRESS, DataAddress::TYPE);
            return None;
        };
        let Value::String(address_type) = type_value else {
            context.invalid_property(
                types::DATA_ADDRESS,
                DataAddress::TYPE,
                type_value,
                "expected a string",
            );
            return None;
        };

        let mut address = DataAddress::new(address_type.clone());
        for (key, value) in object {
            if jsonld::is_keyword(key) || key == TYPE {
                continue;
            }
            let compact = jsonld::compact_key(key);
            // The compact spelling wins when a term is written twice.
            if compact == DataAddress::TYPE || (compact != key.as_str() && object.contains_key(compact)) {
                continue;
            }
            address.set_property(compact, jsonld::unwrap_value(value).clone());
        }
        Some(address)
    }
}
