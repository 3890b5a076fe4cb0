//! Flow state transformers.
//!
//! The state object carries the expanded property name and no context.

use crate::properties::STATE;
use crate::{check_type, types};
use dataplane_spi::DataFlowState;
use transform_core::jsonld::{self, TYPE};
use transform_core::{JsonObject, TransformerContext, TypeTransformer};

/// `DataFlowState` to JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowStateToJson;

impl TypeTransformer<DataFlowState, JsonObject> for FlowStateToJson {
    fn transform(
        &self,
        state: &DataFlowState,
        _context: &mut TransformerContext<'_>,
    ) -> Option<JsonObject> {
        let mut object = JsonObject::new();
        object.insert(TYPE.into(), types::DATA_FLOW_STATE.into());
        object.insert(jsonld::edc_term(STATE), state.name().into());
        Some(object)
    }
}

/// JSON to `DataFlowState`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowStateFromJson;

impl TypeTransformer<JsonObject, DataFlowState> for FlowStateFromJson {
    fn transform(
        &self,
        object: &JsonObject,
        context: &mut TransformerContext<'_>,
    ) -> Option<DataFlowState> {
        if !check_type(object, types::DATA_FLOW_STATE, context) {
            return None;
        }
        let Some(raw) = jsonld::string_property(object, STATE) else {
            context.missing_mandatory_property(types::DATA_FLOW_STATE, STATE);
            return None;
        };
        match raw.parse() {
            Ok(state) => Some(state),
            Err(e) => {
                context.invalid_property(types::DATA_FLOW_STATE, STATE, &raw, e);
                None
            }
        }
    }
}
