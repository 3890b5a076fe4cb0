//! Minimal JSON-LD handling for connector messages.
//!
//! Messages are written in compact form against a single `@vocab` context.
//! Readers accept compact (`processId`), prefixed (`edc:processId`) and
//! expanded (`https://w3id.org/edc/v0.0.1/ns/processId`) keys, and values
//! wrapped as `{"@value": v}` or single-element arrays.

use crate::JsonObject;
use serde_json::{Value, json};

/// Connector vocabulary namespace.
pub const EDC_NAMESPACE: &str = "https://w3id.org/edc/v0.0.1/ns/";
/// Prefix conventionally bound to [`EDC_NAMESPACE`].
pub const EDC_PREFIX: &str = "edc";

/// `@context` keyword.
pub const CONTEXT: &str = "@context";
/// `@type` keyword.
pub const TYPE: &str = "@type";
/// `@id` keyword.
pub const ID: &str = "@id";
/// `@vocab` keyword.
pub const VOCAB: &str = "@vocab";
/// `@value` keyword.
pub const VALUE: &str = "@value";

/// Expanded IRI of a vocabulary term.
#[must_use]
pub fn edc_term(name: &str) -> String {
    format!("{EDC_NAMESPACE}{name}")
}

/// Top-level object of the given type, carrying the vocabulary context.
#[must_use]
pub fn compact_object(type_name: &str) -> JsonObject {
    let mut object = JsonObject::new();
    object.insert(CONTEXT.into(), json!({ VOCAB: EDC_NAMESPACE }));
    object.insert(TYPE.into(), Value::String(type_name.into()));
    object
}

/// Nested object of the given type; inherits the context of its parent.
#[must_use]
pub fn nested_object(type_name: &str) -> JsonObject {
    let mut object = JsonObject::new();
    object.insert(TYPE.into(), Value::String(type_name.into()));
    object
}

/// Whether `key` is a JSON-LD keyword.
#[must_use]
pub fn is_keyword(key: &str) -> bool {
    key.starts_with('@')
}

/// Vocabulary-relative form of `key`.
///
/// `foo`, `edc:foo` and the full EDC IRI name the same term under the EDC
/// `@vocab`, so all three compact to `foo`. Keys outside the EDC vocabulary
/// come back unchanged.
#[must_use]
pub fn compact_key(key: &str) -> &str {
    key.strip_prefix(EDC_NAMESPACE)
        .or_else(|| {
            key.strip_prefix(EDC_PREFIX)
                .and_then(|rest| rest.strip_prefix(':'))
        })
        .unwrap_or(key)
}

/// Strip `@value` wrappers and single-element arrays.
#[must_use]
pub fn unwrap_value(value: &Value) -> &Value {
    match value {
        Value::Array(items) if items.len() == 1 => unwrap_value(&items[0]),
        Value::Object(object) => match object.get(VALUE) {
            Some(inner) => unwrap_value(inner),
            None => value,
        },
        _ => value,
    }
}

/// Look up a vocabulary property in any accepted key form.
#[must_use]
pub fn property<'a>(object: &'a JsonObject, name: &str) -> Option<&'a Value> {
    object
        .get(name)
        .or_else(|| object.get(&edc_term(name)))
        .or_else(|| object.get(&format!("{EDC_PREFIX}:{name}")))
        .map(unwrap_value)
        .filter(|value| !value.is_null())
}

/// String-valued property. Numbers and booleans are rendered as text.
#[must_use]
pub fn string_property(object: &JsonObject, name: &str) -> Option<String> {
    match property(object, name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Object-valued property.
#[must_use]
pub fn object_property<'a>(object: &'a JsonObject, name: &str) -> Option<&'a JsonObject> {
    property(object, name)?.as_object()
}

/// Compact `@type` of an object, if it has exactly one.
#[must_use]
pub fn type_of(object: &JsonObject) -> Option<&str> {
    unwrap_value(object.get(TYPE)?).as_str().map(compact_key)
}

/// Whether the object's `@type` is the given vocabulary type.
#[must_use]
pub fn has_type(object: &JsonObject, type_name: &str) -> bool {
    type_of(object) == Some(type_name)
}

/// `@id` of an object.
#[must_use]
pub fn id_of(object: &JsonObject) -> Option<&str> {
    unwrap_value(object.get(ID)?).as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_compact_object_envelope() {
        let object = compact_object("DataFlowStartMessage");
        assert_eq!(
            Value::Object(object),
            json!({
                "@context": {"@vocab": "https://w3id.org/edc/v0.0.1/ns/"},
                "@type": "DataFlowStartMessage"
            })
        );
    }

    #[test]
    fn test_property_key_forms() {
        let object = obj(json!({
            "processId": "p1",
            "https://w3id.org/edc/v0.0.1/ns/assetId": [{"@value": "a1"}],
            "edc:agreementId": {"@value": "c1"}
        }));

        assert_eq!(string_property(&object, "processId").as_deref(), Some("p1"));
        assert_eq!(string_property(&object, "assetId").as_deref(), Some("a1"));
        assert_eq!(string_property(&object, "agreementId").as_deref(), Some("c1"));
        assert!(property(&object, "participantId").is_none());
    }

    #[test]
    fn test_null_is_absent() {
        let object = obj(json!({"reason": null}));
        assert!(property(&object, "reason").is_none());
    }

    #[test]
    fn test_type_of_accepts_expanded_and_array() {
        let expanded = obj(json!({"@type": ["https://w3id.org/edc/v0.0.1/ns/DataAddress"]}));
        assert_eq!(type_of(&expanded), Some("DataAddress"));
        assert!(has_type(&expanded, "DataAddress"));

        let untyped = obj(json!({"type": "HttpData"}));
        assert!(type_of(&untyped).is_none());
    }

    #[test]
    fn test_multi_element_arrays_are_kept() {
        let value = json!(["a", "b"]);
        assert_eq!(unwrap_value(&value), &value);
    }

    #[test]
    fn test_compact_key() {
        assert_eq!(compact_key("https://w3id.org/edc/v0.0.1/ns/state"), "state");
        assert_eq!(compact_key("edc:state"), "state");
        assert_eq!(compact_key("edcstate"), "edcstate");
        assert_eq!(compact_key("@type"), "@type");
    }
}
