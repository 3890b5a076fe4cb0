//! Data addresses and transfer types.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Location of data plus whatever a data plane needs to reach it.
///
/// `type` is mandatory; every other property is free-form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAddress {
    #[serde(rename = "type")]
    address_type: String,
    #[serde(flatten)]
    properties: BTreeMap<String, Value>,
}

impl DataAddress {
    /// Property holding the address type.
    pub const TYPE: &'static str = "type";
    /// Property naming the secret that holds credentials for the address.
    pub const KEY_NAME: &'static str = "keyName";

    /// Create an address of the given type.
    #[must_use]
    pub fn new(address_type: impl Into<String>) -> Self {
        Self {
            address_type: address_type.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add a property. Setting `type` replaces the address type.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Set a property in place.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if key == Self::TYPE {
            if let Value::String(t) = value {
                self.address_type = t;
            }
            return;
        }
        self.properties.insert(key, value);
    }

    /// Address type, e.g. `HttpData`.
    #[must_use]
    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    /// Raw property value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Property as a string, if it is one.
    #[must_use]
    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }

    /// Name of the credentials secret, if any.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        self.string_property(Self::KEY_NAME)
    }

    /// All properties except `type`.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }
}

/// Direction of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlowType {
    /// Data plane pushes to the destination.
    Push,
    /// Consumer pulls through an endpoint data reference.
    Pull,
}

impl FlowType {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::Pull => "PULL",
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUSH" => Ok(Self::Push),
            "PULL" => Ok(Self::Pull),
            _ => Err(ParseError::new("flow type", s)),
        }
    }
}

/// Destination type plus flow type, written `HttpData-PUSH`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferType {
    /// Destination address type
    pub destination_type: String,
    /// Flow direction
    pub flow_type: FlowType,
}

impl TransferType {
    /// Create a transfer type.
    #[must_use]
    pub fn new(destination_type: impl Into<String>, flow_type: FlowType) -> Self {
        Self {
            destination_type: destination_type.into(),
            flow_type,
        }
    }
}

impl Default for TransferType {
    fn default() -> Self {
        Self::new("", FlowType::Push)
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.destination_type, self.flow_type)
    }
}

impl FromStr for TransferType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (destination, flow) = s
            .rsplit_once('-')
            .ok_or_else(|| ParseError::new("transfer type", s))?;
        if destination.is_empty() {
            return Err(ParseError::new("transfer type", s));
        }
        let flow_type = flow
            .parse()
            .map_err(|_| ParseError::new("transfer type", s))?;
        Ok(Self::new(destination, flow_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_address_properties() {
        let address = DataAddress::new("HttpData")
            .with_property("baseUrl", "http://example.com")
            .with_property(DataAddress::KEY_NAME, "api-key")
            .with_property("proxyPath", true);

        assert_eq!(address.address_type(), "HttpData");
        assert_eq!(address.string_property("baseUrl"), Some("http://example.com"));
        assert_eq!(address.key_name(), Some("api-key"));
        assert_eq!(address.property("proxyPath"), Some(&json!(true)));
        assert_eq!(address.properties().len(), 3);
    }

    #[test]
    fn test_setting_type_property_replaces_type() {
        let address = DataAddress::new("HttpData").with_property("type", "AmazonS3");
        assert_eq!(address.address_type(), "AmazonS3");
        assert!(address.property("type").is_none());
    }

    #[test]
    fn test_data_address_serde_flattens() {
        let address = DataAddress::new("HttpData").with_property("baseUrl", "http://x");
        let value = serde_json::to_value(&address).unwrap();
        assert_eq!(value, json!({"type": "HttpData", "baseUrl": "http://x"}));

        let back: DataAddress = serde_json::from_value(value).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn test_flow_type_parse() {
        assert_eq!("PUSH".parse::<FlowType>().unwrap(), FlowType::Push);
        assert_eq!("pull".parse::<FlowType>().unwrap(), FlowType::Pull);
        assert!("SIDEWAYS".parse::<FlowType>().is_err());
    }

    #[test]
    fn test_transfer_type_text_form() {
        let transfer = TransferType::new("HttpData", FlowType::Push);
        assert_eq!(transfer.to_string(), "HttpData-PUSH");

        let parsed: TransferType = "Amazon-S3-PULL".parse().unwrap();
        assert_eq!(parsed.destination_type, "Amazon-S3");
        assert_eq!(parsed.flow_type, FlowType::Pull);

        assert!("HttpData".parse::<TransferType>().is_err());
        assert!("-PUSH".parse::<TransferType>().is_err());
        assert!("HttpData-BOTH".parse::<TransferType>().is_err());
    }
}
