//! Registered data-plane instances.

use crate::DataAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use url::Url;

/// Lifecycle of a data-plane instance as seen by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataPlaneInstanceState {
    /// Known but never checked.
    Registered,
    /// Last check succeeded.
    Available,
    /// Last check failed.
    Unavailable,
    /// Withdrawn; never selected or checked again.
    Unregistered,
}

impl fmt::Display for DataPlaneInstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registered => "REGISTERED",
            Self::Available => "AVAILABLE",
            Self::Unavailable => "UNAVAILABLE",
            Self::Unregistered => "UNREGISTERED",
        })
    }
}

/// A data plane the control plane can signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPlaneInstance {
    /// Instance id
    pub id: String,
    /// Signaling endpoint, e.g. `http://dataplane:8183/v1/dataflows`
    pub url: Url,
    /// Source address types the instance can read
    pub allowed_source_types: BTreeSet<String>,
    /// Transfer types (`HttpData-PUSH`) the instance supports
    pub allowed_transfer_types: BTreeSet<String>,
    /// Free-form properties
    pub properties: BTreeMap<String, Value>,
    /// Current state
    pub state: DataPlaneInstanceState,
    /// When the state last changed
    pub state_timestamp: DateTime<Utc>,
    /// Last successful availability check
    pub last_active: Option<DateTime<Utc>>,
}

impl DataPlaneInstance {
    /// New instance in `REGISTERED` state.
    #[must_use]
    pub fn new(id: impl Into<String>, url: Url) -> Self {
        Self {
            id: id.into(),
            url,
            allowed_source_types: BTreeSet::new(),
            allowed_transfer_types: BTreeSet::new(),
            properties: BTreeMap::new(),
            state: DataPlaneInstanceState::Registered,
            state_timestamp: Utc::now(),
            last_active: None,
        }
    }

    /// Allow a source type.
    #[must_use]
    pub fn with_allowed_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.allowed_source_types.insert(source_type.into());
        self
    }

    /// Allow a transfer type.
    #[must_use]
    pub fn with_allowed_transfer_type(mut self, transfer_type: impl Into<String>) -> Self {
        self.allowed_transfer_types.insert(transfer_type.into());
        self
    }

    /// Add a property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Whether this instance can move data from `source` using `transfer_type`.
    ///
    /// A missing transfer type only checks the source.
    #[must_use]
    pub fn can_handle(&self, source: &DataAddress, transfer_type: Option<&str>) -> bool {
        self.allowed_source_types.contains(source.address_type())
            && transfer_type.is_none_or(|t| self.allowed_transfer_types.contains(t))
    }

    /// Whether the instance may be selected.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state == DataPlaneInstanceState::Available
    }

    /// Move to `state`, stamping the transition time.
    pub fn transition_to(&mut self, state: DataPlaneInstanceState) {
        self.state = state;
        self.state_timestamp = Utc::now();
        if state == DataPlaneInstanceState::Available {
            self.last_active = Some(self.state_timestamp);
        }
    }
}
