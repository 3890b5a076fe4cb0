//! Data-flow lifecycle states.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// State of a data flow on the data plane, with its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataFlowState {
    /// The data plane does not know the flow.
    NotTracked,
    /// Flow accepted, not yet running.
    Received,
    /// Transfer running.
    Started,
    /// Transfer finished.
    Completed,
    /// Transfer paused.
    Suspended,
    /// Transfer stopped on request.
    Terminated,
    /// Transfer failed.
    Failed,
    /// Control plane informed of the outcome.
    Notified,
}

impl DataFlowState {
    const ALL: [Self; 8] = [
        Self::NotTracked,
        Self::Received,
        Self::Started,
        Self::Completed,
        Self::Suspended,
        Self::Terminated,
        Self::Failed,
        Self::Notified,
    ];

    /// Numeric code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::NotTracked => 0,
            Self::Received => 100,
            Self::Started => 150,
            Self::Completed => 200,
            Self::Suspended => 225,
            Self::Terminated => 250,
            Self::Failed => 300,
            Self::Notified => 400,
        }
    }

    /// State for a numeric code.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Wire name, e.g. `STARTED`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NotTracked => "NOT_TRACKED",
            Self::Received => "RECEIVED",
            Self::Started => "STARTED",
            Self::Completed => "COMPLETED",
            Self::Suspended => "SUSPENDED",
            Self::Terminated => "TERMINATED",
            Self::Failed => "FAILED",
            Self::Notified => "NOTIFIED",
        }
    }

    /// No further transitions happen from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Terminated | Self::Failed | Self::Notified
        )
    }
}

impl fmt::Display for DataFlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataFlowState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::new("data flow state", s))
    }
}
