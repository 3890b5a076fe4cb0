//! Data-plane selector.
//!
//! Keeps the registered data-plane instances, checks their availability and
//! picks one that can serve a given source and transfer type using a named
//! [`SelectionStrategy`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod service;
pub mod store;
pub mod strategy;

pub use error::SelectorError;
pub use service::DataPlaneSelectorService;
pub use store::{DataPlaneInstanceStore, InMemoryDataPlaneInstanceStore, InstanceUpdate};
pub use strategy::{
    DEFAULT_STRATEGY, FirstSelectionStrategy, RandomSelectionStrategy, SelectionStrategy,
    SelectionStrategyRegistry,
};
