//! Data-plane signaling client.
//!
//! [`DataPlaneSignalingClient`] sends start, suspend, terminate and
//! availability messages to one data-plane instance over HTTP.
//! [`DataFlowController`] picks the instance through the data-plane selector
//! and forwards to a client created by [`DataPlaneSignalingClientFactory`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod controller;
pub mod factory;
pub mod settings;

pub use client::DataPlaneSignalingClient;
pub use controller::{DataFlowController, DataFlowResponse};
pub use factory::DataPlaneSignalingClientFactory;
pub use settings::SignalingClientSettings;
