//! Shared test utilities for the connector extensions.
//!
//! This crate provides:
//! - Proptest generators for signaling and Vault inputs
//! - Recording mocks for data-plane clients
//! - Test fixtures with sample messages, instances and Vault responses

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
