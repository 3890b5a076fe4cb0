//! Type transformer registry.
//!
//! Transformers convert between wire representations (JSON objects) and
//! domain types. They are registered per `(input, output)` type pair and may
//! call back into the registry for nested values; problems found along the
//! way are collected on the [`TransformerContext`] and surface as a single
//! [`TransformFailure`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod jsonld;
pub mod registry;

pub use context::TransformerContext;
pub use error::TransformFailure;
pub use registry::{TypeTransformer, TypeTransformerRegistry};

/// A JSON object as used on the wire.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Last path segment of a type name, e.g. `DataAddress` for `dataplane_spi::DataAddress`.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
