//! Registry of transformers indexed by input and output type.

use crate::{TransformFailure, TransformerContext, short_type_name};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::debug;

/// Converts an `I` into an `O`.
///
/// Returning `None` means the input could not be converted; the transformer
/// should report why on the context.
pub trait TypeTransformer<I, O>: Send + Sync {
    /// Transform `input`, reporting problems on `context`.
    fn transform(&self, input: &I, context: &mut TransformerContext<'_>) -> Option<O>;
}

pub(crate) trait ErasedTransformer: Send + Sync {
    fn transform_any(
        &self,
        input: &dyn Any,
        context: &mut TransformerContext<'_>,
    ) -> Option<Box<dyn Any>>;
}

struct Typed<I, O, T> {
    inner: T,
    _types: PhantomData<fn(&I) -> O>,
}

impl<I, O, T> ErasedTransformer for Typed<I, O, T>
where
    I: 'static,
    O: 'static,
    T: TypeTransformer<I, O>,
{
    fn transform_any(
        &self,
        input: &dyn Any,
        context: &mut TransformerContext<'_>,
    ) -> Option<Box<dyn Any>> {
        let input = input.downcast_ref::<I>()?;
        self.inner
            .transform(input, context)
            .map(|output| Box::new(output) as Box<dyn Any>)
    }
}

/// Registry of transformers.
#[derive(Default)]
pub struct TypeTransformerRegistry {
    transformers: HashMap<(TypeId, TypeId), Box<dyn ErasedTransformer>>,
}

impl std::fmt::Debug for TypeTransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeTransformerRegistry")
            .field("transformers", &self.transformers.len())
            .finish()
    }
}

impl TypeTransformerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer, replacing any previous one for the same pair.
    pub fn register<I, O, T>(&mut self, transformer: T)
    where
        I: 'static,
        O: 'static,
        T: TypeTransformer<I, O> + 'static,
    {
        debug!(
            input = short_type_name::<I>(),
            output = short_type_name::<O>(),
            "Registering transformer"
        );
        self.transformers.insert(
            (TypeId::of::<I>(), TypeId::of::<O>()),
            Box::new(Typed {
                inner: transformer,
                _types: PhantomData,
            }),
        );
    }

    /// Whether a transformer for `I -> O` is registered.
    #[must_use]
    pub fn has_transformer<I: 'static, O: 'static>(&self) -> bool {
        self.transformers
            .contains_key(&(TypeId::of::<I>(), TypeId::of::<O>()))
    }

    /// Number of registered transformers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub(crate) fn find<I: 'static, O: 'static>(&self) -> Option<&dyn ErasedTransformer> {
        self.transformers
            .get(&(TypeId::of::<I>(), TypeId::of::<O>()))
            .map(AsRef::as_ref)
    }

    /// Transform `input` into an `O`.
    ///
    /// # Errors
    ///
    /// Fails when no transformer is registered for the pair, or when any
    /// problem was reported, even if a value was produced.
    pub fn transform<I: 'static, O: 'static>(&self, input: &I) -> Result<O, TransformFailure> {
        let mut context = TransformerContext::new(self);
        let output = context.transform::<I, O>(input);

        if context.has_problems() {
            return Err(TransformFailure::from_messages(context.into_problems()));
        }

        output.ok_or_else(|| {
            TransformFailure::new(format!(
                "Failed to transform {} to {}",
                short_type_name::<I>(),
                short_type_name::<O>()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Celsius(f64);

    #[derive(Debug, PartialEq)]
    struct Fahrenheit(f64);

    #[derive(Debug, PartialEq)]
    struct Reading {
        label: String,
        value: Fahrenheit,
    }

    struct ToFahrenheit;

    impl TypeTransformer<Celsius, Fahrenheit> for ToFahrenheit {
        fn transform(&self, c: &Celsius, _: &mut TransformerContext<'_>) -> Option<Fahrenheit> {
            Some(Fahrenheit(c.0 * 9.0 / 5.0 + 32.0))
        }
    }

    struct ToReading;

    impl TypeTransformer<(String, Celsius), Reading> for ToReading {
        fn transform(
            &self,
            pair: &(String, Celsius),
            ctx: &mut TransformerContext<'_>,
        ) -> Option<Reading> {
            if pair.0.is_empty() {
                ctx.missing_mandatory_property("Reading", "label");
                return None;
            }
            Some(Reading {
                label: pair.0.clone(),
                value: ctx.transform(&pair.1)?,
            })
        }
    }

    fn registry() -> TypeTransformerRegistry {
        let mut registry = TypeTransformerRegistry::new();
        registry.register::<Celsius, Fahrenheit, _>(ToFahrenheit);
        registry.register::<(String, Celsius), Reading, _>(ToReading);
        registry
    }

    #[test]
    fn test_transform_with_registered_transformer() {
        let out: Fahrenheit = registry().transform(&Celsius(100.0)).unwrap();
        assert_eq!(out, Fahrenheit(212.0));
    }

    #[test]
    fn test_nested_transform_uses_same_registry() {
        let reading: Reading = registry()
            .transform(&("kitchen".to_string(), Celsius(0.0)))
            .unwrap();
        assert_eq!(reading.value, Fahrenheit(32.0));
        assert_eq!(reading.label, "kitchen");
    }

    #[test]
    fn test_missing_transformer_is_reported() {
        let err = registry().transform::<Fahrenheit, Celsius>(&Fahrenheit(1.0)).unwrap_err();
        assert_eq!(
            err.messages,
            vec!["No Transformer registered that can handle Fahrenheit -> Celsius".to_string()]
        );
    }

    #[test]
    fn test_reported_problem_becomes_failure() {
        let err = registry()
            .transform::<_, Reading>(&(String::new(), Celsius(0.0)))
            .unwrap_err();
        assert_eq!(
            err.messages,
            vec!["Mandatory value 'label' missing in 'Reading'".to_string()]
        );
    }

    #[test]
    fn test_registry_introspection() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.has_transformer::<Celsius, Fahrenheit>());
        assert!(!registry.has_transformer::<Fahrenheit, Celsius>());
    }
}
