//! Per-call transformation context.

use crate::{TypeTransformerRegistry, short_type_name};
use std::fmt::Display;

/// Carries the registry and the problems reported during one top-level
/// transformation.
#[derive(Debug)]
pub struct TransformerContext<'r> {
    registry: &'r TypeTransformerRegistry,
    problems: Vec<String>,
}

impl<'r> TransformerContext<'r> {
    /// Create a context over `registry`.
    #[must_use]
    pub const fn new(registry: &'r TypeTransformerRegistry) -> Self {
        Self {
            registry,
            problems: Vec::new(),
        }
    }

    /// Transform a nested value through the registry.
    pub fn transform<I: 'static, O: 'static>(&mut self, input: &I) -> Option<O> {
        let registry = self.registry;
        let Some(transformer) = registry.find::<I, O>() else {
            self.report_problem(format!(
                "No Transformer registered that can handle {} -> {}",
                short_type_name::<I>(),
                short_type_name::<O>()
            ));
            return None;
        };

        transformer
            .transform_any(input, self)
            .and_then(|output| output.downcast::<O>().ok())
            .map(|output| *output)
    }

    /// Record a problem.
    pub fn report_problem(&mut self, problem: impl Into<String>) {
        self.problems.push(problem.into());
    }

    /// A mandatory property is absent.
    pub fn missing_mandatory_property(&mut self, type_name: &str, property: &str) {
        self.report_problem(format!(
            "Mandatory value '{property}' missing in '{type_name}'"
        ));
    }

    /// A property is present but unusable.
    pub fn invalid_property(
        &mut self,
        type_name: &str,
        property: &str,
        value: impl Display,
        reason: impl Display,
    ) {
        self.report_problem(format!(
            "Value '{value}' of '{property}' in '{type_name}' is invalid: {reason}"
        ));
    }

    /// The object carries another `@type` than expected.
    pub fn unexpected_type(&mut self, expected: &str, actual: Option<&str>) {
        self.report_problem(format!(
            "Expected type '{expected}', got '{}'",
            actual.unwrap_or("<none>")
        ));
    }

    /// Whether anything was reported.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Reported problems, in order.
    #[must_use]
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    /// Consume the context, returning its problems.
    #[must_use]
    pub fn into_problems(self) -> Vec<String> {
        self.problems
    }
}
