//! Mapping rules
//!
//! A [`MappingRule`] declares that a value read from a source path should be
//! written to a target path, optionally through a transformer. Rules are plain
//! data attached to an [`EntitySchema`](crate::EntitySchema), either on one of
//! its fields or on the type itself.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use crate::condition::Condition;
use crate::transformer::{Transformer, TransformerType};
use std::fmt;
use std::sync::Arc;

/// How a rule picks its transformer
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TransformerSelector {
    /// Infer a default transformer from the field types
    #[default]
    Infer,
    /// Use the transformer registered under this name
    Named(String),
    /// Use the transformer registered for this type, constructing one if needed
    Type(TransformerType),
}

/// One mapping instruction
#[derive(Clone, Default)]
pub struct MappingRule {
    /// Target type the rule applies to; falls back to the declaring type's
    /// default mapping target when unset
    pub target: Option<&'static str>,
    /// Dot-delimited source path; empty means the declaring field itself
    pub map_from: String,
    /// Dot-delimited target path; empty means the source field's name
    pub map_to: String,
    pub transformer: TransformerSelector,
    /// Skip the rule when this evaluates false for the raw source value
    pub condition: Option<Arc<dyn Condition>>,
}

impl MappingRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the rule to `target` and its subtypes
    pub fn target(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    pub fn map_from(mut self, path: impl Into<String>) -> Self {
        self.map_from = path.into();
        self
    }

    pub fn map_to(mut self, path: impl Into<String>) -> Self {
        self.map_to = path.into();
        self
    }

    /// Select a transformer by registered name
    pub fn transformer_ref(mut self, name: impl Into<String>) -> Self {
        self.transformer = TransformerSelector::Named(name.into());
        self
    }

    /// Select a transformer by type, constructing it on first use if it was
    /// never registered
    pub fn transformer<T: Transformer + Default>(mut self) -> Self {
        self.transformer = TransformerSelector::Type(TransformerType::of::<T>());
        self
    }

    /// Select a transformer type that must be registered before use
    pub fn transformer_type(mut self, ty: TransformerType) -> Self {
        self.transformer = TransformerSelector::Type(ty);
        self
    }

    pub fn condition<C: Condition + 'static>(mut self, condition: C) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }
}

impl fmt::Debug for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingRule")
            .field("target", &self.target)
            .field("map_from", &self.map_from)
            .field("map_to", &self.map_to)
            .field("transformer", &self.transformer)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}
