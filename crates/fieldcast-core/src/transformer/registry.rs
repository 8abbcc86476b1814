//! Transformer registration and resolution
//!
//! The registry keeps three independent indexes (by reference name, by
//! transformer type and by default (from, to) pair) plus a cache of inference
//! results keyed by the field types actually met during mapping.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use super::Transformer;
use crate::rule::{MappingRule, TransformerSelector};
use crate::schema::SchemaRegistry;
use crate::types::ValueType;
use crate::{Error, Result};
use dashmap::DashMap;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A transformer registered as the default for a type pair
#[derive(Clone)]
struct DefaultEntry {
    from: ValueType,
    to: ValueType,
    transformer: Arc<dyn Transformer>,
}

/// Registered transformers and the resolution caches built on top of them
#[derive(Default)]
pub struct TransformerRegistry {
    by_name: HashMap<String, Arc<dyn Transformer>>,
    by_type: DashMap<TypeId, Arc<dyn Transformer>>,
    defaults: Vec<DefaultEntry>,
    inferred: DashMap<(ValueType, ValueType), Option<Arc<dyn Transformer>>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `transformer` under `name` and under its own type
    ///
    /// A transformer that declares default types is also registered as the
    /// default for that pair. Nothing is registered when that pair is taken.
    pub fn register_named<T: Transformer>(&mut self, name: impl Into<String>, transformer: T) -> Result<()> {
        let transformer = Arc::new(transformer);
        let declared = self.declared_default(transformer.as_ref())?;
        self.by_name.insert(name.into(), transformer.clone());
        self.insert_typed::<T>(transformer, declared);
        Ok(())
    }

    /// Register `transformer` under its own type
    pub fn register_typed<T: Transformer>(&mut self, transformer: T) -> Result<()> {
        let transformer = Arc::new(transformer);
        let declared = self.declared_default(transformer.as_ref())?;
        self.insert_typed::<T>(transformer, declared);
        Ok(())
    }

    /// The pair `transformer` declares for itself, checked to be free
    fn declared_default(&self, transformer: &dyn Transformer) -> Result<Option<(ValueType, ValueType)>> {
        match transformer.default_types() {
            Some((from, to)) => self.ensure_default_free(transformer, from, to).map(|_| Some((from, to))),
            None => Ok(None),
        }
    }

    fn insert_typed<T: Transformer>(&mut self, transformer: Arc<T>, declared: Option<(ValueType, ValueType)>) {
        let transformer: Arc<dyn Transformer> = transformer;
        self.by_type.insert(TypeId::of::<T>(), transformer.clone());
        if let Some((from, to)) = declared {
            self.defaults.push(DefaultEntry { from, to, transformer });
        }
        self.inferred.clear();
    }

    fn ensure_default_free(&self, transformer: &dyn Transformer, from: ValueType, to: ValueType) -> Result<()> {
        match self.defaults.iter().find(|e| e.from == from && e.to == to) {
            Some(existing) => Err(Error::configuration(format!(
                "Cannot register default transformer {} for pair [ {}, {} ] - already registered by [ {} ]",
                transformer.name(),
                from,
                to,
                existing.transformer.name()
            ))),
            None => Ok(()),
        }
    }

    /// Register a default transformer for `types`, or for the pair the
    /// transformer declares itself when `types` is `None`
    ///
    /// Two defaults for the exact same pair are a configuration error.
    pub fn register_default(
        &mut self,
        transformer: Arc<dyn Transformer>,
        types: Option<(ValueType, ValueType)>,
    ) -> Result<()> {
        let (from, to) = types.or_else(|| transformer.default_types()).ok_or_else(|| {
            Error::configuration(format!(
                "Cannot register {} as a default transformer: no type pair given or declared",
                transformer.name()
            ))
        })?;
        self.ensure_default_free(transformer.as_ref(), from, to)?;

        self.defaults.push(DefaultEntry { from, to, transformer });
        self.inferred.clear();
        Ok(())
    }

    pub fn named(&self, name: &str) -> Option<Arc<dyn Transformer>> {
        self.by_name.get(name).cloned()
    }

    /// Registered default pairs, in registration order
    pub fn default_pairs(&self) -> Vec<(ValueType, ValueType)> {
        self.defaults.iter().map(|e| (e.from, e.to)).collect()
    }

    /// Number of cached inference results
    pub fn inferred_len(&self) -> usize {
        self.inferred.len()
    }

    /// Pick the transformer for `rule` given the declared source and target
    /// field types
    ///
    /// `Ok(None)` means the value is copied as-is.
    pub fn resolve(
        &self,
        rule: &MappingRule,
        from: ValueType,
        to: ValueType,
        schemas: &SchemaRegistry,
    ) -> Result<Option<Arc<dyn Transformer>>> {
        trace!(%from, %to, selector = ?rule.transformer, "resolving transformer");
        match &rule.transformer {
            TransformerSelector::Named(name) => self
                .named(name)
                .map(Some)
                .ok_or_else(|| Error::TransformerNotFound {
                    reference: name.clone(),
                }),
            TransformerSelector::Type(ty) => {
                if let Some(found) = self.by_type.get(&ty.id()) {
                    return Ok(Some(found.value().clone()));
                }
                let entry = self.by_type.entry(ty.id()).or_try_insert_with(|| {
                    trace!(transformer = ty.name(), "constructing transformer on first use");
                    ty.construct().ok_or_else(|| {
                        Error::configuration(format!(
                            "No transformer registered for type {} and it cannot be constructed",
                            ty.name()
                        ))
                    })
                })?;
                Ok(Some(entry.value().clone()))
            }
            TransformerSelector::Infer => Ok(self.infer(from, to, schemas)),
        }
    }

    /// Default transformer for the runtime pair, cached including misses
    fn infer(&self, from: ValueType, to: ValueType, schemas: &SchemaRegistry) -> Option<Arc<dyn Transformer>> {
        if let Some(cached) = self.inferred.get(&(from, to)) {
            return cached.value().clone();
        }
        self.inferred
            .entry((from, to))
            .or_insert_with(|| {
                let found = self.search_defaults(from, to, schemas);
                trace!(
                    %from,
                    %to,
                    transformer = found.as_ref().map(|t| t.name()),
                    "inferred default transformer"
                );
                found
            })
            .value()
            .clone()
    }

    /// Most specific assignable default: smallest from-distance, then
    /// smallest to-distance, then earliest registration
    fn search_defaults(&self, from: ValueType, to: ValueType, schemas: &SchemaRegistry) -> Option<Arc<dyn Transformer>> {
        self.defaults
            .iter()
            .enumerate()
            .filter_map(|(order, entry)| {
                let from_distance = schemas.distance(entry.from, from)?;
                let to_distance = schemas.distance(entry.to, to)?;
                Some(((from_distance, to_distance, order), entry))
            })
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, entry)| entry.transformer.clone())
    }
}

impl fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("TransformerRegistry")
            .field("named", &names)
            .field("typed", &self.by_type.len())
            .field("defaults", &self.default_pairs())
            .field("inferred", &self.inferred.len())
            .finish()
    }
}
