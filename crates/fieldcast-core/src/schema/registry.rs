//! Registry of entity schemas
//!
//! The registry answers every type question the engine asks: the class
//! lineage of a type, where a field is declared, whether one type is
//! assignable from another, and how to construct a type.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use super::{EntitySchema, FieldDescriptor};
use crate::types::{Entity, ValueType};
use crate::{Error, Result};
use dashmap::DashMap;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Ancestor-aware field index of one type
type FieldIndex = HashMap<&'static str, FieldDescriptor>;

/// Collection of entity schemas, keyed by type name
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, EntitySchema>,
    field_indexes: DashMap<&'static str, Arc<FieldIndex>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema; each type name may be registered once
    pub fn register(&mut self, schema: EntitySchema) -> Result<()> {
        let name = schema.name();
        if self.schemas.contains_key(name) {
            return Err(Error::configuration(format!(
                "Schema for class {} is already registered",
                name
            )));
        }
        self.schemas.insert(name, schema);
        self.field_indexes.clear();
        Ok(())
    }

    /// Register several schemas, stopping at the first failure
    pub fn register_all<I>(&mut self, schemas: I) -> Result<()>
    where
        I: IntoIterator<Item = EntitySchema>,
    {
        schemas.into_iter().try_for_each(|schema| self.register(schema))
    }

    pub fn schema(&self, name: &str) -> Option<&EntitySchema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Class chain of `name`, most-derived first
    ///
    /// Interfaces are not part of the lineage. The walk stops at the first
    /// base type that has no registered schema.
    pub fn lineage(&self, name: &str) -> Vec<&EntitySchema> {
        let mut chain: Vec<&EntitySchema> = Vec::new();
        let mut current = self.schemas.get(name);
        while let Some(schema) = current {
            if chain.iter().any(|seen| seen.name() == schema.name()) {
                break;
            }
            chain.push(schema);
            current = schema.parent().and_then(|parent| self.schemas.get(parent));
        }
        chain
    }

    /// Look up a field declared on `type_name` or any of its base types
    ///
    /// A field redeclared on a derived type shadows the base declaration.
    pub fn find_field(&self, type_name: &'static str, field: &str) -> Option<FieldDescriptor> {
        if let Some(index) = self.field_indexes.get(type_name) {
            return index.get(field).copied();
        }
        let index = self
            .field_indexes
            .entry(type_name)
            .or_insert_with(|| Arc::new(self.build_field_index(type_name)))
            .clone();
        index.get(field).copied()
    }

    fn build_field_index(&self, type_name: &str) -> FieldIndex {
        let mut index = FieldIndex::new();
        for schema in self.lineage(type_name) {
            for field in schema.fields() {
                index
                    .entry(field.descriptor.name)
                    .or_insert(field.descriptor);
            }
        }
        index
    }

    /// Whether a slot declared as `declared` accepts a value of type `actual`
    pub fn is_assignable(&self, declared: ValueType, actual: ValueType) -> bool {
        self.distance(declared, actual).is_some()
    }

    /// How far `declared` sits above `actual` in the type hierarchy
    ///
    /// `Some(0)` for identical types, the inheritance depth for base types and
    /// interfaces, `Some(1)` for `Number` over a numeric type and
    /// `Some(usize::MAX)` for `Any`. `None` when not assignable.
    pub fn distance(&self, declared: ValueType, actual: ValueType) -> Option<usize> {
        if declared == actual {
            return Some(0);
        }
        match (declared, actual) {
            (ValueType::Any, _) => Some(usize::MAX),
            (ValueType::Number, actual) if actual.is_numeric() => Some(1),
            (ValueType::Entity(declared), ValueType::Entity(actual)) => {
                self.supertype_distance(declared, actual)
            }
            _ => None,
        }
    }

    /// Breadth-first walk over base types and interfaces
    fn supertype_distance(&self, declared: &str, actual: &str) -> Option<usize> {
        let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(actual, 0)]);
        let mut visited: HashSet<&str> = HashSet::new();
        while let Some((name, depth)) = queue.pop_front() {
            if name == declared {
                return Some(depth);
            }
            if !visited.insert(name) {
                continue;
            }
            if let Some(schema) = self.schemas.get(name) {
                schema
                    .parent()
                    .into_iter()
                    .chain(schema.interfaces().iter().copied())
                    .for_each(|supertype| queue.push_back((supertype, depth + 1)));
            }
        }
        None
    }

    /// Build a fresh instance through the type's construction path
    pub fn instantiate(&self, type_name: &str) -> Result<Box<dyn Entity>> {
        let schema = self.schemas.get(type_name).ok_or_else(|| Error::Construction {
            type_name: type_name.to_string(),
            reason: "no schema registered for this class".to_string(),
            source: None,
        })?;
        schema.construct().ok_or_else(|| Error::Construction {
            type_name: type_name.to_string(),
            reason: "class declares no no-argument construction path".to_string(),
            source: None,
        })
    }
}
