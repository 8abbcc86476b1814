//! Precomputed per-type schemas
//!
//! An [`EntitySchema`] is the static description of one entity type: its
//! place in the type hierarchy, its declared fields, the mapping rules
//! declared on those fields and on the type itself, and how to construct a
//! fresh instance. Schemas are collected in a [`SchemaRegistry`], which the
//! mapping engine consults instead of introspecting types at runtime.
//!
//! ```
//! use fieldcast_core::{EntitySchema, MappingRule, ValueType};
//!
//! let schema = EntitySchema::builder("Person")
//!     .default_target("PersonDto")
//!     .mapped_field("name", ValueType::String, [MappingRule::new().map_to("displayName")])
//!     .field("age", ValueType::Int)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.fields().len(), 2);
//! assert_eq!(schema.default_target(), Some("PersonDto"));
//! ```
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

pub mod registry;

pub use registry::SchemaRegistry;

use crate::rule::MappingRule;
use crate::types::{Entity, ValueType};
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Name and declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: ValueType,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, ty: ValueType) -> Self {
        Self { name, ty }
    }
}

/// A field as declared on one type, with the rules attached to it
#[derive(Debug, Clone)]
pub struct DeclaredField {
    pub descriptor: FieldDescriptor,
    pub rules: Vec<MappingRule>,
}

/// No-argument construction path for an entity type
pub type Constructor = Arc<dyn Fn() -> Box<dyn Entity> + Send + Sync>;

/// Static description of one entity type
#[derive(Clone)]
pub struct EntitySchema {
    name: &'static str,
    parent: Option<&'static str>,
    interfaces: Vec<&'static str>,
    fields: Vec<DeclaredField>,
    type_rules: Vec<MappingRule>,
    default_target: Option<&'static str>,
    constructor: Option<Constructor>,
}

impl EntitySchema {
    pub fn builder(name: &'static str) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Direct base type, if any
    pub fn parent(&self) -> Option<&'static str> {
        self.parent
    }

    pub fn interfaces(&self) -> &[&'static str] {
        &self.interfaces
    }

    /// Fields declared on this type only, in declaration order
    pub fn fields(&self) -> &[DeclaredField] {
        &self.fields
    }

    /// Rules declared on the type itself
    pub fn type_rules(&self) -> &[MappingRule] {
        &self.type_rules
    }

    /// Target used by rules that name no explicit target type
    pub fn default_target(&self) -> Option<&'static str> {
        self.default_target
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    pub(crate) fn construct(&self) -> Option<Box<dyn Entity>> {
        self.constructor.as_ref().map(|constructor| constructor())
    }
}

impl fmt::Debug for EntitySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("fields", &self.fields)
            .field("type_rules", &self.type_rules)
            .field("default_target", &self.default_target)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

/// Builder for [`EntitySchema`]
pub struct EntitySchemaBuilder {
    schema: EntitySchema,
}

impl EntitySchemaBuilder {
    pub fn new(name: &'static str) -> Self {
        Self {
            schema: EntitySchema {
                name,
                parent: None,
                interfaces: Vec::new(),
                fields: Vec::new(),
                type_rules: Vec::new(),
                default_target: None,
                constructor: None,
            },
        }
    }

    /// Set the direct base type
    pub fn extends(mut self, parent: &'static str) -> Self {
        self.schema.parent = Some(parent);
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, interface: &'static str) -> Self {
        self.schema.interfaces.push(interface);
        self
    }

    /// Set the default mapping target
    pub fn default_target(mut self, target: &'static str) -> Self {
        self.schema.default_target = Some(target);
        self
    }

    /// Declare a field without mapping rules
    pub fn field(self, name: &'static str, ty: ValueType) -> Self {
        self.mapped_field(name, ty, [])
    }

    /// Declare a field together with its mapping rules
    pub fn mapped_field<I>(mut self, name: &'static str, ty: ValueType, rules: I) -> Self
    where
        I: IntoIterator<Item = MappingRule>,
    {
        self.schema.fields.push(DeclaredField {
            descriptor: FieldDescriptor::new(name, ty),
            rules: rules.into_iter().collect(),
        });
        self
    }

    /// Add a type-level rule
    pub fn rule(mut self, rule: MappingRule) -> Self {
        self.schema.type_rules.push(rule);
        self
    }

    /// Set the construction path
    pub fn constructor<E, F>(mut self, constructor: F) -> Self
    where
        E: Entity,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.schema.constructor = Some(Arc::new(move || Box::new(constructor()) as Box<dyn Entity>));
        self
    }

    /// Construct through `Default`
    pub fn constructible<E: Entity + Default>(self) -> Self {
        self.constructor(E::default)
    }

    pub fn build(self) -> Result<EntitySchema> {
        let schema = self.schema;
        for (index, field) in schema.fields.iter().enumerate() {
            let name = field.descriptor.name;
            if schema.fields[..index].iter().any(|f| f.descriptor.name == name) {
                return Err(Error::configuration(format!(
                    "Field {} declared twice on class {}",
                    name, schema.name
                )));
            }
        }
        if schema.parent == Some(schema.name) {
            return Err(Error::configuration(format!(
                "Class {} cannot extend itself",
                schema.name
            )));
        }
        Ok(schema)
    }
}
