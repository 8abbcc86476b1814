//! Mapping passes between entity graphs
//!
//! # Module Organization
//!
//! - [`path`] - Dotted path resolution on the source and target side
//! - [`structure`] - Per type-pair rule collections and their cache
//! - [`engine`] - The [`MappingEngine`] and its builder
//!
//! # Examples
//!
//! ```
//! use fieldcast_core::{
//!     Entity, EntitySchema, FieldAccessError, MappingEngine, MappingRule, SchemaRegistry,
//!     TypedEntity, Value, ValueType,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct User {
//!     name: Option<String>,
//! }
//!
//! #[derive(Default)]
//! struct UserView {
//!     display_name: Option<String>,
//! }
//!
//! impl Entity for User {
//!     fn type_name(&self) -> &'static str {
//!         "User"
//!     }
//!
//!     fn get_field(&self, name: &str) -> Option<Value> {
//!         (name == "name").then(|| self.name.clone().into())
//!     }
//!
//!     fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
//!         match name {
//!             "name" => Ok(self.name = value.extract(name)?),
//!             _ => Err(FieldAccessError::UnknownField(name.to_string())),
//!         }
//!     }
//! }
//!
//! impl Entity for UserView {
//!     fn type_name(&self) -> &'static str {
//!         Self::TYPE_NAME
//!     }
//!
//!     fn get_field(&self, name: &str) -> Option<Value> {
//!         (name == "displayName").then(|| self.display_name.clone().into())
//!     }
//!
//!     fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
//!         match name {
//!             "displayName" => Ok(self.display_name = value.extract(name)?),
//!             _ => Err(FieldAccessError::UnknownField(name.to_string())),
//!         }
//!     }
//! }
//!
//! impl TypedEntity for UserView {
//!     const TYPE_NAME: &'static str = "UserView";
//! }
//!
//! let mut schemas = SchemaRegistry::new();
//! schemas.register(
//!     EntitySchema::builder("User")
//!         .default_target("UserView")
//!         .mapped_field("name", ValueType::String, [MappingRule::new().map_to("displayName")])
//!         .build()?,
//! )?;
//! schemas.register(
//!     EntitySchema::builder("UserView")
//!         .field("displayName", ValueType::String)
//!         .constructible::<UserView>()
//!         .build()?,
//! )?;
//!
//! let engine = MappingEngine::new(Arc::new(schemas))?;
//! let view: UserView = engine.map_as(&User { name: Some("Ada".to_string()) })?;
//! assert_eq!(view.display_name.as_deref(), Some("Ada"));
//! # Ok::<(), fieldcast_core::Error>(())
//! ```
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

pub mod engine;
pub mod path;
pub mod structure;


pub use engine::{MappingEngine, MappingEngineBuilder};
pub use path::{PathResolver, ResolvedFieldRef, PATH_DELIMITER};
pub use structure::{EntityStructure, FieldRules, StructureCache};
