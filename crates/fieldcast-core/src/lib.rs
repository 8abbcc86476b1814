//! Fieldcast Core - Rule-driven field propagation between object graphs
//!
//! This crate copies field values from a source entity graph into a target
//! entity graph according to declarative per-field and per-type rules,
//! transforming values on the way when the rules ask for it.
//!
//! # Main Components
//!
//! - **Error Handling**: Error types using `thiserror` and `anyhow`
//! - **Core Types**: Dynamic [`Value`]s and the [`Entity`] capability interface
//! - **Schemas**: Precomputed per-type field and rule tables in a [`SchemaRegistry`]
//! - **Transformers**: Explicit, referenced and type-inferred value conversions
//! - **Mapping Engine**: Path resolution, cached entity structures and mapping passes
//!
//! # Example
//!
//! ```no_run
//! use fieldcast_core::{Entity, MappingEngine, Result, SchemaRegistry};
//! use std::sync::Arc;
//!
//! fn copy(source: &dyn Entity, target: &mut dyn Entity, schemas: SchemaRegistry) -> Result<()> {
//!     let engine = MappingEngine::new(Arc::new(schemas))?;
//!     engine.map(source, target)
//! }
//! ```
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

pub mod condition;
pub mod config;
pub mod decorator;
pub mod error;
pub mod mapping;
pub mod rule;
pub mod schema;
pub mod transformer;
pub mod types;

// Re-export main types for convenience
pub use condition::{Condition, NotBlank};
pub use config::EngineConfig;
pub use decorator::{Decorator, DecoratorContext};
pub use error::{Error, FieldAccessError, Result, TransformError};
pub use mapping::{EntityStructure, MappingEngine, MappingEngineBuilder};
pub use rule::{MappingRule, TransformerSelector};
pub use schema::{EntitySchema, EntitySchemaBuilder, FieldDescriptor, SchemaRegistry};
pub use transformer::{TransformContext, Transformer, TransformerRegistry, TransformerType};
pub use types::{AsAny, Entity, FromValue, ObjectRef, TypedEntity, Value, ValueType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
