//! Value transformers applied while copying a field
//!
//! A [`Transformer`] turns the value read from a source field into the value
//! written to a target field. Rules pick one explicitly, by registered name
//! or by type, or leave the choice to the [`TransformerRegistry`], which infers
//! a default transformer from the two field types.
//!
//! # Module Organization
//!
//! - [`registry`] - Registration and resolution of transformers
//! - [`built_in`] - Pre-configured transformers for common conversions
//!
//! # Examples
//!
//! ```
//! use fieldcast_core::transformer::{TransformContext, Transformer};
//! use fieldcast_core::{TransformError, Value, ValueType};
//!
//! #[derive(Default)]
//! struct Uppercase;
//!
//! impl Transformer for Uppercase {
//!     fn transform(&self, value: Value, _context: &TransformContext<'_>) -> Result<Value, TransformError> {
//!         Ok(match value {
//!             Value::String(s) => Value::String(s.to_uppercase()),
//!             other => other,
//!         })
//!     }
//!
//!     fn default_types(&self) -> Option<(ValueType, ValueType)> {
//!         Some((ValueType::String, ValueType::String))
//!     }
//! }
//! ```
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod registry;


pub use registry::TransformerRegistry;

use crate::error::TransformError;
use crate::schema::FieldDescriptor;
use crate::types::{Entity, Value, ValueType};
use std::any::{self, TypeId};
use std::fmt;
use std::sync::Arc;

/// Everything a transformer may inspect besides the value itself
pub struct TransformContext<'a> {
    pub source_field: &'a FieldDescriptor,
    pub target_field: &'a FieldDescriptor,
    /// Object owning the source field
    pub source: &'a dyn Entity,
    /// Object owning the target field
    pub target: &'a dyn Entity,
}

/// Converts a source field value into a target field value
///
/// Returning [`Value::Null`] leaves the target field untouched.
pub trait Transformer: Send + Sync + 'static {
    fn transform(&self, value: Value, context: &TransformContext<'_>) -> Result<Value, TransformError>;

    /// The (from, to) pair this transformer serves as a default for, if any
    fn default_types(&self) -> Option<(ValueType, ValueType)> {
        None
    }

    /// Name used in diagnostics
    fn name(&self) -> &'static str {
        short_type_name(any::type_name::<Self>())
    }
}

/// Identity of a transformer type, with an optional construction path
#[derive(Clone, Copy)]
pub struct TransformerType {
    id: TypeId,
    name: &'static str,
    construct: Option<fn() -> Arc<dyn Transformer>>,
}

impl TransformerType {
    /// A transformer type the registry may construct on first use
    pub fn of<T: Transformer + Default>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(any::type_name::<T>()),
            construct: Some(construct_default::<T>),
        }
    }

    /// A transformer type that must be registered explicitly
    pub fn registered<T: Transformer>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(any::type_name::<T>()),
            construct: None,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn construct(&self) -> Option<Arc<dyn Transformer>> {
        self.construct.map(|construct| construct())
    }
}

impl PartialEq for TransformerType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for TransformerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransformerType({})", self.name)
    }
}

fn construct_default<T: Transformer + Default>() -> Arc<dyn Transformer> {
    Arc::new(T::default())
}

/// Strip the module path from a type name
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(index) => &full[index + 2..],
        None => full,
    }
}
