//! Dotted path resolution
//!
//! A path such as `address.street` names a field reached through a chain of
//! nested entities. Resolving it yields the entity that owns the leaf field
//! together with the field's declared descriptor. Source paths stop quietly
//! at a null intermediate; target paths materialise missing intermediates
//! and attach them to their owner before descending.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use crate::error::FieldAccessError;
use crate::schema::{FieldDescriptor, SchemaRegistry};
use crate::types::{Entity, ObjectRef, Value, ValueType};
use crate::{Error, Result};
use std::ops::Deref;
use std::sync::RwLockReadGuard;
use tracing::trace;

/// Separator between path segments
pub const PATH_DELIMITER: char = '.';

/// Read access to an entity that is either borrowed directly or held under
/// its lock
pub enum EntityView<'a> {
    Borrowed(&'a dyn Entity),
    Locked(RwLockReadGuard<'a, Box<dyn Entity>>),
}

impl<'a> Deref for EntityView<'a> {
    type Target = dyn Entity;

    fn deref(&self) -> &Self::Target {
        match self {
            EntityView::Borrowed(entity) => *entity,
            EntityView::Locked(guard) => &***guard,
        }
    }
}

/// Owner of a resolved source field
pub enum SourceOwner<'a> {
    /// The root object passed to the mapping call
    Root(&'a dyn Entity),
    /// An entity reached through an object-valued field
    Nested(ObjectRef),
}

impl<'a> SourceOwner<'a> {
    pub fn type_name(&self) -> &'static str {
        match self {
            SourceOwner::Root(entity) => entity.type_name(),
            SourceOwner::Nested(object) => object.type_name(),
        }
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        match self {
            SourceOwner::Root(entity) => entity.get_field(field),
            SourceOwner::Nested(object) => object.get(field),
        }
    }

    pub fn view(&self) -> EntityView<'_> {
        match self {
            SourceOwner::Root(entity) => EntityView::Borrowed(*entity),
            SourceOwner::Nested(object) => EntityView::Locked(object.read()),
        }
    }

    pub fn object(&self) -> Option<&ObjectRef> {
        match self {
            SourceOwner::Root(_) => None,
            SourceOwner::Nested(object) => Some(object),
        }
    }
}

/// Owner of a resolved target field
pub enum TargetOwner<'a> {
    Root(&'a mut dyn Entity),
    Nested(ObjectRef),
}

impl<'a> TargetOwner<'a> {
    pub fn type_name(&self) -> &'static str {
        match self {
            TargetOwner::Root(entity) => entity.type_name(),
            TargetOwner::Nested(object) => object.type_name(),
        }
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        match self {
            TargetOwner::Root(entity) => entity.get_field(field),
            TargetOwner::Nested(object) => object.get(field),
        }
    }

    pub fn set(&mut self, field: &str, value: Value) -> std::result::Result<(), FieldAccessError> {
        match self {
            TargetOwner::Root(entity) => entity.set_field(field, value),
            TargetOwner::Nested(object) => object.write().set_field(field, value),
        }
    }

    pub fn view(&self) -> EntityView<'_> {
        match self {
            TargetOwner::Root(entity) => EntityView::Borrowed(&**entity),
            TargetOwner::Nested(object) => EntityView::Locked(object.read()),
        }
    }

    pub fn object(&self) -> Option<&ObjectRef> {
        match self {
            TargetOwner::Root(_) => None,
            TargetOwner::Nested(object) => Some(object),
        }
    }
}

/// A path resolved down to its leaf field
pub struct ResolvedFieldRef<O> {
    pub owner: O,
    pub field: FieldDescriptor,
    /// Runtime type name of the owner
    pub owner_type: &'static str,
}

impl<O> ResolvedFieldRef<O> {
    /// Declared type of the leaf field, used for transformer lookup
    pub fn value_type(&self) -> ValueType {
        self.field.ty
    }
}

impl<'a> ResolvedFieldRef<SourceOwner<'a>> {
    /// Current value of the leaf field
    pub fn read(&self) -> Result<Value> {
        self.owner
            .get(self.field.name)
            .ok_or_else(|| Error::FieldNotFound {
                field: self.field.name.to_string(),
                type_name: self.owner_type.to_string(),
                path: self.field.name.to_string(),
            })
    }
}

/// Resolves dotted paths against entity graphs using the registered schemas
pub struct PathResolver<'s> {
    schemas: &'s SchemaRegistry,
}

impl<'s> PathResolver<'s> {
    pub fn new(schemas: &'s SchemaRegistry) -> Self {
        Self { schemas }
    }

    /// Resolve a source path
    ///
    /// Returns `Ok(None)` when an intermediate field is null; the rule that
    /// asked for this path is then skipped.
    pub fn resolve_source<'a>(
        &self,
        path: &str,
        root: &'a dyn Entity,
    ) -> Result<Option<ResolvedFieldRef<SourceOwner<'a>>>> {
        let (intermediates, leaf) = split_path(path);
        let mut owner = SourceOwner::Root(root);

        for segment in intermediates {
            let owner_type = owner.type_name();
            let field = self.lookup(owner_type, segment, path)?;
            let value = owner
                .get(field.name)
                .ok_or_else(|| field_not_found(segment, owner_type, path))?;
            owner = match value {
                Value::Object(object) => SourceOwner::Nested(object),
                Value::Null => {
                    trace!(path, field = segment, class = owner_type, "null intermediate on source path");
                    return Ok(None);
                }
                _ => return Err(not_an_object(segment, owner_type, path)),
            };
        }

        let owner_type = owner.type_name();
        let field = self.lookup(owner_type, leaf, path)?;
        Ok(Some(ResolvedFieldRef {
            owner,
            field,
            owner_type,
        }))
    }

    /// Resolve a target path, constructing and attaching any null
    /// intermediate objects on the way
    pub fn resolve_target<'a>(
        &self,
        path: &str,
        root: &'a mut dyn Entity,
    ) -> Result<ResolvedFieldRef<TargetOwner<'a>>> {
        let (intermediates, leaf) = split_path(path);
        let mut owner = TargetOwner::Root(root);

        for segment in intermediates {
            let owner_type = owner.type_name();
            let field = self.lookup(owner_type, segment, path)?;
            let value = owner
                .get(field.name)
                .ok_or_else(|| field_not_found(segment, owner_type, path))?;
            let next = match value {
                Value::Object(object) => object,
                Value::Null => self.materialise(&mut owner, field, owner_type, path)?,
                _ => return Err(not_an_object(segment, owner_type, path)),
            };
            owner = TargetOwner::Nested(next);
        }

        let owner_type = owner.type_name();
        let field = self.lookup(owner_type, leaf, path)?;
        Ok(ResolvedFieldRef {
            owner,
            field,
            owner_type,
        })
    }

    fn materialise(
        &self,
        owner: &mut TargetOwner<'_>,
        field: FieldDescriptor,
        owner_type: &'static str,
        path: &str,
    ) -> Result<ObjectRef> {
        let ValueType::Entity(type_name) = field.ty else {
            return Err(not_an_object(field.name, owner_type, path));
        };

        let entity = self.schemas.instantiate(type_name).map_err(|e| Error::Construction {
            type_name: type_name.to_string(),
            reason: format!("field {} on class {} could not be materialised", field.name, owner_type),
            source: Some(e.into()),
        })?;
        let object = ObjectRef::from_boxed(entity);

        owner
            .set(field.name, Value::Object(object.clone()))
            .map_err(|e| Error::Construction {
                type_name: type_name.to_string(),
                reason: format!("could not attach to field {} on class {}", field.name, owner_type),
                source: Some(e.into()),
            })?;

        trace!(path, field = field.name, class = owner_type, created = type_name, "materialised target intermediate");
        Ok(object)
    }

    fn lookup(&self, owner_type: &'static str, segment: &str, path: &str) -> Result<FieldDescriptor> {
        self.schemas
            .find_field(owner_type, segment)
            .ok_or_else(|| field_not_found(segment, owner_type, path))
    }
}

/// Split into intermediate segments and the leaf segment
fn split_path(path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = path.split(PATH_DELIMITER).collect();
    let leaf = segments.pop().unwrap_or_default();
    (segments, leaf)
}

fn field_not_found(field: &str, type_name: &str, path: &str) -> Error {
    Error::FieldNotFound {
        field: field.to_string(),
        type_name: type_name.to_string(),
        path: path.to_string(),
    }
}

fn not_an_object(field: &str, type_name: &str, path: &str) -> Error {
    Error::NotAnObject {
        field: field.to_string(),
        type_name: type_name.to_string(),
        path: path.to_string(),
    }
}
