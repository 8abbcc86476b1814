//! The mapping engine
//!
//! [`MappingEngine`] runs one mapping pass at a time: it fetches the entity
//! structure for the runtime type pair, applies every type-level rule, then
//! every field-level rule, then the decorators registered for the pair.
//! Any error aborts the pass; fields already written stay written.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use super::path::{PathResolver, ResolvedFieldRef, SourceOwner, TargetOwner, PATH_DELIMITER};
use super::structure::{EntityStructure, StructureCache};
use crate::config::EngineConfig;
use crate::decorator::{Decorator, DecoratorContext};
use crate::rule::MappingRule;
use crate::schema::SchemaRegistry;
use crate::transformer::{built_in, TransformContext, Transformer, TransformerRegistry};
use crate::types::{AsAny, Entity, TypedEntity, Value, ValueType};
use crate::{Error, Result};
use anyhow::anyhow;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug_span, trace};

type DecoratorKey = (&'static str, &'static str);

/// Rule-driven field propagation between entity graphs
///
/// Registration takes `&mut self` and mapping takes `&self`, so all
/// registrations are complete before the engine is shared across threads.
pub struct MappingEngine {
    schemas: Arc<SchemaRegistry>,
    transformers: TransformerRegistry,
    structures: StructureCache,
    decorators: HashMap<DecoratorKey, Vec<Arc<dyn Decorator>>>,
    config: EngineConfig,
}

impl MappingEngine {
    /// Engine with the default configuration
    pub fn new(schemas: Arc<SchemaRegistry>) -> Result<Self> {
        Self::with_config(schemas, EngineConfig::default())
    }

    pub fn with_config(schemas: Arc<SchemaRegistry>, config: EngineConfig) -> Result<Self> {
        let mut transformers = TransformerRegistry::new();
        if config.default_transformers {
            for transformer in built_in::default_transformers() {
                transformers.register_default(transformer, None)?;
            }
        }
        Ok(Self {
            schemas,
            transformers,
            structures: StructureCache::new(),
            decorators: HashMap::new(),
            config,
        })
    }

    pub fn builder(schemas: Arc<SchemaRegistry>) -> MappingEngineBuilder {
        MappingEngineBuilder::new(schemas)
    }

    /// Register a transformer under a reference name
    pub fn register_transformer<T: Transformer>(&mut self, name: impl Into<String>, transformer: T) -> Result<()> {
        self.transformers.register_named(name, transformer)
    }

    /// Register a transformer under its own type
    pub fn register_transformer_type<T: Transformer>(&mut self, transformer: T) -> Result<()> {
        self.transformers.register_typed(transformer)
    }

    /// Register a default transformer for `types`, or for the pair it
    /// declares itself
    pub fn register_default_transformer<T: Transformer>(
        &mut self,
        transformer: T,
        types: Option<(ValueType, ValueType)>,
    ) -> Result<()> {
        self.transformers.register_default(Arc::new(transformer), types)
    }

    /// Run `decorator` after every pass from `source_type` into `target_type`
    pub fn register_decorator<D: Decorator>(
        &mut self,
        source_type: &'static str,
        target_type: &'static str,
        decorator: D,
    ) {
        self.decorators
            .entry((source_type, target_type))
            .or_default()
            .push(Arc::new(decorator));
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn transformers(&self) -> &TransformerRegistry {
        &self.transformers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rules applied when mapping `source_type` into `target_type`
    pub fn structure(&self, source_type: &'static str, target_type: &'static str) -> Result<Arc<EntityStructure>> {
        self.structures.get(source_type, target_type, &self.schemas)
    }

    /// Number of type pairs with a cached structure
    pub fn cached_structures(&self) -> usize {
        self.structures.len()
    }

    /// Map `source` into the existing `target`
    pub fn map(&self, source: &dyn Entity, target: &mut dyn Entity) -> Result<()> {
        let source_type = source.type_name();
        let target_type = target.type_name();
        let span = debug_span!("map", source = source_type, target = target_type);
        let _enter = span.enter();

        let structure = self.structures.get(source_type, target_type, &self.schemas)?;

        for rule in &structure.type_rules {
            let from = strip_type_prefix(&rule.map_from, source_type);
            let to = strip_type_prefix(&rule.map_to, target_type);
            self.apply_rule(rule, from, to, source, &mut *target)?;
        }

        for declared in &structure.field_rules {
            for rule in &declared.rules {
                let from = effective_source_path(declared.field.name, &rule.map_from);
                self.apply_rule(rule, &from, &rule.map_to, source, &mut *target)?;
            }
        }

        self.decorate(source, target)
    }

    /// Construct a `target_type` and map `source` into it
    pub fn map_new(&self, source: &dyn Entity, target_type: &str) -> Result<Box<dyn Entity>> {
        let mut target = self.schemas.instantiate(target_type)?;
        self.map(source, &mut *target)?;
        Ok(target)
    }

    /// Construct a `T` and map `source` into it
    pub fn map_as<T: TypedEntity>(&self, source: &dyn Entity) -> Result<T> {
        let target = self.map_new(source, T::TYPE_NAME)?;
        let constructed = target.type_name();
        <dyn Entity as AsAny>::into_any(target)
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| Error::Construction {
                type_name: T::TYPE_NAME.to_string(),
                reason: format!("registered construction path produced {}", constructed),
                source: None,
            })
    }

    /// Map each source into a new `target_type`, preserving order
    ///
    /// The first failure aborts the whole call.
    pub fn map_collection(&self, sources: &[&dyn Entity], target_type: &str) -> Result<Vec<Box<dyn Entity>>> {
        sources
            .iter()
            .map(|source| self.map_new(*source, target_type))
            .collect()
    }

    /// Map each source into a new `T`, preserving order
    pub fn map_collection_as<T: TypedEntity>(&self, sources: &[&dyn Entity]) -> Result<Vec<T>> {
        sources.iter().map(|source| self.map_as(*source)).collect()
    }

    fn apply_rule(
        &self,
        rule: &MappingRule,
        from_path: &str,
        to_path: &str,
        source: &dyn Entity,
        target: &mut dyn Entity,
    ) -> Result<()> {
        if from_path.trim().is_empty() {
            return Err(Error::configuration(format!(
                "fromPath cannot be empty on class {}",
                source.type_name()
            )));
        }

        let resolver = PathResolver::new(&self.schemas);
        let Some(from) = resolver.resolve_source(from_path, source)? else {
            trace!(from = from_path, "source path crosses a null object, rule skipped");
            return Ok(());
        };

        let to_path = if to_path.is_empty() { from.field.name } else { to_path };
        let mut to = resolver.resolve_target(to_path, target)?;

        let transformer = self
            .transformers
            .resolve(rule, from.value_type(), to.value_type(), &self.schemas)?;

        let raw = from.read()?;
        if let Some(condition) = &rule.condition {
            if !condition.matches(&raw) {
                trace!(from = from_path, to = to_path, "condition not met, rule skipped");
                return Ok(());
            }
        }

        let value = match transformer {
            Some(transformer) => self.transform(transformer.as_ref(), raw, &from, &to)?,
            None => raw,
        };

        if value.is_null() {
            trace!(from = from_path, to = to_path, "null value not written");
            return Ok(());
        }

        self.write(&from, &mut to, value)
    }

    fn transform(
        &self,
        transformer: &dyn Transformer,
        value: Value,
        from: &ResolvedFieldRef<SourceOwner<'_>>,
        to: &ResolvedFieldRef<TargetOwner<'_>>,
    ) -> Result<Value> {
        let source_view = from.owner.view();
        // The same object may own both fields; it is locked once
        let shared = match (from.owner.object(), to.owner.object()) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        let target_view;
        let target: &dyn Entity = if shared {
            &*source_view
        } else {
            target_view = to.owner.view();
            &*target_view
        };

        let context = TransformContext {
            source_field: &from.field,
            target_field: &to.field,
            source: &*source_view,
            target,
        };
        trace!(transformer = transformer.name(), from = from.field.name, to = to.field.name, "transforming");
        transformer.transform(value, &context).map_err(|source| Error::Transform {
            transformer: transformer.name().to_string(),
            source_field: from.field.name.to_string(),
            source_type: from.owner_type.to_string(),
            target_field: to.field.name.to_string(),
            target_type: to.owner_type.to_string(),
            source,
        })
    }

    fn write(
        &self,
        from: &ResolvedFieldRef<SourceOwner<'_>>,
        to: &mut ResolvedFieldRef<TargetOwner<'_>>,
        value: Value,
    ) -> Result<()> {
        let (target_field, target_type) = (to.field.name, to.owner_type);
        let write_error = |cause: anyhow::Error| Error::Write {
            source_field: from.field.name.to_string(),
            source_type: from.owner_type.to_string(),
            target_field: target_field.to_string(),
            target_type: target_type.to_string(),
            source: cause,
        };

        if self.config.check_write_types {
            if let Some(actual) = value.value_type() {
                if !self.schemas.is_assignable(to.field.ty, actual) {
                    return Err(write_error(anyhow!(
                        "value of type {} does not fit field type {}",
                        actual,
                        to.field.ty
                    )));
                }
            }
        }

        to.owner
            .set(target_field, value)
            .map_err(|e| write_error(e.into()))
    }

    fn decorate(&self, source: &dyn Entity, target: &mut dyn Entity) -> Result<()> {
        let key = (source.type_name(), target.type_name());
        let Some(decorators) = self.decorators.get(&key) else {
            return Ok(());
        };

        let mut context = DecoratorContext { source, target };
        for decorator in decorators {
            trace!(decorator = decorator.name(), "running decorator");
            decorator.decorate(&mut context).map_err(|source| Error::Decorator {
                decorator: decorator.name().to_string(),
                source_type: key.0.to_string(),
                target_type: key.1.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for MappingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingEngine")
            .field("schemas", &self.schemas.len())
            .field("transformers", &self.transformers)
            .field("structures", &self.structures.len())
            .field("decorated_pairs", &self.decorators.len())
            .field("config", &self.config)
            .finish()
    }
}

type Registration = Box<dyn FnOnce(&mut TransformerRegistry) -> Result<()>>;

/// Fluent construction of a [`MappingEngine`]
pub struct MappingEngineBuilder {
    schemas: Arc<SchemaRegistry>,
    config: EngineConfig,
    registrations: Vec<Registration>,
    decorators: Vec<(DecoratorKey, Arc<dyn Decorator>)>,
}

impl MappingEngineBuilder {
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            schemas,
            config: EngineConfig::default(),
            registrations: Vec::new(),
            decorators: Vec::new(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transformer<T: Transformer>(mut self, name: impl Into<String>, transformer: T) -> Self {
        let name = name.into();
        self.registrations
            .push(Box::new(move |registry: &mut TransformerRegistry| registry.register_named(name, transformer)));
        self
    }

    pub fn transformer_type<T: Transformer>(mut self, transformer: T) -> Self {
        self.registrations
            .push(Box::new(move |registry: &mut TransformerRegistry| registry.register_typed(transformer)));
        self
    }

    pub fn default_transformer<T: Transformer>(
        mut self,
        transformer: T,
        types: Option<(ValueType, ValueType)>,
    ) -> Self {
        self.registrations.push(Box::new(move |registry: &mut TransformerRegistry| {
            registry.register_default(Arc::new(transformer), types)
        }));
        self
    }

    pub fn decorator<D: Decorator>(
        mut self,
        source_type: &'static str,
        target_type: &'static str,
        decorator: D,
    ) -> Self {
        self.decorators
            .push(((source_type, target_type), Arc::new(decorator)));
        self
    }

    /// Build the engine, applying registrations in the order they were added
    ///
    /// Built-in defaults, when enabled, are registered first.
    pub fn build(self) -> Result<MappingEngine> {
        let mut engine = MappingEngine::with_config(self.schemas, self.config)?;
        for registration in self.registrations {
            registration(&mut engine.transformers)?;
        }
        for (key, decorator) in self.decorators {
            engine.decorators.entry(key).or_default().push(decorator);
        }
        Ok(engine)
    }
}

/// Drop a leading `<TypeName>.` from `path`, ignoring ASCII case
pub(crate) fn strip_type_prefix<'a>(path: &'a str, type_name: &str) -> &'a str {
    let len = type_name.len();
    match path.get(..len) {
        Some(head) if head.eq_ignore_ascii_case(type_name) && path[len..].starts_with(PATH_DELIMITER) => {
            &path[len + 1..]
        }
        _ => path,
    }
}

/// Source path of a field-level rule declared on `field`
pub(crate) fn effective_source_path<'a>(field: &'a str, map_from: &'a str) -> Cow<'a, str> {
    if map_from.is_empty() {
        return Cow::Borrowed(field);
    }
    let prefixed = map_from
        .strip_prefix(field)
        .is_some_and(|rest| rest.starts_with(PATH_DELIMITER));
    if prefixed {
        Cow::Borrowed(map_from)
    } else {
        Cow::Owned(format!("{}{}{}", field, PATH_DELIMITER, map_from))
    }
}
