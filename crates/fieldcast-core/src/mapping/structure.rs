//! Entity structures and their cache
//!
//! An [`EntityStructure`] holds every rule that applies when mapping one
//! source type to one target type. Computing it walks the source lineage
//! once; the [`StructureCache`] keeps the result for the lifetime of the
//! engine, keyed by the exact type pair.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use crate::rule::MappingRule;
use crate::schema::{EntitySchema, FieldDescriptor, SchemaRegistry};
use crate::types::ValueType;
use crate::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Rules declared on one field, as collected for a type pair
#[derive(Debug, Clone)]
pub struct FieldRules {
    /// Type on which the field is declared
    pub declared_in: &'static str,
    pub field: FieldDescriptor,
    pub rules: Vec<MappingRule>,
}

/// Applicable rules for one (source type, target type) pair
#[derive(Debug, Clone)]
pub struct EntityStructure {
    pub source_type: &'static str,
    pub target_type: &'static str,
    /// Type-level rules, most-derived declaring type first
    pub type_rules: Vec<MappingRule>,
    /// Fields with at least one applicable rule, most-derived declaring type
    /// first; a field redeclared along the lineage appears once per level
    pub field_rules: Vec<FieldRules>,
}

impl EntityStructure {
    /// Collect the rules of `source_type` and its ancestors that apply when
    /// mapping into `target_type`
    pub fn compute(source_type: &str, target_type: &'static str, schemas: &SchemaRegistry) -> Result<Self> {
        let lineage = schemas.lineage(source_type);
        let Some(most_derived) = lineage.first() else {
            return Err(Error::configuration(format!(
                "Could not create entity structure for <{}, {}>: class {} has no registered schema",
                source_type, target_type, source_type
            )));
        };

        let mut structure = EntityStructure {
            source_type: most_derived.name(),
            target_type,
            type_rules: Vec::new(),
            field_rules: Vec::new(),
        };

        for schema in &lineage {
            for rule in schema.type_rules() {
                if !applies(rule, schema, &structure, schemas)? {
                    continue;
                }
                // Type-level rules have no field to fall back to
                if rule.map_from.trim().is_empty() {
                    return Err(Error::configuration(format!(
                        "mapFrom can not be empty when used at a type level (class {})",
                        schema.name()
                    )));
                }
                structure.type_rules.push(rule.clone());
            }

            for declared in schema.fields() {
                let mut rules = Vec::new();
                for rule in &declared.rules {
                    if applies(rule, schema, &structure, schemas)? {
                        rules.push(rule.clone());
                    }
                }
                if !rules.is_empty() {
                    structure.field_rules.push(FieldRules {
                        declared_in: schema.name(),
                        field: declared.descriptor,
                        rules,
                    });
                }
            }
        }

        Ok(structure)
    }

    /// Total number of rules in the structure
    pub fn rule_count(&self) -> usize {
        self.type_rules.len() + self.field_rules.iter().map(|f| f.rules.len()).sum::<usize>()
    }
}

/// Whether `rule`, declared on `schema`, targets the structure's target type
/// or one of its supertypes
fn applies(
    rule: &MappingRule,
    schema: &EntitySchema,
    structure: &EntityStructure,
    schemas: &SchemaRegistry,
) -> Result<bool> {
    let declared = rule.target.or(schema.default_target()).ok_or_else(|| {
        Error::configuration(format!(
            "Could not create entity structure for <{}, {}>: No mapping target or default mapping target specified on class {}",
            structure.source_type,
            structure.target_type,
            schema.name()
        ))
    })?;
    Ok(schemas.is_assignable(
        ValueType::Entity(declared),
        ValueType::Entity(structure.target_type),
    ))
}

/// Memoised entity structures, keyed by exact type pair
#[derive(Debug, Default)]
pub struct StructureCache {
    entries: DashMap<(&'static str, &'static str), Arc<EntityStructure>>,
}

impl StructureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structure for the pair, computed on first request
    ///
    /// A failed computation is not cached.
    pub fn get(
        &self,
        source_type: &'static str,
        target_type: &'static str,
        schemas: &SchemaRegistry,
    ) -> Result<Arc<EntityStructure>> {
        let key = (source_type, target_type);
        if let Some(found) = self.entries.get(&key) {
            return Ok(found.value().clone());
        }
        let entry = self.entries.entry(key).or_try_insert_with(|| {
            let structure = EntityStructure::compute(source_type, target_type, schemas)?;
            debug!(
                source = source_type,
                target = target_type,
                type_rules = structure.type_rules.len(),
                fields = structure.field_rules.len(),
                "computed entity structure"
            );
            Ok::<_, Error>(Arc::new(structure))
        })?;
        Ok(entry.value().clone())
    }

    pub fn contains(&self, source_type: &str, target_type: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.key().0 == source_type && entry.key().1 == target_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemas() -> SchemaRegistry {
        let mut schemas = SchemaRegistry::new();
        schemas
            .register_all([
                EntitySchema::builder("Dto").build().unwrap(),
                EntitySchema::builder("SpecialDto").extends("Dto").build().unwrap(),
                EntitySchema::builder("Other").build().unwrap(),
                EntitySchema::builder("Base")
                    .default_target("Dto")
                    .mapped_field("id", ValueType::Long, [MappingRule::new()])
                    .mapped_field("secret", ValueType::String, [MappingRule::new().target("Other")])
                    .field("plain", ValueType::String)
                    .build()
                    .unwrap(),
                EntitySchema::builder("Child")
                    .extends("Base")
                    .default_target("Dto")
                    .rule(MappingRule::new().map_from("Child.id").map_to("Dto.ref"))
                    .mapped_field("id", ValueType::Long, [MappingRule::new().map_to("childId")])
                    .mapped_field(
                        "special",
                        ValueType::String,
                        [MappingRule::new().target("SpecialDto")],
                    )
                    .build()
                    .unwrap(),
                EntitySchema::builder("Untargeted")
                    .mapped_field("x", ValueType::Int, [MappingRule::new()])
                    .build()
                    .unwrap(),
            ])
            .unwrap();
        schemas
    }

    #[test]
    fn test_collects_along_lineage() {
        let schemas = schemas();
        let structure = EntityStructure::compute("Child", "Dto", &schemas).unwrap();

        assert_eq!(structure.type_rules.len(), 1);
        let fields: Vec<(&str, &str)> = structure
            .field_rules
            .iter()
            .map(|f| (f.declared_in, f.field.name))
            .collect();
        // `id` appears once per declaring level, `special` only targets SpecialDto
        assert_eq!(fields, vec![("Child", "id"), ("Base", "id")]);
        assert_eq!(structure.rule_count(), 3);
    }

    #[test]
    fn test_subtype_target_sees_more_rules() {
        let schemas = schemas();
        let structure = EntityStructure::compute("Child", "SpecialDto", &schemas).unwrap();
        let names: Vec<&str> = structure.field_rules.iter().map(|f| f.field.name).collect();
        assert_eq!(names, vec!["id", "special", "id"]);
    }

    #[test]
    fn test_missing_target_is_configuration_error() {
        let schemas = schemas();
        let err = EntityStructure::compute("Untargeted", "Dto", &schemas).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("No mapping target"));
    }

    #[test]
    fn test_empty_type_level_source_rejected() {
        let mut schemas = schemas();
        schemas
            .register(
                EntitySchema::builder("Blank")
                    .rule(MappingRule::new().target("Dto").map_to("ref"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let err = EntityStructure::compute("Blank", "Dto", &schemas).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("mapFrom can not be empty"));
    }

    #[test]
    fn test_unregistered_source() {
        let schemas = schemas();
        assert!(EntityStructure::compute("Nope", "Dto", &schemas).is_err());
    }

    #[test]
    fn test_cache_keys_on_exact_pair() {
        let schemas = schemas();
        let cache = StructureCache::new();

        let first = cache.get("Child", "Dto", &schemas).unwrap();
        let again = cache.get("Child", "Dto", &schemas).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let special = cache.get("Child", "SpecialDto", &schemas).unwrap();
        assert!(!Arc::ptr_eq(&first, &special));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("Child", "SpecialDto"));
    }

    #[test]
    fn test_failures_are_not_cached() {
        let schemas = schemas();
        let cache = StructureCache::new();
        assert!(cache.get("Untargeted", "Dto", &schemas).is_err());
        assert!(cache.is_empty());
    }
}
