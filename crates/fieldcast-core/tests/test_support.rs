//! Shared fixtures for integration tests
//!
//! A small person/address domain mapped into a flattened DTO domain, plus an
//! employee/manager pair that extends both sides.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use fieldcast_core::transformer::built_in::CommaSeparatedToList;
use fieldcast_core::{
    EngineConfig, Entity, EntitySchema, EntitySchemaBuilder, FieldAccessError, MappingEngine,
    MappingRule, ObjectRef, SchemaRegistry, TypedEntity, Value, ValueType,
};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Route engine events to the test output; set `RUST_LOG=fieldcast_core=trace`
/// to see them
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Default, Clone)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
}

impl Entity for Address {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "street" => Some(self.street.clone().into()),
            "city" => Some(self.city.clone().into()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
        match name {
            "street" => self.street = value.extract(name)?,
            "city" => self.city = value.extract(name)?,
            _ => return Err(FieldAccessError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

impl TypedEntity for Address {
    const TYPE_NAME: &'static str = "Address";
}

#[derive(Debug, Default, Clone)]
pub struct Location {
    pub street: Option<String>,
    pub city: Option<String>,
}

impl Entity for Location {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "street" => Some(self.street.clone().into()),
            "city" => Some(self.city.clone().into()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
        match name {
            "street" => self.street = value.extract(name)?,
            "city" => self.city = value.extract(name)?,
            _ => return Err(FieldAccessError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

impl TypedEntity for Location {
    const TYPE_NAME: &'static str = "Location";
}

#[derive(Debug, Default, Clone)]
pub struct Person {
    pub name: Option<String>,
    pub age: i32,
    pub creation_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub address: Option<ObjectRef>,
}

impl Entity for Person {
    fn type_name(&self) -> &'static str {
        "Person"
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.clone().into()),
            "age" => Some(self.age.into()),
            "creationDate" => Some(self.creation_date.into()),
            "notes" => Some(self.notes.clone().into()),
            "address" => Some(self.address.clone().into()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
        match name {
            "name" => self.name = value.extract(name)?,
            "age" => self.age = value.extract(name)?,
            "creationDate" => self.creation_date = value.extract(name)?,
            "notes" => self.notes = value.extract(name)?,
            "address" => self.address = value.extract(name)?,
            _ => return Err(FieldAccessError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct PersonDto {
    pub display_name: Option<String>,
    pub created_at: i64,
    pub tags: Vec<String>,
    pub location: Option<ObjectRef>,
    pub age: i32,
    pub street: Option<String>,
}

impl Entity for PersonDto {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "displayName" => Some(self.display_name.clone().into()),
            "createdAt" => Some(self.created_at.into()),
            "tags" => Some(self.tags.clone().into()),
            "location" => Some(self.location.clone().into()),
            "age" => Some(self.age.into()),
            "street" => Some(self.street.clone().into()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
        match name {
            "displayName" => self.display_name = value.extract(name)?,
            "createdAt" => self.created_at = value.extract(name)?,
            "tags" => self.tags = value.extract(name)?,
            "location" => self.location = value.extract(name)?,
            "age" => self.age = value.extract(name)?,
            "street" => self.street = value.extract(name)?,
            _ => return Err(FieldAccessError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

impl TypedEntity for PersonDto {
    const TYPE_NAME: &'static str = "PersonDto";
}

impl PersonDto {
    /// City of the attached location, if any
    pub fn city(&self) -> Option<String> {
        self.location
            .as_ref()
            .and_then(|location| location.with(|l: &Location| l.city.clone()))
            .flatten()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Employee {
    pub person: Person,
    pub employee_id: i64,
}

impl Entity for Employee {
    fn type_name(&self) -> &'static str {
        "Employee"
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "employeeId" => Some(self.employee_id.into()),
            _ => self.person.get_field(name),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
        match name {
            "employeeId" => self.employee_id = value.extract(name)?,
            _ => return self.person.set_field(name, value),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ManagerDto {
    pub base: PersonDto,
    pub badge: i64,
}

impl Entity for ManagerDto {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "badge" => Some(self.badge.into()),
            _ => self.base.get_field(name),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
        match name {
            "badge" => self.badge = value.extract(name)?,
            _ => return self.base.set_field(name, value),
        }
        Ok(())
    }
}

impl TypedEntity for ManagerDto {
    const TYPE_NAME: &'static str = "ManagerDto";
}

/// Person schema with its standard rules; tests may add more before building
pub fn person_schema() -> EntitySchemaBuilder {
    EntitySchema::builder("Person")
        .default_target("PersonDto")
        .rule(MappingRule::new().map_from("address.street").map_to("street"))
        .mapped_field("name", ValueType::String, [MappingRule::new().map_to("displayName")])
        .mapped_field("age", ValueType::Int, [MappingRule::new()])
        .mapped_field(
            "creationDate",
            ValueType::Date,
            [MappingRule::new().map_to("createdAt")],
        )
        .mapped_field(
            "notes",
            ValueType::String,
            [MappingRule::new()
                .map_to("tags")
                .transformer::<CommaSeparatedToList>()],
        )
        .mapped_field(
            "address",
            ValueType::Entity("Address"),
            [MappingRule::new().map_from("city").map_to("location.city")],
        )
}

/// Schemas for the fixture domain around the given person schema
pub fn schemas_with(person: EntitySchema) -> SchemaRegistry {
    let mut schemas = SchemaRegistry::new();
    schemas
        .register_all([
            EntitySchema::builder("Address")
                .field("street", ValueType::String)
                .field("city", ValueType::String)
                .constructible::<Address>()
                .build()
                .unwrap(),
            EntitySchema::builder("Location")
                .field("street", ValueType::String)
                .field("city", ValueType::String)
                .constructible::<Location>()
                .build()
                .unwrap(),
            person,
            EntitySchema::builder("PersonDto")
                .field("displayName", ValueType::String)
                .field("createdAt", ValueType::Long)
                .field("tags", ValueType::List)
                .field("location", ValueType::Entity("Location"))
                .field("age", ValueType::Int)
                .field("street", ValueType::String)
                .constructible::<PersonDto>()
                .build()
                .unwrap(),
            EntitySchema::builder("Employee")
                .extends("Person")
                .default_target("PersonDto")
                .mapped_field(
                    "employeeId",
                    ValueType::Long,
                    [MappingRule::new().target("ManagerDto").map_to("badge")],
                )
                .build()
                .unwrap(),
            EntitySchema::builder("ManagerDto")
                .extends("PersonDto")
                .field("badge", ValueType::Long)
                .constructible::<ManagerDto>()
                .build()
                .unwrap(),
        ])
        .unwrap();
    schemas
}

/// Schemas for the whole fixture domain
pub fn schemas() -> SchemaRegistry {
    schemas_with(person_schema().build().unwrap())
}

/// Engine over the fixture schemas with built-in defaults
pub fn engine() -> MappingEngine {
    init_tracing();
    MappingEngine::new(Arc::new(schemas())).unwrap()
}

/// Engine over the fixture schemas without built-in defaults
pub fn bare_engine() -> MappingEngine {
    init_tracing();
    MappingEngine::with_config(
        Arc::new(schemas()),
        EngineConfig::default().with_default_transformers(false),
    )
    .unwrap()
}

pub fn person(name: &str) -> Person {
    Person {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

pub fn address(street: &str, city: &str) -> ObjectRef {
    ObjectRef::new(Address {
        street: Some(street.to_string()),
        city: Some(city.to_string()),
    })
}
