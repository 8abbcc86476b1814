//! Post-mapping decorators
//!
//! Decorators are registered for an exact (source type, target type) pair and
//! run after every rule of a mapping pass has been applied.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use crate::transformer::short_type_name;
use crate::types::Entity;
use std::any;

/// What a decorator sees: the source read-only, the target mutable
pub struct DecoratorContext<'a> {
    pub source: &'a dyn Entity,
    pub target: &'a mut dyn Entity,
}

pub trait Decorator: Send + Sync + 'static {
    fn decorate(&self, context: &mut DecoratorContext<'_>) -> anyhow::Result<()>;

    /// Name used in diagnostics
    fn name(&self) -> &'static str {
        short_type_name(any::type_name::<Self>())
    }
}

impl<F> Decorator for F
where
    F: Fn(&mut DecoratorContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn decorate(&self, context: &mut DecoratorContext<'_>) -> anyhow::Result<()> {
        self(context)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}
