//! Mapping conditions
//!
//! A condition gates a single rule on the raw source value. When it does not
//! match, the rule is skipped and the target field keeps whatever it held.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use crate::types::Value;

pub trait Condition: Send + Sync {
    fn matches(&self, value: &Value) -> bool;
}

impl<F> Condition for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn matches(&self, value: &Value) -> bool {
        self(value)
    }
}

/// Matches strings that contain something other than whitespace
#[derive(Debug, Default, Clone, Copy)]
pub struct NotBlank;

impl Condition for NotBlank {
    fn matches(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(NotBlank.matches(&Value::from("x")));
        assert!(!NotBlank.matches(&Value::from("  ")));
        assert!(!NotBlank.matches(&Value::Null));
        assert!(!NotBlank.matches(&Value::Int(1)));
    }

    #[test]
    fn test_closure_condition() {
        let positive = |value: &Value| value.as_i64().is_some_and(|n| n > 0);
        assert!(positive.matches(&Value::Int(2)));
        assert!(!positive.matches(&Value::Long(-2)));
    }
}
