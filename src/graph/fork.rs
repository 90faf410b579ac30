//! Conditional transitions between steps.

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::trace;

use crate::{FormflowError, Result, Vars, graph::Route, session::SessionStore};

/// Opaque fork condition over the submitted values and the session.
pub type Predicate = Arc<dyn Fn(&ForkContext<'_>) -> Result<bool> + Send + Sync>;

/// Everything a fork condition may look at.
pub struct ForkContext<'a> {
    /// route of the step being left
    pub route: &'a str,
    /// values submitted for that step
    pub values: &'a Vars,
    /// session as it was before the submitted values are saved
    pub session: &'a dyn SessionStore,
}

#[derive(Clone)]
pub enum ForkCondition {
    /// Holds when the submitted value of `field` equals `value`.
    FieldEquals {
        field: String,
        value: Value,
    },
    /// Named predicate registered with the wizard builder.
    Predicate {
        name: String,
        predicate: Predicate,
    },
}

impl ForkCondition {
    pub fn field_equals<V: Into<Value>>(
        field: &str,
        value: V,
    ) -> Self {
        Self::FieldEquals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn predicate<F>(
        name: &str,
        predicate: F,
    ) -> Self
    where
        F: Fn(&ForkContext<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        Self::Predicate {
            name: name.to_string(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn evaluate(
        &self,
        ctx: &ForkContext<'_>,
    ) -> Result<bool> {
        match self {
            Self::FieldEquals { field, value } => Ok(ctx.values.get(field) == Some(value)),
            Self::Predicate { name, predicate } => {
                trace!("fork::evaluate({}, {})", ctx.route, name);
                (predicate.as_ref())(ctx).map_err(|e| match e {
                    FormflowError::Condition { .. } => e,
                    other => FormflowError::Condition {
                        route: ctx.route.to_string(),
                        message: format!("predicate '{}': {}", name, other),
                    },
                })
            }
        }
    }
}

impl fmt::Debug for ForkCondition {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::FieldEquals { field, value } => f.debug_struct("FieldEquals").field("field", field).field("value", value).finish(),
            Self::Predicate { name, .. } => f.debug_struct("Predicate").field("name", name).finish_non_exhaustive(),
        }
    }
}

/// Conditional edge: `target` replaces the default next step when `condition` holds.
#[derive(Debug, Clone)]
pub struct ForkRule {
    pub condition: ForkCondition,
    pub target: Route,
}

impl ForkRule {
    pub fn new(
        target: &str,
        condition: ForkCondition,
    ) -> Self {
        Self {
            condition,
            target: target.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{ForkCondition, ForkContext, FormflowError, MemSession, Vars};

    #[test]
    fn test_field_equals_uses_json_equality() {
        let session = MemSession::new("s1");
        let values = Vars::new().with("x", "y").with("n", 3);
        let ctx = ForkContext {
            route: "/a",
            values: &values,
            session: &session,
        };

        assert!(ForkCondition::field_equals("x", "y").evaluate(&ctx).unwrap());
        assert!(!ForkCondition::field_equals("x", "z").evaluate(&ctx).unwrap());
        assert!(ForkCondition::field_equals("n", 3).evaluate(&ctx).unwrap());
        assert!(!ForkCondition::field_equals("n", "3").evaluate(&ctx).unwrap());
        assert!(!ForkCondition::field_equals("missing", json!(null)).evaluate(&ctx).unwrap());
    }

    #[test]
    fn test_predicate_errors_carry_route() {
        let session = MemSession::new("s1");
        let values = Vars::new();
        let ctx = ForkContext {
            route: "/a",
            values: &values,
            session: &session,
        };

        let failing = ForkCondition::predicate("broken", |_| Err(FormflowError::Session("no data".to_string())));
        match failing.evaluate(&ctx).unwrap_err() {
            FormflowError::Condition { route, message } => {
                assert_eq!(route, "/a");
                assert!(message.contains("broken"));
                assert!(message.contains("no data"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(format!("{:?}", failing).contains("broken"));
    }
}
