//! Step graphs shared by the unit tests.

use crate::{ForkCondition, ForkRule, StepDefinition, StepGraph};

/// Fork to `target` when `field` was submitted as `value`.
pub fn fork_on<V: Into<serde_json::Value>>(
    field: &str,
    value: V,
    target: &str,
) -> ForkRule {
    ForkRule::new(target, ForkCondition::field_equals(field, value))
}

/// `/a -> /b -> /c`
pub fn linear_graph() -> StepGraph {
    StepGraph::new(
        vec![
            StepDefinition::new("/a").fields(["x"]).next("/b"),
            StepDefinition::new("/b").fields(["b"]).next("/c"),
            StepDefinition::new("/c"),
        ],
        None,
    )
    .unwrap()
}

/// `/a -> /b -> /c`, with `/a` forking to `/fork -> /c` when `x == "y"`.
pub fn forked_graph() -> StepGraph {
    StepGraph::new(
        vec![
            StepDefinition::new("/a").fields(["x"]).next("/b").fork(fork_on("x", "y", "/fork")),
            StepDefinition::new("/b").fields(["b"]).next("/c"),
            StepDefinition::new("/fork").fields(["f"]).next("/c"),
            StepDefinition::new("/c"),
        ],
        None,
    )
    .unwrap()
}

/// Enquiry-style wizard ending in a confirm and a confirmation step.
///
/// `/name -> /contact -> /email -> /confirm -> /done`; `/contact` forks to
/// `/phone -> /confirm` when `contact-method == "phone"`. Changing
/// `contact-method` invalidates `email` and `phone`.
pub fn enquiry_json() -> &'static str {
    r#"{
        "id": "enquiry",
        "name": "Enquiry",
        "steps": [
            { "route": "/name", "fields": ["name"], "next": "/contact" },
            { "route": "/contact", "fields": ["contact-method"], "next": "/email",
              "forks": [ { "target": "/phone", "condition": { "field": "contact-method", "value": "phone" } } ] },
            { "route": "/email", "fields": ["email"], "next": "/confirm" },
            { "route": "/phone", "fields": ["phone"], "next": "/confirm" },
            { "route": "/confirm", "next": "/done" },
            { "route": "/done" }
        ],
        "fields": {
            "contact-method": { "invalidates": ["email", "phone"] }
        },
        "sections": [
            { "name": "about-you", "fields": ["name"] },
            { "name": "contact", "fields": ["contact-method", "email", "phone"] }
        ]
    }"#
}
