use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    FormflowError, Result,
    model::{ConditionModel, ForkModel, StepModel},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub first_step: Option<String>,
    #[serde(default)]
    pub confirm_step: Option<String>,
    pub steps: Vec<StepModel>,
    #[serde(default)]
    pub fields: HashMap<String, FieldModel>,
    #[serde(default)]
    pub sections: Vec<SectionModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldModel {
    /// fields whose answers depend on this one
    #[serde(default)]
    pub invalidates: Vec<String>,
}

/// A group of fields shown together on the confirmation step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionModel {
    pub name: String,
    pub fields: Vec<String>,
}

impl WizardModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s).map_err(|e| FormflowError::Convert(format!("{}", e)))?;
        jsonschema::validate(&Self::schema(), &value)?;
        let wizard = serde_json::from_value::<WizardModel>(value);
        match wizard {
            Ok(v) => Ok(v),
            Err(e) => Err(FormflowError::Convert(format!("{}", e))),
        }
    }

    /// Predicate names referenced by any fork.
    pub fn predicate_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.forks.iter())
            .filter_map(|f: &ForkModel| match &f.condition {
                ConditionModel::Predicate { predicate } => Some(predicate.as_str()),
                ConditionModel::FieldEquals { .. } => None,
            })
            .collect()
    }

    fn schema() -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "minLength": 1 },
                "name": { "type": "string" },
                "first_step": { "type": "string" },
                "confirm_step": { "type": "string" },
                "steps": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "route": { "type": "string" },
                            "fields": { "type": "array", "items": { "type": "string" } },
                            "next": { "type": "string" },
                            "continue_on_edit": { "type": "boolean" },
                            "clear_session": { "type": "boolean" },
                            "forks": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "target": { "type": "string" },
                                        "condition": {
                                            "oneOf": [
                                                {
                                                    "type": "object",
                                                    "properties": {
                                                        "field": { "type": "string" },
                                                        "value": {}
                                                    },
                                                    "required": ["field", "value"],
                                                    "additionalProperties": false
                                                },
                                                {
                                                    "type": "object",
                                                    "properties": {
                                                        "predicate": { "type": "string" }
                                                    },
                                                    "required": ["predicate"],
                                                    "additionalProperties": false
                                                }
                                            ]
                                        }
                                    },
                                    "required": ["target", "condition"]
                                }
                            }
                        },
                        "required": ["route"]
                    }
                },
                "fields": {
                    "type": "object",
                    "additionalProperties": {
                        "type": "object",
                        "properties": {
                            "invalidates": { "type": "array", "items": { "type": "string" } }
                        }
                    }
                },
                "sections": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "fields": { "type": "array", "items": { "type": "string" } }
                        },
                        "required": ["name", "fields"]
                    }
                }
            },
            "required": ["id", "steps"]
        })
    }
}
