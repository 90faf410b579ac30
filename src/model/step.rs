use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepModel {
    pub route: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub forks: Vec<ForkModel>,
    #[serde(default)]
    pub continue_on_edit: Option<bool>,
    #[serde(default)]
    pub clear_session: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForkModel {
    pub target: String,
    pub condition: ConditionModel,
}

/// Fork condition as written in a wizard definition.
///
/// Either `{"field": "x", "value": "y"}` or `{"predicate": "name"}`, where the
/// name refers to a predicate registered on the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionModel {
    FieldEquals { field: String, value: Value },
    Predicate { predicate: String },
}
