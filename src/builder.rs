use std::{collections::HashMap, sync::Arc};

use tracing::warn;

use crate::{
    Config, ForkCondition, ForkContext, ForkRule, FormflowError, InvalidationTable, Predicate, Result, SessionRegistry, StepDefinition, StepGraph, Wizard,
    model::{ConditionModel, StepModel, WizardModel},
};

pub struct WizardBuilder {
    model: WizardModel,
    config: Config,
    predicates: HashMap<String, Predicate>,
}

impl WizardBuilder {
    pub fn new(model: WizardModel) -> Self {
        Self {
            model,
            config: Config::default(),
            predicates: HashMap::new(),
        }
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Registers a fork predicate under the name wizard definitions refer to.
    pub fn predicate<F>(
        mut self,
        name: &str,
        predicate: F,
    ) -> Self
    where
        F: Fn(&ForkContext<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        self.predicates.insert(name.to_string(), Arc::new(predicate));
        self
    }

    /// Validates the definition and builds the wizard.
    ///
    /// Model-level `first_step` and `confirm_step` take precedence over the
    /// config. Any graph error aborts the build.
    pub fn build(self) -> Result<Wizard> {
        let steps = self.model.steps.iter().map(|s| self.step_definition(s)).collect::<Result<Vec<_>>>()?;
        let referenced = self.model.predicate_names();
        for name in self.predicates.keys() {
            if !referenced.contains(&name.as_str()) {
                warn!("wizard {}: predicate {} is registered but never used", self.model.id, name);
            }
        }

        let mut wizard_config = self.config.wizard.clone();
        if let Some(first_step) = &self.model.first_step {
            wizard_config.first_step = Some(first_step.clone());
        }
        if let Some(confirm_step) = &self.model.confirm_step {
            wizard_config.confirm_step = confirm_step.clone();
        }

        let graph = StepGraph::new(steps, wizard_config.first_step.as_deref())?;
        if !graph.contains(&wizard_config.confirm_step) {
            warn!("wizard {}: confirm step {} is not part of the wizard", self.model.id, wizard_config.confirm_step);
        }

        let table = InvalidationTable::from(&self.model.fields);
        for field in table.fields() {
            if graph.step_for_field(field).is_none() {
                warn!("wizard {}: field {} is not collected by any step", self.model.id, field);
            }
        }

        let sessions = SessionRegistry::new(self.config.store.session_capacity);

        Ok(Wizard::new(self.model.id, graph, table, self.model.sections, wizard_config, sessions))
    }

    fn step_definition(
        &self,
        model: &StepModel,
    ) -> Result<StepDefinition> {
        let mut forks = Vec::with_capacity(model.forks.len());
        for fork in model.forks.iter() {
            let condition = match &fork.condition {
                ConditionModel::FieldEquals { field, value } => ForkCondition::field_equals(field, value.clone()),
                ConditionModel::Predicate { predicate } => {
                    let registered = self
                        .predicates
                        .get(predicate)
                        .ok_or(FormflowError::Graph(format!("step {} uses unknown predicate '{}'", model.route, predicate)))?;
                    ForkCondition::Predicate {
                        name: predicate.clone(),
                        predicate: registered.clone(),
                    }
                }
            };
            forks.push(ForkRule::new(&fork.target, condition));
        }

        Ok(StepDefinition {
            route: model.route.clone(),
            fields: model.fields.clone(),
            next: model.next.clone(),
            forks,
            continue_on_edit: model.continue_on_edit,
            clear_session: model.clear_session,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, FormflowError, WizardBuilder, WizardModel, fixtures};

    #[test]
    fn test_build_from_json() {
        let model = WizardModel::from_json(fixtures::enquiry_json()).unwrap();
        let wizard = WizardBuilder::new(model).build().unwrap();
        assert_eq!(wizard.id(), "enquiry");
        assert_eq!(wizard.graph().len(), 6);
        assert_eq!(wizard.graph().first_step(), "/name");
        assert_eq!(wizard.config().confirm_step, "/confirm");
    }

    #[test]
    fn test_model_overrides_config() {
        let mut model = WizardModel::from_json(fixtures::enquiry_json()).unwrap();
        model.first_step = Some("/contact".to_string());
        model.confirm_step = Some("/done".to_string());
        let config = Config::load_from_str("[wizard]\nfirst_step = \"/name\"\nconfirm_step = \"/confirm\"").unwrap();

        let wizard = WizardBuilder::new(model).config(config).build().unwrap();
        assert_eq!(wizard.graph().first_step(), "/contact");
        assert_eq!(wizard.config().confirm_step, "/done");
    }

    #[test]
    fn test_unknown_predicate_is_rejected() {
        let text = r#"{
            "id": "p",
            "steps": [
                { "route": "/a", "next": "/b", "forks": [{ "target": "/c", "condition": { "predicate": "is-adult" } }] },
                { "route": "/b" },
                { "route": "/c" }
            ]
        }"#;
        let model = WizardModel::from_json(text).unwrap();
        let err = WizardBuilder::new(model.clone()).build().unwrap_err();
        assert!(matches!(err, FormflowError::Graph(msg) if msg.contains("is-adult")));

        let wizard = WizardBuilder::new(model).predicate("is-adult", |_| Ok(true)).build().unwrap();
        assert_eq!(wizard.graph().step("/a").unwrap().forks.len(), 1);
    }

    #[test]
    fn test_invalid_graph_is_rejected() {
        let text = r#"{ "id": "p", "steps": [ { "route": "/a", "next": "/b" }, { "route": "/b", "next": "/a" } ] }"#;
        let model = WizardModel::from_json(text).unwrap();
        assert!(matches!(WizardBuilder::new(model).build(), Err(FormflowError::Graph(_))));
    }
}
