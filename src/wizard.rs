//! Request-level facade tying the graph, the session and the navigation rules together.

use std::{fmt, sync::Arc};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::{
    FormflowError, Result, ShareLock, Vars,
    common::is_empty_value,
    config::WizardConfig,
    flow::{
        Invalidation, InvalidationTable, NextStepResolver, StepData, branch_target, estimate_total, is_accessible, join_url, missing_prereq_redirect,
        on_branch_changed, on_field_changed,
    },
    graph::{ForkContext, Route, StepDefinition, StepGraph},
    model::SectionModel,
    session::{MemSession, SessionId, SessionRegistry, SessionStore, completed_steps, mark_completed},
};

/// What to show for a step the user may enter.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StepView {
    pub route: Route,
    /// 1-indexed position in the user's journey
    pub step_number: usize,
    pub total_steps: usize,
    /// form action, `None` on a terminal step
    pub next_page: Option<String>,
    pub back_link: Option<String>,
    pub editing: bool,
    /// stored answers for the step's fields
    pub values: Vars,
}

/// Result of entering or submitting a step.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Navigation {
    Render(StepView),
    Redirect(String),
    /// A terminal step was submitted.
    Finished,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub name: String,
    pub value: Value,
    /// step collecting the field, the target of a change link
    pub step: Option<Route>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SectionSummary {
    pub name: String,
    pub fields: Vec<FieldSummary>,
}

pub struct Wizard {
    id: String,
    graph: Arc<StepGraph>,
    table: Arc<InvalidationTable>,
    sections: Vec<SectionModel>,
    config: WizardConfig,
    sessions: SessionRegistry,
}

impl fmt::Debug for Wizard {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("id", &self.id)
            .field("first_step", &self.graph.first_step())
            .field("steps", &self.graph.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Wizard {
    pub(crate) fn new(
        id: String,
        graph: StepGraph,
        table: InvalidationTable,
        sections: Vec<SectionModel>,
        config: WizardConfig,
        sessions: SessionRegistry,
    ) -> Self {
        info!("wizard {} ready: {} steps, first {}", id, graph.len(), graph.first_step());
        Self {
            id,
            graph: Arc::new(graph),
            table: Arc::new(table),
            sections,
            config,
            sessions,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    pub fn invalidation_table(&self) -> &InvalidationTable {
        &self.table
    }

    /// Effective config, model overrides applied.
    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Session for `sid`, created when unknown.
    pub fn open_session(
        &self,
        sid: Option<&str>,
    ) -> (SessionId, ShareLock<MemSession>) {
        self.sessions.open(sid)
    }

    pub fn resolver(&self) -> NextStepResolver<'_> {
        NextStepResolver::from_config(&self.config)
    }

    /// Route and edit flag of a request path.
    pub fn parse_url<'u>(
        &self,
        url: &'u str,
    ) -> (&'u str, bool) {
        self.resolver().parse_url(url)
    }

    /// Where a failed submission sends the user back to.
    pub fn error_redirect(
        &self,
        route: &str,
        editing: bool,
    ) -> String {
        let url = join_url(&self.config.base_url, route);
        if editing && !url.ends_with(self.config.edit_suffix.as_str()) {
            format!("{}{}", url, self.config.edit_suffix)
        } else {
            url
        }
    }

    /// Enters `route`.
    ///
    /// Records the visit in the journey and works out the step number, the
    /// total, the back link and the form action. A user who has not reached
    /// the step yet is redirected instead. Entering a step that clears the
    /// session resets it once the view is built.
    pub fn enter(
        &self,
        session: &mut dyn SessionStore,
        route: &str,
        editing: bool,
    ) -> Result<Navigation> {
        trace!("wizard::enter({}, editing={})", route, editing);
        let step = self.step(route)?;
        let completed = completed_steps(session)?;
        if let Some(redirect) = self.check_prereqs(route, &completed) {
            return Ok(redirect);
        }

        let record = StepData::load(session)?.record(route);
        let total_steps = estimate_total(&record.step_data.steps_journey, &self.graph, self.graph.first_step());
        let back_link = record.step_data.back_link(route).map(|r| join_url(&self.config.base_url, r));

        let values = stored_values(step, session);
        let next_page = {
            let ctx = ForkContext {
                route,
                values: &values,
                session: &*session,
            };
            self.resolver().resolve(step, &ctx, &completed, editing)?
        };
        record.step_data.save(session)?;

        let view = StepView {
            route: route.to_string(),
            step_number: record.step_number,
            total_steps,
            next_page,
            back_link,
            editing,
            values,
        };

        if self.clears_session(step) {
            debug!("step {} clears the session", route);
            session.reset();
        }

        Ok(Navigation::Render(view))
    }

    /// Submits `values` for `route`.
    ///
    /// Changed answers first invalidate whatever depends on them, then the
    /// answers are saved and the step is marked completed. Fields the step
    /// does not collect are ignored. Every fork is evaluated before the
    /// session is written, so a failing predicate leaves it untouched.
    pub fn submit(
        &self,
        session: &mut dyn SessionStore,
        route: &str,
        values: Vars,
        editing: bool,
    ) -> Result<Navigation> {
        trace!("wizard::submit({}, editing={})", route, editing);
        let step = self.step(route)?;
        let completed = completed_steps(session)?;
        if let Some(redirect) = self.check_prereqs(route, &completed) {
            return Ok(redirect);
        }

        let mut submitted = Vars::new();
        for (field, value) in values.iter() {
            if step.has_field(field) {
                submitted.set(field, value.clone());
            } else {
                warn!("step {}: ignoring undeclared field {}", route, field);
            }
        }

        let old_target = if self.config.path_invalidation && completed.iter().any(|r| r == route) {
            let stored = stored_values(step, session);
            let ctx = ForkContext {
                route,
                values: &stored,
                session: &*session,
            };
            branch_target(step, &ctx)?.map(str::to_string)
        } else {
            None
        };

        let mut delta = Invalidation::default();
        for (field, value) in submitted.iter() {
            if session.get(field).as_ref() != Some(value) {
                delta.merge(on_field_changed(field, &self.graph, &self.table, &*session, &completed));
            }
        }

        if let Some(old_target) = &old_target {
            let ctx = ForkContext {
                route,
                values: &submitted,
                session: &*session,
            };
            if let Some(new_target) = branch_target(step, &ctx)? {
                delta.merge(on_branch_changed(route, old_target, new_target, &self.graph, &*session, &completed));
            }
        }

        let next = {
            let completed: Vec<Route> = completed.iter().filter(|r| !delta.forgotten_steps.contains(*r)).cloned().collect();
            let ctx = ForkContext {
                route,
                values: &submitted,
                session: &*session,
            };
            self.resolver().resolve(step, &ctx, &completed, editing)?
        };

        delta.apply(session)?;
        for (field, value) in submitted.iter() {
            session.set(field, value.clone());
        }
        mark_completed(session, route)?;

        Ok(match next {
            Some(url) => Navigation::Redirect(url),
            None => Navigation::Finished,
        })
    }

    /// Answered fields grouped by section, for a check-your-answers page.
    ///
    /// Without configured sections, every answered field of every step is
    /// listed under a single `answers` section.
    pub fn summary(
        &self,
        session: &dyn SessionStore,
    ) -> Vec<SectionSummary> {
        if self.sections.is_empty() {
            return vec![SectionSummary {
                name: "answers".to_string(),
                fields: self.summarize(session, self.graph.steps().flat_map(|s| s.fields.iter())),
            }];
        }

        self.sections
            .iter()
            .map(|section| SectionSummary {
                name: section.name.clone(),
                fields: self.summarize(session, section.fields.iter()),
            })
            .collect()
    }

    fn summarize<'f>(
        &self,
        session: &dyn SessionStore,
        fields: impl Iterator<Item = &'f String>,
    ) -> Vec<FieldSummary> {
        fields
            .filter_map(|name| {
                let value = session.get(name).filter(|v| !is_empty_value(Some(v)))?;
                Some(FieldSummary {
                    name: name.clone(),
                    value,
                    step: self.graph.step_for_field(name).map(|s| s.route.clone()),
                })
            })
            .collect()
    }

    fn step(
        &self,
        route: &str,
    ) -> Result<&StepDefinition> {
        self.graph.step(route).ok_or(FormflowError::UnknownStep(route.to_string()))
    }

    fn check_prereqs(
        &self,
        route: &str,
        completed: &[Route],
    ) -> Option<Navigation> {
        if is_accessible(route, completed, &self.graph) {
            return None;
        }
        let target = missing_prereq_redirect(completed, &self.graph);
        Some(Navigation::Redirect(join_url(&self.config.base_url, &target)))
    }

    fn clears_session(
        &self,
        step: &StepDefinition,
    ) -> bool {
        step.clear_session.unwrap_or(step.is_terminal() && self.config.clear_session)
    }
}

/// Stored answers for the fields of `step`.
fn stored_values(
    step: &StepDefinition,
    session: &dyn SessionStore,
) -> Vars {
    step.fields.iter().filter_map(|f| session.get(f).map(|v| (f.clone(), v))).collect()
}
