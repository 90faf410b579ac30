//! Next step resolution.

use tracing::{debug, trace};

use crate::{
    Result,
    config::WizardConfig,
    graph::{ForkContext, Route, StepDefinition},
};

/// Decides where a user goes after a step.
#[derive(Debug, Clone, Copy)]
pub struct NextStepResolver<'a> {
    /// prefix the wizard is mounted under, `/` for none
    pub base_url: &'a str,
    /// summary step that edit mode fast-forwards to
    pub confirm_step: &'a str,
    /// marker appended to routes opened in edit mode
    pub edit_suffix: &'a str,
    /// used for steps without their own `continue_on_edit`
    pub continue_on_edit: bool,
}

impl<'a> NextStepResolver<'a> {
    pub fn from_config(config: &'a WizardConfig) -> Self {
        Self {
            base_url: &config.base_url,
            confirm_step: &config.confirm_step,
            edit_suffix: &config.edit_suffix,
            continue_on_edit: config.continue_on_edit,
        }
    }

    /// Url of the step after `step`, `None` when `step` is terminal.
    ///
    /// Outside edit mode this is the default `next` unless a fork overrides
    /// it. In edit mode, a step that was never completed is opened for
    /// editing. An already completed one is opened for editing only when the
    /// step continues on edit and is not the confirm step; otherwise the user
    /// goes straight back to the confirm step.
    pub fn resolve(
        &self,
        step: &StepDefinition,
        ctx: &ForkContext<'_>,
        completed: &[Route],
        editing: bool,
    ) -> Result<Option<String>> {
        trace!("resolver::resolve({}, editing={})", step.route, editing);
        let Some(candidate) = branch_target(step, ctx)? else {
            return Ok(None);
        };

        if !editing {
            return Ok(Some(join_url(self.base_url, candidate)));
        }

        let already_completed = completed.iter().any(|r| r == candidate);
        let continue_on_edit = step.continue_on_edit.unwrap_or(self.continue_on_edit);
        if already_completed && (!continue_on_edit || candidate == self.confirm_step) {
            debug!("step {}: {} already completed, back to {}", step.route, candidate, self.confirm_step);
            return Ok(Some(join_url(self.base_url, self.confirm_step)));
        }

        Ok(Some(format!("{}{}", join_url(self.base_url, candidate), self.edit_suffix)))
    }

    /// Splits a request path into its route and whether it is in edit mode.
    pub fn parse_url<'u>(
        &self,
        url: &'u str,
    ) -> (&'u str, bool) {
        let base = self.base_url.trim_end_matches('/');
        let path = url.strip_prefix(base).filter(|rest| rest.starts_with('/')).unwrap_or(url);
        match path.strip_suffix(self.edit_suffix) {
            Some("") => ("/", true),
            Some(route) => (route, true),
            None => (path, false),
        }
    }
}

/// Default `next` of `step`, replaced by the target of the last matching fork.
pub fn branch_target<'s>(
    step: &'s StepDefinition,
    ctx: &ForkContext<'_>,
) -> Result<Option<&'s str>> {
    let Some(mut candidate) = step.next.as_deref() else {
        return Ok(None);
    };
    for fork in step.forks.iter() {
        if fork.condition.evaluate(ctx)? {
            debug!("step {}: fork to {} matched", step.route, fork.target);
            candidate = fork.target.as_str();
        }
    }
    Ok(Some(candidate))
}

/// Prefixes `route` with `base_url` unless the wizard is mounted at the root.
pub fn join_url(
    base_url: &str,
    route: &str,
) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{}{}", base, route)
}

#[cfg(test)]
mod tests {
    use crate::{
        ForkCondition, ForkContext, ForkRule, FormflowError, MemSession, NextStepResolver, SessionStore, StepDefinition, Vars, config::WizardConfig,
        fixtures::fork_on, flow::join_url,
    };

    fn routes(list: &[&str]) -> Vec<String> {
        list.iter().map(|r| r.to_string()).collect()
    }

    fn resolve(
        step: &StepDefinition,
        values: &Vars,
        completed: &[&str],
        editing: bool,
    ) -> Option<String> {
        let config = WizardConfig::default();
        let session = MemSession::new("s1");
        let ctx = ForkContext {
            route: &step.route,
            values,
            session: &session,
        };
        NextStepResolver::from_config(&config).resolve(step, &ctx, &routes(completed), editing).unwrap()
    }

    #[test]
    fn test_default_next_without_forks() {
        let step = StepDefinition::new("/a").next("/b");
        assert_eq!(resolve(&step, &Vars::new(), &[], false).as_deref(), Some("/b"));
        assert_eq!(resolve(&StepDefinition::new("/end"), &Vars::new(), &[], false), None);
    }

    #[test]
    fn test_last_matching_fork_wins() {
        let step = StepDefinition::new("/a").next("/b").fork(fork_on("x", "y", "/first")).fork(fork_on("z", 1, "/second")).fork(fork_on("x", "nope", "/third"));

        let both = Vars::new().with("x", "y").with("z", 1);
        assert_eq!(resolve(&step, &both, &[], false).as_deref(), Some("/second"));

        let first_only = Vars::new().with("x", "y");
        assert_eq!(resolve(&step, &first_only, &[], false).as_deref(), Some("/first"));

        assert_eq!(resolve(&step, &Vars::new(), &[], false).as_deref(), Some("/b"));
    }

    #[test]
    fn test_predicate_sees_session() {
        let step = StepDefinition::new("/a").next("/b").fork(ForkRule::new(
            "/returning",
            ForkCondition::predicate("returning", |ctx| Ok(ctx.session.get("visited").is_some())),
        ));
        let config = WizardConfig::default();
        let resolver = NextStepResolver::from_config(&config);

        let mut session = MemSession::new("s1");
        let values = Vars::new();
        let next = resolver.resolve(&step, &ForkContext { route: "/a", values: &values, session: &session }, &[], false).unwrap();
        assert_eq!(next.as_deref(), Some("/b"));

        session.set("visited", true.into());
        let next = resolver.resolve(&step, &ForkContext { route: "/a", values: &values, session: &session }, &[], false).unwrap();
        assert_eq!(next.as_deref(), Some("/returning"));
    }

    #[test]
    fn test_predicate_failure_propagates() {
        let step = StepDefinition::new("/a").next("/b").fork(ForkRule::new(
            "/c",
            ForkCondition::predicate("broken", |_| Err(FormflowError::Session("boom".to_string()))),
        ));
        let config = WizardConfig::default();
        let session = MemSession::new("s1");
        let values = Vars::new();
        let ctx = ForkContext {
            route: "/a",
            values: &values,
            session: &session,
        };
        let err = NextStepResolver::from_config(&config).resolve(&step, &ctx, &[], false).unwrap_err();
        assert!(matches!(err, FormflowError::Condition { route, .. } if route == "/a"));
    }

    #[test]
    fn test_edit_mode_opens_uncompleted_step_for_editing() {
        let step = StepDefinition::new("/a").next("/b");
        assert_eq!(resolve(&step, &Vars::new(), &["/a"], true).as_deref(), Some("/b/edit"));
    }

    #[test]
    fn test_edit_mode_fast_forwards_to_confirm() {
        let step = StepDefinition::new("/a").next("/b").fork(fork_on("x", "y", "/fork"));
        let values = Vars::new().with("x", "y");
        for completed in [&["/b"][..], &["/fork"][..], &["/b", "/fork"][..]] {
            let next = resolve(&step.clone().continue_on_edit(false), &values, completed, true);
            let expected = if completed.contains(&"/fork") { "/confirm" } else { "/fork/edit" };
            assert_eq!(next.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_continue_on_edit_walks_completed_steps() {
        let step = StepDefinition::new("/a").next("/b").continue_on_edit(true);
        assert_eq!(resolve(&step, &Vars::new(), &["/b"], true).as_deref(), Some("/b/edit"));
        assert_eq!(resolve(&step, &Vars::new(), &[], true).as_deref(), Some("/b/edit"));

        let to_confirm = StepDefinition::new("/a").next("/confirm").continue_on_edit(true);
        assert_eq!(resolve(&to_confirm, &Vars::new(), &["/confirm"], true).as_deref(), Some("/confirm"));
    }

    #[test]
    fn test_base_url_prefixes_results() {
        let mut config = WizardConfig::default();
        config.base_url = "/apply/".to_string();
        let resolver = NextStepResolver::from_config(&config);
        let session = MemSession::new("s1");
        let values = Vars::new();
        let ctx = ForkContext {
            route: "/a",
            values: &values,
            session: &session,
        };
        let step = StepDefinition::new("/a").next("/b");

        assert_eq!(resolver.resolve(&step, &ctx, &[], false).unwrap().as_deref(), Some("/apply/b"));
        assert_eq!(resolver.resolve(&step, &ctx, &routes(&["/b"]), true).unwrap().as_deref(), Some("/apply/confirm"));
        assert_eq!(join_url("/", "/b"), "/b");
    }

    #[test]
    fn test_parse_url() {
        let mut config = WizardConfig::default();
        let resolver = NextStepResolver::from_config(&config);
        assert_eq!(resolver.parse_url("/about"), ("/about", false));
        assert_eq!(resolver.parse_url("/about/edit"), ("/about", true));

        config.base_url = "/apply".to_string();
        let resolver = NextStepResolver::from_config(&config);
        assert_eq!(resolver.parse_url("/apply/about/edit"), ("/about", true));
        assert_eq!(resolver.parse_url("/apply"), ("/apply", false));
        assert_eq!(resolver.parse_url("/applyx/about"), ("/applyx/about", false));
    }
}
