use crate::graph::ForkRule;

/// Route of a step, e.g. `/about`. Unique within a wizard.
pub type Route = String;

/// One page of the wizard.
#[derive(Debug, Clone, Default)]
pub struct StepDefinition {
    /// step route
    pub route: Route,
    /// fields collected on this step, may be empty
    pub fields: Vec<String>,
    /// unconditional successor, `None` on terminal steps
    pub next: Option<Route>,
    /// conditional successors, the last matching fork wins
    pub forks: Vec<ForkRule>,
    /// keep walking answered steps in edit mode instead of jumping to the confirm step
    pub continue_on_edit: Option<bool>,
    /// reset the session when this step is entered
    pub clear_session: Option<bool>,
}

impl StepDefinition {
    pub fn new(route: &str) -> Self {
        Self {
            route: route.to_string(),
            ..Default::default()
        }
    }

    pub fn fields<I, S>(
        mut self,
        fields: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn next(
        mut self,
        route: &str,
    ) -> Self {
        self.next = Some(route.to_string());
        self
    }

    pub fn fork(
        mut self,
        fork: ForkRule,
    ) -> Self {
        self.forks.push(fork);
        self
    }

    pub fn continue_on_edit(
        mut self,
        value: bool,
    ) -> Self {
        self.continue_on_edit = Some(value);
        self
    }

    pub fn clear_session(
        mut self,
        value: bool,
    ) -> Self {
        self.clear_session = Some(value);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }

    pub fn has_field(
        &self,
        field: &str,
    ) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Default next step followed by every fork target.
    pub fn successors(&self) -> impl Iterator<Item = &str> {
        self.next.iter().map(String::as_str).chain(self.forks.iter().map(|f| f.target.as_str()))
    }
}
