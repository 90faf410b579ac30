//! The per-session journey log.
//!
//! The log holds each visited route once, in the order the user reached
//! them. A route seen for the first time goes right after the previously
//! visited one, so a detour taken after going back lands next to the step it
//! branched from instead of at the end.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    FormflowError, Result,
    graph::Route,
    session::{STEP_DATA_KEY, SessionStore},
};

/// Journey log as stored under the `stepData` session key.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepData {
    /// visited routes, each at most once
    #[serde(default)]
    pub steps_journey: Vec<Route>,
    /// last visited route, the insertion anchor for new routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_step: Option<Route>,
}

/// Outcome of recording a visit.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyRecord {
    pub step_data: StepData,
    /// 1-indexed position of the recorded route
    pub step_number: usize,
}

impl StepData {
    pub fn load(session: &dyn SessionStore) -> Result<Self> {
        match session.get(STEP_DATA_KEY) {
            None => Ok(Self::default()),
            Some(value) => serde_json::from_value(value).map_err(|e| FormflowError::Session(format!("invalid '{}' in session: {}", STEP_DATA_KEY, e))),
        }
    }

    pub fn save(
        &self,
        session: &mut dyn SessionStore,
    ) -> Result<()> {
        session.set(STEP_DATA_KEY, serde_json::to_value(self)?);
        Ok(())
    }

    /// Records a visit to `route`.
    ///
    /// A known route keeps its place. A new one is inserted after
    /// `prev_step`, or appended when there is no usable anchor. Either way
    /// `route` becomes the new `prev_step`.
    pub fn record(
        &self,
        route: &str,
    ) -> JourneyRecord {
        trace!("journey::record({})", route);
        let mut journey = self.steps_journey.clone();

        let position = match journey.iter().position(|r| r == route) {
            Some(position) => position,
            None => {
                let anchor = self.prev_step.as_ref().and_then(|prev| journey.iter().position(|r| r == prev));
                let position = anchor.map_or(journey.len(), |i| i + 1);
                journey.insert(position, route.to_string());
                position
            }
        };

        JourneyRecord {
            step_data: StepData {
                steps_journey: journey,
                prev_step: Some(route.to_string()),
            },
            step_number: position + 1,
        }
    }

    /// 1-indexed position of `route`, if it was visited.
    pub fn step_number(
        &self,
        route: &str,
    ) -> Option<usize> {
        self.steps_journey.iter().position(|r| r == route).map(|i| i + 1)
    }

    /// The route visited before `route`.
    pub fn back_link(
        &self,
        route: &str,
    ) -> Option<&str> {
        let position = self.steps_journey.iter().position(|r| r == route)?;
        position.checked_sub(1).map(|i| self.steps_journey[i].as_str())
    }

    /// Copy without `routes`.
    pub fn forget(
        &self,
        routes: &[Route],
    ) -> StepData {
        StepData {
            steps_journey: self.steps_journey.iter().filter(|r| !routes.contains(*r)).cloned().collect(),
            prev_step: self.prev_step.clone(),
        }
    }
}
