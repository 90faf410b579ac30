//! # Formflow
//!
//! Formflow is a step-flow engine for multi-page form wizards written in Rust.
//! It decides where a user goes next, what counts as progress, and which
//! answers must be forgotten when an earlier answer is revised.
//!
//! ## Core Features
//!
//! - **Validated Step Graph**: Steps, default transitions and conditional forks are checked once at load time
//! - **Next Step Resolution**: Last-match-wins forks with edit-mode fast-forward to the confirmation step
//! - **Journey Tracking**: A deduplicated per-session log of visited steps for step numbers and back links
//! - **Progress Estimation**: Total step counts that follow the forks a user actually took
//! - **Answer Invalidation**: Dependent answers and unreachable branches are forgotten when an answer changes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formflow::{Navigation, Vars, WizardBuilder, WizardModel};
//!
//! let model = WizardModel::from_json(json_str)?;
//! let wizard = WizardBuilder::new(model).build()?;
//!
//! let (_, session) = wizard.open_session(None);
//! let mut session = session.write().unwrap();
//!
//! if let Navigation::Render(view) = wizard.enter(&mut *session, "/name", false)? {
//!     println!("step {} of {}", view.step_number, view.total_steps);
//! }
//! let nav = wizard.submit(&mut *session, "/name", Vars::new().with("name", "Ada"), false)?;
//! ```

mod builder;
mod common;
mod config;
mod error;
mod events;
mod flow;
mod graph;
mod model;
mod session;
mod utils;
mod wizard;

#[cfg(test)]
mod fixtures;

use std::sync::{Arc, RwLock};

pub use builder::WizardBuilder;
pub use common::{Queue, Vars};
pub use config::{Config, StoreConfig, WizardConfig};
pub use error::FormflowError;
pub use events::SessionEvent;
pub use flow::{
    Invalidation, InvalidationTable, JourneyRecord, NextStepResolver, StepData, estimate_total, is_accessible, missing_prereq_redirect, on_branch_changed,
    on_field_changed,
};
pub use graph::{ForkCondition, ForkContext, ForkRule, Predicate, Route, StepDefinition, StepGraph, Transition, reachable_from, reaching};
pub use model::*;
pub use session::{MemSession, SessionId, SessionRegistry, SessionStore};
pub use wizard::{FieldSummary, Navigation, SectionSummary, StepView, Wizard};

/// Result type alias for Formflow operations.
pub type Result<T> = std::result::Result<T, FormflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub type ShareLock<T> = Arc<RwLock<T>>;
