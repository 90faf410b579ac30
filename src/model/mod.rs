mod step;
mod wizard;

pub use step::{ConditionModel, ForkModel, StepModel};
pub use wizard::{FieldModel, SectionModel, WizardModel};
