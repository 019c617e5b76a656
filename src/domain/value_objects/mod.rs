//! Value objects - Immutable objects defined by their attributes

mod editorial;
mod workflow_step;

pub use editorial::EditorialGuidelines;
pub use workflow_step::{StepTransition, WorkflowStep};
