//! Aggregates - Cluster of domain objects treated as a single unit

pub mod workflow_aggregate;

pub use workflow_aggregate::{AggregateError, WorkflowAggregate};
