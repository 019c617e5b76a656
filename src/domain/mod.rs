//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Curriculum, ContentItem, Chapter
//! - Value Objects: WorkflowStep, EditorialGuidelines
//! - Aggregates: Workflow aggregate root

pub mod aggregates;
pub mod entities;
pub mod value_objects;
