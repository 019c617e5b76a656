//! Application services - Use case implementations
//!
//! This module contains the application services that drive the book
//! creation workflow. Services depend on outbound ports only, so the
//! language model and snapshot storage can be swapped for test doubles.

pub mod activity_tracker;
pub mod book_generation_service;
pub mod llm;
pub mod workflow_service;

pub use activity_tracker::ActivitySnapshot;

// Re-export generation service types
pub use book_generation_service::BookGenerationService;

// Re-export workflow service types
pub use workflow_service::{ApprovalReport, NavigationOutcome, WorkflowError, WorkflowService};
