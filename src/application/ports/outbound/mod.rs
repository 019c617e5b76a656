//! Outbound ports - Interfaces that the application requires from external systems

mod llm_port;
mod snapshot_port;

pub use llm_port::{ChatMessage, LlmPort, LlmRequest, LlmResponse, MessageRole};
pub use snapshot_port::{SnapshotError, WorkflowSnapshotPort, WORKFLOW_SNAPSHOT_KEY};
