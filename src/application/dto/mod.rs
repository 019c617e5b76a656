//! Data Transfer Objects - For API boundaries
//!
//! Request bodies and response shapes for the HTTP layer. Domain types are
//! embedded where their serialized form is already the wire form.

pub mod content;
pub mod workflow;

pub use content::*;
pub use workflow::*;
