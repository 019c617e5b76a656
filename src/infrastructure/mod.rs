//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite and in-memory snapshot stores
//! - HTTP: REST API routes
//! - Ollama: LLM integration for every generation step
//! - Export: Markdown, HTML and plain-text textbook rendering
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod export;
pub mod http;
pub mod ollama;
pub mod persistence;
pub mod state;
