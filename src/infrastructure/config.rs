//! Application configuration

use std::env;

use anyhow::{Context, Result};

/// Where the workflow snapshot is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotBackend {
    Sqlite,
    Memory,
}

impl std::str::FromStr for SnapshotBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(SnapshotBackend::Sqlite),
            "memory" => Ok(SnapshotBackend::Memory),
            other => anyhow::bail!("Unsupported snapshot backend: {}", other),
        }
    }
}

/// Snapshot persistence settings
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    pub backend: SnapshotBackend,
    /// SQLite database file, used by the sqlite backend
    pub sqlite_path: String,
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ollama API base URL (OpenAI-compatible)
    pub ollama_base_url: String,
    /// Default model for LLM requests
    pub ollama_model: String,
    /// Sampling temperature for generation calls
    pub llm_temperature: f32,

    pub persistence: PersistenceConfig,

    /// Heading used by every export format
    pub book_title: String,
    /// Require every intervening step's prerequisite on multi-step jumps
    pub strict_navigation: bool,

    /// HTTP server port
    pub server_port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434/v1".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            llm_temperature: env::var("BOOKFORGE_LLM_TEMPERATURE")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse()
                .context("BOOKFORGE_LLM_TEMPERATURE must be a number")?,

            persistence: PersistenceConfig {
                backend: env::var("BOOKFORGE_SNAPSHOT_BACKEND")
                    .unwrap_or_else(|_| "sqlite".to_string())
                    .parse()?,
                sqlite_path: env::var("BOOKFORGE_SQLITE_PATH")
                    .unwrap_or_else(|_| "./data/bookforge.db".to_string()),
            },

            book_title: env::var("BOOKFORGE_BOOK_TITLE")
                .unwrap_or_else(|_| "Your New Science Textbook".to_string()),
            strict_navigation: env::var("BOOKFORGE_STRICT_NAVIGATION")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("BOOKFORGE_STRICT_NAVIGATION must be true or false")?,

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}
