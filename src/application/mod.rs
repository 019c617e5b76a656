//! Application layer - Use cases and ports
//!
//! This layer contains:
//! - Ports: Interfaces to the language model and snapshot storage
//! - Services: The workflow and generation use cases
//! - DTOs: Request and response shapes for the HTTP layer

pub mod dto;
pub mod ports;
pub mod services;
