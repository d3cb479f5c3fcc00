//! Request and Response models for the scheduler API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::SaveConfigRequest;
pub use responses::{AckResponse, ConfigResponse, HealthResponse};
