//! Data models for the application
//!
//! This module contains the data structures used throughout the client,
//! organized by domain. Each sub-module represents a specific feature area.

mod payment;
mod plan;
mod subscription;
mod tenant;

// Re-export all models for convenient imports
pub use payment::*;
pub use plan::*;
pub use subscription::*;
pub use tenant::*;
