//! Application Layer
//!
//! Orchestrates the domain through:
//!
//! - **Ports**: interfaces for the market directory and the listing cache
//! - **Services**: market gateway, order orchestrator and status stream loop
//! - **DTOs**: transport-neutral request and event shapes

pub mod dto;
pub mod ports;
pub mod services;

pub use dto::*;
pub use ports::*;
pub use services::*;
