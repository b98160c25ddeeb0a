// Application layer - use cases and orchestration over the repository,
// the statement writer and the clock.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
