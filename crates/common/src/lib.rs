//! Common types, protocol definitions, and errors shared between the
//! collection service and sensor agents.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
