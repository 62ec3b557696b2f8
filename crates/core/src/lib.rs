//! Core types, validation, and merge rules for the Pixel analytics pipeline.

pub mod error;
pub mod events;
pub mod limits;
pub mod payload;
pub mod schema;
pub mod session;
pub mod stats;

pub use error::*;
pub use events::*;
pub use payload::*;
pub use session::*;
pub use stats::*;
