//! Error types for the Meridian protocol layer.

mod extension;
mod provider;
mod retrieval;
mod tool;

pub use extension::*;
pub use provider::*;
pub use retrieval::*;
pub use tool::*;
