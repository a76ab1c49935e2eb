//! Codec Module
//!
//! Translation at the storage boundary.
//!
//! ## Responsibilities
//! - Namespace logical keys so several stores can share one table
//! - Turn application values into JSON text and back
//! - Decode JSON-typed columns while rows are mapped

mod key;
mod value;

pub use key::KeyCodec;
pub use value::{JsonColumn, ValueCodec};
