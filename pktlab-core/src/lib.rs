//! pktlab Core Library
//!
//! This crate provides the error type and the address/constant types shared
//! by the pktlab packet fixture crates.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
