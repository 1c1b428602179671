//! # visa-core
//!
//! Core types, validation rules, and repository traits for visa-tracker.
//!
//! This crate provides the domain model (applications and their documents),
//! the closed enums for visa type and status, the patch types used for
//! partial updates, and the repository traits that storage backends implement.

pub mod dates;
pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;
pub mod uuid_utils;
pub mod validation;

// Re-export commonly used types at crate root
pub use dates::FlexibleDateTime;
pub use error::{Error, ErrorKind, Result};
pub use models::*;
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
