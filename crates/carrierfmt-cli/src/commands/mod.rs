//! Command implementations.

pub mod extract;

pub use self::extract::{execute_extract, extract_with};
