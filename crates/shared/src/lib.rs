//! Glossa Shared Types and Utilities
//!
//! This crate contains types, errors, and utilities shared across the Glossa server.

pub mod db;
pub mod error;
pub mod pagination;
pub mod types;

pub use db::*;
pub use error::*;
pub use pagination::{Page, PageMetadata, PageQuery, PageRequest, PaginationError, Sort, SortDirection};
pub use types::*;
