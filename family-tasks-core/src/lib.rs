//! Core library for Family Tasks.
//!
//! This crate provides the domain models, input validation and database
//! operations for family members, categories and tasks, independent of any
//! transport layer (HTTP, MCP, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use family_tasks_core::db::Database;
//! use family_tasks_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let mom = db.create_family_member(CreateFamilyMemberInput {
//!     name: "Mom".into(),
//!     email: None,
//!     avatar_url: None,
//! })?;
//! let tasks = db.get_tasks()?;
//! # let _ = (mom, tasks);
//! # Ok::<(), family_tasks_core::Error>(())
//! ```

pub mod db;
mod error;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{EntityKind, Error, Result, ValidationError};
