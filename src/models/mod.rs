//! Core data models for the catalog.
//!
//! These entities map to SQLite tables via `sqlx::FromRow`. Their external
//! JSON shape lives in `crate::resources`, not here.

pub mod image;
pub mod item;
pub mod option;
pub mod user;
