//! Core types shared across the mtcheck crates
//!
//! This crate provides foundational types used by the checking engine,
//! its error facility and its logging facility:
//!
//! - **Identity types**: SnapshotRef, MachineName
//! - **Schema constants**: Canonical field keys and event names

pub mod identity;
pub mod schema;

pub use identity::{MachineName, SnapshotRef};
