//! core
//!
//! Core domain types and configuration for revdiff.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Revision, Oid
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing rejects malformed input at the boundary
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
