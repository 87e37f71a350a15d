//! Durable record store for clipbench.
//!
//! This crate provides:
//! - Whole-document JSON persistence with atomic temp-then-rename commits
//! - Backward-compatible schema migration on every load
//! - CRUD over video records with newest-first listing

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{LibraryDocument, RecordStore, DOCUMENT_VERSION};
