//! Roster Store: access to the union store.
//!
//! The union store owns every union and participant record. This crate is
//! the single access point for reading connection snapshots and issuing
//! mutation requests, behind the [`UnionStore`] trait. Two backends are
//! provided: the REST client used in production and an in-memory store used
//! by tests and offline fixtures.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod store;

pub use client::{HttpUnionStore, StoreConfig, StoreError};
pub use memory::{MemoryUnionStore, Snapshot, StoreCall};
pub use store::UnionStore;
