//! Local caching module for offline breed data.
//!
//! This module provides:
//! - `PrefsStore`: a namespaced key-value store persisted as JSON
//! - `BreedCache`: the breed list plus its write time, expiring after 24 hours
//!
//! The breed list is stored as an ordered JSON array of
//! `{"name": ..., "subBreeds": [...]}` objects.

pub mod manager;
pub mod store;

pub use manager::BreedCache;
pub use store::PrefsStore;
