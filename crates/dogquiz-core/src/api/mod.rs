//! REST API client module for the Dog CEO service.
//!
//! This module provides the `ApiClient` for fetching the breed list and
//! random breed images from `https://dog.ceo/api`. The API is public and
//! needs no authentication.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
