//! Core library for dogquiz.
//!
//! - `api`: Dog CEO REST client
//! - `cache`: persisted breed list with a 24-hour expiry
//! - `repository`: memory/disk/network breed resolution and quiz questions
//! - `state`: quiz session and breed list state containers
//! - `config`: on-disk configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod repository;
pub mod state;
pub mod utils;

pub use api::ApiClient;
pub use cache::BreedCache;
pub use config::Config;
pub use models::{Breed, QuizQuestion};
pub use repository::{BreedRepository, RepositoryError};

use anyhow::Result;

/// Build a repository from configuration: API client at the configured base
/// URL over the breed cache in the configured cache directory.
pub fn open_repository(config: &Config) -> Result<BreedRepository> {
    let api = ApiClient::with_base_url(config.api_base_url())?;
    let cache = BreedCache::new(&config.cache_dir()?)?;
    Ok(BreedRepository::new(api, cache))
}
