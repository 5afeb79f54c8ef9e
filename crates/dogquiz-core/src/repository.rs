//! Breed repository: the single source of breed data for the quiz and list.
//!
//! Resolution order for the breed list is memory, then the on-disk cache,
//! then the network. Memory and disk hits are returned immediately and
//! refreshed from the network in a background task whose failure is only
//! logged.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::cache::BreedCache;
use crate::models::{Breed, QuizQuestion};

/// Number of candidate breeds offered per question
pub const QUIZ_OPTION_COUNT: usize = 4;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Not enough dog breeds available to generate quiz (got {available})")]
    NotEnoughBreeds { available: usize },

    /// Prints the whole context chain so the root cause reaches the user
    #[error("{0:#}")]
    Api(#[from] anyhow::Error),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Where a question's image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Breed(String),
    SubBreed { breed: String, sub_breed: String },
}

/// Pick the image scope for a breed. Breeds without sub-breeds always use the
/// breed itself; otherwise a fair coin decides between the breed and one
/// uniformly chosen sub-breed.
pub fn pick_image_source<R: Rng>(breed: &Breed, rng: &mut R) -> ImageSource {
    if breed.has_sub_breeds() && rng.gen_bool(0.5) {
        if let Some(sub) = breed.sub_breeds.choose(rng) {
            return ImageSource::SubBreed {
                breed: breed.name.clone(),
                sub_breed: sub.clone(),
            };
        }
    }
    ImageSource::Breed(breed.name.clone())
}

/// Choose `QUIZ_OPTION_COUNT` distinct breeds and one of them as the answer.
/// Returns `None` when the pool is too small.
pub fn pick_options<R: Rng>(breeds: &[Breed], rng: &mut R) -> Option<(Vec<Breed>, Breed)> {
    if breeds.len() < QUIZ_OPTION_COUNT {
        return None;
    }

    let mut options: Vec<Breed> = breeds
        .choose_multiple(rng, QUIZ_OPTION_COUNT)
        .cloned()
        .collect();
    options.shuffle(rng);

    let correct = options[rng.gen_range(0..options.len())].clone();
    Some((options, correct))
}

/// Repository over the Dog CEO API with a two-level breed cache.
/// Clone is cheap; clones share both caches and the HTTP connection pool.
#[derive(Clone)]
pub struct BreedRepository {
    api: ApiClient,
    local: Arc<BreedCache>,
    memory: Arc<RwLock<Option<Arc<Vec<Breed>>>>>,
}

impl BreedRepository {
    pub fn new(api: ApiClient, local: BreedCache) -> Self {
        Self {
            api,
            local: Arc::new(local),
            memory: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Breed list
    // =========================================================================

    /// All breeds, from memory, disk, or network in that order.
    ///
    /// Cache hits trigger a background refresh. Only the network path can
    /// fail.
    pub async fn all_breeds(&self) -> RepositoryResult<Arc<Vec<Breed>>> {
        let in_memory = self.memory.read().await.clone();
        if let Some(breeds) = in_memory {
            debug!(count = breeds.len(), "Using memory cache");
            self.refresh_in_background();
            return Ok(breeds);
        }

        if let Some(local) = self.local.get() {
            debug!(count = local.len(), "Using local cache");
            let breeds = Arc::new(local);
            *self.memory.write().await = Some(breeds.clone());
            self.refresh_in_background();
            return Ok(breeds);
        }

        debug!("Fetching breeds from network");
        self.fetch_from_network().await
    }

    /// All breeds straight from the network, repopulating both caches
    pub async fn all_breeds_with_refresh(&self) -> RepositoryResult<Arc<Vec<Breed>>> {
        self.fetch_from_network().await
    }

    async fn fetch_from_network(&self) -> RepositoryResult<Arc<Vec<Breed>>> {
        let breeds = Arc::new(self.api.fetch_all_breeds().await?);
        info!(count = breeds.len(), "Fetched breeds from network");

        *self.memory.write().await = Some(breeds.clone());

        if let Err(e) = self.local.put(&breeds) {
            warn!(error = %e, "Failed to save breeds to local cache");
        }

        Ok(breeds)
    }

    /// Spawn an unawaited network refresh. Failure keeps the current value.
    fn refresh_in_background(&self) {
        let repo = self.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.fetch_from_network().await {
                warn!(error = %e, "Failed to refresh breeds from network");
            }
        });
    }

    /// Warm the caches, discarding the list itself
    pub async fn preload_breeds(&self) -> RepositoryResult<()> {
        self.all_breeds().await.map(|_| ())
    }

    pub async fn preload_breeds_with_refresh(&self) -> RepositoryResult<()> {
        self.all_breeds_with_refresh().await.map(|_| ())
    }

    /// The breed list currently held in memory, without touching disk or network
    pub async fn cached_breeds(&self) -> Option<Arc<Vec<Breed>>> {
        self.memory.read().await.clone()
    }

    /// Drop both the in-memory and the on-disk breed list
    pub async fn clear_cache(&self) -> RepositoryResult<()> {
        *self.memory.write().await = None;
        self.local.clear()?;
        Ok(())
    }

    pub fn cache_age_display(&self) -> Option<String> {
        self.local.age_display()
    }

    // =========================================================================
    // Quiz
    // =========================================================================

    /// Build a question: four distinct breeds, one correct, and an image of it
    pub async fn generate_quiz_question(&self) -> RepositoryResult<QuizQuestion> {
        let breeds = self.all_breeds().await?;
        debug!(available = breeds.len(), "Generating quiz question");

        // ThreadRng is not Send; keep it out of scope across awaits
        let picked = {
            let mut rng = rand::thread_rng();
            pick_options(&breeds, &mut rng)
                .map(|(options, correct)| {
                    let source = pick_image_source(&correct, &mut rng);
                    (options, correct, source)
                })
        };

        let Some((options, correct, source)) = picked else {
            warn!(available = breeds.len(), "Not enough breeds to generate quiz question");
            return Err(RepositoryError::NotEnoughBreeds {
                available: breeds.len(),
            });
        };

        let image_url = self.fetch_image(&source).await?;
        debug!(breed = %correct.name, ?source, "Generated quiz question");

        Ok(QuizQuestion::new(image_url, correct, options))
    }

    async fn fetch_image(&self, source: &ImageSource) -> RepositoryResult<String> {
        let url = match source {
            ImageSource::Breed(breed) => self.api.fetch_random_breed_image(breed).await?,
            ImageSource::SubBreed { breed, sub_breed } => {
                self.api.fetch_random_sub_breed_image(breed, sub_breed).await?
            }
        };
        Ok(url)
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// A random image of any breed
    pub async fn random_image(&self) -> RepositoryResult<String> {
        Ok(self.api.fetch_random_image().await?)
    }

    /// Every image URL for a breed
    pub async fn breed_images(&self, breed: &str) -> RepositoryResult<Vec<String>> {
        Ok(self.api.fetch_breed_images(breed).await?)
    }
}

// ============================================================================
// Tests
// ============================================================================
