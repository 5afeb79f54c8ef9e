//! Data models for the dog quiz.
//!
//! - `Breed`: a breed and its sub-breeds
//! - `QuizQuestion`: an image plus four candidate breeds
//! - `api`: JSON envelopes returned by the Dog CEO API

pub mod api;
pub mod breed;
pub mod quiz;

pub use api::{BreedsResponse, ImageResponse, ImagesResponse};
pub use breed::Breed;
pub use quiz::QuizQuestion;
