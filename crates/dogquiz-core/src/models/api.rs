//! Response envelopes returned by the Dog CEO API.
//!
//! Every endpoint wraps its payload as `{"message": ..., "status": "success"}`.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::Breed;

/// Status string the API uses for successful responses
pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
pub struct BreedsResponse {
    /// Breed name to sub-breed names, in server order
    pub message: Map<String, Value>,
    pub status: String,
}

impl BreedsResponse {
    pub fn into_breeds(self) -> serde_json::Result<Vec<Breed>> {
        self.message
            .into_iter()
            .map(|(name, subs)| {
                let sub_breeds: Vec<String> = serde_json::from_value(subs)?;
                Ok(Breed::with_sub_breeds(name, sub_breeds))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ImagesResponse {
    pub message: Vec<String>,
    pub status: String,
}
