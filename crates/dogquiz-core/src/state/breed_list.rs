//! State container for the breed list view.

use std::collections::HashMap;
use std::fmt::Display;

use crate::models::Breed;

#[derive(Debug, Clone, Default)]
pub struct BreedList {
    pub is_loading: bool,
    pub breeds: Vec<Breed>,
    pub error: Option<String>,
    pub selection: usize,
    /// Image URLs fetched on demand, keyed by breed name
    pub images: HashMap<String, Vec<String>>,
    /// Breed whose image list is currently being fetched
    pub loading_images_for: Option<String>,
    pub image_error: Option<String>,
}

impl BreedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Apply a breed-list fetch. Failure clears the list.
    pub fn loaded<E: Display>(&mut self, result: Result<Vec<Breed>, E>) {
        self.is_loading = false;
        match result {
            Ok(breeds) => {
                self.breeds = breeds;
                self.error = None;
                self.selection = self.selection.min(self.breeds.len().saturating_sub(1));
            }
            Err(e) => {
                self.breeds.clear();
                self.selection = 0;
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn selected(&self) -> Option<&Breed> {
        self.breeds.get(self.selection)
    }

    pub fn select_next(&mut self) {
        if self.selection + 1 < self.breeds.len() {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    /// Move the selection by `delta` rows, clamped to the list
    pub fn select_by(&mut self, delta: isize) {
        if self.breeds.is_empty() {
            return;
        }
        let max = self.breeds.len() - 1;
        self.selection = self.selection.saturating_add_signed(delta).min(max);
    }

    pub fn begin_loading_images(&mut self, breed: &str) {
        self.loading_images_for = Some(breed.to_string());
        self.image_error = None;
    }

    pub fn images_loaded<E: Display>(&mut self, breed: &str, result: Result<Vec<String>, E>) {
        if self.loading_images_for.as_deref() == Some(breed) {
            self.loading_images_for = None;
        }
        match result {
            Ok(urls) => {
                self.images.insert(breed.to_string(), urls);
            }
            Err(e) => {
                self.image_error = Some(format!("Failed to load images for {}: {}", breed, e));
            }
        }
    }

    pub fn images_for(&self, breed: &str) -> Option<&[String]> {
        self.images.get(breed).map(Vec::as_slice)
    }
}
