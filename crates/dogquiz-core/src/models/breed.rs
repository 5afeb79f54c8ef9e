use serde::{Deserialize, Serialize};

/// A dog breed as named by the Dog CEO taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    /// Lower-case canonical name, e.g. `bulldog`
    pub name: String,
    #[serde(rename = "subBreeds")]
    pub sub_breeds: Vec<String>,
}

impl Breed {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_breeds: Vec::new(),
        }
    }

    pub fn with_sub_breeds(name: impl Into<String>, sub_breeds: Vec<String>) -> Self {
        Self {
            name: name.into(),
            sub_breeds,
        }
    }

    /// Name with the first character upper-cased; the rest is left alone.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Every nameable variant: `"<sub> <name>"` for each sub-breed, then the
    /// bare breed name last.
    pub fn all_variants(&self) -> Vec<String> {
        self.sub_breeds
            .iter()
            .map(|sub| format!("{} {}", sub, self.name))
            .chain(std::iter::once(self.name.clone()))
            .collect()
    }

    pub fn has_sub_breeds(&self) -> bool {
        !self.sub_breeds.is_empty()
    }

    /// Sub-breeds joined for the list view
    pub fn sub_breeds_display(&self) -> String {
        self.sub_breeds.join(",")
    }
}
