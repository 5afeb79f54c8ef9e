use super::Breed;

/// One quiz question: an image of `correct_breed` and four candidate answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub image_url: String,
    pub correct_breed: Breed,
    /// Four distinct breeds, one of which is `correct_breed`, in random order
    pub options: Vec<Breed>,
    /// Display name of the correct breed
    pub correct_answer: String,
}

impl QuizQuestion {
    pub fn new(image_url: String, correct_breed: Breed, options: Vec<Breed>) -> Self {
        let correct_answer = correct_breed.display_name();
        Self {
            image_url,
            correct_breed,
            options,
            correct_answer,
        }
    }

    pub fn is_correct(&self, breed: &Breed) -> bool {
        breed.name == self.correct_breed.name
    }

    /// Position of the correct breed within `options`
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|b| self.is_correct(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_question_answer_and_index() {
        let options = vec![
            Breed::new("akita"),
            Breed::with_sub_breeds("hound", vec!["afghan".to_string()]),
            Breed::new("pug"),
            Breed::new("boxer"),
        ];
        let question = QuizQuestion::new(
            "https://images.dog.ceo/breeds/hound-afghan/1.jpg".to_string(),
            Breed::with_sub_breeds("hound", vec!["afghan".to_string()]),
            options,
        );

        assert_eq!(question.correct_answer, "Hound");
        assert_eq!(question.correct_index(), Some(1));
        // Matching is by name only
        assert!(question.is_correct(&Breed::new("hound")));
        assert!(!question.is_correct(&Breed::new("pug")));
    }
}
