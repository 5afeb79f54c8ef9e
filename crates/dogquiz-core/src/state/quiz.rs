//! Quiz session state container.
//!
//! `QuizSession` is a plain reducer: the front-end performs the async work
//! (preloading breeds, generating questions) and feeds the outcomes back in.
//! Each outcome is applied as one whole step, so completions never interleave.

use std::fmt::Display;

use tracing::debug;

use crate::models::{Breed, QuizQuestion};

/// Questions per session
pub const QUESTIONS_PER_SESSION: u32 = 10;

/// What the caller should do after `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Load another question and feed it to `question_loaded`
    FetchQuestion,
    /// The session is over
    Finished,
}

/// Coarse view of the session, derived from the fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase<'a> {
    Loading,
    Error(&'a str),
    Active {
        question: &'a QuizQuestion,
        selection: Option<&'a Breed>,
        show_result: bool,
        is_correct: bool,
        score: u32,
        count: u32,
    },
    Finished {
        score: u32,
        count: u32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    pub is_loading: bool,
    pub current_question: Option<QuizQuestion>,
    pub selected_answer: Option<Breed>,
    pub show_result: bool,
    pub is_correct: bool,
    pub score: u32,
    /// Questions served so far, including the one on screen
    pub total_questions: u32,
    pub error: Option<String>,
    pub game_finished: bool,
    /// True until the first breed preload succeeds
    needs_preload: bool,
}

impl QuizSession {
    /// A fresh session that still has to preload breeds
    pub fn new() -> Self {
        Self {
            needs_preload: true,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> QuizPhase<'_> {
        if self.game_finished {
            return QuizPhase::Finished {
                score: self.score,
                count: self.total_questions,
            };
        }
        if let Some(ref error) = self.error {
            return QuizPhase::Error(error);
        }
        match (&self.current_question, self.is_loading) {
            (Some(question), false) => QuizPhase::Active {
                question,
                selection: self.selected_answer.as_ref(),
                show_result: self.show_result,
                is_correct: self.is_correct,
                score: self.score,
                count: self.total_questions,
            },
            _ => QuizPhase::Loading,
        }
    }

    /// Whether the breed list still has to be preloaded before questions
    pub fn needs_preload(&self) -> bool {
        self.needs_preload
    }

    /// Enter the loading state, clearing any previous error
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn preload_succeeded(&mut self) {
        self.needs_preload = false;
    }

    pub fn preload_failed(&mut self, error: impl Display) {
        self.is_loading = false;
        self.error = Some(format!("Failed to load dog breeds: {}", error));
    }

    /// Apply the outcome of a question fetch
    pub fn question_loaded<E: Display>(&mut self, result: Result<QuizQuestion, E>) {
        self.is_loading = false;
        match result {
            Ok(question) => {
                self.current_question = Some(question);
                self.selected_answer = None;
                self.show_result = false;
                self.total_questions += 1;
                debug!(count = self.total_questions, "Question loaded");
            }
            Err(e) => {
                self.error = Some(format!("Failed to load question: {}", e));
            }
        }
    }

    /// Record the user's pick. Ignored while loading, without a question, or
    /// once a result is already showing.
    pub fn select_answer(&mut self, breed: &Breed) -> bool {
        if self.is_loading || self.show_result || self.game_finished {
            return false;
        }
        let Some(ref question) = self.current_question else {
            return false;
        };

        self.is_correct = question.is_correct(breed);
        if self.is_correct {
            self.score += 1;
        }
        self.selected_answer = Some(breed.clone());
        self.show_result = true;
        debug!(correct = self.is_correct, score = self.score, "Answer selected");
        true
    }

    /// Select the option at `index` of the current question
    pub fn select_option(&mut self, index: usize) -> bool {
        let breed = self
            .current_question
            .as_ref()
            .and_then(|q| q.options.get(index))
            .cloned();
        match breed {
            Some(breed) => self.select_answer(&breed),
            None => false,
        }
    }

    /// Move past the current question
    pub fn advance(&mut self) -> Advance {
        if self.total_questions >= QUESTIONS_PER_SESSION {
            self.game_finished = true;
            Advance::Finished
        } else {
            Advance::FetchQuestion
        }
    }

    /// Re-attempt whatever failed; same as advancing
    pub fn retry(&mut self) -> Advance {
        self.error = None;
        self.advance()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Reset every counter; the breed list stays preloaded
    pub fn restart(&mut self) {
        let needs_preload = self.needs_preload;
        *self = Self {
            needs_preload,
            ..Self::default()
        };
    }

    /// The auto-advance countdown runs while a result is shown and more
    /// questions remain
    pub fn countdown_armed(&self) -> bool {
        self.show_result
            && !self.is_loading
            && self.error.is_none()
            && !self.game_finished
            && self.total_questions < QUESTIONS_PER_SESSION
    }

    /// Session progress in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        (self.total_questions.min(QUESTIONS_PER_SESSION) as f64) / QUESTIONS_PER_SESSION as f64
    }
}
