//! Observable state for the quiz and breed list views.
//!
//! - `QuizSession`: score, question counter and game-over flag for one run
//! - `AutoAdvance` / `Countdown`: the 3-second auto-advance after an answer
//! - `BreedList`: the all-breeds view

pub mod breed_list;
pub mod countdown;
pub mod quiz;

pub use breed_list::BreedList;
pub use countdown::{AutoAdvance, Countdown, CountdownEvent, COUNTDOWN_INTERVAL, COUNTDOWN_STEPS};
pub use quiz::{Advance, QuizPhase, QuizSession, QUESTIONS_PER_SESSION};
