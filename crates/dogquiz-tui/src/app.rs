//! Application state management for dogquiz.
//!
//! This module contains the core `App` struct that owns the repository, the
//! quiz and breed list state containers, and the channel that background
//! tasks use to report back.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use dogquiz_core::models::{Breed, QuizQuestion};
use dogquiz_core::state::{Advance, AutoAdvance, BreedList, CountdownEvent, QuizSession};
use dogquiz_core::BreedRepository;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// At most a handful of fetches are ever in flight.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of breeds to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: isize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Quiz,
    Breeds,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Quiz => "Quiz",
            Tab::Breeds => "Breeds",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Quiz => Tab::Breeds,
            Tab::Breeds => Tab::Quiz,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        // Only two tabs
        self.next()
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned tasks back to the main loop.
///
/// Errors are carried as display strings; the state containers only ever
/// show them.
#[derive(Debug)]
pub enum TaskResult {
    /// Breed preload finished before the first question
    Preloaded(Result<(), String>),
    /// A quiz question was generated
    Question(Result<QuizQuestion, String>),
    /// Breed list for the Breeds tab
    Breeds(Result<Vec<Breed>, String>),
    /// Image list for one breed (breed name, urls)
    BreedImages(String, Result<Vec<String>, String>),
    /// Auto-advance countdown progress
    Countdown(CountdownEvent),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    pub repo: BreedRepository,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    /// Highlighted quiz option before it is picked
    pub option_cursor: usize,

    pub quiz: QuizSession,
    pub breed_list: BreedList,
    pub auto_advance: AutoAdvance,

    // Status bar
    pub status_message: Option<String>,
    pub cache_age: Option<String>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    // Countdown events are sent from a sync callback and must not be lost,
    // so they bypass the bounded task channel
    countdown_rx: mpsc::UnboundedReceiver<CountdownEvent>,
    countdown_tx: mpsc::UnboundedSender<CountdownEvent>,
}

impl App {
    pub fn new(repo: BreedRepository) -> Self {
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (countdown_tx, countdown_rx) = mpsc::unbounded_channel();
        let cache_age = repo.cache_age_display();

        Self {
            repo,
            state: AppState::Normal,
            current_tab: Tab::Quiz,
            option_cursor: 0,
            quiz: QuizSession::new(),
            breed_list: BreedList::new(),
            auto_advance: AutoAdvance::new(),
            status_message: None,
            cache_age,
            task_rx,
            task_tx,
            countdown_rx,
            countdown_tx,
        }
    }

    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if tx.send(result).await.is_err() {
            debug!("Task result dropped, app is shutting down");
        }
    }

    // ===== Quiz =====

    /// Begin a session: preload breeds if that has not succeeded yet, then
    /// load the first question.
    pub fn start_quiz(&mut self) {
        if self.quiz.is_loading {
            return;
        }
        if !self.quiz.needs_preload() {
            self.load_next_question();
            return;
        }

        info!("Preloading breeds");
        self.quiz.begin_loading();
        let repo = self.repo.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = repo.preload_breeds().await.map_err(|e| e.to_string());
            Self::send_result(&tx, TaskResult::Preloaded(result)).await;
        });
        self.sync_countdown();
    }

    pub fn load_next_question(&mut self) {
        self.quiz.begin_loading();
        self.option_cursor = 0;
        let repo = self.repo.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = repo.generate_quiz_question().await.map_err(|e| e.to_string());
            Self::send_result(&tx, TaskResult::Question(result)).await;
        });
        self.sync_countdown();
    }

    /// Pick the option at `index`
    pub fn select_option(&mut self, index: usize) {
        if self.quiz.select_option(index) {
            self.option_cursor = index;
        }
        self.sync_countdown();
    }

    /// Pick the highlighted option
    pub fn select_highlighted(&mut self) {
        self.select_option(self.option_cursor);
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.quiz.show_result {
            return;
        }
        let count = self
            .quiz
            .current_question
            .as_ref()
            .map(|q| q.options.len())
            .unwrap_or(0);
        if count == 0 {
            return;
        }
        let next = self.option_cursor as isize + delta;
        self.option_cursor = next.clamp(0, count as isize - 1) as usize;
    }

    /// Move past an answered question, either loading the next one or
    /// finishing the session.
    pub fn next_question(&mut self) {
        if !self.quiz.show_result || self.quiz.is_loading || self.quiz.game_finished {
            return;
        }
        match self.quiz.advance() {
            Advance::FetchQuestion => self.load_next_question(),
            Advance::Finished => {
                info!(score = self.quiz.score, total = self.quiz.total_questions, "Quiz finished");
                self.sync_countdown();
            }
        }
    }

    /// Recover from an error shown on the quiz tab
    pub fn retry(&mut self) {
        if self.quiz.error.is_none() || self.quiz.is_loading {
            return;
        }
        if self.quiz.needs_preload() {
            self.quiz.clear_error();
            self.start_quiz();
            return;
        }
        match self.quiz.retry() {
            Advance::FetchQuestion => self.load_next_question(),
            Advance::Finished => self.sync_countdown(),
        }
    }

    /// Play again after a finished session
    pub fn restart(&mut self) {
        if !self.quiz.game_finished {
            return;
        }
        self.quiz.restart();
        self.start_quiz();
    }

    /// Keep the auto-advance countdown in step with the quiz state
    fn sync_countdown(&mut self) {
        let tx = self.countdown_tx.clone();
        self.auto_advance.sync(self.quiz.countdown_armed(), move || {
            move |event| {
                if tx.send(event).is_err() {
                    debug!(?event, "Countdown event dropped, app is shutting down");
                }
            }
        });
    }

    // ===== Breeds =====

    /// Load the breed list if it has not been loaded yet
    pub fn ensure_breeds_loaded(&mut self) {
        if self.breed_list.breeds.is_empty() && !self.breed_list.is_loading {
            self.load_breeds(false);
        }
    }

    /// Load the breed list, bypassing the caches when `force_refresh` is set
    pub fn load_breeds(&mut self, force_refresh: bool) {
        if self.breed_list.is_loading {
            return;
        }
        self.breed_list.begin_loading();
        if force_refresh {
            self.status_message = Some("Refreshing breeds...".to_string());
        }

        let repo = self.repo.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = if force_refresh {
                repo.all_breeds_with_refresh().await
            } else {
                repo.all_breeds().await
            };
            let result = result.map(|b| b.as_ref().clone()).map_err(|e| e.to_string());
            Self::send_result(&tx, TaskResult::Breeds(result)).await;
        });
    }

    /// Fetch the image list for the selected breed unless already present
    pub fn load_selected_images(&mut self) {
        let Some(name) = self.breed_list.selected().map(|b| b.name.clone()) else {
            return;
        };
        if self.breed_list.images_for(&name).is_some()
            || self.breed_list.loading_images_for.as_deref() == Some(name.as_str())
        {
            return;
        }

        self.breed_list.begin_loading_images(&name);
        let repo = self.repo.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = repo.breed_images(&name).await.map_err(|e| e.to_string());
            Self::send_result(&tx, TaskResult::BreedImages(name, result)).await;
        });
    }

    // ===== Background Tasks =====

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        while let Ok(event) = self.countdown_rx.try_recv() {
            results.push(TaskResult::Countdown(event));
        }

        for result in results {
            self.process_task_result(result);
        }
    }

    /// Apply one task result to app state.
    ///
    /// Each result is handled to completion before the next, so state updates
    /// never interleave.
    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Preloaded(Ok(())) => {
                self.quiz.preload_succeeded();
                self.cache_age = self.repo.cache_age_display();
                self.load_next_question();
            }
            TaskResult::Preloaded(Err(msg)) => {
                error!(error = %msg, "Failed to preload breeds");
                self.quiz.preload_failed(&msg);
            }
            TaskResult::Question(result) => {
                if let Err(ref msg) = result {
                    error!(error = %msg, "Failed to load question");
                }
                self.quiz.question_loaded(result);
            }
            TaskResult::Breeds(result) => {
                match result {
                    Ok(ref breeds) => {
                        debug!(count = breeds.len(), "Breed list loaded");
                        self.status_message = None;
                    }
                    Err(ref msg) => {
                        error!(error = %msg, "Failed to load breeds");
                        self.status_message = Some(user_message(msg));
                    }
                }
                self.breed_list.loaded(result);
                self.cache_age = self.repo.cache_age_display();
            }
            TaskResult::BreedImages(breed, result) => {
                if let Err(ref msg) = result {
                    warn!(breed = %breed, error = %msg, "Failed to load breed images");
                }
                self.breed_list.images_loaded(&breed, result);
            }
            TaskResult::Countdown(event) => {
                if self.auto_advance.accept(event) {
                    debug!("Countdown elapsed, advancing");
                    self.next_question();
                }
            }
        }
        self.sync_countdown();
    }
}

/// Simplify common error messages for the status bar
fn user_message(msg: &str) -> String {
    let lower = msg.to_lowercase();
    if lower.contains("rate limit") {
        "Server is busy. Please wait a moment and try again.".to_string()
    } else if lower.contains("network") || lower.contains("connect") {
        "Network error. Check your connection.".to_string()
    } else {
        format!("Error: {}", msg)
    }
}
