//! Auto-advance countdown shown after an answer.
//!
//! A `Countdown` is a spawned tokio task that reports `Tick`s once per
//! interval and a final `Elapsed`. Dropping it aborts the task. Every
//! countdown is stamped with a generation so events that were already queued
//! when it was canceled can be recognised and ignored.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Steps counted down before auto-advancing
pub const COUNTDOWN_STEPS: u8 = 3;

/// Time between steps
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick { generation: u64, remaining: u8 },
    Elapsed { generation: u64 },
}

impl CountdownEvent {
    pub fn generation(&self) -> u64 {
        match *self {
            CountdownEvent::Tick { generation, .. } | CountdownEvent::Elapsed { generation } => {
                generation
            }
        }
    }
}

pub struct Countdown {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawn a countdown on the current tokio runtime
    pub fn start<F>(generation: u64, steps: u8, interval: Duration, on_event: F) -> Self
    where
        F: Fn(CountdownEvent) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut remaining = steps;
            while remaining > 0 {
                on_event(CountdownEvent::Tick { generation, remaining });
                tokio::time::sleep(interval).await;
                remaining -= 1;
            }
            on_event(CountdownEvent::Elapsed { generation });
        });

        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Keeps at most one countdown running, in step with an "armed" condition.
///
/// `sync` restarts the countdown whenever the condition turns true and
/// cancels it when the condition turns false.
#[derive(Default)]
pub struct AutoAdvance {
    current: Option<Countdown>,
    armed: bool,
    last_generation: u64,
    remaining: Option<u8>,
}

impl AutoAdvance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the countdown in line with `armed`. `on_event` is only invoked
    /// to build a callback when a new countdown starts.
    pub fn sync<F>(&mut self, armed: bool, on_event: impl FnOnce() -> F)
    where
        F: Fn(CountdownEvent) + Send + 'static,
    {
        if armed == self.armed {
            return;
        }
        self.armed = armed;
        self.current = None;
        self.remaining = None;

        if armed {
            self.last_generation += 1;
            debug!(generation = self.last_generation, "Starting countdown");
            self.current = Some(Countdown::start(
                self.last_generation,
                COUNTDOWN_STEPS,
                COUNTDOWN_INTERVAL,
                on_event(),
            ));
            self.remaining = Some(COUNTDOWN_STEPS);
        }
    }

    /// Cancel any running countdown and disarm
    pub fn cancel(&mut self) {
        self.armed = false;
        self.current = None;
        self.remaining = None;
    }

    /// Feed an event back. Returns true when the live countdown elapsed and
    /// the caller should advance.
    pub fn accept(&mut self, event: CountdownEvent) -> bool {
        let live = self
            .current
            .as_ref()
            .is_some_and(|c| c.generation() == event.generation());
        if !live {
            debug!(generation = event.generation(), "Ignoring stale countdown event");
            return false;
        }

        match event {
            CountdownEvent::Tick { remaining, .. } => {
                self.remaining = Some(remaining);
                false
            }
            CountdownEvent::Elapsed { .. } => {
                self.current = None;
                self.remaining = Some(0);
                true
            }
        }
    }

    /// Seconds left on the live countdown, if one is running
    pub fn remaining(&self) -> Option<u8> {
        self.remaining.filter(|&r| r > 0)
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Generation of the live countdown, if one is running
    pub fn generation(&self) -> Option<u64> {
        self.current.as_ref().map(Countdown::generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn channel_callback(
        tx: mpsc::UnboundedSender<CountdownEvent>,
    ) -> impl Fn(CountdownEvent) + Send + 'static {
        move |event| {
            let _ = tx.send(event);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_then_elapses() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = tokio::time::Instant::now();
        let _countdown = Countdown::start(7, 3, Duration::from_secs(1), channel_callback(tx));

        assert_eq!(rx.recv().await, Some(CountdownEvent::Tick { generation: 7, remaining: 3 }));
        assert_eq!(rx.recv().await, Some(CountdownEvent::Tick { generation: 7, remaining: 2 }));
        assert_eq!(rx.recv().await, Some(CountdownEvent::Tick { generation: 7, remaining: 1 }));
        assert_eq!(rx.recv().await, Some(CountdownEvent::Elapsed { generation: 7 }));
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_countdown_never_elapses() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let countdown = Countdown::start(1, 3, Duration::from_secs(1), channel_callback(tx));

        assert_eq!(rx.recv().await, Some(CountdownEvent::Tick { generation: 1, remaining: 3 }));
        drop(countdown);

        tokio::time::sleep(Duration::from_secs(10)).await;
        // Sender went away with the aborted task
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_restarts_on_rearm() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut auto = AutoAdvance::new();

        auto.sync(true, || channel_callback(tx.clone()));
        assert!(auto.is_running());
        assert_eq!(auto.remaining(), Some(3));
        let first = rx.recv().await.unwrap();
        assert_eq!(first.generation(), 1);
        assert!(!auto.accept(first));

        // Condition drops (next question loading), then comes back
        auto.sync(false, || channel_callback(tx.clone()));
        assert!(!auto.is_running());
        assert_eq!(auto.remaining(), None);
        auto.sync(true, || channel_callback(tx.clone()));

        let mut advanced = false;
        while let Some(event) = rx.recv().await {
            if auto.accept(event) {
                assert_eq!(event.generation(), 2);
                advanced = true;
                break;
            }
        }
        assert!(advanced);
        assert!(!auto.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_ignores_stale_events() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut auto = AutoAdvance::new();
        auto.sync(true, || channel_callback(tx.clone()));

        assert!(!auto.accept(CountdownEvent::Elapsed { generation: 99 }));
        assert!(auto.is_running());

        auto.cancel();
        assert!(!auto.accept(CountdownEvent::Elapsed { generation: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_with_unchanged_condition_keeps_countdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut auto = AutoAdvance::new();
        auto.sync(true, || channel_callback(tx.clone()));
        auto.sync(true, || channel_callback(tx.clone()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_tracks_live_countdown() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut auto = AutoAdvance::new();
        assert_eq!(auto.generation(), None);

        auto.sync(true, || channel_callback(tx.clone()));
        assert_eq!(auto.generation(), Some(1));
        auto.sync(false, || channel_callback(tx.clone()));
        assert_eq!(auto.generation(), None);
        auto.sync(true, || channel_callback(tx.clone()));
        assert_eq!(auto.generation(), Some(2));

        assert!(auto.accept(CountdownEvent::Elapsed { generation: 2 }));
        assert_eq!(auto.generation(), None);
    }
}
