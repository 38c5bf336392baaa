//! Carousel position and autoplay for `testimonials` and `slide` blocks.
//!
//! [`Carousel`] is the index arithmetic. [`CarouselPlayer`] owns at most one
//! background timer that advances it; the timer is cancelled when the player
//! is dropped or reconfigured, and a cancelled timer never advances the
//! index again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    current: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.current = (self.current + 1) % self.len;
        }
        self.current
    }

    pub fn previous(&mut self) -> usize {
        if self.len > 0 {
            self.current = (self.current + self.len - 1) % self.len;
        }
        self.current
    }

    /// Jump to `index`; out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.len {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Follow a change in the number of slides, clamping the position.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        if self.current >= len {
            self.current = len.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Autoplay {
    pub enabled: bool,
    pub interval: Duration,
}

impl Autoplay {
    pub const OFF: Autoplay = Autoplay {
        enabled: false,
        interval: Duration::ZERO,
    };

    pub fn new(enabled: bool, interval_ms: u64) -> Self {
        Self {
            enabled,
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Whether a timer should run for a carousel of `len` entries.
    pub fn should_run(&self, len: usize) -> bool {
        self.enabled && len > 1 && !self.interval.is_zero()
    }
}

#[derive(Debug, Default)]
struct Shared {
    carousel: Carousel,
    /// Bumped whenever the running timer is cancelled.
    generation: u64,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mounted carousel with its autoplay timer.
#[derive(Debug)]
pub struct CarouselPlayer {
    shared: Arc<Mutex<Shared>>,
    autoplay: Autoplay,
    timer: Option<JoinHandle<()>>,
}

impl CarouselPlayer {
    /// Mount a carousel of `len` entries, starting its timer if autoplay
    /// applies and a tokio runtime is available.
    pub fn mount(len: usize, autoplay: Autoplay) -> Self {
        let mut player = Self {
            shared: Arc::new(Mutex::new(Shared {
                carousel: Carousel::new(len),
                generation: 0,
            })),
            autoplay,
            timer: None,
        };
        player.start_timer();
        player
    }

    pub fn current(&self) -> usize {
        lock(&self.shared).carousel.current()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared).carousel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn autoplay(&self) -> Autoplay {
        self.autoplay
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn next(&self) -> usize {
        lock(&self.shared).carousel.next()
    }

    pub fn previous(&self) -> usize {
        lock(&self.shared).carousel.previous()
    }

    pub fn go_to(&self, index: usize) -> bool {
        lock(&self.shared).carousel.go_to(index)
    }

    /// Apply new length/autoplay settings. The timer is restarted only when
    /// something changed, so repeated identical edits keep a single timer.
    pub fn reconfigure(&mut self, len: usize, autoplay: Autoplay) {
        let unchanged = {
            let shared = lock(&self.shared);
            shared.carousel.len() == len && self.autoplay == autoplay
        };
        if unchanged {
            return;
        }
        self.stop_timer();
        lock(&self.shared).carousel.resize(len);
        self.autoplay = autoplay;
        self.start_timer();
    }

    fn start_timer(&mut self) {
        let (len, generation) = {
            let shared = lock(&self.shared);
            (shared.carousel.len(), shared.generation)
        };
        if !self.autoplay.should_run(len) {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("no async runtime, carousel autoplay disabled");
            return;
        };

        let period = self.autoplay.interval;
        let shared = Arc::clone(&self.shared);
        self.timer = Some(runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let mut state = lock(&shared);
                if state.generation != generation {
                    break;
                }
                state.carousel.next();
            }
        }));
    }

    fn stop_timer(&mut self) {
        lock(&self.shared).generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for CarouselPlayer {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_wraps_both_ways() {
        let mut c = Carousel::new(3);
        assert_eq!(c.next(), 1);
        assert_eq!(c.next(), 2);
        assert_eq!(c.next(), 0);
        assert_eq!(c.previous(), 2);
        assert!(!c.go_to(3));
        assert!(c.go_to(1));
        assert_eq!(c.current(), 1);
    }

    #[test]
    fn test_empty_carousel_stays_put() {
        let mut c = Carousel::new(0);
        assert_eq!(c.next(), 0);
        assert_eq!(c.previous(), 0);
    }

    #[test]
    fn test_resize_clamps() {
        let mut c = Carousel::new(3);
        c.go_to(2);
        c.resize(2);
        assert_eq!(c.current(), 1);
        c.resize(0);
        assert_eq!(c.current(), 0);
    }

    #[test]
    fn test_should_run() {
        assert!(Autoplay::new(true, 5000).should_run(2));
        assert!(!Autoplay::new(true, 5000).should_run(1));
        assert!(!Autoplay::new(false, 5000).should_run(3));
        assert!(!Autoplay::new(true, 0).should_run(3));
    }

    #[test]
    fn test_mount_without_runtime_spawns_nothing() {
        let player = CarouselPlayer::mount(3, Autoplay::new(true, 10));
        assert!(!player.is_running());
        assert_eq!(player.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_advances_once_per_interval() {
        let player = CarouselPlayer::mount(3, Autoplay::new(true, 5000));
        assert!(player.is_running());
        assert_eq!(player.current(), 0);

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert_eq!(player.current(), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(player.current(), 1);
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(player.current(), 2);
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(player.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timer_for_single_slide() {
        let player = CarouselPlayer::mount(1, Autoplay::new(true, 1000));
        assert!(!player.is_running());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(player.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_player_never_advances() {
        let player = CarouselPlayer::mount(4, Autoplay::new(true, 1000));
        let shared = Arc::clone(&player.shared);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(lock(&shared).carousel.current(), 1);

        drop(player);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(lock(&shared).carousel.current(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_keeps_a_single_timer() {
        let mut player = CarouselPlayer::mount(5, Autoplay::new(true, 1000));
        player.reconfigure(5, Autoplay::new(true, 1000));
        player.reconfigure(5, Autoplay::new(true, 2000));
        player.reconfigure(5, Autoplay::new(true, 2000));

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(player.current(), 1);
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(player.current(), 2);

        player.reconfigure(5, Autoplay::OFF);
        assert!(!player.is_running());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(player.current(), 2);
    }
}
