//! Playback timers
//!
//! Timers are host-pumped: the front end calls `poll(now)` every frame (egui)
//! or on a tokio interval (CLI) with the clock from [`crate::time::now_seconds`].
//! A [`Ticker`] has a single slot, so a view can never own two live timers.

use tracing::{debug, error, trace};

use super::types::Year;

/// Single-slot repeating timer.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    period: f64,
    next_due: Option<f64>,
}

impl Ticker {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            period: ms.max(1) as f64 / 1000.0,
            next_due: None,
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start the timer. Arming a live timer leaks the first one, so it is
    /// rejected; cancel first.
    pub fn arm(&mut self, now: f64) -> bool {
        if self.next_due.is_some() {
            error!(period = self.period, "Ticker armed twice without cancel");
            debug_assert!(false, "ticker armed twice without cancel");
            return false;
        }
        self.next_due = Some(now + self.period);
        true
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Change the period. A live timer is cancelled and re-armed.
    pub fn set_period_ms(&mut self, ms: u64, now: f64) {
        let was_armed = self.is_armed();
        self.cancel();
        self.period = ms.max(1) as f64 / 1000.0;
        if was_armed {
            self.arm(now);
        }
    }

    /// Number of periods elapsed since the last poll. Re-arms from the last
    /// due time so long frames are caught up rather than dropped.
    pub fn poll(&mut self, now: f64) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let mut fired = 0;
        while now >= due {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        if fired > 0 {
            trace!(fired, "Ticker fired");
        }
        fired
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Ready,
    Playing,
}

/// What a year-stepping tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Advanced to this year.
    Advanced(Year),
    /// Already at the last year; playback stopped.
    Finished,
}

/// `Idle → Ready → Playing → Ready` around one [`Ticker`].
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    state: PlaybackState,
    ticker: Ticker,
    /// Year that `reset` returns to.
    home: Year,
}

impl Playback {
    pub fn new(interval_ms: u64, home: Year) -> Self {
        Self {
            state: PlaybackState::Idle,
            ticker: Ticker::from_millis(interval_ms),
            home,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn home(&self) -> Year {
        self.home
    }

    pub fn has_live_timer(&self) -> bool {
        self.ticker.is_armed()
    }

    pub fn interval(&self) -> f64 {
        self.ticker.period()
    }

    /// `Idle → Ready` once the owning view has drawn its static elements.
    pub fn ready(&mut self) {
        if self.state == PlaybackState::Idle {
            self.state = PlaybackState::Ready;
        }
    }

    /// Start playing. No-op when already playing or not yet initialized.
    pub fn play(&mut self, now: f64) -> bool {
        match self.state {
            PlaybackState::Playing => {
                trace!("Play ignored, already playing");
                false
            }
            PlaybackState::Idle => {
                debug!("Play ignored, view not initialized");
                false
            }
            PlaybackState::Ready => {
                self.ticker.arm(now);
                self.state = PlaybackState::Playing;
                debug!(interval = self.ticker.period(), "Playback started");
                true
            }
        }
    }

    pub fn pause(&mut self) {
        self.ticker.cancel();
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Ready;
            debug!("Playback paused");
        }
    }

    /// Stop and return the year to go back to.
    pub fn reset(&mut self) -> Year {
        self.pause();
        self.home
    }

    pub fn set_interval_ms(&mut self, ms: u64, now: f64) {
        self.ticker.set_period_ms(ms, now);
    }

    /// Advance `year` by the number of elapsed periods, stopping at the last
    /// year. Returns one step per elapsed period that moved or finished.
    pub fn poll(&mut self, now: f64, year: Year) -> Option<Step> {
        if !self.is_playing() {
            return None;
        }
        let fired = self.ticker.poll(now);
        if fired == 0 {
            return None;
        }
        let mut current = year;
        for _ in 0..fired {
            match current.next() {
                Some(next) => current = next,
                None => {
                    self.pause();
                    return Some(if current == year {
                        Step::Finished
                    } else {
                        Step::Advanced(current)
                    });
                }
            }
        }
        Some(Step::Advanced(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ready(ms: u64, home: Year) -> Playback {
        let mut playback = Playback::new(ms, home);
        playback.ready();
        playback
    }

    #[test]
    fn test_ticker_poll_counts_periods() {
        let mut ticker = Ticker::from_millis(500);
        assert_eq!(ticker.poll(10.0), 0);
        ticker.arm(0.0);
        assert_eq!(ticker.poll(0.4), 0);
        assert_eq!(ticker.poll(0.5), 1);
        assert_eq!(ticker.poll(1.6), 2);
        ticker.cancel();
        assert_eq!(ticker.poll(100.0), 0);
    }

    #[test]
    fn test_play_requires_init() {
        let mut playback = Playback::new(1000, Year::FIRST);
        assert!(!playback.play(0.0));
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(!playback.has_live_timer());
    }

    #[test]
    fn test_double_play_keeps_one_timer() {
        let mut playback = ready(1000, Year::FIRST);
        assert!(playback.play(0.0));
        assert!(!playback.play(0.2));
        playback.pause();
        assert!(!playback.has_live_timer());
        assert_eq!(playback.poll(50.0, Year::FIRST), None);
    }

    #[test]
    fn test_autopause_at_last_year() {
        let mut playback = ready(1000, Year::FIRST);
        let year = Year::new(2022).unwrap();
        playback.play(0.0);
        assert_eq!(playback.poll(5.0, year), Some(Step::Advanced(Year::LAST)));
        assert!(!playback.is_playing());
        assert!(!playback.has_live_timer());
    }

    #[test]
    fn test_play_at_last_year_finishes_on_first_tick() {
        let mut playback = ready(500, Year::LAST);
        playback.play(0.0);
        assert_eq!(playback.poll(0.5, Year::LAST), Some(Step::Finished));
        assert_eq!(playback.state(), PlaybackState::Ready);
    }

    #[test]
    fn test_reset_cancels_and_returns_home() {
        let mut playback = ready(1000, Year::FIRST);
        playback.play(0.0);
        assert_eq!(playback.reset(), Year::FIRST);
        assert!(!playback.has_live_timer());
        assert_eq!(playback.state(), PlaybackState::Ready);
    }

    #[test]
    fn test_speed_change_rearms_live_timer() {
        let mut playback = ready(1000, Year::FIRST);
        playback.play(0.0);
        playback.set_interval_ms(250, 0.0);
        assert!(playback.has_live_timer());
        assert_eq!(playback.poll(0.25, Year::FIRST), Some(Step::Advanced(Year::new(1951).unwrap())));
    }

    proptest! {
        #[test]
        fn playback_never_overshoots(start in 1950i64..=2023, frames in proptest::collection::vec(0.0f64..5.0, 1..60)) {
            let mut playback = ready(100, Year::FIRST);
            let mut year = Year::clamped(start);
            let mut now = 0.0;
            playback.play(now);
            for dt in frames {
                now += dt;
                if let Some(Step::Advanced(next)) = playback.poll(now, year) {
                    prop_assert!(next > year);
                    year = next;
                }
                prop_assert!(year <= Year::LAST);
                prop_assert_eq!(playback.has_live_timer(), playback.is_playing());
            }
        }
    }
}
