//! Wall-clock time source for animations.

use instant::{Duration, Instant};

/// Keeps track of elapsed time since it was started.
///
/// The clock starts itself on the first read when `auto_start` is set, so a
/// freshly created clock reports zero on its first query.
#[derive(Debug, Clone)]
pub struct Clock {
    pub auto_start: bool,
    start_time: Option<Instant>,
    old_time: Option<Instant>,
    elapsed: Duration,
    running: bool,
}

impl Clock {
    pub fn new(auto_start: bool) -> Self {
        Self {
            auto_start,
            start_time: None,
            old_time: None,
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// (Re)starts the clock at `now` and resets the elapsed time.
    pub fn start_at(&mut self, now: Instant) {
        self.start_time = Some(now);
        self.old_time = Some(now);
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Freezes the elapsed time at `now`.
    pub fn stop_at(&mut self, now: Instant) {
        self.delta_at(now);
        self.running = false;
        self.auto_start = false;
    }

    /// Time since the previous call to any read method.
    pub fn delta_at(&mut self, now: Instant) -> Duration {
        if self.auto_start && !self.running {
            self.start_at(now);
            return Duration::ZERO;
        }
        if !self.running {
            return Duration::ZERO;
        }
        let delta = match self.old_time {
            Some(old) if now > old => now.duration_since(old),
            _ => Duration::ZERO,
        };
        self.old_time = Some(now);
        self.elapsed += delta;
        delta
    }

    pub fn delta(&mut self) -> Duration {
        self.delta_at(Instant::now())
    }

    /// Total running time in seconds as of `now`.
    pub fn elapsed_time_at(&mut self, now: Instant) -> f64 {
        self.delta_at(now);
        self.elapsed.as_secs_f64()
    }

    pub fn elapsed_time(&mut self) -> f64 {
        self.elapsed_time_at(Instant::now())
    }

    /// Instant the clock was last started, if ever.
    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(true)
    }
}
