use std::time::Duration;

use tracing::debug;

use super::{CancellationToken, DelayRange};

/// Longest uninterrupted sleep; cancellation is polled between slices.
const SLICE: Duration = Duration::from_millis(200);

/// Clock seam so tests can observe pauses without waiting for them.
pub(crate) trait Sleep {
    fn sleep(&self, duration: Duration);
}

pub(crate) struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Spaces network probes out by a random pause drawn from a [`DelayRange`].
/// The first probe of a run goes out immediately.
pub(crate) struct Pacer<S> {
    delay: DelayRange,
    sleeper: S,
    probes: usize,
}

impl<S: Sleep> Pacer<S> {
    pub(crate) fn new(delay: DelayRange, sleeper: S) -> Self {
        Self {
            delay,
            sleeper,
            probes: 0,
        }
    }

    /// Wait before the next probe. Returns `false` when the run was
    /// cancelled before or during the pause; no probe must follow then.
    pub(crate) fn before_probe(&mut self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        if self.probes > 0 {
            let pause = self.delay.sample();
            debug!(seconds = pause.as_secs_f64(), "pausing before next probe");
            let mut remaining = pause;
            while !remaining.is_zero() {
                if cancel.is_cancelled() {
                    return false;
                }
                let step = remaining.min(SLICE);
                self.sleeper.sleep(step);
                remaining -= step;
            }
            if cancel.is_cancelled() {
                return false;
            }
        }
        self.probes += 1;
        true
    }

    #[cfg(test)]
    pub(crate) fn probes(&self) -> usize {
        self.probes
    }
}
