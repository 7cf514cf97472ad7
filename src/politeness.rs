use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// Uniform random pause between outbound requests.
#[derive(Debug, Clone, Copy)]
pub struct Politeness {
    min_secs: f64,
    max_secs: f64,
}

impl Politeness {
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Politeness { min_secs, max_secs }
    }

    pub fn disabled() -> Self {
        Politeness::new(0.0, 0.0)
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max_secs <= 0.0 {
            return Duration::ZERO;
        }
        let secs = if self.max_secs > self.min_secs {
            rng.random_range(self.min_secs..self.max_secs)
        } else {
            self.min_secs
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    pub fn pause(&self) {
        let delay = self.draw(&mut rand::rng());
        if !delay.is_zero() {
            debug!("Sleeping {:.2}s", delay.as_secs_f64());
            std::thread::sleep(delay);
        }
    }
}
