// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/backoff.rs
// Version: 1.0.0
//
// Exponential reconnect delay with optional jitter.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    pub min: Duration,
    pub max: Duration,
    pub factor: f64,
    pub jitter: bool,
    attempt: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30), 1.5)
    }
}

impl Backoff {
    pub fn new(min: Duration, max: Duration, factor: f64) -> Self {
        Self {
            min,
            max: max.max(min),
            factor: factor.max(1.0),
            jitter: true,
            attempt: 0,
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Delay for the current attempt, advancing to the next one
    pub fn duration(&mut self) -> Duration {
        let exp = i32::try_from(self.attempt).unwrap_or(i32::MAX);
        let scaled = self.min.as_secs_f64() * self.factor.powi(exp);
        let computed = if scaled.is_finite() && scaled < self.max.as_secs_f64() {
            Duration::from_secs_f64(scaled)
        } else {
            self.max
        };
        self.attempt = self.attempt.saturating_add(1);

        if self.jitter && computed > self.min {
            rand::thread_rng().gen_range(self.min..=computed)
        } else {
            computed
        }
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}
