//! # Response Rotation
//!
//! Chooses the canned reply for each relayed message.
//! The first reply of a process is always the first pool entry; after that a reply is
//! drawn uniformly from every entry that differs from the previous one.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::config::ConfigError;

/// Ordered, non-empty list of candidate replies. Read-only after construction.
#[derive(Debug, Clone)]
pub struct ResponsePool {
    responses: Vec<String>,
}

impl ResponsePool {
    pub fn new(responses: Vec<String>) -> Result<Self, ConfigError> {
        if responses.is_empty() {
            return Err(ConfigError::NoResponses);
        }
        Ok(Self { responses })
    }

    pub fn first(&self) -> &str {
        &self.responses[0]
    }

    /// Entries not equal to `last`, in pool order.
    fn candidates(&self, last: Option<&str>) -> Vec<&str> {
        self.responses
            .iter()
            .map(String::as_str)
            .filter(|r| Some(*r) != last)
            .collect()
    }
}

/// Process-wide rotation memory. Starts fresh on every restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    last_response: Option<String>,
    first_run: bool,
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            last_response: None,
            first_run: true,
        }
    }
}

impl RotationState {
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Picks the next reply without recording it.
    ///
    /// When every entry equals the last reply (a single-entry pool), that entry is
    /// repeated rather than failing.
    pub fn select<'p, R: Rng + ?Sized>(&self, pool: &'p ResponsePool, rng: &mut R) -> &'p str {
        if self.first_run {
            return pool.first();
        }
        let candidates = pool.candidates(self.last_response());
        match candidates.choose(rng) {
            Some(choice) => *choice,
            None => pool.first(),
        }
    }

    /// Records a delivered reply. After the first commit the state never returns to first-run.
    pub fn commit(&mut self, response: &str) {
        self.last_response = Some(response.to_string());
        self.first_run = false;
    }
}

/// Rotation state together with the random source used to draw from it.
#[derive(Debug)]
pub struct Rotation {
    pub state: RotationState,
    rng: StdRng,
}

impl Rotation {
    pub fn new(rng: StdRng) -> Self {
        Self {
            state: RotationState::default(),
            rng,
        }
    }

    pub fn select<'p>(&mut self, pool: &'p ResponsePool) -> &'p str {
        self.state.select(pool, &mut self.rng)
    }
}
