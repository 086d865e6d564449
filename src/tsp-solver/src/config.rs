//! Colony parameters.

use crate::ant::Exponents;
use crate::error::{AcoError, AcoResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the colony needs besides the distance matrix.
///
/// Missing fields in a JSON file fall back to [`ColonyConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Ants per iteration.
    pub ant_count: usize,
    /// Fraction of pheromone removed each iteration, in `[0, 1]`.
    pub evaporation_rate: f64,
    pub max_iterations: usize,
    /// Pheromone exponent.
    pub alpha: f64,
    /// Heuristic exponent.
    pub beta: f64,
    /// City every ant starts (and ends) its tour at.
    pub start_city: usize,
    /// Fixed seed for reproducible runs; `None` seeds from the environment.
    pub random_seed: Option<u64>,
    /// Level every pheromone cell starts at.
    pub initial_pheromone: f64,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            ant_count: 4,
            evaporation_rate: 0.5,
            max_iterations: 100,
            alpha: 1.0,
            beta: 2.0,
            start_city: 0,
            random_seed: None,
            initial_pheromone: 1.0,
        }
    }
}

impl ColonyConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> AcoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    #[must_use]
    pub fn with_ant_count(mut self, ant_count: usize) -> Self {
        self.ant_count = ant_count;
        self
    }

    #[must_use]
    pub fn with_evaporation_rate(mut self, evaporation_rate: f64) -> Self {
        self.evaporation_rate = evaporation_rate;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    #[must_use]
    pub fn with_start_city(mut self, start_city: usize) -> Self {
        self.start_city = start_city;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_initial_pheromone(mut self, initial_pheromone: f64) -> Self {
        self.initial_pheromone = initial_pheromone;
        self
    }

    /// Selection weighting derived from `alpha` and `beta`.
    #[must_use]
    pub fn exponents(&self) -> Exponents {
        Exponents {
            alpha: self.alpha,
            beta: self.beta,
        }
    }

    /// Checks every parameter that does not depend on the instance size.
    pub fn validate(&self) -> AcoResult<()> {
        if self.ant_count == 0 {
            return Err(AcoError::config("ant_count must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(AcoError::config("max_iterations must be positive"));
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return Err(AcoError::config(format!(
                "evaporation_rate must be in [0, 1], got {}",
                self.evaporation_rate
            )));
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(AcoError::config(format!(
                "alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return Err(AcoError::config(format!(
                "beta must be a non-negative number, got {}",
                self.beta
            )));
        }
        if !(self.initial_pheromone.is_finite() && self.initial_pheromone > 0.0) {
            return Err(AcoError::config(format!(
                "initial_pheromone must be positive, got {}",
                self.initial_pheromone
            )));
        }
        Ok(())
    }

    /// Checks the start city against an instance with `city_count` cities.
    pub fn validate_for(&self, city_count: usize) -> AcoResult<()> {
        self.validate()?;
        if self.start_city >= city_count {
            return Err(AcoError::config(format!(
                "start_city {} out of range for {city_count} cities",
                self.start_city
            )));
        }
        Ok(())
    }
}
