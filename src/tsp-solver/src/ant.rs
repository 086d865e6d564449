//! Ants and the tour-construction rule.

use crate::error::{AcoError, AcoResult};
use crate::matrix::{DistanceMatrix, HeuristicMatrix};
use crate::pheromone::PheromoneMatrix;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A stream of uniform draws in `[0, 1)`.
pub trait UniformSource {
    fn next_unit(&mut self) -> f64;
}

impl UniformSource for fastrand::Rng {
    fn next_unit(&mut self) -> f64 {
        self.f64()
    }
}

pub trait Evaluator {
    /// Combines an edge's heuristic desirability and pheromone level into the
    /// unnormalized weight used by roulette selection. Must be `0` when `heuristic` is `0`.
    fn edge_quality(&self, heuristic: f64, pheromone: f64) -> f64;

    /// Natural log of [`Evaluator::edge_quality`]; `-inf` for an edge that must not be taken.
    ///
    /// Selection works on these so that very small weights do not underflow to zero.
    fn ln_edge_quality(&self, heuristic: f64, pheromone: f64) -> f64 {
        self.edge_quality(heuristic, pheromone).ln()
    }

    /// Transforms the length of a closed tour into the quantity of pheromone
    /// deposited on each of its edges.
    fn pheromones_deposited(&self, tour_distance: f64) -> f64;
}

/// The classic `pheromone^alpha * heuristic^beta` weighting with `1 / L` deposits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exponents {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for Exponents {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 2.0,
        }
    }
}

impl Evaluator for Exponents {
    fn edge_quality(&self, heuristic: f64, pheromone: f64) -> f64 {
        // 0^0 is 1, so visited cities have to be masked explicitly when beta is 0.
        if heuristic <= 0.0 {
            return 0.0;
        }
        pheromone.powf(self.alpha) * heuristic.powf(self.beta)
    }

    fn ln_edge_quality(&self, heuristic: f64, pheromone: f64) -> f64 {
        if heuristic <= 0.0 {
            return f64::NEG_INFINITY;
        }
        scaled_ln(pheromone, self.alpha) + scaled_ln(heuristic, self.beta)
    }

    fn pheromones_deposited(&self, tour_distance: f64) -> f64 {
        1.0 / tour_distance
    }
}

// `exponent * ln(x)`, with `0 * ln(0)` taken as 0 to match `0^0 = 1`.
fn scaled_ln(x: f64, exponent: f64) -> f64 {
    if exponent == 0.0 {
        0.0
    } else {
        exponent * x.ln()
    }
}

/// Roulette-wheel draw over unnormalized `scores`.
///
/// Walks the cities in index order and returns the first one whose cumulative
/// probability reaches the draw. Zero-score cities are never returned. Yields `None`
/// when nothing has positive weight.
pub fn roulette<R>(scores: &[f64], rng: &mut R) -> Option<usize>
where
    R: UniformSource + ?Sized,
{
    let total: f64 = scores.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let draw = rng.next_unit();
    let mut cumulative = 0.0;
    let mut last = None;
    for (city, &score) in scores.iter().enumerate() {
        if score <= 0.0 {
            continue;
        }
        cumulative += score / total;
        if cumulative >= draw {
            return Some(city);
        }
        last = Some(city);
    }

    // Rounding left the cumulative sum just short of the draw.
    warn!(draw, cumulative, "roulette fell through, taking last candidate");
    last
}

/// Sums the edge costs of a path, closing edge included when present.
#[must_use]
pub fn tour_distance(tour: &[usize], distances: &DistanceMatrix) -> f64 {
    tour.windows(2).map(|edge| distances.get(edge[0], edge[1])).sum()
}

/// An ant's best tour over the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRecord {
    pub distance: f64,
    pub path: Vec<usize>,
    pub iteration: usize,
}

#[derive(Debug, Clone)]
pub struct Ant {
    id: usize,
    start: usize,

    // Current tour, starting at `start`.
    tour: Vec<usize>,
    visited: Vec<bool>,
    distance: f64,

    best: Option<BestRecord>,

    // Per-ant scratch, reused every step.
    heuristic: HeuristicMatrix,
    scores: Vec<f64>,
}

impl Ant {
    /// Creates an ant standing on `start`. The caller guarantees `start < distances.len()`.
    #[must_use]
    pub fn new(id: usize, start: usize, distances: &DistanceMatrix) -> Self {
        let n = distances.len();
        let mut ant = Self {
            id,
            start,
            tour: Vec::with_capacity(n + 1),
            visited: vec![false; n],
            distance: 0.0,
            best: None,
            heuristic: HeuristicMatrix::new(distances),
            scores: vec![0.0; n],
        };
        ant.reset();
        ant
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    /// Length of the current tour as of the last [`Ant::calculate_distance`].
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub fn best(&self) -> Option<&BestRecord> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn heuristic(&self) -> &HeuristicMatrix {
        &self.heuristic
    }

    /// Number of cities not yet on the tour.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.visited.iter().filter(|&&seen| !seen).count()
    }

    /// Clears the current tour and moves the ant back to its start city, which is returned.
    /// The personal best is kept.
    pub fn reset(&mut self) -> usize {
        self.tour.clear();
        self.visited.fill(false);
        self.distance = 0.0;
        self.walk_to(self.start);
        self.start
    }

    /// Appends `city` to the tour.
    pub fn walk_to(&mut self, city: usize) {
        self.tour.push(city);
        self.visited[city] = true;
    }

    /// Picks the next city by roulette selection and walks to it.
    pub fn visit_city<E, R>(
        &mut self,
        distances: &DistanceMatrix,
        pheromone: &PheromoneMatrix,
        evaluator: &E,
        rng: &mut R,
    ) -> AcoResult<usize>
    where
        E: Evaluator + ?Sized,
        R: UniformSource + ?Sized,
    {
        let from = self.tour.last().copied().unwrap_or(self.start);

        self.heuristic.refresh(distances, &self.visited);
        let heuristic = self.heuristic.row(from);
        let trail = pheromone.row(from);
        let mut shift = f64::NEG_INFINITY;
        for (score, (&h, &t)) in self.scores.iter_mut().zip(heuristic.iter().zip(trail)) {
            let ln = evaluator.ln_edge_quality(h, t);
            *score = if ln.is_nan() { f64::NEG_INFINITY } else { ln };
            shift = shift.max(*score);
        }

        // Weights relative to the best candidate, which scores exactly 1.
        for score in &mut self.scores {
            *score = if shift.is_finite() {
                (*score - shift).exp()
            } else {
                0.0
            };
        }

        let city = roulette(&self.scores, rng).ok_or_else(|| AcoError::NoReachableCity {
            ant_id: self.id,
            from,
            remaining: self.remaining(),
        })?;
        self.walk_to(city);
        Ok(city)
    }

    /// Returns to the start city, closing the cycle.
    pub fn close_tour(&mut self) {
        self.tour.push(self.start);
    }

    /// Builds a full closed tour from the start city and returns its length.
    pub fn construct_tour<E, R>(
        &mut self,
        distances: &DistanceMatrix,
        pheromone: &PheromoneMatrix,
        evaluator: &E,
        rng: &mut R,
    ) -> AcoResult<f64>
    where
        E: Evaluator + ?Sized,
        R: UniformSource + ?Sized,
    {
        for _ in 1..distances.len() {
            self.visit_city(distances, pheromone, evaluator, rng)?;
        }
        self.close_tour();
        Ok(self.calculate_distance(distances))
    }

    pub fn calculate_distance(&mut self, distances: &DistanceMatrix) -> f64 {
        self.distance = tour_distance(&self.tour, distances);
        self.distance
    }

    /// Records the current tour as the personal best when it is strictly shorter than
    /// the stored one, or when nothing is stored yet. Returns whether it did.
    pub fn update_best(&mut self, iteration: usize) -> bool {
        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| self.distance < best.distance);
        if improved {
            self.best = Some(BestRecord {
                distance: self.distance,
                path: self.tour.clone(),
                iteration,
            });
        }
        improved
    }
}
