//! The colony's shared trail memory.

/// Directed pheromone levels, one cell per ordered city pair.
///
/// Only the colony holds this mutably; ants see it through `&PheromoneMatrix` while
/// they build tours.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    data: Box<[f64]>,
    n: usize,
}

impl PheromoneMatrix {
    /// Fills every cell, diagonal included, with `initial`.
    #[must_use]
    pub fn new(n: usize, initial: f64) -> Self {
        Self {
            data: vec![initial; n * n].into_boxed_slice(),
            n,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    #[must_use]
    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.n..(from + 1) * self.n]
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[f64] {
        &self.data
    }

    /// Sum over every cell.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Scales every cell by `1 - rate` in a single pass.
    pub fn evaporate(&mut self, rate: f64) {
        let keep = 1.0 - rate;
        for level in self.data.iter_mut() {
            *level *= keep;
        }
    }

    /// Adds `amount` to each edge `path[k] -> path[k + 1]`.
    pub fn deposit(&mut self, path: &[usize], amount: f64) {
        for edge in path.windows(2) {
            self.data[edge[0] * self.n + edge[1]] += amount;
        }
    }
}
