//! Elitist ant colony optimization for the travelling salesman problem.
//!
//! A fixed population of ants builds closed tours over a [`DistanceMatrix`], choosing
//! each next city by roulette selection over `pheromone^alpha * (1/distance)^beta`.
//! After every iteration the shared [`PheromoneMatrix`] evaporates, each ant deposits
//! `1 / length` along its tour, and the iteration's shortest tour is reinforced once more.
//!
//! ```no_run
//! use elitist_aco::{load_distance_matrix, Colony, ColonyConfig, IterationStats};
//!
//! let distances = load_distance_matrix(vec![
//!     vec![0.0, 10.0, 15.0],
//!     vec![10.0, 0.0, 35.0],
//!     vec![15.0, 35.0, 0.0],
//! ])?;
//! let config = ColonyConfig::new().with_ant_count(4).with_seed(42);
//! let mut colony = Colony::new(distances, config)?;
//! let report = colony.run(&mut |stats: &IterationStats| println!("{stats:?}"))?;
//! println!("{:?}", report.best);
//! # Ok::<(), elitist_aco::AcoError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod ant;
pub mod config;
pub mod error;
pub mod loader;
pub mod matrix;
pub mod pheromone;
pub mod stats;
pub mod tsp;

pub use ant::{roulette, tour_distance, Ant, BestRecord, Evaluator, Exponents, UniformSource};
pub use config::ColonyConfig;
pub use error::{AcoError, AcoResult};
pub use loader::{
    load_distance_matrix, load_path, DistanceSource, JsonFile, Rows, TsplibFile, XmlFile,
};
pub use matrix::{DistanceMatrix, HeuristicMatrix};
pub use pheromone::PheromoneMatrix;
pub use stats::{AntReport, IterationStats, Observer, RunReport};
pub use tsp::Colony;
