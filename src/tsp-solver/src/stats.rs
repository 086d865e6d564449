//! Run telemetry: per-iteration statistics and per-ant summaries.

use crate::ant::Ant;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Population-wide tour lengths for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationStats {
    pub iteration: usize,
    pub best_distance: f64,
    pub worst_distance: f64,
    pub mean_distance: f64,
}

impl IterationStats {
    /// Summarizes `distances`, which must be non-empty.
    #[must_use]
    pub fn from_distances(iteration: usize, distances: &[f64]) -> Self {
        let best_distance = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let worst_distance = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean_distance = distances.iter().sum::<f64>() / distances.len() as f64;
        Self {
            iteration,
            best_distance,
            worst_distance,
            mean_distance,
        }
    }
}

/// An ant's personal best at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntReport {
    pub ant_id: usize,
    pub best_distance: f64,
    pub best_path: Vec<usize>,
    pub best_iteration: usize,
}

impl AntReport {
    /// `None` for an ant that has never completed a tour.
    #[must_use]
    pub fn from_ant(ant: &Ant) -> Option<Self> {
        ant.best().map(|best| Self {
            ant_id: ant.id(),
            best_distance: best.distance,
            best_path: best.path.clone(),
            best_iteration: best.iteration,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub history: Vec<IterationStats>,
    pub ants: Vec<AntReport>,
    /// Shortest personal best; the lowest ant id wins ties.
    pub best: Option<AntReport>,
}

impl RunReport {
    #[must_use]
    pub fn new(history: Vec<IterationStats>, ants: Vec<AntReport>) -> Self {
        let best = ants
            .iter()
            .fold(None::<&AntReport>, |best, ant| match best {
                Some(current) if current.best_distance <= ant.best_distance => Some(current),
                _ => Some(ant),
            })
            .cloned();
        Self {
            history,
            ants,
            best,
        }
    }

    /// History as `iteration,best,worst,mean` rows with a header line.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::from("iteration,best,worst,mean\n");
        for stats in &self.history {
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "{},{},{},{}",
                stats.iteration, stats.best_distance, stats.worst_distance, stats.mean_distance
            );
        }
        out
    }
}

/// Receives telemetry while the colony runs. Any `FnMut(&IterationStats)` closure is one.
pub trait Observer {
    fn on_iteration(&mut self, _stats: &IterationStats) {}

    fn on_finish(&mut self, _ants: &[AntReport]) {}
}

impl<F> Observer for F
where
    F: FnMut(&IterationStats),
{
    fn on_iteration(&mut self, stats: &IterationStats) {
        self(stats);
    }
}
