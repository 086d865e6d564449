//! An elitist ant-colony travelling salesman solver.

use crate::ant::{Ant, Evaluator, Exponents};
use crate::config::ColonyConfig;
use crate::error::AcoResult;
use crate::matrix::DistanceMatrix;
use crate::pheromone::PheromoneMatrix;
use crate::stats::{AntReport, IterationStats, Observer, RunReport};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Colony {
    distances: DistanceMatrix,

    // Edge pheromone levels. Only `update_pheromone` writes to it.
    pheromone: PheromoneMatrix,

    ants: Vec<Ant>,
    config: ColonyConfig,
    evaluator: Exponents,
    rng: fastrand::Rng,

    // Index of the next iteration to run.
    iteration: usize,
    history: Vec<IterationStats>,

    // The ant reinforced by the last elitist step.
    elite: Option<usize>,

    // A reused tour length buffer.
    distance_buf: Vec<f64>,
}

impl Colony {
    /// Validates `config` against the instance and sets up the population.
    ///
    /// Every pheromone cell starts at `config.initial_pheromone` and every ant stands on
    /// `config.start_city`.
    pub fn new(distances: DistanceMatrix, config: ColonyConfig) -> AcoResult<Self> {
        config.validate_for(distances.len())?;

        let ants = (0..config.ant_count)
            .map(|id| Ant::new(id, config.start_city, &distances))
            .collect();
        let rng = match config.random_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        info!(
            cities = distances.len(),
            ants = config.ant_count,
            iterations = config.max_iterations,
            evaporation_rate = config.evaporation_rate,
            alpha = config.alpha,
            beta = config.beta,
            "colony ready"
        );

        Ok(Self {
            pheromone: PheromoneMatrix::new(distances.len(), config.initial_pheromone),
            evaluator: config.exponents(),
            distance_buf: Vec::with_capacity(config.ant_count),
            history: Vec::new(),
            distances,
            ants,
            config,
            rng,
            iteration: 0,
            elite: None,
        })
    }

    #[must_use]
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    #[must_use]
    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    #[must_use]
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    #[must_use]
    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    #[must_use]
    pub fn history(&self) -> &[IterationStats] {
        &self.history
    }

    /// Number of iterations completed so far.
    #[must_use]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.iteration >= self.config.max_iterations
    }

    /// Id of the ant whose tour got the elitist deposit in the last iteration.
    #[must_use]
    pub fn elite(&self) -> Option<usize> {
        self.elite
    }

    /// Runs a single iteration and returns its statistics, or `None` once the
    /// iteration budget is spent.
    pub fn step(&mut self) -> AcoResult<Option<IterationStats>> {
        if self.is_done() {
            return Ok(None);
        }

        self.construct_tours()?;
        let stats = self.evaluate();
        self.update_pheromone();

        info!(
            iteration = stats.iteration,
            best = stats.best_distance,
            worst = stats.worst_distance,
            mean = stats.mean_distance,
            "iteration complete"
        );

        self.history.push(stats);
        for ant in &mut self.ants {
            ant.reset();
        }
        self.iteration += 1;

        Ok(Some(stats))
    }

    /// Runs every remaining iteration, reporting to `observer` as it goes.
    pub fn run<O>(&mut self, observer: &mut O) -> AcoResult<RunReport>
    where
        O: Observer + ?Sized,
    {
        while let Some(stats) = self.step()? {
            observer.on_iteration(&stats);
        }

        let reports = self.reports();
        observer.on_finish(&reports);
        Ok(RunReport::new(self.history.clone(), reports))
    }

    /// Personal bests of every ant that has completed at least one tour.
    #[must_use]
    pub fn reports(&self) -> Vec<AntReport> {
        self.ants.iter().filter_map(AntReport::from_ant).collect()
    }

    /// Gets the best path ever discovered or `None` if no paths were ever explored.
    #[must_use]
    pub fn best_path(&self) -> Option<(f64, &[usize])> {
        self.ants
            .iter()
            .filter_map(Ant::best)
            .fold(None, |best: Option<(f64, &[usize])>, record| match best {
                Some((distance, _)) if distance <= record.distance => best,
                _ => Some((record.distance, record.path.as_slice())),
            })
    }

    fn construct_tours(&mut self) -> AcoResult<()> {
        for ant in &mut self.ants {
            // Drops anything left over from a step that failed halfway.
            ant.reset();
            ant.construct_tour(
                &self.distances,
                &self.pheromone,
                &self.evaluator,
                &mut self.rng,
            )?;
            debug!(
                ant = ant.id(),
                route = ?ant.tour(),
                distance = ant.distance(),
                "tour built"
            );
        }
        Ok(())
    }

    fn evaluate(&mut self) -> IterationStats {
        self.distance_buf.clear();
        for ant in &mut self.ants {
            self.distance_buf.push(ant.distance());
            if ant.update_best(self.iteration) {
                info!(
                    ant = ant.id(),
                    distance = ant.distance(),
                    iteration = self.iteration,
                    "new personal best"
                );
            }
        }
        IterationStats::from_distances(self.iteration, &self.distance_buf)
    }

    /// Evaporation, then one deposit per ant, then the elitist deposit.
    fn update_pheromone(&mut self) {
        self.pheromone.evaporate(self.config.evaporation_rate);

        for ant in &self.ants {
            let deposited = self.evaluator.pheromones_deposited(ant.distance());
            self.pheromone.deposit(ant.tour(), deposited);
        }

        // First ant with the shortest tour this iteration.
        let elite = self.ants.iter().fold(None::<&Ant>, |best, ant| match best {
            Some(current) if current.distance() <= ant.distance() => Some(current),
            _ => Some(ant),
        });
        if let Some(ant) = elite {
            let deposited = self.evaluator.pheromones_deposited(ant.distance());
            self.pheromone.deposit(ant.tour(), deposited);
        }
        self.elite = elite.map(Ant::id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcoError;

    fn four_cities() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 10.0, 15.0, 20.0],
            vec![10.0, 0.0, 35.0, 25.0],
            vec![15.0, 35.0, 0.0, 30.0],
            vec![20.0, 25.0, 30.0, 0.0],
        ])
        .unwrap()
    }

    fn triangle() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 3.0, 4.0],
            vec![3.0, 0.0, 5.0],
            vec![4.0, 5.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let err = Colony::new(four_cities(), ColonyConfig::new().with_ant_count(0)).unwrap_err();
        assert!(matches!(err, AcoError::Configuration { .. }));

        let err = Colony::new(four_cities(), ColonyConfig::new().with_start_city(4)).unwrap_err();
        assert!(matches!(err, AcoError::Configuration { .. }));
    }

    #[test]
    fn test_setup_state() {
        let colony = Colony::new(four_cities(), ColonyConfig::new().with_ant_count(3)).unwrap();
        assert_eq!(colony.ants().len(), 3);
        assert!(colony.pheromone().cells().iter().all(|&v| v == 1.0));
        assert!(colony.ants().iter().all(|ant| ant.tour() == [0]));
        assert_eq!(colony.iteration(), 0);
        assert!(colony.best_path().is_none());
        assert!(colony.reports().is_empty());
    }

    #[test]
    fn test_single_ant_scenario() {
        let config = ColonyConfig::new()
            .with_ant_count(1)
            .with_evaporation_rate(0.5)
            .with_max_iterations(1)
            .with_seed(7);
        let mut colony = Colony::new(four_cities(), config).unwrap();

        let stats = colony.step().unwrap().unwrap();
        let (distance, path) = colony.best_path().unwrap();
        let path = path.to_vec();

        assert_eq!(path.len(), 5);
        let edges: f64 = path
            .windows(2)
            .map(|e| colony.distances().get(e[0], e[1]))
            .sum();
        assert_eq!(distance, edges);
        assert_eq!(stats.best_distance, distance);
        assert_eq!(stats.worst_distance, distance);

        // Evaporated to 0.5, then the ant's deposit and the elitist deposit.
        let first = path[1];
        let expected = 0.5 + 2.0 / distance;
        assert!((colony.pheromone().get(0, first) - expected).abs() < 1e-12);
        assert!(colony.pheromone().get(0, first) > 0.5);
        assert!((colony.pheromone().get(first, 0) - 0.5).abs() < 1e-12);

        assert!(colony.is_done());
        assert!(colony.step().unwrap().is_none());
    }

    #[test]
    fn test_elitist_deposits_once_on_tie() {
        // Both directions around a symmetric triangle have the same length.
        let config = ColonyConfig::new()
            .with_ant_count(5)
            .with_evaporation_rate(1.0)
            .with_max_iterations(1)
            .with_seed(3);
        let mut colony = Colony::new(triangle(), config).unwrap();
        let stats = colony.step().unwrap().unwrap();

        assert_eq!(stats.best_distance, 12.0);
        assert_eq!(stats.worst_distance, 12.0);
        assert_eq!(colony.elite(), Some(0));

        // Each closed tour has 3 edges: five ant deposits plus exactly one elitist one.
        let expected = 6.0 * 3.0 / 12.0;
        assert!((colony.pheromone().total() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_elitist_reinforces_iteration_minimum() {
        let config = ColonyConfig::new()
            .with_ant_count(6)
            .with_evaporation_rate(1.0)
            .with_max_iterations(1)
            .with_seed(21);
        let mut colony = Colony::new(four_cities(), config).unwrap();
        let stats = colony.step().unwrap().unwrap();

        let reports = colony.reports();
        let ant_sum: f64 = reports.iter().map(|r| 4.0 / r.best_distance).sum();
        let expected = ant_sum + 4.0 / stats.best_distance;
        assert!((colony.pheromone().total() - expected).abs() < 1e-9);

        let elite = colony.elite().unwrap();
        let first_min = reports
            .iter()
            .find(|r| r.best_distance == stats.best_distance)
            .unwrap();
        assert_eq!(elite, first_min.ant_id);
    }

    #[test]
    fn test_run_reports_every_iteration() {
        let config = ColonyConfig::new()
            .with_ant_count(4)
            .with_max_iterations(12)
            .with_seed(99);
        let mut colony = Colony::new(four_cities(), config).unwrap();

        let mut seen = Vec::new();
        let report = colony
            .run(&mut |stats: &IterationStats| seen.push(stats.iteration))
            .unwrap();

        assert_eq!(seen, (0..12).collect::<Vec<_>>());
        assert_eq!(report.history.len(), 12);
        assert_eq!(report.ants.len(), 4);
        for stats in &report.history {
            assert!(stats.best_distance <= stats.mean_distance + 1e-9);
            assert!(stats.mean_distance <= stats.worst_distance + 1e-9);
        }

        let best = report.best.unwrap();
        let (distance, path) = colony.best_path().unwrap();
        assert_eq!(best.best_distance, distance);
        assert_eq!(best.best_path, path);
        assert!(best.best_iteration < 12);
    }

    #[test]
    fn test_ants_reset_between_iterations() {
        let config = ColonyConfig::new().with_max_iterations(2).with_seed(1);
        let mut colony = Colony::new(four_cities(), config).unwrap();
        colony.step().unwrap();
        assert!(colony
            .ants()
            .iter()
            .all(|ant| ant.tour() == [0] && ant.distance() == 0.0));
        assert!(colony.ants().iter().all(|ant| ant.best().is_some()));
    }

    #[test]
    fn test_pheromone_stays_non_negative() {
        let config = ColonyConfig::new()
            .with_ant_count(3)
            .with_evaporation_rate(0.9)
            .with_max_iterations(20)
            .with_seed(5);
        let mut colony = Colony::new(four_cities(), config).unwrap();
        while colony.step().unwrap().is_some() {
            assert!(colony.pheromone().cells().iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn test_huge_iteration_budget() {
        let config = ColonyConfig::new().with_max_iterations(usize::MAX).with_seed(2);
        let mut colony = Colony::new(four_cities(), config).unwrap();
        assert!(colony.step().unwrap().is_some());
        assert_eq!(colony.history().len(), 1);
        assert!(!colony.is_done());
    }

    #[test]
    fn test_step_starts_from_clean_tours() {
        let config = ColonyConfig::new()
            .with_ant_count(2)
            .with_max_iterations(1)
            .with_seed(6);
        let mut colony = Colony::new(four_cities(), config).unwrap();

        // Leftovers of an iteration that stopped partway through.
        colony.ants[0].walk_to(2);
        colony.ants[1].walk_to(3);
        colony.ants[1].walk_to(1);

        colony.step().unwrap().unwrap();
        for report in colony.reports() {
            let path = &report.best_path;
            assert_eq!(path.len(), 5);
            let mut cities = path[..4].to_vec();
            cities.sort_unstable();
            assert_eq!(cities, vec![0, 1, 2, 3]);
            assert_eq!(report.best_distance, crate::ant::tour_distance(path, colony.distances()));
        }
    }

    #[test]
    fn test_run_with_steep_heuristic() {
        let config = ColonyConfig::new()
            .with_beta(400.0)
            .with_max_iterations(5)
            .with_seed(10);
        let mut colony = Colony::new(four_cities(), config).unwrap();
        let report = colony.run(&mut |_: &IterationStats| {}).unwrap();
        assert_eq!(report.history.len(), 5);
    }

    #[test]
    fn test_run_with_huge_distances() {
        let distances = DistanceMatrix::from_rows(vec![
            vec![0.0, 1e200, 1e200],
            vec![1e200, 0.0, 1e200],
            vec![1e200, 1e200, 0.0],
        ])
        .unwrap();
        let config = ColonyConfig::new().with_max_iterations(5).with_seed(12);
        let mut colony = Colony::new(distances, config).unwrap();
        let report = colony.run(&mut |_: &IterationStats| {}).unwrap();
        let best = report.best.unwrap().best_distance;
        assert!((best / 3e200 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_custom_start_city() {
        let config = ColonyConfig::new()
            .with_start_city(2)
            .with_max_iterations(3)
            .with_seed(8);
        let mut colony = Colony::new(four_cities(), config).unwrap();
        let report = colony.run(&mut |_: &IterationStats| {}).unwrap();
        for ant in &report.ants {
            assert_eq!(ant.best_path.first(), Some(&2));
            assert_eq!(ant.best_path.last(), Some(&2));
        }
    }
}
