//! Read-only parallel helpers.
//!
//! Workers only read creature state and hand values back; the tick thread
//! applies any resulting change after the join. A task that panics
//! resolves to `None` and does not take the batch down with it.

use digilife_agents::creature::Creature;
use digilife_agents::fitness::lifetime_score;
use digilife_core::error::{DigiError, Result};
use digilife_core::types::{CreatureId, Position};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};

pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// A pool with `threads` workers; zero picks one per core.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("digilife-worker-{i}"))
            .build()
            .map_err(|e| DigiError::Backend(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Apply `f` to every item in parallel and wait for all of them.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<Option<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| {
            items
                .par_iter()
                .map(|item| panic::catch_unwind(AssertUnwindSafe(|| f(item))).ok())
                .collect()
        })
    }

    /// Indices of creatures strictly closer than `radius` to `at`.
    pub fn distance_filter(&self, creatures: &[Creature], at: Position, radius: f64) -> Vec<usize> {
        let r2 = radius * radius;
        self.pool.install(|| {
            creatures
                .par_iter()
                .enumerate()
                .filter(|(_, c)| c.position.distance_squared(&at) < r2)
                .map(|(i, _)| i)
                .collect()
        })
    }

    /// Lifetime score of every creature, best first.
    pub fn score_fitness(&self, creatures: &[Creature]) -> Vec<(CreatureId, f64)> {
        let mut scored: Vec<(CreatureId, f64)> = self
            .map(creatures, |c| (c.id, lifetime_score(c)))
            .into_iter()
            .flatten()
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digilife_core::config::SimConfig;
    use digilife_core::types::SimRng;
    use rand::SeedableRng;

    fn line(n: usize) -> Vec<Creature> {
        let config = SimConfig::default();
        let mut rng = SimRng::seed_from_u64(1);
        (0..n)
            .map(|i| Creature::new(CreatureId(i as u64), Position::new(i as f64 * 10.0, 0.0), &config, &mut rng))
            .collect()
    }

    #[test]
    fn test_map_survives_panicking_task() {
        let pool = WorkerPool::new(2).unwrap();
        let results = pool.map(&[1, 2, 3, 4], |&x| {
            if x == 3 {
                panic!("boom");
            }
            x * 10
        });
        assert_eq!(results, vec![Some(10), Some(20), None, Some(40)]);
    }

    #[test]
    fn test_distance_filter_matches_linear_scan() {
        let pool = WorkerPool::new(2).unwrap();
        let creatures = line(50);
        let mut near = pool.distance_filter(&creatures, Position::new(100.0, 0.0), 35.0);
        near.sort();
        assert_eq!(near, vec![7, 8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn test_scores_are_sorted_best_first() {
        let pool = WorkerPool::new(0).unwrap();
        let mut creatures = line(5);
        creatures[3].generation = 4;
        let scores = pool.score_fitness(&creatures);
        assert_eq!(scores.len(), 5);
        assert_eq!(scores[0].0, CreatureId(3));
        assert!(scores.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
