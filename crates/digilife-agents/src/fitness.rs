//! Fitness scoring and population statistics.

use crate::creature::Creature;
use digilife_core::types::Phase;
use serde::Serialize;
use std::collections::BTreeMap;

/// Lifetime score of a creature.
///
/// Rewards survival, a full energy store, accumulated complexity, feeding
/// and lineage depth. Used for ranking by the worker pool; it does not
/// replace the running `fitness` a creature earns while it acts.
pub fn lifetime_score(creature: &Creature) -> f64 {
    let survival = (creature.age / 500.0).min(1.0) * 30.0;
    let energy = creature.energy_ratio() * 20.0;
    let complexity = (creature.complexity / 500.0).min(1.0) * 30.0;
    let feeding = creature.food_eaten as f64 * 2.0;
    let lineage = creature.generation as f64 * 5.0;
    survival + energy + complexity + feeding + lineage
}

/// Aggregate view over a population.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FitnessStats {
    pub population: usize,
    pub average_energy: f64,
    pub average_complexity: f64,
    pub average_age: f64,
    pub max_fitness: f64,
    pub phases: BTreeMap<Phase, usize>,
}

impl FitnessStats {
    pub fn from_creatures<'a>(creatures: impl IntoIterator<Item = &'a Creature>) -> Self {
        let mut stats = FitnessStats::default();
        let (mut energy, mut complexity, mut age) = (0.0, 0.0, 0.0);
        let mut max_fitness = f64::NEG_INFINITY;

        for c in creatures {
            stats.population += 1;
            energy += c.energy;
            complexity += c.complexity;
            age += c.age;
            max_fitness = max_fitness.max(c.fitness);
            *stats.phases.entry(c.phase()).or_insert(0) += 1;
        }

        if stats.population > 0 {
            let n = stats.population as f64;
            stats.average_energy = energy / n;
            stats.average_complexity = complexity / n;
            stats.average_age = age / n;
            stats.max_fitness = max_fitness;
        }
        stats
    }

    pub fn phase_count(&self, phase: Phase) -> usize {
        self.phases.get(&phase).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digilife_core::config::SimConfig;
    use digilife_core::types::{CreatureId, Position, SimRng};
    use rand::SeedableRng;

    fn creature(id: u64) -> Creature {
        let mut rng = SimRng::seed_from_u64(id);
        Creature::new(CreatureId(id), Position::new(100.0, 100.0), &SimConfig::default(), &mut rng)
    }

    #[test]
    fn test_lifetime_score_of_newborn() {
        let c = creature(1);
        // Full-ish energy store only: 250/350 of 20 points.
        let expected = 250.0 / 350.0 * 20.0;
        assert!((lifetime_score(&c) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_lifetime_score_caps_survival_and_complexity() {
        let mut c = creature(2);
        c.age = 10_000.0;
        c.complexity = 10_000.0;
        c.energy = 0.0;
        c.food_eaten = 3;
        c.generation = 2;
        assert!((lifetime_score(&c) - (30.0 + 30.0 + 6.0 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_stats_report_max_fitness_and_phases() {
        let mut a = creature(1);
        let mut b = creature(2);
        a.fitness = 12.0;
        a.energy = 100.0;
        b.fitness = 40.0;
        b.energy = 300.0;
        b.complexity = 600.0;

        let stats = FitnessStats::from_creatures([&a, &b]);
        assert_eq!(stats.population, 2);
        assert_eq!(stats.max_fitness, 40.0);
        assert_eq!(stats.average_energy, 200.0);
        assert_eq!(stats.phase_count(Phase::Primitive), 1);
        assert_eq!(stats.phase_count(Phase::Advanced), 1);
        assert_eq!(stats.phase_count(Phase::Complex), 0);
    }

    #[test]
    fn test_stats_of_empty_population() {
        let stats = FitnessStats::from_creatures(std::iter::empty());
        assert_eq!(stats.population, 0);
        assert_eq!(stats.max_fitness, 0.0);
    }
}
