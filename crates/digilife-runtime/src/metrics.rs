//! World statistics.
//!
//! [`WorldStats`] is a serializable snapshot of everything the stats
//! report shows: population and counters, averages, the phase census,
//! vocal and predator counts, epidemics and a coarse health verdict.
//! [`History`] samples snapshots at a fixed interval during a run.

use crate::disease::EpidemicReport;
use crate::evolution::PredatorSummary;
use crate::world::World;
use digilife_agents::creature::Creature;
use digilife_core::types::{CreatureId, Phase, Tick};
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall condition of the ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentStatus {
    Critical,
    Difficult,
    Stable,
    Thriving,
}

impl EnvironmentStatus {
    /// Weighted blend of crowding (0.4), food supply (0.3) and mean energy ratio (0.3).
    pub fn assess(population_ratio: f64, food_ratio: f64, energy_ratio: f64) -> Self {
        let health = population_ratio * 0.4 + food_ratio * 0.3 + energy_ratio * 0.3;
        if health < 0.2 {
            EnvironmentStatus::Critical
        } else if health < 0.4 {
            EnvironmentStatus::Difficult
        } else if health < 0.7 {
            EnvironmentStatus::Stable
        } else {
            EnvironmentStatus::Thriving
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EnvironmentStatus::Critical => "critical",
            EnvironmentStatus::Difficult => "difficult",
            EnvironmentStatus::Stable => "stable",
            EnvironmentStatus::Thriving => "thriving",
        }
    }
}

/// Creatures worth pointing out in a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Notables {
    pub fittest: Option<CreatureId>,
    pub weakest: Option<CreatureId>,
    /// Young, complex and fit.
    pub most_promising: Option<CreatureId>,
}

impl Notables {
    pub fn from_creatures(creatures: &[Creature]) -> Self {
        let by = |key: fn(&Creature) -> f64| {
            move |a: &&Creature, b: &&Creature| key(a).total_cmp(&key(b))
        };
        Self {
            fittest: creatures.iter().max_by(by(|c| c.fitness)).map(|c| c.id),
            weakest: creatures.iter().min_by(by(|c| c.fitness)).map(|c| c.id),
            most_promising: creatures.iter().max_by(by(promise)).map(|c| c.id),
        }
    }
}

fn promise(c: &Creature) -> f64 {
    c.complexity * 0.5 + c.fitness * 0.3 + (1000.0 - c.age) * 0.2
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldStats {
    pub tick: Tick,
    pub population: usize,
    pub max_population: usize,
    pub food: usize,
    pub total_births: u64,
    pub total_deaths: u64,
    pub species: usize,
    pub max_complexity: f64,
    pub average_complexity: f64,
    pub average_energy: f64,
    pub average_age: f64,
    pub average_fitness: f64,
    pub max_fitness: f64,
    pub phases: BTreeMap<Phase, usize>,
    pub vocal_creatures: usize,
    pub active_predators: usize,
    pub predation_kills: u64,
    pub top_predators: Vec<PredatorSummary>,
    pub infected: usize,
    pub epidemics: Vec<EpidemicReport>,
    pub status: EnvironmentStatus,
    pub notables: Notables,
    pub backend: &'static str,
}

/// Number of predators listed in a snapshot.
const TOP_PREDATORS: usize = 5;

impl WorldStats {
    pub fn collect(world: &World) -> Self {
        let creatures = world.creatures();
        let fitness = world.fitness_stats();
        let counters = world.counters();
        let config = world.config();

        let average_fitness = if creatures.is_empty() {
            0.0
        } else {
            creatures.iter().map(|c| c.fitness).sum::<f64>() / creatures.len() as f64
        };
        let energy_ratio = if creatures.is_empty() {
            0.0
        } else {
            creatures.iter().map(Creature::energy_ratio).sum::<f64>() / creatures.len() as f64
        };

        let status = if creatures.is_empty() {
            EnvironmentStatus::Critical
        } else {
            EnvironmentStatus::assess(
                creatures.len() as f64 / config.world.max_population as f64,
                world.food().len() as f64 / (config.world.food_spawn_rate * 5.0).max(1.0),
                energy_ratio,
            )
        };

        Self {
            tick: world.current_tick(),
            population: creatures.len(),
            max_population: config.world.max_population,
            food: world.food().len(),
            total_births: counters.total_births,
            total_deaths: counters.total_deaths,
            species: counters.species_count,
            max_complexity: world.max_complexity(),
            average_complexity: fitness.average_complexity,
            average_energy: fitness.average_energy,
            average_age: fitness.average_age,
            average_fitness,
            max_fitness: fitness.max_fitness,
            phases: fitness.phases,
            vocal_creatures: world.vocal_creatures(),
            active_predators: counters.active_predators,
            predation_kills: counters.predation_kills,
            top_predators: world.top_predators(TOP_PREDATORS),
            infected: world.infected_count(),
            epidemics: world.active_epidemics(),
            status,
            notables: Notables::from_creatures(creatures),
            backend: world.backend_name(),
        }
    }
}

/// Snapshots taken every `interval` ticks.
#[derive(Debug, Clone)]
pub struct History {
    interval: u64,
    samples: Vec<WorldStats>,
}

impl History {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            samples: Vec::new(),
        }
    }

    /// Take a snapshot if the world's clock is on the interval.
    pub fn observe(&mut self, world: &World) -> bool {
        if world.current_tick() % self.interval != 0 {
            return false;
        }
        self.samples.push(WorldStats::collect(world));
        true
    }

    pub fn samples(&self) -> &[WorldStats] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&WorldStats> {
        self.samples.last()
    }

    /// Largest population seen in any sample.
    pub fn peak_population(&self) -> usize {
        self.samples.iter().map(|s| s.population).max().unwrap_or(0)
    }

    /// Population at each sample, oldest first.
    pub fn population_series(&self) -> Vec<(Tick, usize)> {
        self.samples.iter().map(|s| (s.tick, s.population)).collect()
    }
}
