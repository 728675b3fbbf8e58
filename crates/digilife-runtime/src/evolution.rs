//! Selection and species bookkeeping.
//!
//! Two independent culls keep the population in check. Selection pressure
//! trims the lowest-energy tenth once the world is 80% full; the hard cap
//! removes the least fit creatures when the population overshoots the cap
//! by more than the configured slack.

use digilife_agents::creature::Creature;
use digilife_agents::fitness::FitnessStats;
use digilife_core::config::PopulationConfig;
use digilife_core::types::CreatureId;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CullReason {
    SelectionPressure,
    PopulationCap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredatorSummary {
    pub id: CreatureId,
    pub kills: u32,
    pub complexity: f64,
}

#[derive(Debug, Clone)]
pub struct PopulationController {
    config: PopulationConfig,
    max_population: usize,
}

impl PopulationController {
    pub fn new(config: PopulationConfig, max_population: usize) -> Self {
        Self {
            config,
            max_population,
        }
    }

    pub fn max_population(&self) -> usize {
        self.max_population
    }

    pub fn set_max_population(&mut self, max: usize) {
        self.max_population = max;
    }

    /// Largest population that survives [`enforce_cap`](Self::enforce_cap) untouched.
    pub fn hard_limit(&self) -> usize {
        self.max_population + self.config.cap_slack
    }

    /// Remove the lowest-energy fraction when the world is crowded.
    pub fn apply_selection_pressure(&self, creatures: &mut Vec<Creature>) -> Vec<Creature> {
        let n = creatures.len();
        if n == 0 || (n as f64) <= self.max_population as f64 * self.config.pressure_ratio {
            return Vec::new();
        }
        let remove = (n as f64 * self.config.pressure_cull_fraction) as usize;
        if remove == 0 {
            return Vec::new();
        }
        creatures.sort_by(|a, b| a.energy.total_cmp(&b.energy));
        creatures.drain(..remove).collect()
    }

    /// Remove the least fit creatures down to the cap once the overshoot exceeds the slack.
    pub fn enforce_cap(&self, creatures: &mut Vec<Creature>) -> Vec<Creature> {
        let excess = creatures.len().saturating_sub(self.max_population);
        if excess <= self.config.cap_slack {
            return Vec::new();
        }
        creatures.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        creatures.drain(..excess).collect()
    }
}

/// Number of distinct species buckets.
pub fn species_count(creatures: &[Creature]) -> usize {
    creatures.iter().map(Creature::species_id).collect::<HashSet<_>>().len()
}

/// Predators still complex enough to hunt.
pub fn active_predators(creatures: &[Creature], predation_complexity: f64) -> usize {
    creatures
        .iter()
        .filter(|c| c.is_predator() && c.complexity >= predation_complexity)
        .count()
}

/// Up to `limit` creatures with at least one kill, most kills first.
pub fn top_predators(creatures: &[Creature], limit: usize) -> Vec<PredatorSummary> {
    let mut predators: Vec<PredatorSummary> = creatures
        .iter()
        .filter(|c| c.kills() > 0)
        .map(|c| PredatorSummary {
            id: c.id,
            kills: c.kills(),
            complexity: c.complexity,
        })
        .collect();
    predators.sort_by(|a, b| b.kills.cmp(&a.kills));
    predators.truncate(limit);
    predators
}

pub fn fitness_stats(creatures: &[Creature]) -> FitnessStats {
    FitnessStats::from_creatures(creatures)
}
