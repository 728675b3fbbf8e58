//! A creature's view of the world while it updates.
//!
//! The world lends out everything except the creature being updated:
//! the other creatures, the food, a nursery for newborns and the shared
//! RNG. Mutations made through a habitat are visible to every creature
//! updated later in the same tick.

use crate::creature::Creature;
use crate::vocal::Word;
use digilife_core::config::SimConfig;
use digilife_core::types::{CreatureId, DiseaseId, FoodItem, IdSequence, Position, SimRng};
use rand::seq::index;
use serde::Serialize;

/// Candidates inspected by the nearest-food search.
pub const FOOD_SAMPLE: usize = 40;
/// Candidates inspected by the nearest-creature search.
pub const CREATURE_SAMPLE: usize = 25;
pub const FOOD_SEARCH_RADIUS: f64 = 500.0;
pub const CREATURE_SEARCH_RADIUS: f64 = 150.0;

/// Things that happened to or because of a creature during its update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CreatureEvent {
    Born {
        parent: CreatureId,
        child: CreatureId,
        generation: u32,
    },
    Predation {
        predator: CreatureId,
        prey: CreatureId,
        energy_gained: f64,
    },
    Collaboration {
        initiator: CreatureId,
        ally: CreatureId,
    },
    Communication {
        speaker: CreatureId,
        listeners: usize,
    },
    Vocalized {
        speaker: CreatureId,
        word: Word,
        listeners: usize,
    },
    Recovered {
        creature: CreatureId,
        disease: DiseaseId,
    },
    KilledByDisease {
        creature: CreatureId,
        disease: DiseaseId,
    },
}

pub struct Habitat<'a> {
    pub width: f64,
    pub height: f64,
    pub food: &'a mut Vec<FoodItem>,
    /// Every live creature except the one being updated.
    pub others: &'a mut [Creature],
    /// Children born this tick. They join the world after the update loop.
    pub nursery: &'a mut Vec<Creature>,
    pub ids: &'a mut IdSequence,
    pub rng: &'a mut SimRng,
    pub config: &'a SimConfig,
    pub events: &'a mut Vec<CreatureEvent>,
}

impl<'a> Habitat<'a> {
    /// World population as seen by the updating creature, newborns included.
    pub fn population(&self) -> usize {
        self.others.len() + 1 + self.nursery.len()
    }

    /// Indices into `others` strictly closer than `radius`.
    pub fn creatures_near(&self, at: Position, radius: f64) -> Vec<usize> {
        creatures_within(self.others, at, radius)
    }

    /// Indices into `food` strictly closer than `radius`.
    pub fn food_near(&self, at: Position, radius: f64) -> Vec<usize> {
        food_within(self.food, at, radius)
    }

    /// Nearest food within the search radius, sampling when food is plentiful.
    pub fn nearest_food(&mut self, at: Position) -> Option<Position> {
        let limit = FOOD_SEARCH_RADIUS * FOOD_SEARCH_RADIUS;
        let food = &*self.food;
        nearest_sampled(food.len(), FOOD_SAMPLE, self.rng, |i| food[i].position, at, limit)
    }

    /// Nearest other creature within the search radius, sampling in crowds.
    pub fn nearest_creature(&mut self, at: Position) -> Option<Position> {
        let limit = CREATURE_SEARCH_RADIUS * CREATURE_SEARCH_RADIUS;
        let others = &*self.others;
        nearest_sampled(others.len(), CREATURE_SAMPLE, self.rng, |i| others[i].position, at, limit)
    }
}

pub fn creatures_within(creatures: &[Creature], at: Position, radius: f64) -> Vec<usize> {
    let r2 = radius * radius;
    creatures
        .iter()
        .enumerate()
        .filter(|(_, c)| c.position.distance_squared(&at) < r2)
        .map(|(i, _)| i)
        .collect()
}

pub fn food_within(food: &[FoodItem], at: Position, radius: f64) -> Vec<usize> {
    let r2 = radius * radius;
    food.iter()
        .enumerate()
        .filter(|(_, f)| f.position.distance_squared(&at) < r2)
        .map(|(i, _)| i)
        .collect()
}

fn nearest_sampled(
    len: usize,
    sample: usize,
    rng: &mut SimRng,
    position_of: impl Fn(usize) -> Position,
    at: Position,
    limit_squared: f64,
) -> Option<Position> {
    let candidates: Vec<usize> = if len > sample {
        index::sample(rng, len, sample).into_vec()
    } else {
        (0..len).collect()
    };

    let mut best: Option<(f64, Position)> = None;
    for i in candidates {
        let p = position_of(i);
        let d = p.distance_squared(&at);
        if d < limit_squared && best.map_or(true, |(bd, _)| d < bd) {
            best = Some((d, p));
        }
    }
    best.map(|(_, p)| p)
}
