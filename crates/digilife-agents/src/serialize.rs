//! Creature records for session persistence.
//!
//! A record keeps the scalar state and the genome. Neural weights,
//! vocabularies and infections are not stored: a loaded creature gets a
//! fresh random controller, as if it had no parent.

use crate::creature::Creature;
use crate::genome::Genome;
use crate::vocal::VocalSystem;
use digilife_core::config::SimConfig;
use digilife_core::types::{CreatureId, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub id: CreatureId,
    pub x: f64,
    pub y: f64,
    pub energy: f64,
    pub complexity: f64,
    pub vocal_development: f64,
    pub age: f64,
    pub generation: u32,
    pub genome: Genome,
}

impl Creature {
    pub fn to_record(&self) -> CreatureRecord {
        CreatureRecord {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            energy: self.energy,
            complexity: self.complexity,
            vocal_development: self.vocal_development,
            age: self.age,
            generation: self.generation,
            genome: self.genome.clone(),
        }
    }

    /// Rebuild a creature from a record. The neural controller is freshly randomised.
    pub fn from_record<R: Rng + ?Sized>(record: &CreatureRecord, config: &SimConfig, rng: &mut R) -> Creature {
        let mut creature = Creature::new(record.id, Position::new(record.x, record.y), config, rng);
        creature.energy = record.energy.clamp(0.0, creature.max_energy);
        creature.complexity = record.complexity;
        creature.vocal_development = record.vocal_development;
        creature.age = record.age;
        creature.generation = record.generation;
        creature.genome = record.genome.clone();
        creature.vocal = VocalSystem::new(
            record.complexity,
            config.vocal.complexity_threshold,
            config.vocal.association_threshold,
        );
        let range = config.creature.size_max - config.creature.size_base;
        creature.size = config.creature.size_base + range * (record.complexity / 1000.0).min(1.0);
        creature
    }
}
