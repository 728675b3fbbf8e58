//! Creatures and their per-tick behaviour.
//!
//! A creature blends a hard-wired food-seeking instinct with the output of
//! its neural controller. The blend shifts toward the network as complexity
//! grows. Everything a creature does to the rest of the world goes through
//! the [`Habitat`] the world lends it for the duration of its update.

use crate::genome::Genome;
use crate::habitat::{CreatureEvent, Habitat};
use crate::infection::Infection;
use crate::neural::{NetworkShape, NeuralController};
use crate::vocal::VocalSystem;
use digilife_core::config::SimConfig;
use digilife_core::types::{CreatureId, DeathCause, IdSequence, Phase, Position, Topology};
use rand::Rng;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::f64::consts::TAU;
use std::hash::{Hash, Hasher};

/// Distance from the border at which steering is pushed back inward.
const EDGE_MARGIN: f64 = 80.0;
const EDGE_PUSH: f64 = 1.5;
/// Largest magnitude of a steering vector.
const MAX_STEER: f64 = 2.0;
const BASE_SPEED: f64 = 100.0;
/// Complexity above which the neural controller contributes to steering.
const NEURAL_COMPLEXITY: f64 = 50.0;
const VOCALIZE_CHANCE: f64 = 0.005;
const CHILD_OFFSET: f64 = 20.0;
/// Food closer than this is "seen".
pub(crate) const FOOD_SIGHT: f64 = 100.0;
pub(crate) const FOOD_REACH: f64 = 150.0;
pub(crate) const CREATURE_SIGHT: f64 = 50.0;
pub(crate) const CROWD_RADIUS: f64 = 100.0;
const AVOIDANCE_RADIUS: f64 = 100.0;

/// Recorded once a creature has made its first kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PredatorStats {
    pub kills: u32,
}

#[derive(Debug, Clone)]
pub struct Creature {
    pub id: CreatureId,
    pub position: Position,
    pub vx: f64,
    pub vy: f64,
    /// Radians, updated whenever the creature moves noticeably.
    pub heading: f64,
    pub energy: f64,
    pub max_energy: f64,
    pub complexity: f64,
    pub vocal_development: f64,
    /// Simulated seconds alive.
    pub age: f64,
    pub generation: u32,
    pub fitness: f64,
    pub genome: Genome,
    pub brain: NeuralController,
    pub vocal: VocalSystem,
    pub infection: Option<Infection>,
    pub predator: Option<PredatorStats>,
    pub cause_of_death: Option<DeathCause>,
    pub size: f64,
    pub food_eaten: u32,
    pub distance_traveled: f64,
}

impl Creature {
    /// A first-generation creature with a random genome and network.
    pub fn new<R: Rng + ?Sized>(id: CreatureId, position: Position, config: &SimConfig, rng: &mut R) -> Self {
        let shape = NetworkShape::from_config(&config.neural);
        Self {
            id,
            position,
            vx: 0.0,
            vy: 0.0,
            heading: rng.random_range(0.0..TAU),
            energy: config.creature.initial_energy,
            max_energy: config.creature.max_energy,
            complexity: 0.0,
            vocal_development: 0.0,
            age: 0.0,
            generation: 0,
            fitness: 0.0,
            genome: Genome::random(rng),
            brain: NeuralController::random(shape, config.neural.memory_decay, rng),
            vocal: VocalSystem::new(
                0.0,
                config.vocal.complexity_threshold,
                config.vocal.association_threshold,
            ),
            infection: None,
            predator: None,
            cause_of_death: None,
            size: config.creature.size_base,
            food_eaten: 0,
            distance_traveled: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_complexity(self.complexity)
    }

    pub fn energy_ratio(&self) -> f64 {
        if self.max_energy > 0.0 {
            self.energy / self.max_energy
        } else {
            0.0
        }
    }

    pub fn is_dead(&self) -> bool {
        self.energy <= 0.0
    }

    pub fn is_predator(&self) -> bool {
        self.predator.is_some()
    }

    pub fn kills(&self) -> u32 {
        self.predator.map_or(0, |p| p.kills)
    }

    pub fn is_infected(&self) -> bool {
        self.infection.is_some()
    }

    /// Whether the neural controller contributes to steering.
    pub fn uses_network(&self) -> bool {
        self.complexity > NEURAL_COMPLEXITY
    }

    pub fn can_vocalize(&self, config: &SimConfig) -> bool {
        self.complexity >= config.vocal.complexity_threshold
            && self.vocal_development >= config.vocal.development_requirement
    }

    pub fn can_reproduce(&self, population: usize, config: &SimConfig) -> bool {
        self.energy >= config.creature.reproduction_threshold
            && self.age > self.phase().min_reproduction_age()
            && population < config.world.max_population
    }

    /// Bucket used for species counting: instruction multiset plus complexity bracket.
    pub fn species_id(&self) -> u64 {
        let mut sorted = self.genome.instructions.clone();
        sorted.sort();
        let mut hasher = DefaultHasher::new();
        sorted.hash(&mut hasher);
        ((self.complexity / 100.0).floor() as i64).hash(&mut hasher);
        hasher.finish()
    }

    /// 70% instruction-set overlap, 30% closeness in complexity.
    pub fn genetic_similarity(&self, other: &Creature) -> f64 {
        if self.genome.is_empty() || other.genome.is_empty() {
            return 0.0;
        }
        let closeness = 1.0 - ((self.complexity - other.complexity).abs() / 500.0).min(1.0);
        self.genome.jaccard(&other.genome) * 0.7 + closeness * 0.3
    }

    /// Full update: metabolism, neural decision, then everything else.
    pub fn update(&mut self, dt: f64, h: &mut Habitat<'_>) {
        self.age += dt;
        self.metabolise(dt, h.config);
        self.think(h);
        self.live(dt, h);
    }

    /// Steer using network outputs computed elsewhere.
    pub fn apply_decision(&mut self, outputs: &[f32], h: &mut Habitat<'_>) {
        let neural = self.neural_vector(outputs);
        self.steer(neural, h);
    }

    /// Everything in [`update`](Self::update) except the neural decision.
    pub fn update_non_neural(&mut self, dt: f64, h: &mut Habitat<'_>) {
        self.age += dt;
        self.metabolise(dt, h.config);
        self.live(dt, h);
    }

    /// The eight sensor readings fed to the controller.
    pub fn sensor_inputs(&self, h: &mut Habitat<'_>) -> Vec<f32> {
        let ratio = self.energy_ratio();
        let mut inputs = Vec::with_capacity(8);
        inputs.push(ratio);

        match h.nearest_food(self.position) {
            Some(food) => {
                let (dx, dy) = (food.x - self.position.x, food.y - self.position.y);
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 0.0 {
                    let intensity = (1.0 - dist / 500.0).max(0.3);
                    inputs.push(dx / dist * intensity);
                    inputs.push(dy / dist * intensity);
                } else {
                    inputs.push(1.0);
                    inputs.push(1.0);
                }
            }
            None => {
                inputs.push(h.rng.random_range(-0.2..0.2));
                inputs.push(h.rng.random_range(-0.2..0.2));
            }
        }

        let avoid = h.nearest_creature(self.position).and_then(|other| {
            let (dx, dy) = (other.x - self.position.x, other.y - self.position.y);
            let dist = (dx * dx + dy * dy).sqrt();
            (dist > 0.0 && dist < AVOIDANCE_RADIUS).then(|| (-dx / dist * 0.5, -dy / dist * 0.5))
        });
        let (ax, ay) = avoid.unwrap_or((0.0, 0.0));
        inputs.push(ax);
        inputs.push(ay);

        inputs.push((self.complexity / 1000.0).min(1.0));
        inputs.push(((1.0 - ratio) * 1.5).min(1.0));
        inputs.push(1.0);

        inputs.into_iter().map(|v| v as f32).collect()
    }

    fn metabolise(&mut self, dt: f64, config: &SimConfig) {
        let base = config.creature.energy_cost_per_cycle * dt;
        let upkeep = self.complexity / 100.0 * dt;
        self.energy -= (base + upkeep) * self.phase().efficiency();
    }

    fn think(&mut self, h: &mut Habitat<'_>) {
        let neural = if self.uses_network() {
            let inputs = self.sensor_inputs(h);
            let outputs = self.brain.forward(&inputs);
            self.neural_vector(&outputs)
        } else {
            (0.0, 0.0)
        };
        self.steer(neural, h);
    }

    /// Outputs are read as up, down, left, right.
    fn neural_vector(&self, outputs: &[f32]) -> (f64, f64) {
        if !self.uses_network() || outputs.len() < 4 {
            return (0.0, 0.0);
        }
        let x = (outputs[3] - outputs[2]) as f64;
        let y = (outputs[0] - outputs[1]) as f64;
        (x, y)
    }

    fn instinct(&self, h: &mut Habitat<'_>) -> (f64, f64) {
        match h.nearest_food(self.position) {
            Some(food) => {
                let (dx, dy) = (food.x - self.position.x, food.y - self.position.y);
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 0.0 {
                    let urgency = 1.0 - self.energy_ratio();
                    (dx / dist * urgency, dy / dist * urgency)
                } else {
                    (0.0, 0.0)
                }
            }
            None => (h.rng.random_range(-0.5..0.5), h.rng.random_range(-0.5..0.5)),
        }
    }

    fn steer(&mut self, neural: (f64, f64), h: &mut Habitat<'_>) {
        let strength = (0.8 - self.complexity / 1000.0).max(0.2);
        let (ix, iy) = self.instinct(h);
        let mx = ix * strength + neural.0 * (1.0 - strength);
        let my = iy * strength + neural.1 * (1.0 - strength);
        self.apply_movement(mx, my, h.width, h.height);
    }

    fn apply_movement(&mut self, mut mx: f64, mut my: f64, width: f64, height: f64) {
        if self.position.x < EDGE_MARGIN {
            mx += EDGE_PUSH;
        } else if self.position.x > width - EDGE_MARGIN {
            mx -= EDGE_PUSH;
        }
        if self.position.y < EDGE_MARGIN {
            my += EDGE_PUSH;
        } else if self.position.y > height - EDGE_MARGIN {
            my -= EDGE_PUSH;
        }

        let magnitude = (mx * mx + my * my).sqrt();
        if magnitude > MAX_STEER {
            mx = mx / magnitude * MAX_STEER;
            my = my / magnitude * MAX_STEER;
        }

        let speed = BASE_SPEED * self.phase().speed_multiplier();
        self.vx = mx * speed;
        self.vy = my * speed;
    }

    fn live(&mut self, dt: f64, h: &mut Habitat<'_>) {
        self.integrate(dt, h);
        self.seek_food(h);

        if periodic(self.age, 10.0, dt) && self.can_reproduce(h.population(), h.config) {
            self.reproduce(h);
        }

        if h.config.vocal.audio_enabled
            && self.can_vocalize(h.config)
            && h.rng.random::<f64>() < VOCALIZE_CHANCE
        {
            self.vocalize(h);
        }

        if periodic(self.age, 5.0, dt) {
            self.refresh_appearance(h.config);
        }

        if self.advance_infection(dt, h) {
            if periodic(self.age, 20.0, dt) {
                self.try_predation(h);
            }
            if periodic(self.age, 15.0, dt) {
                self.try_collaboration(dt, h);
            }
            if periodic(self.age, 10.0, dt) {
                self.try_communication(dt, h);
            }
        }

        self.energy = self.energy.clamp(0.0, self.max_energy);
    }

    fn integrate(&mut self, dt: f64, h: &mut Habitat<'_>) {
        let old = self.position;
        self.position.x += self.vx * dt;
        self.position.y += self.vy * dt;
        self.distance_traveled += old.distance_to(&self.position);

        if self.vx.abs() > 0.1 || self.vy.abs() > 0.1 {
            self.heading = self.vy.atan2(self.vx);
        }

        if let Some(food) = h.nearest_food(self.position) {
            if self.position.distance_squared(&food) < old.distance_squared(&food) {
                self.fitness += 0.1;
            }
        }

        match h.config.world.topology {
            Topology::Bounded => {
                let margin = self.size * 2.0;
                if self.position.x < margin {
                    self.position.x = margin;
                    self.vx = self.vx.abs() * 0.5;
                    self.fitness -= 1.0;
                } else if self.position.x > h.width - margin {
                    self.position.x = h.width - margin;
                    self.vx = -self.vx.abs() * 0.5;
                    self.fitness -= 1.0;
                }
                if self.position.y < margin {
                    self.position.y = margin;
                    self.vy = self.vy.abs() * 0.5;
                    self.fitness -= 1.0;
                } else if self.position.y > h.height - margin {
                    self.position.y = h.height - margin;
                    self.vy = -self.vy.abs() * 0.5;
                    self.fitness -= 1.0;
                }
            }
            Topology::Toroidal => {
                self.position.x = self.position.x.rem_euclid(h.width);
                self.position.y = self.position.y.rem_euclid(h.height);
            }
        }
    }

    /// Eat at most one item within reach.
    fn seek_food(&mut self, h: &mut Habitat<'_>) {
        let reach = self.size * self.size;
        let Some(i) = h
            .food
            .iter()
            .position(|f| f.position.distance_squared(&self.position) < reach)
        else {
            return;
        };
        let nutrition = h.food.swap_remove(i).nutrition();
        self.energy = (self.energy + nutrition.energy).min(self.max_energy);
        self.complexity += nutrition.complexity;
        self.vocal_development += nutrition.vocal;
        self.fitness += 10.0;
        self.food_eaten += 1;
    }

    fn reproduce(&mut self, h: &mut Habitat<'_>) {
        let child = self.give_birth(h.ids, h.rng, h.config);
        h.events.push(CreatureEvent::Born {
            parent: self.id,
            child: child.id,
            generation: child.generation,
        });
        h.nursery.push(child);
    }

    /// Pay the reproduction cost and return a mutated child.
    ///
    /// The child starts at the standard initial energy, inherits 70% of the
    /// parent's complexity and half its vocal development, and a fitness of
    /// 20% of the parent's plus two points per generation.
    pub fn give_birth<R: Rng + ?Sized>(&mut self, ids: &mut IdSequence, rng: &mut R, config: &SimConfig) -> Creature {
        self.energy -= config.creature.reproduction_cost;
        self.fitness += 20.0;

        let position = Position::new(
            self.position.x + rng.random_range(-CHILD_OFFSET..CHILD_OFFSET),
            self.position.y + rng.random_range(-CHILD_OFFSET..CHILD_OFFSET),
        );
        let generation = self.generation + 1;
        let complexity = self.complexity * 0.7;
        let genome = self.genome.mutate(self.complexity, config.creature.mutation_rate, rng);
        if config.debug.log_mutations && genome != self.genome {
            tracing::info!(
                parent = %self.id,
                from = self.genome.len(),
                to = genome.len(),
                "genome mutated"
            );
        }

        Creature {
            id: ids.next_id(),
            position,
            vx: 0.0,
            vy: 0.0,
            heading: rng.random_range(0.0..TAU),
            energy: config.creature.initial_energy,
            max_energy: self.max_energy,
            complexity,
            vocal_development: self.vocal_development * 0.5,
            age: 0.0,
            generation,
            fitness: self.fitness * 0.2 + generation as f64 * 2.0,
            genome,
            brain: NeuralController::inherit(
                &self.brain,
                config.neural.inherit_mutation_rate,
                config.neural.inherit_mutation_strength,
                rng,
            ),
            vocal: VocalSystem::new(
                complexity,
                config.vocal.complexity_threshold,
                config.vocal.association_threshold,
            ),
            infection: None,
            predator: None,
            cause_of_death: None,
            size: config.creature.size_base,
            food_eaten: 0,
            distance_traveled: 0.0,
        }
    }

    fn refresh_appearance(&mut self, config: &SimConfig) {
        let range = config.creature.size_max - config.creature.size_base;
        self.size = config.creature.size_base + range * (self.complexity / 1000.0).min(1.0);
    }

    /// Returns false if the infection killed the creature this tick.
    fn advance_infection(&mut self, dt: f64, h: &mut Habitat<'_>) -> bool {
        let Some(infection) = self.infection.as_mut() else {
            return true;
        };
        let disease = infection.disease();
        let tick = infection.advance(dt, h.rng);

        self.energy -= tick.energy_loss;
        self.complexity = (self.complexity - tick.complexity_loss).max(0.0);

        if tick.lethal {
            self.energy = 0.0;
            self.cause_of_death = Some(DeathCause::Disease);
            h.events.push(CreatureEvent::KilledByDisease { creature: self.id, disease });
            return false;
        }
        if tick.expired {
            self.infection = None;
            h.events.push(CreatureEvent::Recovered { creature: self.id, disease });
        }
        true
    }
}

/// True on roughly one tick per `period` seconds of age.
fn periodic(age: f64, period: f64, dt: f64) -> bool {
    age % period < dt
}
