//! The world: owner of every creature, food item and subsystem.
//!
//! One call to [`World::tick`] advances the simulation by one step. The
//! order inside a tick is fixed:
//!
//! 1. food spawns
//! 2. the disease timer advances and may start an outbreak
//! 3. creatures update, batched groups first and then the rest, each one
//!    seeing the mutations made by the creatures updated before it
//! 4. dead creatures leave and newborns join
//! 5. periodic species counting and selection pressure
//! 6. the hard population cap
//!
//! Every event produced along the way is returned to the caller and handed
//! to the injected [`EventSink`].

use crate::batch::BatchEvaluator;
use crate::disease::{DiseaseSystem, EpidemicReport};
use crate::evolution::{self, CullReason, PopulationController, PredatorSummary};
use crate::sink::EventSink;
use crate::workers::WorkerPool;
use digilife_agents::creature::Creature;
use digilife_agents::fitness::{lifetime_score, FitnessStats};
use digilife_agents::habitat::{self, CreatureEvent, Habitat};
use digilife_agents::neural::NeuralController;
use digilife_agents::spawn::FoodSpawnPolicy;
use digilife_core::config::SimConfig;
use digilife_core::types::{
    CreatureId, DeathCause, DiseaseId, FoodItem, IdSequence, Position, SimRng, Tick,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Population above which radius queries are split across the worker pool.
const PARALLEL_SCAN_THRESHOLD: usize = 256;
/// Creatures are placed at least this far from the edges on population.
const SPAWN_MARGIN: f64 = 50.0;
/// Fitness deducted once from a creature that dies, for the death record.
pub const DEATH_FITNESS_PENALTY: f64 = 50.0;

/// Events emitted by [`World::tick`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WorldEvent {
    /// Something a creature did or suffered during its own update.
    Creature(CreatureEvent),
    /// A creature was removed after its energy ran out. `fitness` is its
    /// final score, death penalty included.
    Died {
        id: CreatureId,
        age: f64,
        generation: u32,
        fitness: f64,
        cause: DeathCause,
    },
    /// A creature was removed by selection pressure or the hard cap.
    Culled { id: CreatureId, reason: CullReason },
    Outbreak {
        disease: DiseaseId,
        name: String,
        symptoms: Vec<String>,
        patient_zero: CreatureId,
        contagion_rate: f64,
        lethality: f64,
    },
    Eradicated {
        disease: DiseaseId,
        name: String,
        total_infected: usize,
        deaths: usize,
    },
    /// The batch backend failed and this tick's affected batches ran per creature.
    BackendFallback { backend: &'static str, reason: String },
}

/// Running totals kept across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldCounters {
    pub total_births: u64,
    pub total_deaths: u64,
    pub species_count: usize,
    pub predation_kills: u64,
    pub active_predators: usize,
}

/// How the creatures of one tick are split between batched and
/// per-creature evaluation. Indices are ascending within each group.
#[derive(Debug, Default, PartialEq)]
struct UpdatePlan {
    batched: Vec<Vec<usize>>,
    sequential: Vec<usize>,
}

pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) tick: Tick,
    pub(crate) ids: IdSequence,
    pub(crate) rng: SimRng,
    pub(crate) creatures: Vec<Creature>,
    pub(crate) food: Vec<FoodItem>,
    nursery: Vec<Creature>,
    pending: Vec<CreatureEvent>,
    pub(crate) counters: WorldCounters,
    selected: Option<CreatureId>,
    pub(crate) spawner: Box<dyn FoodSpawnPolicy>,
    pub(crate) diseases: DiseaseSystem,
    population: PopulationController,
    evaluator: BatchEvaluator,
    workers: Option<WorkerPool>,
    sink: Box<dyn EventSink>,
}

impl World {
    /// Assemble a world from already-validated parts. Use
    /// [`WorldBuilder`](crate::world_builder::WorldBuilder) instead.
    pub(crate) fn from_parts(
        config: SimConfig,
        mut rng: SimRng,
        spawner: Box<dyn FoodSpawnPolicy>,
        evaluator: BatchEvaluator,
        workers: Option<WorkerPool>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        let diseases = DiseaseSystem::new(config.disease.clone(), &mut rng);
        let population =
            PopulationController::new(config.population.clone(), config.world.max_population);
        Self {
            width: config.world.width,
            height: config.world.height,
            tick: 0,
            ids: IdSequence::new(),
            rng,
            creatures: Vec::new(),
            food: Vec::new(),
            nursery: Vec::new(),
            pending: Vec::new(),
            counters: WorldCounters::default(),
            selected: None,
            spawner,
            diseases,
            population,
            evaluator,
            workers,
            sink,
            config,
        }
    }

    /// Place `count` fresh creatures uniformly inside the spawn margin.
    pub fn populate(&mut self, count: usize) {
        let (min_x, max_x) = spawn_range(self.width);
        let (min_y, max_y) = spawn_range(self.height);
        for _ in 0..count {
            let position = Position::new(
                self.rng.random_range(min_x..=max_x),
                self.rng.random_range(min_y..=max_y),
            );
            let id = self.ids.next_id();
            let creature = Creature::new(id, position, &self.config, &mut self.rng);
            self.creatures.push(creature);
            self.counters.total_births += 1;
        }
        tracing::debug!(count, population = self.creatures.len(), "populated world");
    }

    /// Advance the simulation by one step of `dt` (scaled by the speed multiplier).
    pub fn tick(&mut self, dt: f64) -> Vec<WorldEvent> {
        let dt = dt * self.config.world.speed_multiplier;
        self.tick += 1;
        let mut events = Vec::new();

        // Phase 1: Food
        let spawned = self.spawner.spawn(dt, self.width, self.height, &mut self.rng);
        self.food.extend(spawned);

        // Phase 2: Outbreaks
        if let Some(event) = self.diseases.tick(&mut self.creatures, &mut self.rng) {
            events.push(event);
        }

        // Phase 3: Creatures
        let plan = self.plan_updates();
        for group in &plan.batched {
            self.update_batched(group, dt, &mut events);
        }
        for &i in &plan.sequential {
            self.update_one(i, dt, &mut events);
        }
        if let Some(err) = self.evaluator.take_fallback() {
            events.push(WorldEvent::BackendFallback {
                backend: self.evaluator.backend_name(),
                reason: err.to_string(),
            });
        }

        // Phase 4: Deaths and births
        self.remove_dead(&mut events);
        let born = self.nursery.len();
        self.counters.total_births += born as u64;
        self.creatures.append(&mut self.nursery);

        // Phase 5: Periodic bookkeeping
        let species_every = self.config.population.species_interval;
        let pressure_every = self.config.population.pressure_interval;
        if species_every > 0 && self.tick % species_every == 0 {
            self.counters.species_count = evolution::species_count(&self.creatures);
            self.counters.active_predators = evolution::active_predators(
                &self.creatures,
                self.config.social.predation_complexity,
            );
        }
        if pressure_every > 0 && self.tick % pressure_every == 0 {
            let culled = self.population.apply_selection_pressure(&mut self.creatures);
            self.bury(culled, CullReason::SelectionPressure, &mut events);
        }

        // Phase 6: Hard cap
        let culled = self.population.enforce_cap(&mut self.creatures);
        self.bury(culled, CullReason::PopulationCap, &mut events);

        for event in &events {
            self.sink.record(self.tick, event);
        }
        events
    }

    /// Run `ticks` steps and return the events of each.
    pub fn run(&mut self, ticks: u64, dt: f64) -> Vec<Vec<WorldEvent>> {
        (0..ticks).map(|_| self.tick(dt)).collect()
    }

    fn plan_updates(&self) -> UpdatePlan {
        let neural = &self.config.neural;
        let all: Vec<usize> = (0..self.creatures.len()).collect();

        if !neural.use_batching {
            return UpdatePlan {
                batched: Vec::new(),
                sequential: all,
            };
        }

        if neural.priority_complex {
            let (complex, simple): (Vec<usize>, Vec<usize>) = all
                .into_iter()
                .partition(|&i| self.creatures[i].complexity >= neural.complex_threshold);
            let mut plan = UpdatePlan::default();
            if !complex.is_empty() {
                plan.batched.push(complex);
            }
            if simple.len() >= neural.batch_threshold {
                plan.batched.push(simple);
            } else {
                plan.sequential = simple;
            }
            plan
        } else if all.len() >= neural.batch_threshold {
            UpdatePlan {
                batched: vec![all],
                sequential: Vec::new(),
            }
        } else {
            UpdatePlan {
                batched: Vec::new(),
                sequential: all,
            }
        }
    }

    /// Lend creature `i` a habitat made of everything else in the world.
    fn with_habitat<T>(
        &mut self,
        i: usize,
        f: impl FnOnce(&mut Creature, &mut Habitat<'_>) -> T,
    ) -> T {
        let mut creature = self.creatures.swap_remove(i);
        let result = {
            let mut h = Habitat {
                width: self.width,
                height: self.height,
                food: &mut self.food,
                others: &mut self.creatures[..],
                nursery: &mut self.nursery,
                ids: &mut self.ids,
                rng: &mut self.rng,
                config: &self.config,
                events: &mut self.pending,
            };
            f(&mut creature, &mut h)
        };
        self.creatures.push(creature);
        let last = self.creatures.len() - 1;
        self.creatures.swap(i, last);
        result
    }

    fn update_one(&mut self, i: usize, dt: f64, events: &mut Vec<WorldEvent>) {
        // Killed earlier this tick; it is removed in phase 4.
        if self.creatures[i].is_dead() {
            return;
        }
        self.with_habitat(i, |c, h| c.update(dt, h));
        self.after_update(i, events);
    }

    fn update_batched(&mut self, group: &[usize], dt: f64, events: &mut Vec<WorldEvent>) {
        for chunk in group.chunks(self.config.neural.batch_size.max(1)) {
            let mut members = Vec::with_capacity(chunk.len());
            let mut inputs = Vec::with_capacity(chunk.len());
            for &i in chunk {
                let c = &self.creatures[i];
                if c.is_dead() || !c.uses_network() {
                    continue;
                }
                let sensed = self.with_habitat(i, |c, h| c.sensor_inputs(h));
                members.push(i);
                inputs.push(sensed);
            }

            let outputs = {
                let mut brains: Vec<&mut NeuralController> = self
                    .creatures
                    .iter_mut()
                    .enumerate()
                    .filter(|(i, _)| members.binary_search(i).is_ok())
                    .map(|(_, c)| &mut c.brain)
                    .collect();
                self.evaluator.evaluate(&mut brains, &inputs)
            };

            for &i in chunk {
                if self.creatures[i].is_dead() {
                    continue;
                }
                let decision = members
                    .binary_search(&i)
                    .ok()
                    .and_then(|k| outputs.get(k))
                    .cloned()
                    .unwrap_or_default();
                self.with_habitat(i, |c, h| {
                    c.apply_decision(&decision, h);
                    c.update_non_neural(dt, h);
                });
                self.after_update(i, events);
            }
        }
    }

    /// Route the creature's own events and let its infection spread.
    fn after_update(&mut self, i: usize, events: &mut Vec<WorldEvent>) {
        for event in std::mem::take(&mut self.pending) {
            let follow_up = match &event {
                CreatureEvent::Recovered { disease, .. } => self.diseases.release(*disease),
                CreatureEvent::KilledByDisease { disease, .. } => {
                    self.diseases.record_death(*disease);
                    None
                }
                CreatureEvent::Predation { .. } => {
                    self.counters.predation_kills += 1;
                    None
                }
                _ => None,
            };
            events.push(WorldEvent::Creature(event));
            events.extend(follow_up);
        }

        let creature = &self.creatures[i];
        if self.diseases.is_enabled() && creature.is_infected() && !creature.is_dead() {
            self.diseases.try_spread(i, &mut self.creatures, &mut self.rng);
        }
    }

    fn remove_dead(&mut self, events: &mut Vec<WorldEvent>) {
        if !self.creatures.iter().any(Creature::is_dead) {
            return;
        }
        let (dead, alive): (Vec<Creature>, Vec<Creature>) =
            std::mem::take(&mut self.creatures).into_iter().partition(Creature::is_dead);
        self.creatures = alive;

        for mut creature in dead {
            creature.fitness -= DEATH_FITNESS_PENALTY;
            self.counters.total_deaths += 1;
            self.forget(&creature, events);
            events.push(WorldEvent::Died {
                id: creature.id,
                age: creature.age,
                generation: creature.generation,
                fitness: creature.fitness,
                cause: creature.cause_of_death.unwrap_or(DeathCause::Starvation),
            });
        }
    }

    fn bury(&mut self, culled: Vec<Creature>, reason: CullReason, events: &mut Vec<WorldEvent>) {
        if !culled.is_empty() {
            tracing::debug!(count = culled.len(), ?reason, population = self.creatures.len(), "culled creatures");
        }
        for creature in culled {
            self.counters.total_deaths += 1;
            self.forget(&creature, events);
            events.push(WorldEvent::Culled {
                id: creature.id,
                reason,
            });
        }
    }

    /// Drop every reference the world keeps to a departing creature.
    fn forget(&mut self, creature: &Creature, events: &mut Vec<WorldEvent>) {
        if let Some(infection) = &creature.infection {
            events.extend(self.diseases.release(infection.disease()));
        }
        if self.selected == Some(creature.id) {
            self.selected = None;
        }
    }

    /// Remove every creature and food item and restart the clock.
    ///
    /// Identifiers keep counting so ids stay unique for the world's lifetime.
    pub fn reset(&mut self) {
        self.creatures.clear();
        self.food.clear();
        self.nursery.clear();
        self.pending.clear();
        self.selected = None;
        self.tick = 0;
        self.counters = WorldCounters::default();
        self.diseases.reset(&mut self.rng);
        tracing::info!("world reset");
    }

    /// Select the first creature whose body covers `at`.
    pub fn select_creature_at(&mut self, at: Position) -> Option<CreatureId> {
        self.selected = self
            .creatures
            .iter()
            .find(|c| c.position.distance_to(&at) < c.size)
            .map(|c| c.id);
        self.selected
    }

    pub fn selected(&self) -> Option<&Creature> {
        let id = self.selected?;
        self.creature(id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.id == id)
    }

    /// Creatures strictly closer than `radius` to `at`.
    pub fn creatures_near(&self, at: Position, radius: f64) -> Vec<&Creature> {
        let indices = match &self.workers {
            Some(pool) if self.creatures.len() > PARALLEL_SCAN_THRESHOLD => {
                pool.distance_filter(&self.creatures, at, radius)
            }
            _ => habitat::creatures_within(&self.creatures, at, radius),
        };
        indices.into_iter().map(|i| &self.creatures[i]).collect()
    }

    /// Food items strictly closer than `radius` to `at`.
    pub fn food_near(&self, at: Position, radius: f64) -> Vec<&FoodItem> {
        habitat::food_within(&self.food, at, radius)
            .into_iter()
            .map(|i| &self.food[i])
            .collect()
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        self.config.world.speed_multiplier = multiplier.max(0.0);
    }

    pub fn set_food_spawn_rate(&mut self, rate: f64) {
        let rate = rate.max(0.0);
        self.config.world.food_spawn_rate = rate;
        self.spawner.set_rate(rate);
    }

    pub fn set_max_population(&mut self, max: usize) {
        let max = max.max(1);
        self.config.world.max_population = max;
        self.population.set_max_population(max);
    }

    /// Flip the audio toggle that gates vocalization.
    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.config.vocal.audio_enabled = enabled;
    }

    pub fn add_food(&mut self, item: FoodItem) {
        self.food.push(item);
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    /// Direct access for tools and tests. Changes apply from the next tick.
    pub fn creatures_mut(&mut self) -> &mut [Creature] {
        &mut self.creatures
    }

    pub fn food(&self) -> &[FoodItem] {
        &self.food
    }

    pub fn population(&self) -> usize {
        self.creatures.len()
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn counters(&self) -> WorldCounters {
        self.counters
    }

    pub fn diseases(&self) -> &DiseaseSystem {
        &self.diseases
    }

    pub fn backend_name(&self) -> &'static str {
        self.evaluator.backend_name()
    }

    /// Number of batch evaluations that fell back to per-creature forwards.
    pub fn backend_failures(&self) -> u64 {
        self.evaluator.failures()
    }

    pub fn max_complexity(&self) -> f64 {
        self.creatures.iter().map(|c| c.complexity).fold(0.0, f64::max)
    }

    pub fn vocal_creatures(&self) -> usize {
        self.creatures
            .iter()
            .filter(|c| c.can_vocalize(&self.config))
            .count()
    }

    pub fn infected_count(&self) -> usize {
        self.creatures.iter().filter(|c| c.is_infected()).count()
    }

    pub fn top_predators(&self, limit: usize) -> Vec<PredatorSummary> {
        evolution::top_predators(&self.creatures, limit)
    }

    pub fn active_epidemics(&self) -> Vec<EpidemicReport> {
        self.diseases.active_epidemics()
    }

    pub fn fitness_stats(&self) -> FitnessStats {
        evolution::fitness_stats(&self.creatures)
    }

    /// Every creature's lifetime score, best first.
    pub fn lifetime_scores(&self) -> Vec<(CreatureId, f64)> {
        if let Some(pool) = &self.workers {
            return pool.score_fitness(&self.creatures);
        }
        let mut scores: Vec<(CreatureId, f64)> = self
            .creatures
            .iter()
            .map(|c| (c.id, lifetime_score(c)))
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores
    }

    /// Replace the world's contents with restored state. The subsystems
    /// keep their configuration; outbreaks start over.
    pub(crate) fn replace_contents(
        &mut self,
        (width, height): (f64, f64),
        tick: Tick,
        counters: WorldCounters,
        creatures: Vec<Creature>,
        food: Vec<FoodItem>,
    ) {
        self.reset();
        self.width = width;
        self.height = height;
        self.config.world.width = width;
        self.config.world.height = height;
        self.tick = tick;
        self.counters = counters;
        for creature in &creatures {
            self.ids.observe(creature.id);
        }
        self.creatures = creatures;
        self.food = food;
    }
}

fn spawn_range(extent: f64) -> (f64, f64) {
    if extent > 2.0 * SPAWN_MARGIN {
        (SPAWN_MARGIN, extent - SPAWN_MARGIN)
    } else {
        (0.0, extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world_builder::WorldBuilder;
    use digilife_agents::spawn::NoFoodPolicy;

    fn quiet_config(population: usize) -> SimConfig {
        let mut config = SimConfig::default();
        config.world.initial_population = population;
        config.world.seed = Some(7);
        config.disease.enabled = false;
        config
    }

    #[test]
    fn populate_places_creatures_inside_margin() {
        let world = WorldBuilder::new()
            .with_config(quiet_config(40))
            .build()
            .unwrap();
        assert_eq!(world.population(), 40);
        for c in world.creatures() {
            assert!(c.position.x >= SPAWN_MARGIN && c.position.x <= world.width() - SPAWN_MARGIN);
            assert!(c.position.y >= SPAWN_MARGIN && c.position.y <= world.height() - SPAWN_MARGIN);
        }
        assert_eq!(world.counters().total_births, 40);
    }

    #[test]
    fn tick_advances_clock() {
        let mut world = WorldBuilder::new()
            .with_config(quiet_config(5))
            .build()
            .unwrap();
        world.tick(1.0);
        world.tick(1.0);
        assert_eq!(world.current_tick(), 2);
    }

    #[test]
    fn batching_plan_partitions_by_complexity() {
        let mut config = quiet_config(30);
        config.neural.priority_complex = true;
        config.neural.batch_threshold = 50;
        config.neural.complex_threshold = 100.0;
        let mut world = WorldBuilder::new().with_config(config).build().unwrap();
        for c in world.creatures.iter_mut().take(4) {
            c.complexity = 150.0;
        }

        let plan = world.plan_updates();
        assert_eq!(plan.batched.len(), 1);
        assert_eq!(plan.batched[0], vec![0, 1, 2, 3]);
        assert_eq!(plan.sequential.len(), 26);
    }

    #[test]
    fn unbatched_plan_is_sequential() {
        let mut config = quiet_config(30);
        config.neural.use_batching = false;
        let world = WorldBuilder::new().with_config(config).build().unwrap();
        let plan = world.plan_updates();
        assert!(plan.batched.is_empty());
        assert_eq!(plan.sequential.len(), 30);
    }

    #[test]
    fn habitat_round_trip_keeps_order() {
        let mut world = WorldBuilder::new()
            .with_config(quiet_config(6))
            .build()
            .unwrap();
        let before: Vec<CreatureId> = world.creatures().iter().map(|c| c.id).collect();
        let seen = world.with_habitat(2, |c, h| (c.id, h.others.len()));
        let after: Vec<CreatureId> = world.creatures().iter().map(|c| c.id).collect();
        assert_eq!(seen, (before[2], 5));
        assert_eq!(before, after);
    }

    #[test]
    fn starving_creatures_are_removed_with_a_death_event() {
        let mut world = WorldBuilder::new()
            .with_config(quiet_config(3))
            .with_spawn_policy(Box::new(NoFoodPolicy))
            .build()
            .unwrap();
        let victim = world.creatures[1].id;
        world.creatures[1].energy = 0.01;

        let events = world.tick(1.0);
        assert!(world.creature(victim).is_none());
        assert!(events.iter().any(|e| matches!(
            e,
            WorldEvent::Died { id, cause: DeathCause::Starvation, .. } if *id == victim
        )));
        assert_eq!(world.counters().total_deaths, 1);
    }

    #[test]
    fn dying_costs_fitness_once() {
        let mut world = WorldBuilder::new()
            .with_config(quiet_config(2))
            .with_spawn_policy(Box::new(NoFoodPolicy))
            .build()
            .unwrap();
        let victim = world.creatures[0].id;
        world.creatures[0].energy = 0.0;
        world.creatures[0].fitness = 12.0;

        let mut events = Vec::new();
        world.remove_dead(&mut events);
        world.remove_dead(&mut events);

        let finals: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                WorldEvent::Died { id, fitness, .. } if *id == victim => Some(*fitness),
                _ => None,
            })
            .collect();
        assert_eq!(finals, vec![12.0 - DEATH_FITNESS_PENALTY]);
        assert_eq!(world.population(), 1);
    }

    #[test]
    fn selection_follows_the_creature_and_clears_on_death() {
        let mut world = WorldBuilder::new()
            .with_config(quiet_config(1))
            .with_spawn_policy(Box::new(NoFoodPolicy))
            .build()
            .unwrap();
        let at = world.creatures[0].position;
        let id = world.select_creature_at(at);
        assert_eq!(id, Some(world.creatures[0].id));
        assert!(world.select_creature_at(Position::new(-500.0, -500.0)).is_none());

        world.select_creature_at(at);
        world.creatures[0].energy = 0.0;
        world.tick(1.0);
        assert!(world.selected().is_none());
    }

    #[test]
    fn reset_keeps_ids_unique() {
        let mut world = WorldBuilder::new()
            .with_config(quiet_config(3))
            .build()
            .unwrap();
        let old_max = world.creatures().iter().map(|c| c.id).max().unwrap();
        world.reset();
        assert_eq!(world.population(), 0);
        assert_eq!(world.current_tick(), 0);
        world.populate(2);
        assert!(world.creatures().iter().all(|c| c.id > old_max));
    }

    #[test]
    fn radius_queries_match_brute_force() {
        let mut world = WorldBuilder::new()
            .with_config(quiet_config(300))
            .with_workers(2)
            .build()
            .unwrap();
        world.add_food(FoodItem::new(
            digilife_core::types::FoodKind::Numeric,
            Position::new(100.0, 100.0),
        ));
        let at = Position::new(600.0, 400.0);
        let expected = world
            .creatures()
            .iter()
            .filter(|c| c.position.distance_to(&at) < 200.0)
            .count();
        assert_eq!(world.creatures_near(at, 200.0).len(), expected);
        assert_eq!(world.food_near(Position::new(100.0, 105.0), 10.0).len(), 1);
    }

    #[test]
    fn lifetime_scores_agree_with_and_without_workers() {
        let sequential = WorldBuilder::new()
            .with_config(quiet_config(20))
            .build()
            .unwrap();
        let pooled = WorldBuilder::new()
            .with_config(quiet_config(20))
            .with_workers(2)
            .build()
            .unwrap();
        let a: Vec<f64> = sequential.lifetime_scores().iter().map(|s| s.1).collect();
        let b: Vec<f64> = pooled.lifetime_scores().iter().map(|s| s.1).collect();
        assert_eq!(a, b);
    }
}
