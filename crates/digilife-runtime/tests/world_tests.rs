//! End-to-end scenarios for the world tick engine.
//!
//! Run with: cargo test -p digilife-runtime --test world_tests
//!
//! Covers:
//! 1. Starvation timing with no food and no neighbours
//! 2. Energy and population bounds over long runs
//! 3. The hard population cap
//! 4. Outbreak scheduling and its population threshold
//! 5. Backend failure fallback
//! 6. Session save and restore

use digilife_runtime::backend::BatchOutput;
use digilife_runtime::batch::PackedBatch;
use digilife_runtime::prelude::*;

fn lonely_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.world.initial_population = 1;
    config.world.max_population = 1;
    config.world.food_spawn_rate = 0.0;
    config.creature.initial_energy = 250.0;
    config.creature.energy_cost_per_cycle = 0.25;
    config.disease.enabled = false;
    config
}

fn quiet_world(config: SimConfig, seed: u64) -> World {
    WorldBuilder::new()
        .with_config(config)
        .with_seed(seed)
        .with_sink(Box::new(NullSink))
        .build()
        .unwrap()
}

#[test]
fn lone_creature_starves_on_schedule() {
    let mut world = WorldBuilder::new()
        .with_config(lonely_config())
        .with_seed(5)
        .with_spawn_policy(Box::new(NoFoodPolicy))
        .with_sink(Box::new(NullSink))
        .build()
        .unwrap();
    let id = world.creatures()[0].id;

    for _ in 0..999 {
        let events = world.tick(1.0);
        assert!(!events.iter().any(|e| matches!(e, WorldEvent::Died { .. })));
    }
    assert_eq!(world.population(), 1);
    assert!((world.creatures()[0].energy - 0.25).abs() < 1e-9);

    let events = world.tick(1.0);
    assert_eq!(world.population(), 0);
    assert!(events.iter().any(|e| matches!(
        e,
        WorldEvent::Died { id: dead, cause: DeathCause::Starvation, .. } if *dead == id
    )));
    assert_eq!(world.current_tick(), 1000);
}

#[test]
fn energy_and_population_stay_bounded() {
    let mut config = SimConfig::default();
    config.world.initial_population = 60;
    config.world.food_spawn_rate = 40.0;
    config.neural.use_gpu = false;
    let mut world = quiet_world(config, 21);
    let hard_limit = world.config().world.max_population + world.config().population.cap_slack;

    for _ in 0..400 {
        world.tick(1.0);
        assert!(world.population() <= hard_limit);
        for c in world.creatures() {
            assert!(c.energy > 0.0 && c.energy <= c.max_energy, "energy {} out of range", c.energy);
        }
    }
}

#[test]
fn overshoot_is_cut_back_to_the_cap() {
    let mut config = SimConfig::default();
    config.world.initial_population = 60;
    config.world.max_population = 20;
    config.disease.enabled = false;
    let sink = MemorySink::new();
    let mut world = WorldBuilder::new()
        .with_config(config)
        .with_seed(8)
        .with_sink(Box::new(sink.clone()))
        .build()
        .unwrap();

    world.tick(1.0);
    assert_eq!(world.population(), 20);
    let culled = sink
        .events()
        .iter()
        .filter(|(_, e)| matches!(e, WorldEvent::Culled { reason: CullReason::PopulationCap, .. }))
        .count();
    assert_eq!(culled, 40);
    assert_eq!(world.counters().total_deaths, 40);
}

fn outbreak_config(population: usize) -> SimConfig {
    let mut config = SimConfig::default();
    config.world.initial_population = population;
    config.disease.interval_min = 5;
    config.disease.interval_max = 5;
    config
}

#[test]
fn outbreak_needs_thirty_creatures() {
    let mut world = quiet_world(outbreak_config(30), 13);
    let mut outbreak = None;
    for _ in 0..5 {
        for event in world.tick(1.0) {
            if let WorldEvent::Outbreak { patient_zero, .. } = event {
                outbreak = Some((world.current_tick(), patient_zero));
            }
        }
    }
    let (tick, patient_zero) = outbreak.expect("no outbreak");
    assert_eq!(tick, 5);
    if let Some(carrier) = world.creature(patient_zero) {
        assert!(carrier.is_infected());
    }
    let diseases = world.diseases().diseases();
    assert_eq!(diseases.len(), 1);
    assert!(diseases[0].total_infected >= 1);

    let mut small = quiet_world(outbreak_config(29), 13);
    for _ in 0..20 {
        let events = small.tick(1.0);
        assert!(!events.iter().any(|e| matches!(e, WorldEvent::Outbreak { .. })));
    }
    assert_eq!(small.infected_count(), 0);
}

struct Broken;

impl ComputeBackend for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn evaluate(&mut self, _batch: &PackedBatch) -> std::result::Result<BatchOutput, BackendError> {
        Err(BackendError::Device("device lost".into()))
    }
}

#[test]
fn failing_backend_falls_back_once() {
    let mut config = SimConfig::default();
    config.world.initial_population = 10;
    config.neural.batch_threshold = 1;
    config.neural.priority_complex = false;
    config.disease.enabled = false;
    let sink = MemorySink::new();
    let mut world = WorldBuilder::new()
        .with_config(config)
        .with_seed(4)
        .with_backend(Box::new(Broken))
        .with_sink(Box::new(sink.clone()))
        .build()
        .unwrap();
    assert_eq!(world.backend_name(), "broken");
    // Complex enough to be steered by the network.
    for c in world.creatures_mut() {
        c.complexity = 120.0;
    }

    for _ in 0..5 {
        world.tick(1.0);
    }
    let fallbacks = sink
        .events()
        .iter()
        .filter(|(_, e)| matches!(e, WorldEvent::BackendFallback { backend: "broken", .. }))
        .count();
    assert_eq!(fallbacks, 1);
    assert!(world.backend_failures() >= 5);
    assert_eq!(world.current_tick(), 5);
}

#[test]
fn session_round_trip_restores_creatures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions").join("world.json");

    let mut config = SimConfig::default();
    config.disease.enabled = false;
    let mut original = quiet_world(config.clone(), 31);
    original.run(40, 1.0);
    let meta = save_world(&original, &path).unwrap();
    assert_eq!(meta.tick, 40);
    assert_eq!(meta.creature_count, original.population());

    let mut restored = quiet_world(config, 32);
    let loaded = load_world(&mut restored, &path).unwrap();
    assert_eq!(loaded.session_id, meta.session_id);
    assert_eq!(restored.current_tick(), 40);
    assert_eq!(restored.counters(), original.counters());
    assert_eq!(restored.food().len(), original.food().len());

    for (a, b) in original.creatures().iter().zip(restored.creatures()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.genome, b.genome);
        assert_eq!(a.generation, b.generation);
        assert!((a.energy - b.energy).abs() < 1e-9);
        assert!((a.position.x - b.position.x).abs() < 1e-9);
    }

    let newest = restored.creatures().iter().map(|c| c.id).max().unwrap();
    restored.populate(1);
    assert!(restored.creatures().iter().any(|c| c.id > newest));
}

#[test]
fn corrupt_session_leaves_world_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut config = SimConfig::default();
    config.disease.enabled = false;
    let mut world = quiet_world(config, 2);
    world.run(3, 1.0);
    let before: Vec<CreatureId> = world.creatures().iter().map(|c| c.id).collect();

    let err = load_world(&mut world, &path).unwrap_err();
    assert!(matches!(err, DigiError::Session(SessionError::Corrupt(_))));
    assert_eq!(world.current_tick(), 3);
    assert_eq!(world.creatures().iter().map(|c| c.id).collect::<Vec<_>>(), before);
}
