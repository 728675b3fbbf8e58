//! Creature behaviour tests driven through a hand-built habitat.

use digilife_agents::prelude::*;
use rand::SeedableRng;

struct Scene {
    food: Vec<FoodItem>,
    others: Vec<Creature>,
    nursery: Vec<Creature>,
    ids: IdSequence,
    rng: SimRng,
    config: SimConfig,
    events: Vec<CreatureEvent>,
}

impl Scene {
    fn new(seed: u64) -> Self {
        Self {
            food: Vec::new(),
            others: Vec::new(),
            nursery: Vec::new(),
            ids: IdSequence::starting_after(100),
            rng: SimRng::seed_from_u64(seed),
            config: SimConfig::default(),
            events: Vec::new(),
        }
    }

    fn creature(&mut self, id: u64, x: f64, y: f64) -> Creature {
        Creature::new(CreatureId(id), Position::new(x, y), &self.config, &mut self.rng)
    }

    fn update(&mut self, c: &mut Creature, dt: f64) {
        let mut h = Habitat {
            width: self.config.world.width,
            height: self.config.world.height,
            food: &mut self.food,
            others: &mut self.others[..],
            nursery: &mut self.nursery,
            ids: &mut self.ids,
            rng: &mut self.rng,
            config: &self.config,
            events: &mut self.events,
        };
        c.update(dt, &mut h);
    }
}

fn strain(lethality: f64) -> Strain {
    Strain {
        disease: DiseaseId(1),
        energy_drain: 0.5,
        complexity_loss: 0.0,
        contagion_rate: 0.0,
        lethality,
        duration: 300,
    }
}

#[test]
fn birth_debits_parent_and_seeds_child() {
    let mut scene = Scene::new(1);
    let mut parent = scene.creature(1, 500.0, 400.0);
    parent.energy = 300.0;
    parent.complexity = 400.0;
    parent.vocal_development = 40.0;
    parent.fitness = 50.0;
    parent.generation = 2;

    let child = parent.give_birth(&mut scene.ids, &mut scene.rng, &scene.config);

    assert_eq!(parent.energy, 300.0 - scene.config.creature.reproduction_cost);
    assert_eq!(parent.fitness, 70.0);
    assert_eq!(child.energy, scene.config.creature.initial_energy);
    assert_eq!(child.generation, 3);
    assert!((child.complexity - 280.0).abs() < 1e-9);
    assert_eq!(child.vocal_development, 20.0);
    assert!((child.fitness - (70.0 * 0.2 + 6.0)).abs() < 1e-9);
    assert_eq!(child.max_energy, parent.max_energy);
    assert!(child.id.0 > 100);
    assert!(child.position.distance_to(&parent.position) < 20.0 * 2f64.sqrt());
}

#[test]
fn energy_stays_within_bounds_while_feeding() {
    let mut scene = Scene::new(2);
    let mut c = scene.creature(1, 600.0, 400.0);
    c.energy = c.max_energy;
    for i in 0..20 {
        scene.food.push(FoodItem::new(FoodKind::Structured, Position::new(600.0 + i as f64 * 0.1, 400.0)));
    }

    for _ in 0..50 {
        scene.update(&mut c, 0.05);
        assert!(c.energy >= 0.0 && c.energy <= c.max_energy, "energy {}", c.energy);
    }
    assert!(c.food_eaten > 0);
}

#[test]
fn feeding_consumes_one_item_per_update() {
    let mut scene = Scene::new(3);
    let mut c = scene.creature(1, 600.0, 400.0);
    c.energy = 100.0;
    scene.food.push(FoodItem::new(FoodKind::Text, Position::new(600.0, 400.0)));
    scene.food.push(FoodItem::new(FoodKind::Text, Position::new(600.5, 400.0)));

    scene.update(&mut c, 0.01);

    assert_eq!(c.food_eaten, 1);
    assert_eq!(scene.food.len(), 1);
    assert!(c.complexity >= 8.0);
}

#[test]
fn strong_creature_eventually_preys() {
    let mut found = false;
    for seed in 0..60 {
        let mut scene = Scene::new(seed);
        let mut hunter = scene.creature(1, 700.0, 450.0);
        hunter.complexity = 300.0;
        hunter.fitness = 100.0;
        hunter.age = 19.95;

        let mut prey = scene.creature(2, 705.0, 450.0);
        prey.fitness = 10.0;
        scene.others.push(prey);

        scene.update(&mut hunter, 0.1);

        if scene.others[0].is_dead() {
            assert_eq!(scene.others[0].cause_of_death, Some(DeathCause::Predation));
            assert_eq!(hunter.kills(), 1);
            assert!(hunter.is_predator());
            assert!(scene
                .events
                .iter()
                .any(|e| matches!(e, CreatureEvent::Predation { prey: CreatureId(2), .. })));
            found = true;
            break;
        }
    }
    assert!(found, "no seed produced a kill");
}

#[test]
fn weak_creature_never_preys() {
    for seed in 0..30 {
        let mut scene = Scene::new(seed);
        let mut hunter = scene.creature(1, 700.0, 450.0);
        hunter.complexity = 300.0;
        hunter.fitness = 10.0;
        hunter.age = 19.95;

        let mut prey = scene.creature(2, 705.0, 450.0);
        prey.fitness = 10.0;
        scene.others.push(prey);

        scene.update(&mut hunter, 0.1);
        assert!(!scene.others[0].is_dead());
        assert!(!hunter.is_predator());
    }
}

#[test]
fn lethal_infection_kills_and_reports() {
    let mut scene = Scene::new(4);
    let mut c = scene.creature(1, 600.0, 400.0);
    c.infection = Some(Infection::new(strain(1.0), &mut scene.rng));

    scene.update(&mut c, 1.0);

    assert!(c.is_dead());
    assert_eq!(c.cause_of_death, Some(DeathCause::Disease));
    assert!(scene
        .events
        .iter()
        .any(|e| matches!(e, CreatureEvent::KilledByDisease { creature: CreatureId(1), .. })));
}

#[test]
fn expired_infection_recovers() {
    let mut scene = Scene::new(5);
    let mut c = scene.creature(1, 600.0, 400.0);
    let mut short = strain(0.0);
    short.duration = 1;
    c.infection = Some(Infection::new(short, &mut scene.rng));

    scene.update(&mut c, 1.0);

    assert!(!c.is_infected());
    assert!(scene
        .events
        .iter()
        .any(|e| matches!(e, CreatureEvent::Recovered { creature: CreatureId(1), .. })));
}

#[test]
fn reproduction_respects_population_cap() {
    let mut scene = Scene::new(6);
    scene.config.world.max_population = 1;
    let mut c = scene.creature(1, 600.0, 400.0);
    c.energy = c.max_energy;
    c.age = 109.95;

    scene.update(&mut c, 0.1);
    assert!(scene.nursery.is_empty());

    scene.config.world.max_population = 10;
    c.energy = c.max_energy;
    c.age = 119.95;
    scene.update(&mut c, 0.1);
    assert_eq!(scene.nursery.len(), 1);
}

#[test]
fn clones_share_a_species() {
    let mut scene = Scene::new(7);
    let a = scene.creature(1, 100.0, 100.0);
    let mut b = a.clone();
    b.id = CreatureId(2);
    assert_eq!(a.species_id(), b.species_id());
    assert!((a.genetic_similarity(&b) - 1.0).abs() < 1e-9);

    b.complexity = 900.0;
    assert_ne!(a.species_id(), b.species_id());
}
