//! Interactions between creatures: predation, collaboration,
//! communication and spoken words.

use crate::creature::{Creature, PredatorStats, CREATURE_SIGHT, CROWD_RADIUS, FOOD_REACH, FOOD_SIGHT};
use crate::habitat::{CreatureEvent, Habitat};
use crate::vocal::{Perception, Word};
use digilife_core::types::{DeathCause, Position};
use rand::Rng;
use std::f64::consts::TAU;

impl Creature {
    pub(crate) fn try_predation(&mut self, h: &mut Habitat<'_>) {
        let config = h.config;
        let social = &config.social;
        if self.complexity < social.predation_complexity {
            return;
        }

        for i in h.creatures_near(self.position, social.predation_range) {
            let prey = &h.others[i];
            if prey.is_dead() || self.fitness <= prey.fitness * social.predation_strength_ratio {
                continue;
            }
            if h.rng.random::<f64>() < social.predation_kill_chance {
                self.predate(i, h);
                break;
            }
        }
    }

    fn predate(&mut self, prey_index: usize, h: &mut Habitat<'_>) {
        let config = h.config;
        let prey = &mut h.others[prey_index];
        let gained = config.social.predation_energy_gain.min(prey.energy * 0.5);
        prey.energy = 0.0;
        prey.cause_of_death = Some(DeathCause::Predation);
        let prey_id = prey.id;

        self.energy = (self.energy + gained).min(self.max_energy);
        self.fitness += 10.0;
        self.predator.get_or_insert_with(PredatorStats::default).kills += 1;

        h.events.push(CreatureEvent::Predation {
            predator: self.id,
            prey: prey_id,
            energy_gained: gained,
        });
    }

    pub(crate) fn try_collaboration(&mut self, dt: f64, h: &mut Habitat<'_>) {
        let config = h.config;
        let social = &config.social;
        if self.complexity < social.collaboration_complexity {
            return;
        }

        for i in h.creatures_near(self.position, social.collaboration_range) {
            if h.others[i].is_dead() {
                continue;
            }
            let similarity = self.genetic_similarity(&h.others[i]);
            if similarity >= social.collaboration_similarity && h.rng.random::<f64>() < 0.05 * dt {
                let bonus = social.collaboration_bonus;
                self.energy = (self.energy + bonus).min(self.max_energy);
                self.fitness += 5.0;

                let ally = &mut h.others[i];
                ally.energy = (ally.energy + bonus).min(ally.max_energy);
                ally.fitness += 5.0;

                h.events.push(CreatureEvent::Collaboration {
                    initiator: self.id,
                    ally: ally.id,
                });
                break;
            }
        }
    }

    pub(crate) fn try_communication(&mut self, dt: f64, h: &mut Habitat<'_>) {
        let config = h.config;
        let social = &config.social;
        if self.complexity < social.communication_complexity {
            return;
        }

        let nearby = live_listeners(h, self.position, social.communication_range);
        if nearby.is_empty() || h.rng.random::<f64>() >= 0.02 * dt {
            return;
        }

        self.energy -= social.communication_cost;
        let share = self.complexity * 0.01 * 0.5;
        let mut reached = 0;
        for i in nearby {
            let listener = &mut h.others[i];
            if listener.complexity >= social.communication_complexity {
                listener.complexity += share;
                listener.fitness += 1.0;
                reached += 1;
            }
        }
        self.fitness += 2.0;

        h.events.push(CreatureEvent::Communication {
            speaker: self.id,
            listeners: reached,
        });
    }

    /// What this creature currently perceives, for choosing a word.
    pub fn perceive(&self, h: &Habitat<'_>) -> Perception {
        let at = self.position;
        let crowd = h.creatures_near(at, CROWD_RADIUS);
        Perception {
            energy_ratio: self.energy_ratio(),
            sees_food: !h.food_near(at, FOOD_SIGHT).is_empty(),
            sees_creature: !h.creatures_near(at, CREATURE_SIGHT).is_empty(),
            threat: crowd.iter().any(|&i| h.others[i].is_predator()),
            can_reproduce: self.can_reproduce(h.population(), h.config),
            is_predator: self.is_predator(),
            fitness: self.fitness,
            age: self.age,
            crowd: crowd.len() + 1,
            food_in_reach: !h.food_near(at, FOOD_REACH).is_empty(),
        }
    }

    pub(crate) fn vocalize(&mut self, h: &mut Habitat<'_>) {
        let perception = self.perceive(h);
        let Some(word) = self.vocal.choose_word(&perception, self.complexity, h.rng) else {
            return;
        };
        self.vocal.record_spoken(word);

        let listeners = live_listeners(h, self.position, h.config.social.communication_range);
        self.apply_word(word, &listeners, h);

        h.events.push(CreatureEvent::Vocalized {
            speaker: self.id,
            word,
            listeners: listeners.len(),
        });
    }

    fn apply_word(&mut self, word: Word, listeners: &[usize], h: &mut Habitat<'_>) {
        let here = self.position;
        // Creatures killed earlier this tick stay dead until removal.
        let listeners: Vec<usize> = listeners
            .iter()
            .copied()
            .filter(|&i| !h.others[i].is_dead())
            .collect();
        let listeners = &listeners[..];
        match word {
            Word::Hunger => {
                for &i in listeners.iter().take(5) {
                    h.others[i].fitness += 0.3;
                }
                self.fitness += 0.5;
            }
            Word::Food => {
                let Some(food) = nearest_food_within(h, here, 80.0) else {
                    self.fitness += 0.5;
                    return;
                };
                let mut guided = 0;
                for &i in listeners {
                    if guided >= 5 {
                        break;
                    }
                    let l = &mut h.others[i];
                    if l.energy_ratio() < 0.5 && push_toward(l, food, 0.2, 150.0) {
                        l.fitness += 0.3;
                        guided += 1;
                    }
                }
                self.fitness += 1.0;
            }
            Word::Help => {
                let mut helped = 0;
                for &i in listeners {
                    let l = &mut h.others[i];
                    if l.energy_ratio() <= 0.4 {
                        continue;
                    }
                    let dist = l.position.distance_to(&here);
                    if push_toward(l, here, 0.3, 150.0) && dist < 30.0 {
                        let transfer = (l.energy * 0.05).min(5.0);
                        l.energy -= transfer;
                        l.fitness += 1.0;
                        self.energy = (self.energy + transfer).min(self.max_energy);
                        helped += 1;
                    }
                }
                if helped > 0 {
                    self.fitness += 2.0;
                }
            }
            Word::Hello => {
                for &i in listeners {
                    let kin = self.genetic_similarity(&h.others[i]) > 0.7;
                    let bonus = if kin { 0.5 } else { 0.2 };
                    h.others[i].fitness += bonus;
                    self.fitness += bonus;
                }
            }
            Word::Danger => {
                for &i in listeners {
                    let l = &mut h.others[i];
                    if push_away(l, here, 0.2, 100.0) {
                        l.fitness += 0.3;
                    }
                }
                self.fitness += 1.0;
            }
            Word::Good => {
                for &i in listeners {
                    let l = &mut h.others[i];
                    l.vx *= 0.9;
                    l.vy *= 0.9;
                    gain_energy(l, 0.5);
                    l.fitness += 0.2;
                }
                self.fitness += 0.5;
            }
            Word::Bad => {
                for &i in listeners {
                    let l = &mut h.others[i];
                    if l.energy_ratio() > 0.3 {
                        l.vx *= 1.1;
                        l.vy *= 1.1;
                        l.fitness += 0.2;
                    }
                }
                self.fitness += 0.3;
            }
            Word::Gather => {
                let mut gathered = 0;
                for &i in listeners {
                    if gathered >= 8 {
                        break;
                    }
                    let l = &mut h.others[i];
                    if push_toward(l, here, 0.25, 120.0) {
                        l.fitness += 0.4;
                        gathered += 1;
                    }
                }
                self.fitness += 2.0;
            }
            Word::Breed => {
                for &i in listeners {
                    let population = h.population();
                    if h.others[i].can_reproduce(population, h.config) && h.rng.random::<f64>() < 0.3 {
                        let child = h.others[i].give_birth(h.ids, h.rng, h.config);
                        h.events.push(CreatureEvent::Born {
                            parent: h.others[i].id,
                            child: child.id,
                            generation: child.generation,
                        });
                        h.nursery.push(child);
                    }
                }
            }
            Word::Defend => {
                for &i in listeners {
                    let l = &mut h.others[i];
                    l.fitness += 5.0;
                    gain_energy(l, 3.0);
                }
                self.fitness += 3.0;
            }
            Word::DangerHere => {
                for &i in listeners {
                    push_away(&mut h.others[i], here, 0.5, 100.0);
                }
            }
            Word::Explore => {
                for &i in listeners {
                    if h.rng.random::<f64>() < 0.5 {
                        let angle = h.rng.random_range(0.0..TAU);
                        let l = &mut h.others[i];
                        l.vx += angle.cos() * 0.4;
                        l.vy += angle.sin() * 0.4;
                        l.fitness += 0.5;
                    }
                }
            }
            Word::Rest => {
                for &i in listeners {
                    let l = &mut h.others[i];
                    l.vx *= 0.5;
                    l.vy *= 0.5;
                    gain_energy(l, 1.0);
                }
            }
            Word::Attack => {
                let hunters: Vec<usize> = listeners
                    .iter()
                    .take(5)
                    .copied()
                    .filter(|&i| h.others[i].is_predator())
                    .collect();
                if hunters.len() < 2 {
                    return;
                }
                let target = listeners
                    .iter()
                    .take(8)
                    .copied()
                    .find(|i| !hunters.contains(i));
                if let Some(prey) = target {
                    let (prey_at, prey_fitness) = (h.others[prey].position, h.others[prey].fitness);
                    for &p in hunters.iter().take(2) {
                        let hunter = &mut h.others[p];
                        if hunter.fitness > prey_fitness * 1.2 {
                            push_toward(hunter, prey_at, 0.3, f64::INFINITY);
                        }
                    }
                }
            }
            Word::Flee => {
                let threat = listeners
                    .iter()
                    .take(5)
                    .copied()
                    .find(|&i| h.others[i].is_predator());
                if let Some(t) = threat {
                    let danger = h.others[t].position;
                    for &i in listeners {
                        let l = &mut h.others[i];
                        if !l.is_predator() {
                            push_away(l, danger, 0.6, 150.0);
                        }
                    }
                }
            }
            Word::Share => {
                if self.energy_ratio() < 0.5 {
                    return;
                }
                let mut shared = 0;
                for &i in listeners {
                    let l = &mut h.others[i];
                    if l.energy_ratio() < 0.3 {
                        let transfer = (self.energy * 0.1).min(10.0);
                        self.energy -= transfer;
                        gain_energy(l, transfer);
                        l.fitness += 2.0;
                        shared += 1;
                    }
                }
                self.fitness += shared as f64 * 3.0;
            }
        }
    }
}

fn nearest_food_within(h: &Habitat<'_>, at: Position, radius: f64) -> Option<Position> {
    h.food_near(at, radius)
        .into_iter()
        .map(|i| h.food[i].position)
        .min_by(|a, b| a.distance_squared(&at).total_cmp(&b.distance_squared(&at)))
}

/// Live creatures within `radius` of `at`.
fn live_listeners(h: &Habitat<'_>, at: Position, radius: f64) -> Vec<usize> {
    h.creatures_near(at, radius)
        .into_iter()
        .filter(|&i| !h.others[i].is_dead())
        .collect()
}

fn gain_energy(c: &mut Creature, amount: f64) {
    if c.is_dead() {
        return;
    }
    c.energy = (c.energy + amount).min(c.max_energy);
}

/// Nudge `c` toward `target` if it is within `max_dist`. Returns whether it moved.
fn push_toward(c: &mut Creature, target: Position, force: f64, max_dist: f64) -> bool {
    let (dx, dy) = (target.x - c.position.x, target.y - c.position.y);
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > 0.0 && dist < max_dist {
        c.vx += dx / dist * force;
        c.vy += dy / dist * force;
        true
    } else {
        false
    }
}

fn push_away(c: &mut Creature, source: Position, force: f64, max_dist: f64) -> bool {
    let (dx, dy) = (c.position.x - source.x, c.position.y - source.y);
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > 0.0 && dist < max_dist {
        c.vx += dx / dist * force;
        c.vy += dy / dist * force;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digilife_core::config::SimConfig;
    use digilife_core::types::{CreatureId, IdSequence, SimRng};
    use rand::SeedableRng;

    fn corpse(config: &SimConfig, rng: &mut SimRng) -> Creature {
        let mut c = Creature::new(CreatureId(2), Position::new(410.0, 400.0), config, rng);
        c.energy = 0.0;
        c.complexity = 800.0;
        c.cause_of_death = Some(DeathCause::Disease);
        c
    }

    #[test]
    fn words_do_not_revive_the_dead() {
        let config = SimConfig::default();
        let mut rng = SimRng::seed_from_u64(4);
        let words = Word::BASIC.iter().chain(Word::ADVANCED.iter());

        for &word in words {
            let mut speaker = Creature::new(CreatureId(1), Position::new(400.0, 400.0), &config, &mut rng);
            speaker.energy = speaker.max_energy;
            speaker.complexity = 1600.0;
            let mut others = vec![corpse(&config, &mut rng)];
            let mut food = Vec::new();
            let mut nursery = Vec::new();
            let mut ids = IdSequence::starting_after(10);
            let mut events = Vec::new();
            let mut h = Habitat {
                width: config.world.width,
                height: config.world.height,
                food: &mut food,
                others: &mut others[..],
                nursery: &mut nursery,
                ids: &mut ids,
                rng: &mut rng,
                config: &config,
                events: &mut events,
            };
            speaker.apply_word(word, &[0], &mut h);

            assert!(others[0].is_dead(), "{:?} revived a dead listener", word);
            assert_eq!(others[0].energy, 0.0);
            assert!(nursery.is_empty());
        }
    }

    #[test]
    fn communication_skips_dead_listeners() {
        let config = SimConfig::default();
        let mut rng = SimRng::seed_from_u64(5);
        let mut speaker = Creature::new(CreatureId(1), Position::new(400.0, 400.0), &config, &mut rng);
        speaker.complexity = 900.0;
        let mut others = vec![corpse(&config, &mut rng)];
        let mut food = Vec::new();
        let mut nursery = Vec::new();
        let mut ids = IdSequence::starting_after(10);
        let mut events = Vec::new();
        let mut h = Habitat {
            width: config.world.width,
            height: config.world.height,
            food: &mut food,
            others: &mut others[..],
            nursery: &mut nursery,
            ids: &mut ids,
            rng: &mut rng,
            config: &config,
            events: &mut events,
        };
        // A long step makes the broadcast roll certain, but nobody alive is near.
        speaker.try_communication(100.0, &mut h);

        assert!(events.is_empty());
        assert_eq!(others[0].complexity, 800.0);
        assert!(others[0].is_dead());
    }
}
