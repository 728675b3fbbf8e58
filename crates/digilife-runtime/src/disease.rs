//! Epidemics.
//!
//! Every few hundred ticks a new disease may break out in a crowded world.
//! A disease lives from its first infection until its last infected host
//! recovers or dies, at which point it is eradicated.

use crate::world::WorldEvent;
use digilife_agents::creature::Creature;
use digilife_agents::habitat::creatures_within;
use digilife_agents::infection::{Infection, Strain};
use digilife_core::config::DiseaseConfig;
use digilife_core::types::{CreatureId, DiseaseId, SimRng};
use rand::seq::{index, IndexedRandom};
use rand::Rng;
use serde::Serialize;

pub const DISEASE_NAMES: [&str; 12] = [
    "Digital Virus",
    "Data Corruption",
    "Genetic Fragmentation",
    "Neural Overload",
    "Energy Degradation",
    "Chaotic Mutation",
    "Binary Infection",
    "Complexity Syndrome",
    "Cognitive Fatigue",
    "Desynchronization",
    "Accelerated Entropy",
    "Systemic Glitch",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Symptom {
    pub name: &'static str,
    pub energy_drain: f64,
    pub complexity_loss: f64,
}

pub const SYMPTOMS: [Symptom; 6] = [
    Symptom { name: "energy loss", energy_drain: 0.5, complexity_loss: 0.0 },
    Symptom { name: "neural confusion", energy_drain: 0.2, complexity_loss: 0.3 },
    Symptom { name: "motor weakness", energy_drain: 0.3, complexity_loss: 0.1 },
    Symptom { name: "cognitive degradation", energy_drain: 0.1, complexity_loss: 0.5 },
    Symptom { name: "extreme fatigue", energy_drain: 0.8, complexity_loss: 0.2 },
    Symptom { name: "disorientation", energy_drain: 0.4, complexity_loss: 0.4 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseStatus {
    Active,
    Eradicated,
}

#[derive(Debug, Clone, Serialize)]
pub struct Disease {
    pub id: DiseaseId,
    pub name: String,
    pub symptoms: Vec<Symptom>,
    /// Chance per contact per tick.
    pub contagion_rate: f64,
    /// Ticks an infection lasts.
    pub duration: u32,
    /// Chance of death per simulated second.
    pub lethality: f64,
    pub status: DiseaseStatus,
    pub current_infected: usize,
    pub total_infected: usize,
    pub deaths_caused: usize,
    pub patient_zero: Option<CreatureId>,
}

impl Disease {
    pub fn random(id: DiseaseId, rng: &mut SimRng) -> Self {
        let name = DISEASE_NAMES.choose(rng).copied().unwrap_or(DISEASE_NAMES[0]);
        let count = rng.random_range(1..=3);
        let symptoms = index::sample(rng, SYMPTOMS.len(), count)
            .into_iter()
            .map(|i| SYMPTOMS[i])
            .collect();
        Self {
            id,
            name: name.to_string(),
            symptoms,
            contagion_rate: rng.random_range(0.05..0.25),
            duration: rng.random_range(50..=200),
            lethality: rng.random_range(0.01..0.1),
            status: DiseaseStatus::Active,
            current_infected: 0,
            total_infected: 0,
            deaths_caused: 0,
            patient_zero: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == DiseaseStatus::Active
    }

    pub fn energy_drain(&self) -> f64 {
        self.symptoms.iter().map(|s| s.energy_drain).sum()
    }

    pub fn complexity_loss(&self) -> f64 {
        self.symptoms.iter().map(|s| s.complexity_loss).sum()
    }

    pub fn symptom_names(&self) -> Vec<String> {
        self.symptoms.iter().map(|s| s.name.to_string()).collect()
    }

    pub fn strain(&self) -> Strain {
        Strain {
            disease: self.id,
            energy_drain: self.energy_drain(),
            complexity_loss: self.complexity_loss(),
            contagion_rate: self.contagion_rate,
            lethality: self.lethality,
            duration: self.duration,
        }
    }
}

/// Summary of an active epidemic.
#[derive(Debug, Clone, Serialize)]
pub struct EpidemicReport {
    pub name: String,
    pub current_infected: usize,
    pub total_infected: usize,
    pub deaths: usize,
    pub symptoms: Vec<String>,
    pub patient_zero: Option<CreatureId>,
    pub contagion_rate: f64,
    pub lethality: f64,
}

/// Schedules outbreaks and tracks every disease ever seen.
#[derive(Debug, Clone)]
pub struct DiseaseSystem {
    config: DiseaseConfig,
    diseases: Vec<Disease>,
    next_id: u64,
    timer: u64,
    interval: u64,
}

impl DiseaseSystem {
    pub fn new(config: DiseaseConfig, rng: &mut SimRng) -> Self {
        let mut system = Self {
            config,
            diseases: Vec::new(),
            next_id: 0,
            timer: 0,
            interval: 0,
        };
        system.interval = system.roll_interval(rng);
        system
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    pub fn disease(&self, id: DiseaseId) -> Option<&Disease> {
        self.diseases.iter().find(|d| d.id == id)
    }

    /// Ticks until the next outbreak may happen.
    pub fn ticks_until_outbreak(&self) -> u64 {
        self.interval.saturating_sub(self.timer)
    }

    /// Forget every disease and restart the outbreak timer.
    pub fn reset(&mut self, rng: &mut SimRng) {
        self.diseases.clear();
        self.timer = 0;
        self.interval = self.roll_interval(rng);
    }

    /// Advance the outbreak timer by one tick.
    ///
    /// An outbreak needs both an elapsed timer and a population of at least
    /// `min_population`. The timer keeps running while the world is too small.
    pub fn tick(&mut self, creatures: &mut [Creature], rng: &mut SimRng) -> Option<WorldEvent> {
        if !self.config.enabled {
            return None;
        }
        self.timer += 1;
        if self.timer < self.interval || creatures.len() < self.config.min_population {
            return None;
        }
        self.timer = 0;
        self.interval = self.roll_interval(rng);
        self.trigger_outbreak(creatures, rng)
    }

    /// Start a new disease in a random living creature.
    pub fn trigger_outbreak(&mut self, creatures: &mut [Creature], rng: &mut SimRng) -> Option<WorldEvent> {
        let candidates: Vec<usize> = (0..creatures.len())
            .filter(|&i| !creatures[i].is_dead() && !creatures[i].is_infected())
            .collect();
        let &patient = candidates.choose(rng)?;

        let id = DiseaseId(self.next_id);
        self.next_id += 1;
        let mut disease = Disease::random(id, rng);
        disease.patient_zero = Some(creatures[patient].id);
        let strain = disease.strain();
        self.diseases.push(disease);
        self.infect_with(&mut creatures[patient], strain, rng);

        let disease = self.diseases.last()?;
        Some(WorldEvent::Outbreak {
            disease: id,
            name: disease.name.clone(),
            symptoms: disease.symptom_names(),
            patient_zero: creatures[patient].id,
            contagion_rate: disease.contagion_rate,
            lethality: disease.lethality,
        })
    }

    /// Infect `creature` with an active disease. Creatures hold one infection at a time.
    pub fn infect(&mut self, creature: &mut Creature, disease: DiseaseId, rng: &mut SimRng) -> bool {
        let Some(strain) = self.disease(disease).filter(|d| d.is_active()).map(Disease::strain) else {
            return false;
        };
        self.infect_with(creature, strain, rng)
    }

    fn infect_with(&mut self, creature: &mut Creature, strain: Strain, rng: &mut SimRng) -> bool {
        if creature.is_infected() {
            return false;
        }
        creature.infection = Some(Infection::new(strain, rng));
        if let Some(d) = self.diseases.iter_mut().find(|d| d.id == strain.disease) {
            d.current_infected += 1;
            d.total_infected += 1;
        }
        true
    }

    /// Expose every healthy neighbour of `source` to its infection.
    ///
    /// Returns the number of new infections.
    pub fn try_spread(&mut self, source: usize, creatures: &mut [Creature], rng: &mut SimRng) -> usize {
        let Some(infection) = creatures.get(source).and_then(|c| c.infection.as_ref()) else {
            return 0;
        };
        let strain = infection.strain;
        let at = creatures[source].position;

        let mut infected = 0;
        for i in creatures_within(creatures, at, self.config.spread_radius) {
            let target = &creatures[i];
            if i == source || target.is_infected() || target.is_dead() {
                continue;
            }
            if rng.random::<f64>() < strain.contagion_rate && self.infect_with(&mut creatures[i], strain, rng) {
                infected += 1;
            }
        }
        infected
    }

    /// Count a death caused by `disease`.
    pub fn record_death(&mut self, disease: DiseaseId) {
        if let Some(d) = self.diseases.iter_mut().find(|d| d.id == disease) {
            d.deaths_caused += 1;
        }
    }

    /// A host stopped carrying `disease`, through recovery or removal.
    ///
    /// Returns the eradication event when this was the last host.
    pub fn release(&mut self, disease: DiseaseId) -> Option<WorldEvent> {
        let d = self.diseases.iter_mut().find(|d| d.id == disease)?;
        d.current_infected = d.current_infected.saturating_sub(1);
        if d.current_infected > 0 || !d.is_active() {
            return None;
        }
        d.status = DiseaseStatus::Eradicated;
        Some(WorldEvent::Eradicated {
            disease: d.id,
            name: d.name.clone(),
            total_infected: d.total_infected,
            deaths: d.deaths_caused,
        })
    }

    pub fn active_epidemics(&self) -> Vec<EpidemicReport> {
        self.diseases
            .iter()
            .filter(|d| d.is_active())
            .map(|d| EpidemicReport {
                name: d.name.clone(),
                current_infected: d.current_infected,
                total_infected: d.total_infected,
                deaths: d.deaths_caused,
                symptoms: d.symptom_names(),
                patient_zero: d.patient_zero,
                contagion_rate: d.contagion_rate,
                lethality: d.lethality,
            })
            .collect()
    }

    fn roll_interval(&self, rng: &mut SimRng) -> u64 {
        let (low, high) = (self.config.interval_min, self.config.interval_max);
        if high > low {
            rng.random_range(low..=high)
        } else {
            low
        }
    }
}
