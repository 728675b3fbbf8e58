//! Creature-side view of a disease.

use digilife_core::types::DiseaseId;
use rand::Rng;

/// The per-tick effect profile of a disease, copied into each infection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strain {
    pub disease: DiseaseId,
    /// Sum of the symptoms' energy drain per second.
    pub energy_drain: f64,
    /// Sum of the symptoms' complexity loss per second.
    pub complexity_loss: f64,
    pub contagion_rate: f64,
    /// Probability per second of killing the host.
    pub lethality: f64,
    /// Ticks an infection lasts.
    pub duration: u32,
}

/// Result of advancing an infection by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfectionTick {
    pub energy_loss: f64,
    pub complexity_loss: f64,
    pub lethal: bool,
    /// The infection ran its course this tick.
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Infection {
    pub strain: Strain,
    pub duration_left: i64,
    /// Multiplier on every symptom, drawn in `[0.5, 1.5)`.
    pub severity: f64,
}

impl Infection {
    pub fn new<R: Rng + ?Sized>(strain: Strain, rng: &mut R) -> Self {
        Self {
            duration_left: strain.duration as i64,
            severity: rng.random_range(0.5..1.5),
            strain,
        }
    }

    pub fn disease(&self) -> DiseaseId {
        self.strain.disease
    }

    pub fn is_active(&self) -> bool {
        self.duration_left > 0
    }

    /// Count down one tick and roll the symptoms.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> InfectionTick {
        self.duration_left -= 1;
        let lethal = rng.random::<f64>() < self.strain.lethality * dt;
        InfectionTick {
            energy_loss: self.strain.energy_drain * self.severity * dt,
            complexity_loss: self.strain.complexity_loss * self.severity * dt,
            lethal,
            expired: !lethal && !self.is_active(),
        }
    }
}
