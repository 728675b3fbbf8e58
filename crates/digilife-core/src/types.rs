//! Shared types used across all digilife crates.

use serde::{Deserialize, Serialize};

/// Simulation tick counter.
pub type Tick = u64;

/// Random number generator owned by a world.
///
/// Every stochastic decision in a tick draws from this generator, so a seeded
/// world replays identically on the same platform.
pub type SimRng = rand_chacha::ChaCha8Rng;

/// Unique identifier for a creature.
///
/// Ids are handed out by an [`IdSequence`] owned by the world and increase
/// monotonically for the lifetime of that world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureId(pub u64);

impl std::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for a disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseId(pub u64);

/// Monotonic id generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Resume after the highest id already in use.
    pub fn starting_after(last: u64) -> Self {
        Self { next: last + 1 }
    }

    pub fn next_id(&mut self) -> CreatureId {
        let id = CreatureId(self.next);
        self.next += 1;
        id
    }

    /// Make sure future ids never collide with `id`.
    pub fn observe(&mut self, id: CreatureId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// A position in the world plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Position) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

/// Edge behaviour of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Creatures are clamped at the borders and bounce back.
    #[default]
    Bounded,
    /// Creatures leaving one edge re-enter at the opposite one.
    Toroidal,
}

/// Kinds of data a creature can feed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKind {
    Numeric,
    Text,
    Audio,
    Structured,
    Binary,
}

/// What a creature gains by consuming one food item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nutrition {
    pub energy: f64,
    pub complexity: f64,
    pub vocal: f64,
}

impl FoodKind {
    pub const ALL: [FoodKind; 5] = [
        FoodKind::Numeric,
        FoodKind::Text,
        FoodKind::Audio,
        FoodKind::Structured,
        FoodKind::Binary,
    ];

    pub fn nutrition(self) -> Nutrition {
        let (energy, complexity, vocal) = match self {
            FoodKind::Numeric => (12.0, 3.0, 0.0),
            FoodKind::Text => (10.0, 8.0, 2.0),
            FoodKind::Audio => (10.0, 3.0, 8.0),
            FoodKind::Structured => (18.0, 15.0, 3.0),
            FoodKind::Binary => (8.0, 2.0, 0.0),
        };
        Nutrition { energy, complexity, vocal }
    }

    /// Relative spawn frequency. The five weights sum to 1.
    pub fn spawn_probability(self) -> f64 {
        match self {
            FoodKind::Numeric => 0.25,
            FoodKind::Text => 0.20,
            FoodKind::Audio => 0.20,
            FoodKind::Structured => 0.25,
            FoodKind::Binary => 0.10,
        }
    }

    /// Pick a kind from a uniform sample in `[0, 1)` by cumulative probability.
    pub fn from_roll(roll: f64) -> FoodKind {
        let mut cumulative = 0.0;
        for kind in Self::ALL {
            cumulative += kind.spawn_probability();
            if roll <= cumulative {
                return kind;
            }
        }
        FoodKind::Numeric
    }
}

/// A piece of data lying in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub kind: FoodKind,
    pub position: Position,
}

impl FoodItem {
    pub fn new(kind: FoodKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn nutrition(&self) -> Nutrition {
        self.kind.nutrition()
    }
}

/// Evolutionary phase, derived from complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Primitive,
    Intermediate,
    Advanced,
    Complex,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Primitive,
        Phase::Intermediate,
        Phase::Advanced,
        Phase::Complex,
    ];

    pub fn from_complexity(complexity: f64) -> Phase {
        if complexity < 200.0 {
            Phase::Primitive
        } else if complexity < 500.0 {
            Phase::Intermediate
        } else if complexity < 1000.0 {
            Phase::Advanced
        } else {
            Phase::Complex
        }
    }

    pub fn speed_multiplier(self) -> f64 {
        match self {
            Phase::Primitive => 0.6,
            Phase::Intermediate => 0.85,
            Phase::Advanced => 1.1,
            Phase::Complex => 1.3,
        }
    }

    /// Multiplier on metabolic cost. Decreases with each phase.
    pub fn efficiency(self) -> f64 {
        match self {
            Phase::Primitive => 1.0,
            Phase::Intermediate => 0.85,
            Phase::Advanced => 0.7,
            Phase::Complex => 0.55,
        }
    }

    /// Age a creature must exceed before it may reproduce.
    pub fn min_reproduction_age(self) -> f64 {
        match self {
            Phase::Primitive => 100.0,
            Phase::Intermediate => 80.0,
            Phase::Advanced => 60.0,
            Phase::Complex => 50.0,
        }
    }

    /// Display colour as RGB.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Phase::Primitive => (255, 100, 100),
            Phase::Intermediate => (255, 165, 0),
            Phase::Advanced => (100, 255, 100),
            Phase::Complex => (100, 150, 255),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Primitive => "primitive",
            Phase::Intermediate => "intermediate",
            Phase::Advanced => "advanced",
            Phase::Complex => "complex",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a creature left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Energy ran out.
    Starvation,
    /// Drained by a predator.
    Predation,
    /// Killed by an infection.
    Disease,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_sequence_is_monotonic() {
        let mut ids = IdSequence::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(b > a);
        ids.observe(CreatureId(40));
        assert_eq!(ids.next_id(), CreatureId(41));
        ids.observe(CreatureId(3));
        assert_eq!(ids.next_id(), CreatureId(42));
    }

    #[test]
    fn phase_brackets() {
        assert_eq!(Phase::from_complexity(0.0), Phase::Primitive);
        assert_eq!(Phase::from_complexity(199.9), Phase::Primitive);
        assert_eq!(Phase::from_complexity(200.0), Phase::Intermediate);
        assert_eq!(Phase::from_complexity(999.0), Phase::Advanced);
        assert_eq!(Phase::from_complexity(1000.0), Phase::Complex);
    }

    #[test]
    fn efficiency_decreases_with_phase() {
        let values: Vec<f64> = Phase::ALL.iter().map(|p| p.efficiency()).collect();
        assert!(values.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn food_roll_covers_every_kind() {
        assert_eq!(FoodKind::from_roll(0.0), FoodKind::Numeric);
        assert_eq!(FoodKind::from_roll(0.3), FoodKind::Text);
        assert_eq!(FoodKind::from_roll(0.5), FoodKind::Audio);
        assert_eq!(FoodKind::from_roll(0.8), FoodKind::Structured);
        assert_eq!(FoodKind::from_roll(0.95), FoodKind::Binary);
        assert_eq!(FoodKind::from_roll(1.5), FoodKind::Numeric);
        let total: f64 = FoodKind::ALL.iter().map(|k| k.spawn_probability()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn position_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-10);
    }
}
