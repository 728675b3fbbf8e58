//! digilife core prelude.
//!
//! ```rust
//! use digilife_core::prelude::*;
//! ```

pub use crate::types::{
    CreatureId, DeathCause, DiseaseId, FoodItem, FoodKind, IdSequence, Nutrition, Phase,
    Position, SimRng, Tick, Topology,
};

pub use crate::config::{
    CreatureConfig, DebugFlags, DiseaseConfig, NeuralConfig, PopulationConfig, SimConfig,
    SocialConfig, VocalConfig, WorldConfig,
};

pub use crate::error::{ConfigError, DigiError, Result, SessionError};
