//! digilife agents prelude.
//!
//! ```rust
//! use digilife_agents::prelude::*;
//! ```

pub use crate::creature::{Creature, PredatorStats};
pub use crate::fitness::{lifetime_score, FitnessStats};
pub use crate::genome::{Genome, Instruction};
pub use crate::habitat::{CreatureEvent, Habitat};
pub use crate::infection::{Infection, InfectionTick, Strain};
pub use crate::neural::{NetworkParameters, NetworkShape, NeuralController};
pub use crate::serialize::CreatureRecord;
pub use crate::spawn::{FoodSpawnPolicy, NoFoodPolicy, RateSpawnPolicy};
pub use crate::vocal::{Perception, VocalSystem, Word};

// Re-export from core
pub use digilife_core::prelude::*;
