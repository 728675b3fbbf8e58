//! Simulation configuration.
//!
//! Every tunable constant of the simulation lives here, grouped into
//! sections that map one-to-one onto the `[simulation.*]` tables of a
//! project's `digilife.toml`.

use crate::error::{ConfigError, DigiError, Result};
use crate::types::Topology;
use serde::{Deserialize, Serialize};

/// Full simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub creature: CreatureConfig,
    #[serde(default)]
    pub neural: NeuralConfig,
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub disease: DiseaseConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub vocal: VocalConfig,
    #[serde(default)]
    pub debug: DebugFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    pub topology: Topology,
    pub initial_population: usize,
    pub max_population: usize,
    /// Food items spawned per simulated second. Zero disables spawning.
    pub food_spawn_rate: f64,
    pub speed_multiplier: f64,
    /// Seed for the world RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
            topology: Topology::Bounded,
            initial_population: 25,
            max_population: 120,
            food_spawn_rate: 5.0,
            speed_multiplier: 1.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    pub initial_energy: f64,
    pub max_energy: f64,
    /// Metabolic cost per simulated second before complexity and efficiency.
    pub energy_cost_per_cycle: f64,
    pub reproduction_threshold: f64,
    pub reproduction_cost: f64,
    pub mutation_rate: f64,
    pub size_base: f64,
    pub size_max: f64,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            initial_energy: 250.0,
            max_energy: 350.0,
            energy_cost_per_cycle: 0.2,
            reproduction_threshold: 180.0,
            reproduction_cost: 35.0,
            mutation_rate: 0.05,
            size_base: 10.0,
            size_max: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuralConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub memory_decay: f32,
    /// Per-weight probability of perturbation when a child inherits a network.
    pub inherit_mutation_rate: f64,
    pub inherit_mutation_strength: f32,
    /// Use batched evaluation through the compute backend.
    pub use_batching: bool,
    /// Allow the GPU backend when the `gpu` feature is compiled in.
    pub use_gpu: bool,
    /// Minimum group size that is worth a batched dispatch.
    pub batch_threshold: usize,
    pub batch_size: usize,
    /// Evaluate complex creatures in batches before everyone else.
    pub priority_complex: bool,
    pub complex_threshold: f64,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            input_size: 8,
            hidden_size: 16,
            output_size: 4,
            memory_decay: 0.7,
            inherit_mutation_rate: 0.15,
            inherit_mutation_strength: 0.2,
            use_batching: true,
            use_gpu: true,
            batch_threshold: 20,
            batch_size: 32,
            priority_complex: true,
            complex_threshold: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub predation_complexity: f64,
    pub predation_strength_ratio: f64,
    pub predation_energy_gain: f64,
    pub predation_range: f64,
    pub predation_kill_chance: f64,
    pub collaboration_complexity: f64,
    pub collaboration_similarity: f64,
    pub collaboration_bonus: f64,
    pub collaboration_range: f64,
    pub communication_complexity: f64,
    pub communication_range: f64,
    pub communication_cost: f64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            predation_complexity: 200.0,
            predation_strength_ratio: 1.5,
            predation_energy_gain: 30.0,
            predation_range: 30.0,
            predation_kill_chance: 0.3,
            collaboration_complexity: 150.0,
            collaboration_similarity: 0.7,
            collaboration_bonus: 5.0,
            collaboration_range: 50.0,
            communication_complexity: 100.0,
            communication_range: 80.0,
            communication_cost: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseConfig {
    pub enabled: bool,
    pub min_population: usize,
    /// Outbreak interval bounds in ticks, inclusive.
    pub interval_min: u64,
    pub interval_max: u64,
    pub spread_radius: f64,
}

impl Default for DiseaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_population: 30,
            interval_min: 500,
            interval_max: 1500,
            spread_radius: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Fraction of the cap above which energy-based selection starts.
    pub pressure_ratio: f64,
    /// Fraction of the population removed by one selection pass.
    pub pressure_cull_fraction: f64,
    /// Ticks between selection passes. Zero disables them.
    pub pressure_interval: u64,
    /// Overshoot tolerated before the fitness-based hard cap kicks in.
    pub cap_slack: usize,
    pub species_interval: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            pressure_ratio: 0.8,
            pressure_cull_fraction: 0.1,
            pressure_interval: 50,
            cap_slack: 10,
            species_interval: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocalConfig {
    /// Gates vocalization entirely.
    pub audio_enabled: bool,
    pub complexity_threshold: f64,
    pub development_requirement: f64,
    /// Associations needed before a word is learned.
    pub association_threshold: u32,
}

impl Default for VocalConfig {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            complexity_threshold: 500.0,
            development_requirement: 100.0,
            association_threshold: 5,
        }
    }
}

/// Which diagnostic events are logged at `info` level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    pub log_births: bool,
    pub log_deaths: bool,
    pub log_vocalizations: bool,
    pub log_mutations: bool,
}

impl DebugFlags {
    pub fn all() -> Self {
        Self {
            log_births: true,
            log_deaths: true,
            log_vocalizations: true,
            log_mutations: true,
        }
    }
}

impl SimConfig {
    /// Check ranges and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        check("world.width", self.world.width, 100.0, 100_000.0)?;
        check("world.height", self.world.height, 100.0, 100_000.0)?;
        check("world.food_spawn_rate", self.world.food_spawn_rate, 0.0, 10_000.0)?;
        check("world.speed_multiplier", self.world.speed_multiplier, 0.0, 100.0)?;
        check("creature.max_energy", self.creature.max_energy, 1.0, 1e9)?;
        check("creature.initial_energy", self.creature.initial_energy, 0.0, self.creature.max_energy)?;
        check("creature.mutation_rate", self.creature.mutation_rate, 0.0, 1.0)?;
        check("neural.inherit_mutation_rate", self.neural.inherit_mutation_rate, 0.0, 1.0)?;
        check("population.pressure_ratio", self.population.pressure_ratio, 0.0, 1.0)?;
        check("population.pressure_cull_fraction", self.population.pressure_cull_fraction, 0.0, 1.0)?;

        if self.world.max_population == 0 {
            return Err(ConfigError::Inconsistent("world.max_population must be positive".into()).into());
        }
        if self.neural.hidden_size < 2 || self.neural.input_size == 0 || self.neural.output_size == 0 {
            return Err(ConfigError::Inconsistent("neural layer sizes are too small".into()).into());
        }
        if self.neural.batch_size == 0 {
            return Err(ConfigError::Inconsistent("neural.batch_size must be positive".into()).into());
        }
        if self.disease.interval_min > self.disease.interval_max {
            return Err(ConfigError::Inconsistent(
                "disease.interval_min exceeds disease.interval_max".into(),
            )
            .into());
        }
        Ok(())
    }

    /// Parse a `WIDTHxHEIGHT` string into world dimensions.
    pub fn parse_world_size(s: &str) -> Result<(f64, f64)> {
        let invalid = || DigiError::Config(ConfigError::InvalidWorldSize(s.to_string()));
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        Ok((width as f64, height as f64))
    }
}

fn check(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(DigiError::out_of_range(field, value, min, max))
    }
}
