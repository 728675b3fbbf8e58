//! World builder.
//!
//! Every collaborator of [`World`] can be swapped here: the food spawn
//! policy, the batch compute backend, the event sink and the worker pool.
//! Anything left unset gets the default for the configuration.
//!
//! # Example
//!
//! ```rust
//! use digilife_runtime::world_builder::WorldBuilder;
//! use digilife_runtime::sink::NullSink;
//! use digilife_core::config::SimConfig;
//!
//! let mut config = SimConfig::default();
//! config.world.seed = Some(42);
//! config.world.initial_population = 10;
//!
//! let mut world = WorldBuilder::new()
//!     .with_config(config)
//!     .with_sink(Box::new(NullSink))
//!     .build()
//!     .unwrap();
//! world.tick(1.0);
//! assert_eq!(world.current_tick(), 1);
//! ```

use crate::backend::{probe_backend, ComputeBackend, CpuBackend};
use crate::batch::BatchEvaluator;
use crate::session;
use crate::sink::{EventSink, TracingSink};
use crate::workers::WorkerPool;
use crate::world::World;
use digilife_agents::spawn::{FoodSpawnPolicy, RateSpawnPolicy};
use digilife_core::config::SimConfig;
use digilife_core::error::Result;
use digilife_core::types::SimRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

pub struct WorldBuilder {
    config: SimConfig,
    spawner: Option<Box<dyn FoodSpawnPolicy>>,
    backend: Option<Box<dyn ComputeBackend>>,
    sink: Option<Box<dyn EventSink>>,
    workers: Option<usize>,
    populate: bool,
    resume: Option<PathBuf>,
}

impl Default for WorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self {
            config: SimConfig::default(),
            spawner: None,
            backend: None,
            sink: None,
            workers: None,
            populate: true,
            resume: None,
        }
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the RNG seed. Two worlds built from the same seed and config
    /// evolve identically.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_spawn_policy(mut self, spawner: Box<dyn FoodSpawnPolicy>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Use this backend for batched evaluation instead of probing.
    pub fn with_backend(mut self, backend: Box<dyn ComputeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach a worker pool with `threads` threads (zero means one per core).
    pub fn with_workers(mut self, threads: usize) -> Self {
        self.workers = Some(threads);
        self
    }

    /// Whether to place `initial_population` creatures on build. On by default.
    pub fn populated(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }

    /// Restore a saved session after building. The build fails if the
    /// session cannot be read.
    pub fn resume_from<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.resume = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<World> {
        self.config.validate()?;

        let rng = match self.config.world.seed {
            Some(seed) => SimRng::seed_from_u64(seed),
            None => SimRng::from_rng(&mut rand::rng()),
        };

        let spawner: Box<dyn FoodSpawnPolicy> = match self.spawner {
            Some(spawner) => spawner,
            None => Box::new(RateSpawnPolicy::new(self.config.world.food_spawn_rate)),
        };

        let backend: Box<dyn ComputeBackend> = match self.backend {
            Some(backend) => backend,
            None if self.config.neural.use_batching => probe_backend(self.config.neural.use_gpu),
            None => Box::new(CpuBackend::new()),
        };

        let workers = self.workers.map(WorkerPool::new).transpose()?;

        let sink: Box<dyn EventSink> = match self.sink {
            Some(sink) => sink,
            None => Box::new(TracingSink::new(self.config.debug.clone())),
        };

        let initial = self.config.world.initial_population;
        let mut world = World::from_parts(
            self.config,
            rng,
            spawner,
            BatchEvaluator::new(backend),
            workers,
            sink,
        );

        match self.resume {
            Some(path) => {
                session::load_world(&mut world, &path)?;
            }
            None if self.populate => world.populate(initial),
            None => {}
        }

        tracing::info!(
            width = world.width(),
            height = world.height(),
            population = world.population(),
            backend = world.backend_name(),
            "world ready"
        );
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digilife_core::error::{ConfigError, DigiError};

    #[test]
    fn seeded_worlds_are_identical() {
        let build = || {
            WorldBuilder::new()
                .with_seed(99)
                .build()
                .unwrap()
        };
        let (mut a, mut b) = (build(), build());
        for _ in 0..25 {
            a.tick(1.0);
            b.tick(1.0);
        }
        let pos_a: Vec<_> = a.creatures().iter().map(|c| (c.id, c.position)).collect();
        let pos_b: Vec<_> = b.creatures().iter().map(|c| (c.id, c.position)).collect();
        assert_eq!(pos_a, pos_b);
    }

    #[test]
    fn unpopulated_world_is_empty() {
        let world = WorldBuilder::new().populated(false).build().unwrap();
        assert_eq!(world.population(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SimConfig::default();
        config.world.max_population = 0;
        let err = WorldBuilder::new().with_config(config).build().err().unwrap();
        assert!(matches!(err, DigiError::Config(ConfigError::Inconsistent(_))));
    }

    #[test]
    fn missing_session_fails_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let result = WorldBuilder::new()
            .resume_from(dir.path().join("absent.json"))
            .build();
        assert!(result.is_err());
    }
}
