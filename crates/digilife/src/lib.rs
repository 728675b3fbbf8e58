//! # digilife
//!
//! An artificial-life simulation. Digital creatures wander a 2-D world,
//! eat typed data, grow more complex, reproduce with mutation, hunt,
//! cooperate, fall ill and, once complex enough, develop a small spoken
//! vocabulary.
//!
//! ## Quick Start
//!
//! ```rust
//! use digilife::prelude::*;
//!
//! let mut config = SimConfig::default();
//! config.world.initial_population = 20;
//!
//! let mut world = WorldBuilder::new()
//!     .with_config(config)
//!     .with_seed(7)
//!     .with_sink(Box::new(NullSink))
//!     .build()
//!     .unwrap();
//!
//! // Ten seconds of simulated time at 60 steps per second
//! for _ in 0..600 {
//!     world.tick(1.0 / 60.0);
//! }
//!
//! let stats = WorldStats::collect(&world);
//! println!("{} creatures, {} species", stats.population, stats.species);
//! ```
//!
//! ## Architecture
//!
//! - [`digilife_core`] - ids, positions, food, phases, configuration and errors
//! - [`digilife_agents`] - genomes, neural controllers, vocal systems, infections
//!   and the per-tick behaviour of a single creature
//! - [`digilife_runtime`] - the world tick engine, epidemics, selection, batched
//!   neural evaluation, statistics and sessions
//!
//! ## Life Cycle
//!
//! | Phase | Complexity | Speed | Efficiency |
//! |-------|------------|-------|------------|
//! | Primitive | < 200 | 0.6 | 1.0 |
//! | Intermediate | < 500 | 0.85 | 0.85 |
//! | Advanced | < 1000 | 1.1 | 0.7 |
//! | Complex | ≥ 1000 | 1.3 | 0.55 |
//!
//! Creatures above complexity 50 steer with their neural controller;
//! below that they follow instinct alone.
//!
//! ## Session Persistence
//!
//! ```rust,no_run
//! use digilife::prelude::*;
//! use std::path::Path;
//!
//! let mut world = WorldBuilder::new().build().unwrap();
//! world.run(100, 1.0 / 60.0);
//! save_world(&world, Path::new(".digilife/current.json")).unwrap();
//!
//! let mut restored = WorldBuilder::new().populated(false).build().unwrap();
//! load_world(&mut restored, Path::new(".digilife/current.json")).unwrap();
//! ```

pub use digilife_agents as agents;
pub use digilife_core as core;
pub use digilife_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use digilife::prelude::*;
/// ```
pub mod prelude {
    pub use digilife_runtime::prelude::*;
}
