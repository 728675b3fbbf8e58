//! # digilife runtime
//!
//! The world tick engine and everything that runs alongside it.
//!
//! The [`world::World`] owns every creature and food item and advances
//! them one tick at a time. Around it sit the epidemic scheduler, the
//! population controller, the batched neural evaluator with its CPU and
//! optional GPU backends, a rayon worker pool for read-only scans, event
//! sinks, statistics and JSON session persistence.
//!
//! ```rust
//! use digilife_runtime::prelude::*;
//!
//! let mut world = WorldBuilder::new()
//!     .with_seed(3)
//!     .with_sink(Box::new(NullSink))
//!     .build()
//!     .unwrap();
//! world.run(10, 1.0);
//! let stats = WorldStats::collect(&world);
//! assert_eq!(stats.tick, 10);
//! ```

pub mod backend;
pub mod batch;
pub mod disease;
pub mod evolution;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod metrics;
pub mod prelude;
pub mod session;
pub mod sink;
pub mod workers;
pub mod world;
pub mod world_builder;
