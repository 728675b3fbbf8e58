//! digilife runtime prelude.
//!
//! ```rust
//! use digilife_runtime::prelude::*;
//! ```

pub use crate::world::{World, WorldCounters, WorldEvent};
pub use crate::world_builder::WorldBuilder;

pub use crate::session::{
    list_sessions, load_world, read_world_state, save_world, snapshot_world, SessionMetadata,
    WorldState,
};

pub use crate::metrics::{EnvironmentStatus, History, Notables, WorldStats};

pub use crate::backend::{probe_backend, BackendError, ComputeBackend, CpuBackend};
pub use crate::batch::BatchEvaluator;

#[cfg(feature = "gpu")]
pub use crate::gpu::GpuBackend;

pub use crate::disease::{Disease, DiseaseSystem, EpidemicReport};
pub use crate::evolution::{CullReason, PopulationController, PredatorSummary};
pub use crate::sink::{EventSink, MemorySink, NullSink, TracingSink};
pub use crate::workers::WorkerPool;

pub use digilife_agents::prelude::*;
