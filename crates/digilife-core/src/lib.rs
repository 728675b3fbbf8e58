//! # digilife core
//!
//! Shared vocabulary for the digilife artificial-life simulation.
//!
//! - **types**: creature and disease ids, the world-owned id sequence,
//!   positions, food kinds with their nutrition, evolutionary phases
//! - **config**: every tunable constant, grouped into serde sections
//! - **error**: the error taxonomy for configuration and persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use digilife_core::prelude::*;
//!
//! let mut ids = IdSequence::new();
//! let first = ids.next_id();
//! assert_eq!(first, CreatureId(0));
//! assert_eq!(Phase::from_complexity(650.0), Phase::Advanced);
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod types;
