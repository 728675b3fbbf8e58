//! # digilife agents
//!
//! The creatures of the digilife simulation and everything they carry.
//!
//! - **genome**: instruction sequences with complexity-aware mutation
//! - **neural**: the two-hidden-layer recurrent controller
//! - **vocal**: learned vocabulary chosen by named predicates
//! - **infection**: per-creature disease state
//! - **creature**: movement, feeding, reproduction and the per-tick update
//! - **social**: predation, collaboration, communication and word effects
//! - **habitat**: what the world lends a creature while it updates
//! - **spawn**: food spawn policies
//! - **fitness**: lifetime scores and population statistics
//! - **serialize**: persistence records

pub mod creature;
pub mod fitness;
pub mod genome;
pub mod habitat;
pub mod infection;
pub mod neural;
pub mod prelude;
pub mod serialize;
pub mod social;
pub mod spawn;
pub mod vocal;
