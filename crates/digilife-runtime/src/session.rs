//! Session persistence: save and restore a world as JSON.
//!
//! A saved world keeps its dimensions, clock, counters, food and every
//! creature's scalar state and genome. Neural weights, vocabularies,
//! infections and outbreaks are not stored; restored creatures get fresh
//! controllers.

use crate::world::{World, WorldCounters};
use digilife_agents::creature::Creature;
use digilife_agents::serialize::CreatureRecord;
use digilife_core::error::{DigiError, Result};
use digilife_core::types::{FoodItem, Tick};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Extension used for saved worlds.
pub const SESSION_EXTENSION: &str = "json";

/// Serializable snapshot of a world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub width: f64,
    pub height: f64,
    pub tick: Tick,
    #[serde(default)]
    pub counters: WorldCounters,
    #[serde(default)]
    pub food: Vec<FoodItem>,
    pub creatures: Vec<CreatureRecord>,
    pub metadata: SessionMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: String,
    pub tick: Tick,
    pub creature_count: usize,
    #[serde(default)]
    pub food_count: usize,
}

/// Capture the world's persistent state.
pub fn snapshot_world(world: &World) -> WorldState {
    let creatures: Vec<CreatureRecord> = world.creatures.iter().map(Creature::to_record).collect();
    WorldState {
        width: world.width,
        height: world.height,
        tick: world.tick,
        counters: world.counters,
        food: world.food.clone(),
        metadata: SessionMetadata {
            session_id: uuid::Uuid::new_v4().to_string(),
            tick: world.tick,
            creature_count: creatures.len(),
            food_count: world.food.len(),
        },
        creatures,
    }
}

/// Save the world to `path`, creating parent directories as needed.
pub fn save_world(world: &World, path: &Path) -> Result<SessionMetadata> {
    let state = snapshot_world(world);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(&state)?;
    std::fs::write(path, json)?;
    tracing::info!(
        path = %path.display(),
        tick = state.metadata.tick,
        creatures = state.metadata.creature_count,
        "saved world"
    );
    Ok(state.metadata)
}

/// Read and validate a saved world without applying it.
pub fn read_world_state(path: &Path) -> Result<WorldState> {
    if !path.exists() {
        return Err(DigiError::session_not_found(path.display().to_string()));
    }
    let json = std::fs::read_to_string(path)?;
    let state: WorldState =
        serde_json::from_str(&json).map_err(|e| DigiError::corrupt_session(e.to_string()))?;
    validate_state(&state)?;
    Ok(state)
}

fn validate_state(state: &WorldState) -> Result<()> {
    if !(state.width.is_finite() && state.height.is_finite()) || state.width <= 0.0 || state.height <= 0.0 {
        return Err(DigiError::corrupt_session(format!(
            "invalid world size {}x{}",
            state.width, state.height
        )));
    }
    let mut seen = HashSet::with_capacity(state.creatures.len());
    for record in &state.creatures {
        if !record.genome.is_within_bounds() {
            return Err(DigiError::corrupt_session(format!(
                "creature {} has a genome of length {}",
                record.id,
                record.genome.len()
            )));
        }
        if !(record.x.is_finite() && record.y.is_finite() && record.energy.is_finite()) {
            return Err(DigiError::corrupt_session(format!(
                "creature {} has non-finite state",
                record.id
            )));
        }
        if !seen.insert(record.id) {
            return Err(DigiError::corrupt_session(format!("duplicate creature id {}", record.id)));
        }
    }
    Ok(())
}

/// Replace the world's contents with the session at `path`.
///
/// The world is left untouched when the file is missing or invalid.
pub fn load_world(world: &mut World, path: &Path) -> Result<SessionMetadata> {
    let state = read_world_state(path)?;
    if state.width != world.width || state.height != world.height {
        tracing::info!(
            saved = %format!("{}x{}", state.width, state.height),
            current = %format!("{}x{}", world.width, world.height),
            "adopting saved world size"
        );
    }

    let (width, height) = (state.width, state.height);
    let creatures: Vec<Creature> = state
        .creatures
        .iter()
        .map(|record| {
            let mut creature = Creature::from_record(record, &world.config, &mut world.rng);
            creature.position.x = creature.position.x.clamp(0.0, width);
            creature.position.y = creature.position.y.clamp(0.0, height);
            creature
        })
        .collect();
    let food: Vec<FoodItem> = state
        .food
        .into_iter()
        .filter(|f| f.position.x >= 0.0 && f.position.x <= width && f.position.y >= 0.0 && f.position.y <= height)
        .collect();

    world.replace_contents((width, height), state.tick, state.counters, creatures, food);
    tracing::info!(
        path = %path.display(),
        tick = state.metadata.tick,
        creatures = world.population(),
        "loaded world"
    );
    Ok(state.metadata)
}

/// Saved sessions in `dir`, sorted by file name. A missing directory is empty.
pub fn list_sessions(dir: &Path) -> Result<Vec<(PathBuf, SessionMetadata)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut sessions = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SESSION_EXTENSION) {
            continue;
        }
        match read_world_state(&path) {
            Ok(state) => sessions.push((path, state.metadata)),
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping unreadable session"),
        }
    }
    sessions.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(sessions)
}
