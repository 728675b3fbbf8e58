//! Event sinks.
//!
//! The world hands every event it produces to an injected [`EventSink`].
//! Sinks are fire-and-forget: they cannot fail and never influence the
//! simulation.

use crate::world::WorldEvent;
use digilife_agents::habitat::CreatureEvent;
use digilife_core::config::DebugFlags;
use digilife_core::types::Tick;
use std::sync::{Arc, Mutex};

pub trait EventSink: Send {
    fn record(&mut self, tick: Tick, event: &WorldEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _tick: Tick, _event: &WorldEvent) {}
}

/// Logs events through `tracing`.
///
/// Births, deaths and vocalizations go to `info` when their debug toggle is
/// on and to `debug` otherwise. Outbreaks and eradications are always `info`.
#[derive(Debug, Default, Clone)]
pub struct TracingSink {
    flags: DebugFlags,
}

impl TracingSink {
    pub fn new(flags: DebugFlags) -> Self {
        Self { flags }
    }
}

impl EventSink for TracingSink {
    fn record(&mut self, tick: Tick, event: &WorldEvent) {
        match event {
            WorldEvent::Creature(CreatureEvent::Born { parent, child, generation }) => {
                if self.flags.log_births {
                    tracing::info!(tick, %parent, %child, generation, "creature born");
                } else {
                    tracing::debug!(tick, %parent, %child, generation, "creature born");
                }
            }
            WorldEvent::Creature(CreatureEvent::Vocalized { speaker, word, listeners }) => {
                if self.flags.log_vocalizations {
                    tracing::info!(tick, %speaker, %word, listeners, "creature spoke");
                } else {
                    tracing::trace!(tick, %speaker, %word, listeners, "creature spoke");
                }
            }
            WorldEvent::Creature(CreatureEvent::Predation { predator, prey, energy_gained }) => {
                tracing::debug!(tick, %predator, %prey, energy_gained, "predation");
            }
            WorldEvent::Creature(other) => {
                tracing::trace!(tick, event = ?other, "creature event");
            }
            WorldEvent::Died { id, age, generation, fitness, cause } => {
                if self.flags.log_deaths {
                    tracing::info!(tick, %id, age, generation, fitness, ?cause, "creature died");
                } else {
                    tracing::debug!(tick, %id, age, generation, fitness, ?cause, "creature died");
                }
            }
            WorldEvent::Culled { id, reason } => {
                tracing::debug!(tick, %id, ?reason, "creature culled");
            }
            WorldEvent::Outbreak { name, symptoms, patient_zero, contagion_rate, lethality, .. } => {
                tracing::info!(
                    tick,
                    disease = %name,
                    symptoms = %symptoms.join(", "),
                    %patient_zero,
                    contagion = contagion_rate,
                    lethality,
                    "epidemic outbreak"
                );
            }
            WorldEvent::Eradicated { name, total_infected, deaths, .. } => {
                tracing::info!(tick, disease = %name, total_infected, deaths, "epidemic eradicated");
            }
            WorldEvent::BackendFallback { backend, reason } => {
                tracing::warn!(tick, backend, %reason, "neural batches now run on the CPU");
            }
        }
    }
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<(Tick, WorldEvent)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Tick, WorldEvent)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, tick: Tick, event: &WorldEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push((tick, event.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digilife_core::types::{CreatureId, DeathCause};

    #[test]
    fn test_memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.record(
            3,
            &WorldEvent::Died {
                id: CreatureId(1),
                age: 10.0,
                generation: 0,
                fitness: -50.0,
                cause: DeathCause::Starvation,
            },
        );
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].0, 3);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let mut sink = NullSink;
        sink.record(
            1,
            &WorldEvent::BackendFallback {
                backend: "gpu",
                reason: "lost".into(),
            },
        );
    }
}
