//! Read-only snapshots of the engines.
//!
//! Design intent:
//! - Observers cannot mutate or steer an engine.
//! - Snapshotting is *on-demand* and can allocate; the step loop stays
//!   unchanged.
//! - A snapshot is everything a presentation layer needs to draw one frame:
//!   per-oscillator records plus the aggregate metric and counters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::phase::PhaseEngine;
use crate::pulse::PulseEngine;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PulseOscillatorSnapshot {
    pub id: usize,
    pub state: f32,
    pub phase: f32,
    pub just_fired: bool,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PulseSnapshot {
    pub tick_count: u64,
    pub fire_count: u64,
    pub synchronization: f32,
    pub oscillators: Vec<PulseOscillatorSnapshot>,
}

pub struct PulseAdapter<'a> {
    engine: &'a PulseEngine,
}

impl<'a> PulseAdapter<'a> {
    pub fn new(engine: &'a PulseEngine) -> Self {
        Self { engine }
    }

    pub fn snapshot(&self) -> PulseSnapshot {
        PulseSnapshot {
            tick_count: self.engine.tick_count(),
            fire_count: self.engine.fire_count(),
            synchronization: self.engine.synchronization(),
            oscillators: self
                .engine
                .oscillators()
                .iter()
                .enumerate()
                .map(|(id, osc)| PulseOscillatorSnapshot {
                    id,
                    state: osc.state,
                    phase: osc.phase,
                    just_fired: osc.just_fired,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseOscillatorSnapshot {
    pub id: usize,
    pub theta: f32,
    pub omega: f32,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseSnapshot {
    pub order_parameter: f32,
    pub oscillators: Vec<PhaseOscillatorSnapshot>,
}

pub struct PhaseAdapter<'a> {
    engine: &'a PhaseEngine,
}

impl<'a> PhaseAdapter<'a> {
    pub fn new(engine: &'a PhaseEngine) -> Self {
        Self { engine }
    }

    pub fn snapshot(&self) -> PhaseSnapshot {
        PhaseSnapshot {
            order_parameter: self.engine.order_parameter(),
            oscillators: self
                .engine
                .oscillators()
                .iter()
                .enumerate()
                .map(|(id, osc)| PhaseOscillatorSnapshot {
                    id,
                    theta: osc.theta,
                    omega: osc.omega,
                })
                .collect(),
        }
    }
}
