//! # firefly
//!
//! Coupled-oscillator synchronization engines: a pulse-coupled
//! integrate-and-fire model (Mirollo–Strogatz) and a mean-field phase model
//! (Kuramoto), as seen in emergent firefly flashing.
//!
//! The crate is the numerical core only. A presentation layer pushes
//! configuration in, drives `step`/`run_for`, and pulls read-only snapshots
//! back out; rendering and wall-clock pacing live outside.
//!
//! ## Quick Start
//!
//! ```
//! use firefly::prelude::*;
//!
//! let mut pulse = PulseEngine::new(PulseConfig::with_count(5).with_seed(42)).unwrap();
//! let mut kuramoto = PhaseEngine::new(PhaseConfig::with_count(100).with_seed(42)).unwrap();
//!
//! // One simulated frame, converted into fixed-size integration ticks.
//! pulse.run_for(0.016);
//! kuramoto.run_for(0.016);
//!
//! let sync = pulse.synchronization();
//! let r = kuramoto.order_parameter();
//! assert!((0.0..=1.0).contains(&sync));
//! assert!((0.0..=1.0).contains(&r));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialization for configs and observer snapshots
//!
//! ## Modules
//!
//! - [`pulse`]: Mirollo–Strogatz integrate-and-fire engine
//! - [`phase`]: Kuramoto mean-field engine
//! - [`prng`]: seedable PRNG with a Box–Muller normal sampler
//! - [`observer`]: read-only snapshot adapters

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/pulse.rs"]
pub mod pulse;

#[path = "core/phase.rs"]
pub mod phase;

pub mod observer;

/// Prelude module for convenient imports.
///
/// ```
/// use firefly::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::ConfigError;
    pub use crate::observer::{PhaseAdapter, PhaseSnapshot, PulseAdapter, PulseSnapshot};
    pub use crate::phase::{PhaseConfig, PhaseEngine, PhaseOscillator};
    pub use crate::prng::Prng;
    pub use crate::pulse::{OscillatorId, PulseConfig, PulseEngine, PulseOscillator};
}
