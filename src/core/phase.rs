//! Mean-field phase ensemble (Kuramoto).
//!
//! Each oscillator is a phase angle `theta` with a fixed natural frequency
//! `omega`. Every tick the ensemble's mean-field vector is computed once and
//! every phase is pulled toward the population mean phase, weighted by the
//! coupling constant. The magnitude of the mean-field vector is the order
//! parameter `R`: 0 for an incoherent population, 1 for perfect synchrony.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::prng::Prng;

const TAU: f32 = 2.0 * core::f32::consts::PI;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseOscillator {
    /// Phase angle, always wrapped into `[0, 2π)`.
    pub theta: f32,
    /// Natural frequency; fixed for the ensemble's lifetime unless the whole
    /// frequency set is re-centered.
    pub omega: f32,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseConfig {
    pub oscillator_count: usize,

    /// Mean-field coupling constant K.
    pub coupling_k: f32,

    /// Fixed integration step used by [`PhaseEngine::run_for`].
    pub dt: f32,

    /// Center of the natural-frequency distribution.
    pub omega0: f32,

    /// Standard deviation of the natural-frequency distribution.
    pub omega_std: f32,

    // If set, makes initialization reproducible for evaluation.
    pub seed: Option<u64>,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            oscillator_count: 100,
            coupling_k: 2.2,
            dt: 0.03,
            omega0: 1.0,
            omega_std: 0.15,
            seed: None,
        }
    }
}

impl PhaseConfig {
    pub fn with_count(oscillator_count: usize) -> Self {
        Self {
            oscillator_count,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.oscillator_count < 1 {
            return Err(ConfigError::OscillatorCount(self.oscillator_count));
        }
        if !(self.dt > 0.0) {
            return Err(ConfigError::Dt(self.dt));
        }
        if !(self.omega_std >= 0.0) {
            return Err(ConfigError::OmegaStd(self.omega_std));
        }
        Ok(())
    }
}

/// The mean-field engine. Sole owner and mutator of its ensemble.
pub struct PhaseEngine {
    cfg: PhaseConfig,
    oscillators: Vec<PhaseOscillator>,
    rng: Prng,
}

impl PhaseEngine {
    /// Builds a fresh ensemble: phases uniform on `[0, 2π)`, frequencies
    /// drawn as `omega0 + omega_std * randn()`.
    pub fn new(cfg: PhaseConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let mut rng = match cfg.seed {
            Some(seed) => Prng::new(seed),
            None => Prng::from_entropy(),
        };
        let oscillators = draw_ensemble(&cfg, &mut rng);

        Ok(Self {
            cfg,
            oscillators,
            rng,
        })
    }

    /// Replaces the whole ensemble under a new configuration.
    ///
    /// Atomic: if validation fails, the previous ensemble is left untouched.
    pub fn reinitialize(&mut self, cfg: PhaseConfig) -> Result<(), ConfigError> {
        cfg.validate()?;

        let mut rng = match cfg.seed {
            Some(seed) => Prng::new(seed),
            None => Prng::from_entropy(),
        };
        self.oscillators = draw_ensemble(&cfg, &mut rng);
        self.cfg = cfg;
        self.rng = rng;
        Ok(())
    }

    /// Redraws all phases and frequencies under the current configuration.
    pub fn randomize(&mut self) {
        self.oscillators = draw_ensemble(&self.cfg, &mut self.rng);
    }

    /// One Euler tick of the mean-field dynamics.
    ///
    /// The mean-field vector is computed once over the whole ensemble before
    /// any phase moves, so the update cannot depend on iteration order. The
    /// per-oscillator derivative is
    ///
    /// ```text
    /// dθ_i = omega_i + K * (-sin θ_i * mx + cos θ_i * my)
    /// ```
    ///
    /// i.e. `Im(e^{-iθ_i} · (mx + i·my))` scaled by K. Every updated phase
    /// is wrapped back into `[0, 2π)`.
    pub fn step(&mut self, dt: f32) {
        let (mx, my) = self.mean_field();
        let k = self.cfg.coupling_k;

        for osc in &mut self.oscillators {
            let (sin_t, cos_t) = osc.theta.sin_cos();
            let coupling = k * (-sin_t * mx + cos_t * my);
            osc.theta = wrap_tau(osc.theta + dt * (osc.omega + coupling));
        }
    }

    /// Fixed-step catch-up: converts a variable elapsed interval into
    /// `max(1, floor(elapsed / dt))` sub-steps of the configured `dt`.
    /// Returns the number of sub-steps executed.
    pub fn run_for(&mut self, elapsed: f32) -> u32 {
        let steps = ((elapsed / self.cfg.dt).floor() as u32).max(1);
        for _ in 0..steps {
            self.step(self.cfg.dt);
        }
        steps
    }

    /// Magnitude of the mean-field vector, in `[0, 1]`.
    pub fn order_parameter(&self) -> f32 {
        let (mx, my) = self.mean_field();
        (mx * mx + my * my).sqrt()
    }

    /// Shifts every natural frequency so the distribution is centered on
    /// `new_omega0`. Built as a fresh frequency set and applied atomically;
    /// pairwise frequency differences are preserved exactly.
    pub fn recenter_frequencies(&mut self, new_omega0: f32) {
        let delta = new_omega0 - self.cfg.omega0;
        let shifted: Vec<f32> = self.oscillators.iter().map(|o| o.omega + delta).collect();
        for (osc, omega) in self.oscillators.iter_mut().zip(shifted) {
            osc.omega = omega;
        }
        self.cfg.omega0 = new_omega0;
    }

    pub fn oscillators(&self) -> &[PhaseOscillator] {
        &self.oscillators
    }

    pub fn config(&self) -> &PhaseConfig {
        &self.cfg
    }

    fn mean_field(&self) -> (f32, f32) {
        let n = self.oscillators.len() as f32;
        let (sum_x, sum_y) = self
            .oscillators
            .iter()
            .fold((0.0f32, 0.0f32), |(x, y), osc| {
                (x + osc.theta.cos(), y + osc.theta.sin())
            });
        (sum_x / n, sum_y / n)
    }
}

fn draw_ensemble(cfg: &PhaseConfig, rng: &mut Prng) -> Vec<PhaseOscillator> {
    (0..cfg.oscillator_count)
        .map(|_| PhaseOscillator {
            theta: rng.gen_range_f32(0.0, TAU),
            omega: cfg.omega0 + cfg.omega_std * rng.randn(),
        })
        .collect()
}

/// Normalizes any real angle into `[0, 2π)`, negative inputs included.
fn wrap_tau(theta: f32) -> f32 {
    let r = theta % TAU;
    if r < 0.0 {
        r + TAU
    } else {
        r
    }
}
