//! Pulse-coupled integrate-and-fire ensemble (Mirollo–Strogatz).
//!
//! Each oscillator carries an excitability `state` driven by a concave rise
//! function of its elapsed internal time (`phase`):
//!
//! ```text
//! state = f(phase) = 1 - exp(-alpha * phase)
//! ```
//!
//! `f` approaches 1 asymptotically and never reaches it in finite phase,
//! which is why the firing threshold must sit strictly below 1. When an
//! oscillator's state crosses the threshold it fires: state and phase reset
//! to zero and every other oscillator receives a fixed pulse nudging it
//! toward threshold.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::prng::Prng;

pub type OscillatorId = usize;

/// Guard margin below threshold and below 1.0.
///
/// A coupled oscillator is clamped to `threshold - EPS`, so coupling alone
/// can never make it cross threshold within the tick it was coupled. The
/// same margin bounds the argument of the logarithm in the phase back-solve.
pub const EPS: f32 = 1e-3;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PulseOscillator {
    /// Excitability in `[0, threshold)`, monotonically rising between firings.
    pub state: f32,
    /// Elapsed internal time since the last firing.
    pub phase: f32,
    /// Set during the tick this oscillator crossed threshold; cleared at the
    /// start of the next tick, so readers see it between ticks.
    pub just_fired: bool,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PulseConfig {
    pub oscillator_count: usize,

    /// Pulse strength; each firing tick nudges every non-firing oscillator's
    /// state by `coupling_strength * 0.5`.
    pub coupling_strength: f32,

    /// Concavity of the rise function.
    pub alpha: f32,

    /// Firing threshold, strictly inside (0, 1).
    pub threshold: f32,

    /// Fixed integration step used by [`PulseEngine::run_for`].
    pub dt: f32,

    // If set, makes initialization reproducible for evaluation.
    pub seed: Option<u64>,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            oscillator_count: 5,
            coupling_strength: 0.3,
            alpha: 2.0,
            threshold: 0.999,
            dt: 0.008,
            seed: None,
        }
    }
}

impl PulseConfig {
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
        if !(self.alpha > 0.0) {
            return Err(ConfigError::Alpha(self.alpha));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        if !(self.dt > 0.0) {
            return Err(ConfigError::Dt(self.dt));
        }
        if !(self.coupling_strength >= 0.0) {
            return Err(ConfigError::CouplingStrength(self.coupling_strength));
        }
        Ok(())
    }
}

/// The pulse-coupled engine. Sole owner and mutator of its ensemble.
pub struct PulseEngine {
    cfg: PulseConfig,
    oscillators: Vec<PulseOscillator>,
    rng: Prng,

    /// Individual firings, not firing ticks.
    fire_count: u64,
    tick_count: u64,
}

impl PulseEngine {
    /// Builds a fresh ensemble. Initial states are drawn uniformly from
    /// `[0, 0.6)`; each phase is back-solved from its state so the
    /// rise-function invariant holds from the first tick.
    pub fn new(cfg: PulseConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let mut rng = match cfg.seed {
            Some(seed) => Prng::new(seed),
            None => Prng::from_entropy(),
        };
        let oscillators = draw_ensemble(&cfg, &mut rng, 0.6);

        Ok(Self {
            cfg,
            oscillators,
            rng,
            fire_count: 0,
            tick_count: 0,
        })
    }

    /// Replaces the whole ensemble under a new configuration.
    ///
    /// Atomic: if validation fails, the previous ensemble and counters are
    /// left untouched.
    pub fn reinitialize(&mut self, cfg: PulseConfig) -> Result<(), ConfigError> {
        cfg.validate()?;

        let mut rng = match cfg.seed {
            Some(seed) => Prng::new(seed),
            None => Prng::from_entropy(),
        };
        self.oscillators = draw_ensemble(&cfg, &mut rng, 0.6);
        self.cfg = cfg;
        self.rng = rng;
        self.fire_count = 0;
        self.tick_count = 0;
        Ok(())
    }

    /// Redraws every oscillator in place (wider spread than `new`, matching
    /// the interactive "randomize") and resets the counters.
    pub fn randomize(&mut self) {
        self.oscillators = draw_ensemble(&self.cfg, &mut self.rng, 0.8);
        self.fire_count = 0;
        self.tick_count = 0;
    }

    /// One fixed-size integration tick.
    ///
    /// The tick runs in four ordered phases so the outcome cannot depend on
    /// iteration order, and firings within one tick are exactly simultaneous:
    ///
    /// 1. **Integrate**: advance every phase by `dt`, recompute states.
    /// 2. **Detect**: collect the set of oscillators at or above threshold,
    ///    judged on phase-1 results only.
    /// 3. **Fire**: reset each detected oscillator and count each firing.
    /// 4. **Couple**: if anything fired, nudge every non-firing oscillator's
    ///    state by `coupling_strength * 0.5`, clamped to `threshold - EPS`,
    ///    and back-solve its phase to keep `state == f(phase)`.
    ///
    /// No reader can observe the ensemble between phases.
    pub fn step(&mut self, dt: f32) {
        let alpha = self.cfg.alpha;
        let threshold = self.cfg.threshold;

        // `just_fired` markers from the previous tick have been visible to
        // readers; retire them before integrating.
        for osc in &mut self.oscillators {
            osc.just_fired = false;
        }

        // Phase 1: integrate.
        for osc in &mut self.oscillators {
            osc.phase += dt;
            osc.state = 1.0 - (-alpha * osc.phase).exp();
        }

        // Phase 2: detect threshold crossings.
        let fired: Vec<OscillatorId> = self
            .oscillators
            .iter()
            .enumerate()
            .filter(|(_, osc)| osc.state >= threshold)
            .map(|(id, _)| id)
            .collect();

        // Phase 3: fire and reset.
        for &id in &fired {
            let osc = &mut self.oscillators[id];
            osc.state = 0.0;
            osc.phase = 0.0;
            osc.just_fired = true;
            self.fire_count += 1;
        }

        // Phase 4: pulse-couple everyone that did not fire this tick.
        if !fired.is_empty() {
            let boost = self.cfg.coupling_strength * 0.5;
            let ceiling = threshold - EPS;
            for osc in &mut self.oscillators {
                if osc.just_fired {
                    continue;
                }
                osc.state = (osc.state + boost).min(ceiling);
                osc.phase = back_solve_phase(osc.state, alpha);
            }
        }

        self.tick_count += 1;
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

    /// Variance-based coherence score in `[0, 1]`.
    ///
    /// `1 - variance(states) / 0.25`, floored at 0; `0.25` is the maximum
    /// variance of a value confined to `[0, 1]`. A single oscillator (or an
    /// empty ensemble) scores 0.
    pub fn synchronization(&self) -> f32 {
        let n = self.oscillators.len();
        if n < 2 {
            return 0.0;
        }

        let mean = self.oscillators.iter().map(|o| o.state).sum::<f32>() / n as f32;
        let variance = self
            .oscillators
            .iter()
            .map(|o| {
                let d = o.state - mean;
                d * d
            })
            .sum::<f32>()
            / n as f32;

        (1.0 - variance / 0.25).max(0.0)
    }

    pub fn oscillators(&self) -> &[PulseOscillator] {
        &self.oscillators
    }

    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &PulseConfig {
        &self.cfg
    }
}

fn draw_ensemble(cfg: &PulseConfig, rng: &mut Prng, state_span: f32) -> Vec<PulseOscillator> {
    (0..cfg.oscillator_count)
        .map(|_| {
            let state = rng.gen_range_f32(0.0, state_span);
            PulseOscillator {
                state,
                phase: back_solve_phase(state, cfg.alpha),
                just_fired: false,
            }
        })
        .collect()
}

/// Inverts the rise function: `phase = -ln(1 - state) / alpha`.
///
/// The state is clamped into `[0, 1 - EPS]` first so floating-point
/// accumulation at or above 1 can never feed the logarithm a non-positive
/// argument. This is an expected numeric edge, not an error.
fn back_solve_phase(state: f32, alpha: f32) -> f32 {
    let s = state.clamp(0.0, 1.0 - EPS);
    -(1.0 - s).ln() / alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_engine(n: usize) -> PulseEngine {
        PulseEngine::new(PulseConfig::with_count(n).with_seed(1)).unwrap()
    }

    /// Pins oscillator `i` to a known state with a consistent phase.
    fn set_state(engine: &mut PulseEngine, i: usize, state: f32) {
        let alpha = engine.cfg.alpha;
        engine.oscillators[i].state = state;
        engine.oscillators[i].phase = back_solve_phase(state, alpha);
        engine.oscillators[i].just_fired = false;
    }

    #[test]
    fn single_oscillator_fires_at_the_predicted_time() {
        let cfg = PulseConfig {
            oscillator_count: 1,
            coupling_strength: 0.3,
            alpha: 2.0,
            threshold: 0.999,
            dt: 0.008,
            seed: Some(1),
        };
        let mut engine = PulseEngine::new(cfg).unwrap();
        engine.oscillators[0].state = 0.0;
        engine.oscillators[0].phase = 0.0;

        let t_star = -(1.0f32 - cfg.threshold).ln() / cfg.alpha;

        let mut fired_at = None;
        for _ in 0..2_000 {
            engine.step(cfg.dt);
            if engine.oscillators[0].just_fired {
                fired_at = Some(engine.tick_count());
                break;
            }
        }

        let fired_at = fired_at.expect("oscillator never fired");
        let fired_time = fired_at as f32 * cfg.dt;
        assert!(
            (fired_time - t_star).abs() <= cfg.dt,
            "fired at t={fired_time}, predicted t*={t_star}"
        );
        assert_eq!(engine.fire_count(), 1);
    }

    #[test]
    fn firing_resets_state_and_phase_and_flag_lasts_one_tick() {
        let mut engine = quiet_engine(2);
        set_state(&mut engine, 0, 0.9995);
        set_state(&mut engine, 1, 0.2);

        engine.step(engine.config().dt);
        assert!(engine.oscillators()[0].just_fired);
        assert_eq!(engine.oscillators()[0].state, 0.0);
        assert_eq!(engine.oscillators()[0].phase, 0.0);
        assert_eq!(engine.fire_count(), 1);

        // The flag is retired at the start of the next tick, and a freshly
        // reset oscillator cannot re-fire immediately.
        engine.step(engine.config().dt);
        assert!(!engine.oscillators()[0].just_fired);
    }

    #[test]
    fn each_individual_firing_is_counted() {
        let mut engine = quiet_engine(3);
        set_state(&mut engine, 0, 0.9995);
        set_state(&mut engine, 1, 0.9995);
        set_state(&mut engine, 2, 0.1);

        engine.step(engine.config().dt);
        assert_eq!(engine.fire_count(), 2);
        assert_eq!(engine.tick_count(), 1);
    }

    #[test]
    fn coupled_oscillators_stay_below_threshold() {
        let mut engine = quiet_engine(4);
        set_state(&mut engine, 0, 0.9995); // will fire
        set_state(&mut engine, 1, 0.997); // would cross with the boost
        set_state(&mut engine, 2, 0.5);
        set_state(&mut engine, 3, 0.0);

        engine.step(engine.config().dt);

        let threshold = engine.config().threshold;
        for osc in engine.oscillators().iter().filter(|o| !o.just_fired) {
            assert!(osc.state < threshold, "coupled state {} >= threshold", osc.state);
        }
    }

    #[test]
    fn coupling_keeps_state_and_phase_consistent() {
        let mut engine = quiet_engine(2);
        set_state(&mut engine, 0, 0.9995);
        set_state(&mut engine, 1, 0.4);

        engine.step(engine.config().dt);

        let alpha = engine.config().alpha;
        let osc = engine.oscillators()[1];
        let expected = 1.0 - (-alpha * osc.phase).exp();
        assert!((osc.state - expected).abs() < 1e-5);
    }

    #[test]
    fn no_coupling_without_a_firing() {
        let mut engine = quiet_engine(2);
        set_state(&mut engine, 0, 0.3);
        set_state(&mut engine, 1, 0.6);
        let dt = engine.config().dt;
        let alpha = engine.config().alpha;
        let before: Vec<f32> = engine.oscillators().iter().map(|o| o.phase).collect();

        engine.step(dt);

        // Pure integration: each phase advanced by exactly dt.
        for (osc, phase_before) in engine.oscillators().iter().zip(before) {
            assert!((osc.phase - (phase_before + dt)).abs() < 1e-6);
            let expected = 1.0 - (-alpha * osc.phase).exp();
            assert!((osc.state - expected).abs() < 1e-6);
        }
        assert_eq!(engine.fire_count(), 0);
    }

    #[test]
    fn synchronization_is_bounded_and_hits_the_extremes() {
        let mut engine = quiet_engine(5);
        for i in 0..5 {
            set_state(&mut engine, i, 0.37);
        }
        assert!((engine.synchronization() - 1.0).abs() < 1e-6);

        // Spread the states; score stays inside [0, 1].
        for i in 0..5 {
            set_state(&mut engine, i, i as f32 * 0.2);
        }
        let sync = engine.synchronization();
        assert!((0.0..=1.0).contains(&sync));

        let single = quiet_engine(1);
        assert_eq!(single.synchronization(), 0.0);
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let base = PulseConfig::default();

        let cases = [
            (
                PulseConfig {
                    oscillator_count: 0,
                    ..base
                },
                ConfigError::OscillatorCount(0),
            ),
            (
                PulseConfig { alpha: 0.0, ..base },
                ConfigError::Alpha(0.0),
            ),
            (
                PulseConfig {
                    threshold: 1.0,
                    ..base
                },
                ConfigError::Threshold(1.0),
            ),
            (
                PulseConfig {
                    threshold: 0.0,
                    ..base
                },
                ConfigError::Threshold(0.0),
            ),
            (
                PulseConfig { dt: 0.0, ..base },
                ConfigError::Dt(0.0),
            ),
            (
                PulseConfig {
                    coupling_strength: -0.1,
                    ..base
                },
                ConfigError::CouplingStrength(-0.1),
            ),
        ];

        for (cfg, expected) in cases {
            assert_eq!(PulseEngine::new(cfg).err(), Some(expected));
        }
    }

    #[test]
    fn failed_reinitialize_leaves_the_ensemble_untouched() {
        let mut engine = quiet_engine(3);
        engine.step(engine.config().dt);
        let before: Vec<f32> = engine.oscillators().iter().map(|o| o.state).collect();
        let ticks_before = engine.tick_count();

        let bad = PulseConfig {
            threshold: 2.0,
            ..*engine.config()
        };
        assert!(engine.reinitialize(bad).is_err());

        let after: Vec<f32> = engine.oscillators().iter().map(|o| o.state).collect();
        assert_eq!(before, after);
        assert_eq!(engine.tick_count(), ticks_before);
        assert_eq!(engine.config().oscillator_count, 3);
    }

    #[test]
    fn reinitialize_replaces_the_ensemble_wholesale() {
        let mut engine = quiet_engine(3);
        engine.step(engine.config().dt);
        assert!(engine.tick_count() > 0);

        engine
            .reinitialize(PulseConfig::with_count(7).with_seed(2))
            .unwrap();
        assert_eq!(engine.oscillators().len(), 7);
        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.fire_count(), 0);
    }

    #[test]
    fn randomize_redraws_and_resets_counters() {
        let mut engine = quiet_engine(6);
        for _ in 0..100 {
            engine.step(engine.config().dt);
        }
        engine.randomize();
        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.fire_count(), 0);
        for osc in engine.oscillators() {
            assert!((0.0..0.8).contains(&osc.state));
            assert!(!osc.just_fired);
        }
    }

    #[test]
    fn run_for_executes_fixed_substeps() {
        let mut engine = quiet_engine(2);
        let dt = engine.config().dt;

        assert_eq!(engine.run_for(dt * 5.0 + dt * 0.5), 5);
        assert_eq!(engine.tick_count(), 5);

        // Short real frames still advance one step.
        assert_eq!(engine.run_for(dt * 0.1), 1);
        assert_eq!(engine.tick_count(), 6);
    }

    /// Mirollo–Strogatz scenario: three oscillators with nearby initial
    /// states settle into phase-locked firing. The two trailing oscillators
    /// are absorbed into an exactly simultaneous pair after the first firing
    /// round, and the round spread stops growing well below the natural
    /// period.
    #[test]
    fn nearby_oscillators_lock_their_firing_times() {
        let cfg = PulseConfig {
            oscillator_count: 3,
            coupling_strength: 0.3,
            alpha: 2.0,
            threshold: 0.999,
            dt: 0.008,
            seed: Some(5),
        };
        let mut engine = PulseEngine::new(cfg).unwrap();
        set_state(&mut engine, 0, 0.30);
        set_state(&mut engine, 1, 0.32);
        set_state(&mut engine, 2, 0.34);

        // Fire ticks per oscillator, in firing order.
        let mut fires: Vec<Vec<u64>> = vec![Vec::new(); 3];
        for _ in 0..40_000 {
            engine.step(cfg.dt);
            for (id, osc) in engine.oscillators().iter().enumerate() {
                if osc.just_fired {
                    fires[id].push(engine.tick_count());
                }
            }
        }

        let rounds = fires.iter().map(|f| f.len()).min().unwrap();
        assert!(rounds >= 20, "expected many firing rounds, got {rounds}");

        // Oscillators 0 and 1 receive the same clamped pulse in the first
        // firing round and stay exactly simultaneous from then on.
        for k in 1..rounds {
            assert_eq!(fires[0][k], fires[1][k], "pair diverged at round {k}");
        }

        // The whole ensemble is phase-locked: per-round spread settles to a
        // constant far below the uncoupled period.
        let spread = |k: usize| {
            let ts = [fires[0][k], fires[1][k], fires[2][k]];
            ts.iter().max().unwrap() - ts.iter().min().unwrap()
        };
        let natural_period_ticks =
            ((-(1.0f32 - cfg.threshold).ln() / cfg.alpha) / cfg.dt) as u64;
        let last = spread(rounds - 1);
        assert!(last <= spread(1), "round spread grew: {} -> {last}", spread(1));
        assert!(
            last < natural_period_ticks / 4,
            "spread {last} not small against period {natural_period_ticks}"
        );
        for k in rounds.saturating_sub(5)..rounds {
            assert_eq!(spread(k), last, "spread still drifting at round {k}");
        }
    }
}
