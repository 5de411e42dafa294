//! ado::simulation — synthetic observers and dry-run sessions.
//!
//! A [`SimulatedObserver`] answers like a subject whose true psychometric
//! function is known, drawing each response from a seeded
//! `Xoshiro256PlusPlus` stream. [`simulate_session`] runs the usual
//! select → respond → update loop against an engine, which is how hosts check
//! a configuration before running it on people and how the integration tests
//! measure parameter recovery.
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::ado::{
    engine::ADOEngine, errors::ADOResult, psychometric::PsychometricModel, response::Response,
};

/// Observer with fixed true parameters.
#[derive(Debug, Clone)]
pub struct SimulatedObserver {
    model: PsychometricModel,
    threshold: f64,
    slope: f64,
    rng: Xoshiro256PlusPlus,
}

impl SimulatedObserver {
    /// `seed = None` draws the RNG state from OS entropy.
    pub fn new(model: PsychometricModel, threshold: f64, slope: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        SimulatedObserver { model, threshold, slope, rng }
    }

    /// True `P(clear)` at `design`.
    pub fn p_clear(&self, design: f64) -> f64 {
        self.model.p_clear(design, self.threshold, self.slope)
    }

    /// Draw one response at `design`.
    pub fn respond(&mut self, design: f64) -> Response {
        let p = self.p_clear(design);
        Response::from(self.rng.gen::<f64>() < p)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }
}

/// Run `trials` adaptive trials of `observer` through `engine`.
///
/// Returns the `(design, response)` pairs in trial order. Stops at the first
/// update error (e.g. a posterior collapse under `RetainPrevious`) and
/// propagates it; trials completed before the error remain in the engine.
pub fn simulate_session(
    engine: &mut ADOEngine, observer: &mut SimulatedObserver, trials: usize,
) -> ADOResult<Vec<(f64, Response)>> {
    let mut presented = Vec::with_capacity(trials);
    for _ in 0..trials {
        let design = engine.select_next_design();
        let response = observer.respond(design);
        engine.update(design, response)?;
        presented.push((design, response));
    }
    Ok(presented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ado::config::ADOConfig;

    #[test]
    // Purpose
    // -------
    // The empirical clear rate follows the true psychometric function.
    fn responses_follow_the_true_function() {
        let mut obs = SimulatedObserver::new(PsychometricModel::Logistic, 60.0, 0.5, Some(7));
        let n = 4000;
        let far_above = (0..n).filter(|_| obs.respond(80.0).is_clear()).count() as f64 / n as f64;
        let at_threshold = (0..n).filter(|_| obs.respond(60.0).is_clear()).count() as f64 / n as f64;
        let far_below = (0..n).filter(|_| obs.respond(40.0).is_clear()).count() as f64 / n as f64;
        assert!(far_above > 0.99);
        assert!((at_threshold - 0.5).abs() < 0.05);
        assert!(far_below < 0.01);
    }

    #[test]
    fn same_seed_gives_same_responses() {
        let mut a = SimulatedObserver::new(PsychometricModel::Logistic, 55.0, 0.2, Some(42));
        let mut b = SimulatedObserver::new(PsychometricModel::Logistic, 55.0, 0.2, Some(42));
        let ra: Vec<_> = (0..50).map(|i| a.respond(30.0 + i as f64)).collect();
        let rb: Vec<_> = (0..50).map(|i| b.respond(30.0 + i as f64)).collect();
        assert_eq!(ra, rb);
    }

    #[test]
    fn simulated_session_records_every_trial() {
        let mut engine = ADOEngine::new(ADOConfig::default()).unwrap();
        let mut obs = SimulatedObserver::new(PsychometricModel::Logistic, 60.0, 1.0, Some(3));
        let presented = simulate_session(&mut engine, &mut obs, 8).unwrap();
        assert_eq!(presented.len(), 8);
        assert_eq!(engine.trial_count(), 8);
        assert_eq!(engine.history().designs(), presented.iter().map(|p| p.0).collect::<Vec<_>>());
    }
}
