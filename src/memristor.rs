use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

use crate::models::{rk4_step, DeviceParameters, MemristorPhysics};

/// Relative standard deviation of the measurement noise.
pub const NOISE_FRACTION: f64 = 0.05;

/// A single memristive device: internal state `w`, material parameters and the
/// noise stream of its measurement circuit.
///
/// Every `update` draws one standard normal sample, or two when the thermal
/// override fires, so a fixed seed replays a run exactly.
#[derive(Clone)]
pub struct Memristor {
    params: DeviceParameters,
    w: f64,
    r: f64,
    raw_i: f64,
    i: f64,
    power: f64,
    overheated: bool,
    seed: u64,
    rng: ChaCha8Rng,
}

impl Memristor {
    pub fn new(params: DeviceParameters, seed: u64) -> Self {
        let w = params.clip_state(params.w_init);
        Self {
            params,
            w,
            r: params.resistance(w),
            raw_i: 0.0,
            i: 0.0,
            power: 0.0,
            overheated: false,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeds the noise stream from the thread RNG. The chosen seed is kept so
    /// the run can be replayed with `new`.
    pub fn with_random_seed(params: DeviceParameters) -> Self {
        Self::new(params, rand::random())
    }

    /// Restarts the noise stream. State and parameters are untouched.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restores `w` to `w_init`. Nothing else changes.
    pub fn reset(&mut self) {
        self.w = self.params.w_init;
    }

    /// Advances the device by `dt` seconds under a constant `voltage`.
    ///
    /// Negative or NaN `dt` counts as zero: time only moves forward.
    pub fn update(&mut self, dt: f64, voltage: f64) {
        let dt = if dt > 0.0 { dt } else { 0.0 };

        let w_new = rk4_step(&self.params, dt, voltage, self.w);
        self.w = self.params.clip_state(w_new);
        self.observe(voltage);
        self.overheated = false;

        if self.temperature_rise() > self.params.t_critical {
            // burnout pushes the filament back toward the off state
            let w_before = self.w;
            self.w = self.params.clip_state(self.w - dt * self.params.k_off.abs());
            self.observe(voltage);
            self.overheated = true;
            debug!(
                w_before,
                w_after = self.w,
                power = self.power,
                "thermal runaway: forced degradation step"
            );
        }
    }

    // derive r, i and power from the current w; consumes one noise sample
    fn observe(&mut self, voltage: f64) {
        self.r = self.params.resistance(self.w);
        self.raw_i = limit_current(voltage / self.r, self.params.i_compliance);
        let z: f64 = StandardNormal.sample(&mut self.rng);
        self.i = self.raw_i + z * (NOISE_FRACTION * self.raw_i);
        self.power = (self.i * voltage).abs();
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn i(&self) -> f64 {
        self.i
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    /// Compliance-limited current of the last evaluation, before noise.
    pub fn raw_current(&self) -> f64 {
        self.raw_i
    }

    /// Lumped heat proxy `power * theta_thermal`.
    pub fn temperature_rise(&self) -> f64 {
        self.power * self.params.theta_thermal
    }

    /// Whether the thermal override fired during the last update.
    pub fn overheated(&self) -> bool {
        self.overheated
    }

    pub fn iv_point(&self, v: f64) -> (f64, f64) {
        (v, self.i)
    }

    pub fn params(&self) -> &DeviceParameters {
        &self.params
    }

    /// Swaps material parameters mid-simulation. State is kept; the next
    /// update uses the new values.
    pub fn set_params(&mut self, params: DeviceParameters) {
        self.params = params;
    }
}

impl fmt::Debug for Memristor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Memristor(w={:.4}, r={:.1}Ω, i={:.3e}A, p={:.3e}W, seed={})",
            self.w, self.r, self.i, self.power, self.seed
        )
    }
}

// Clamp to [-limit, limit] without panicking on a malformed (negative) limit.
fn limit_current(raw: f64, limit: f64) -> f64 {
    let mut i = raw;
    if i > limit {
        i = limit;
    }
    if i < -limit {
        i = -limit;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn device() -> Memristor {
        Memristor::new(DeviceParameters::default(), 7)
    }

    #[test]
    fn test_new_starts_at_w_init() {
        let params = DeviceParameters { w_init: 0.3, ..Default::default() };
        let m = Memristor::new(params, 1);
        assert_eq!(m.w(), 0.3);
        assert_eq!(m.r(), params.resistance(0.3));
        assert_eq!(m.i(), 0.0);
        assert_eq!(m.seed(), 1);
    }

    #[test]
    fn test_reset_restores_w_init_only() {
        let mut m = device();
        for _ in 0..5 {
            m.update(0.001, 2.0);
        }
        assert!(m.w() > 0.0);
        let r_before = m.r();
        m.reset();
        assert_eq!(m.w(), 0.0);
        // derived quantities wait for the next update
        assert_eq!(m.r(), r_before);
        m.reset();
        assert_eq!(m.w(), 0.0);
    }

    #[test]
    fn test_set_params_keeps_state() {
        let mut m = device();
        m.update(0.001, 2.0);
        let w = m.w();
        let fast = DeviceParameters { k_off: 1000.0, ..Default::default() };
        m.set_params(fast);
        assert_eq!(m.w(), w);
        assert_eq!(m.params().k_off, 1000.0);
        m.update(0.0001, 2.0);
        assert_relative_eq!(m.w(), w + 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_compliance_clamps_raw_current() {
        let params = DeviceParameters { w_init: 1.0, ..Default::default() };
        let mut m = Memristor::new(params, 3);
        // 0.9 V / 100 Ω = 9 mA, under the 50 mA limit
        m.update(0.001, 0.9);
        assert_relative_eq!(m.raw_current(), 0.009, epsilon = 1e-15);
        m.update(0.0, 50.0);
        assert_eq!(m.raw_current(), params.i_compliance);
        m.update(0.0, -50.0);
        assert_eq!(m.raw_current(), -params.i_compliance);
    }

    #[test]
    fn test_noise_scales_with_current() {
        let params = DeviceParameters { w_init: 1.0, ..Default::default() };
        let mut m = Memristor::new(params, 11);
        for _ in 0..200 {
            m.update(0.0, 0.5);
            let rel = (m.i() - m.raw_current()) / m.raw_current();
            // 8 sigma
            assert!(rel.abs() < 0.4, "relative noise {rel}");
        }
    }

    #[test]
    fn test_negative_dt_is_zero_step() {
        let mut m = device();
        m.update(-1.0, 5.0);
        assert_eq!(m.w(), 0.0);
        m.update(f64::NAN, 5.0);
        assert_eq!(m.w(), 0.0);
    }

    #[test]
    fn test_same_seed_replays() {
        let mut a = device();
        let mut b = device();
        for k in 0..100 {
            let v = if k % 2 == 0 { 1.5 } else { -1.5 };
            a.update(0.001, v);
            b.update(0.001, v);
            assert_eq!(a.i(), b.i());
            assert_eq!(a.w(), b.w());
        }
    }

    #[test]
    fn test_reseed_restarts_stream() {
        let mut a = device();
        a.update(0.0, 0.5);
        let first = a.i();
        a.update(0.0, 0.5);
        a.reseed(7);
        a.update(0.0, 0.5);
        assert_eq!(a.i(), first);
    }

    #[test]
    fn test_limit_current_with_negative_limit() {
        assert_eq!(limit_current(0.2, 0.1), 0.1);
        assert_eq!(limit_current(-0.2, 0.1), -0.1);
        assert_eq!(limit_current(0.05, 0.1), 0.05);
        assert_eq!(limit_current(0.0, -0.1), 0.1);
    }
}
