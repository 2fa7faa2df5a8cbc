use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

// Defines the physical behavior of a memristor.
pub trait MemristorPhysics {
    /// Returns the resistance (Ohms) for a given state `w`.
    fn resistance(&self, w: f64) -> f64;

    /// Returns the time derivative dw/dt for state `w` under applied voltage `v`.
    /// The threshold model here ignores `w`; windowed models may not.
    fn drift_rate(&self, v: f64, w: f64) -> f64;

    /// Defines the valid state range (0.0 to 1.0).
    fn clip_state(&self, w: f64) -> f64 {
        w.clamp(0.0, 1.0)
    }
}

/// Material parameters of a threshold-switching (VTEAM style) device.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceParameters {
    pub v_on: f64,  // negative threshold
    pub v_off: f64, // positive threshold
    pub k_on: f64,  // < 0, drives w toward 0
    pub k_off: f64, // > 0, drives w toward 1
    pub alpha_on: f64,
    pub alpha_off: f64,
    pub r_on: f64,  // resistance at w = 1
    pub r_off: f64, // resistance at w = 0
    pub w_init: f64,
    // power -> temperature-rise proxy
    pub theta_thermal: f64,
    pub t_critical: f64,
    // current limiter of the measurement circuit (A)
    pub i_compliance: f64,
}

impl DeviceParameters {
    pub const STANDARD: DeviceParameters = DeviceParameters {
        v_on: -1.0,
        v_off: 1.0,
        k_on: -100.0,
        k_off: 100.0,
        alpha_on: 3.0,
        alpha_off: 3.0,
        r_on: 100.0,
        r_off: 10_000.0,
        w_init: 0.0,
        theta_thermal: 0.01,
        t_critical: 5.0,
        i_compliance: 0.05,
    };

    /// Checks the physically sensible domain. The integrator never calls this;
    /// it is for UI and config layers that want to warn before simulating.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.v_on < 0.0 && 0.0 < self.v_off) {
            return Err(ParameterError::Thresholds { v_on: self.v_on, v_off: self.v_off });
        }
        if !(self.k_on < 0.0 && 0.0 < self.k_off) {
            return Err(ParameterError::DriftSigns { k_on: self.k_on, k_off: self.k_off });
        }
        if !(0.0 < self.r_on && self.r_on < self.r_off) {
            return Err(ParameterError::Resistances { r_on: self.r_on, r_off: self.r_off });
        }
        if !(0.0..=1.0).contains(&self.w_init) {
            return Err(ParameterError::InitialState(self.w_init));
        }
        if !(self.i_compliance > 0.0) {
            return Err(ParameterError::Compliance(self.i_compliance));
        }
        Ok(())
    }
}

impl Default for DeviceParameters {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl MemristorPhysics for DeviceParameters {
    fn resistance(&self, w: f64) -> f64 {
        // linear mapping between r_on (w=1) and r_off (w=0)
        self.r_on + (self.r_off - self.r_on) * (1.0 - w)
    }

    fn drift_rate(&self, v: f64, _w: f64) -> f64 {
        // v_on is negative, so v / v_on - 1 is positive below the threshold
        if v > self.v_off {
            self.k_off * (v / self.v_off - 1.0).powf(self.alpha_off)
        } else if v < self.v_on {
            self.k_on * (v / self.v_on - 1.0).powf(self.alpha_on)
        } else {
            0.0
        }
    }
}

impl fmt::Debug for DeviceParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeviceParameters(v_on={}, v_off={}, k_on={}, k_off={}, alpha={}/{}, r_on={}, r_off={}, w_init={}, theta={}, t_crit={}, i_cc={})",
            self.v_on,
            self.v_off,
            self.k_on,
            self.k_off,
            self.alpha_on,
            self.alpha_off,
            self.r_on,
            self.r_off,
            self.w_init,
            self.theta_thermal,
            self.t_critical,
            self.i_compliance
        )
    }
}

/// One classical Runge-Kutta step of size `dt` with `v` held constant over the
/// sub-steps. The result is not clipped.
pub fn rk4_step<M: MemristorPhysics + ?Sized>(model: &M, dt: f64, v: f64, w0: f64) -> f64 {
    let k1 = model.drift_rate(v, w0);
    let k2 = model.drift_rate(v, w0 + 0.5 * dt * k1);
    let k3 = model.drift_rate(v, w0 + 0.5 * dt * k2);
    let k4 = model.drift_rate(v, w0 + dt * k3);
    w0 + (dt / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resistance_endpoints_exact() {
        let p = DeviceParameters::default();
        assert_eq!(p.resistance(0.0), p.r_off);
        assert_eq!(p.resistance(1.0), p.r_on);
        assert_relative_eq!(p.resistance(0.5), 5050.0);
    }

    #[test]
    fn test_drift_rate_dead_zone() {
        let p = DeviceParameters::default();
        for v in [-1.0, -0.5, 0.0, 0.3, 1.0] {
            assert_eq!(p.drift_rate(v, 0.4), 0.0, "v={v}");
        }
    }

    #[test]
    fn test_drift_rate_polarity() {
        let p = DeviceParameters::default();
        // (2/1 - 1)^3 * 100
        assert_relative_eq!(p.drift_rate(2.0, 0.0), 100.0);
        // (-3/-1 - 1)^3 * -100
        assert_relative_eq!(p.drift_rate(-3.0, 1.0), -800.0);
    }

    #[test]
    fn test_rk4_constant_rate_is_exact() {
        let p = DeviceParameters::default();
        let w = rk4_step(&p, 0.001, 2.0, 0.25);
        assert_relative_eq!(w, 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_clip_state() {
        let p = DeviceParameters::default();
        assert_eq!(p.clip_state(1.7), 1.0);
        assert_eq!(p.clip_state(-0.2), 0.0);
        assert_eq!(p.clip_state(0.3), 0.3);
    }

    #[test]
    fn test_validate() {
        assert!(DeviceParameters::default().validate().is_ok());

        let p = DeviceParameters { v_on: 0.5, ..Default::default() };
        assert!(matches!(p.validate(), Err(ParameterError::Thresholds { .. })));

        let p = DeviceParameters { r_off: 50.0, ..Default::default() };
        assert!(matches!(p.validate(), Err(ParameterError::Resistances { .. })));

        let p = DeviceParameters { w_init: 1.5, ..Default::default() };
        assert_eq!(p.validate(), Err(ParameterError::InitialState(1.5)));
    }
}
