use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Drive waveform shape. The integer encoding is what config documents store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    #[default]
    Dc,
    Sine,
    Triangle,
    Pulse,
    /// Write/erase/read test cycle driven by `PulseSettings`.
    PulseSequence,
}

impl Waveform {
    pub const ALL: [Waveform; 5] = [
        Waveform::Dc,
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Pulse,
        Waveform::PulseSequence,
    ];

    /// Decodes the persisted integer. Unknown values fall back to DC.
    pub fn from_index(idx: i64) -> Self {
        match idx {
            1 => Waveform::Sine,
            2 => Waveform::Triangle,
            3 => Waveform::Pulse,
            4 => Waveform::PulseSequence,
            _ => Waveform::Dc,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            Waveform::Dc => 0,
            Waveform::Sine => 1,
            Waveform::Triangle => 2,
            Waveform::Pulse => 3,
            Waveform::PulseSequence => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Waveform::Dc => "DC",
            Waveform::Sine => "Sine",
            Waveform::Triangle => "Triangle",
            Waveform::Pulse => "Pulse",
            Waveform::PulseSequence => "Pulse Sequence",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dc" => Ok(Waveform::Dc),
            "sine" | "sin" => Ok(Waveform::Sine),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "pulse" | "square" => Ok(Waveform::Pulse),
            "pulse-seq" | "pulse_seq" | "pulse-sequence" | "sequence" => Ok(Waveform::PulseSequence),
            other => Err(format!(
                "unknown waveform '{other}' (expected dc, sine, triangle, pulse, pulse-seq)"
            )),
        }
    }
}

/// Voltage schedule for the pulse-sequence test mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseSettings {
    pub v_set: f64,
    pub v_reset: f64,
    pub v_read: f64,
    /// Duration of each phase (s)
    pub pulse_width: f64,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self { v_set: 2.0, v_reset: -2.0, v_read: 0.2, pulse_width: 0.1 }
    }
}

/// Phase of the pulse-sequence cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulsePhase {
    Set,
    ReadAfterSet,
    Reset,
    ReadAfterReset,
}

impl PulseSettings {
    /// Cycle is set -> read -> reset -> read, each phase `pulse_width` long.
    pub const PHASES: usize = 4;

    pub fn cycle_length(&self) -> f64 {
        Self::PHASES as f64 * self.pulse_width
    }

    /// Active phase at time `t`, or `None` when the width is degenerate.
    pub fn phase_at(&self, t: f64) -> Option<PulsePhase> {
        if !(self.pulse_width > 0.0 && self.pulse_width.is_finite()) {
            return None;
        }
        let local = t.rem_euclid(self.cycle_length());
        // rem_euclid can round up to exactly the cycle length
        let slot = ((local / self.pulse_width) as usize).min(Self::PHASES - 1);
        Some(match slot {
            0 => PulsePhase::Set,
            1 => PulsePhase::ReadAfterSet,
            2 => PulsePhase::Reset,
            _ => PulsePhase::ReadAfterReset,
        })
    }

    pub fn voltage_at(&self, t: f64) -> f64 {
        match self.phase_at(t) {
            Some(PulsePhase::Set) => self.v_set,
            Some(PulsePhase::Reset) => self.v_reset,
            Some(PulsePhase::ReadAfterSet) | Some(PulsePhase::ReadAfterReset) | None => self.v_read,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StimulusConfig {
    pub waveform: Waveform,
    pub amplitude: f64,
    /// Hz; expected positive but not enforced
    pub frequency: f64,
    pub pulse: PulseSettings,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Dc,
            amplitude: 1.0,
            frequency: 1.0,
            pulse: PulseSettings::default(),
        }
    }
}

impl StimulusConfig {
    pub fn new(waveform: Waveform, amplitude: f64, frequency: f64) -> Self {
        Self { waveform, amplitude, frequency, ..Default::default() }
    }

    /// Drive voltage at simulated time `t`. Pure in `t`.
    pub fn generate(&self, t: f64) -> f64 {
        match self.waveform {
            Waveform::Dc => self.amplitude,
            Waveform::Sine => self.amplitude * (2.0 * PI * self.frequency * t).sin(),
            Waveform::Triangle => {
                let x = self.cycle_fraction(t);
                let tri = if x < 0.5 { 4.0 * x - 1.0 } else { 3.0 - 4.0 * x };
                self.amplitude * tri
            }
            Waveform::Pulse => {
                if self.cycle_fraction(t) < 0.5 {
                    self.amplitude
                } else {
                    0.0
                }
            }
            Waveform::PulseSequence => self.pulse.voltage_at(t),
        }
    }

    // frac(t * f) in [0, 1), also for negative t
    fn cycle_fraction(&self, t: f64) -> f64 {
        let x = (t * self.frequency).rem_euclid(1.0);
        if x >= 1.0 {
            0.0
        } else {
            x
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dc_and_sine() {
        let dc = StimulusConfig::new(Waveform::Dc, 1.5, 3.0);
        assert_eq!(dc.generate(0.0), 1.5);
        assert_eq!(dc.generate(123.4), 1.5);

        let sine = StimulusConfig::new(Waveform::Sine, 2.0, 1.0);
        assert_relative_eq!(sine.generate(0.0), 0.0);
        assert_relative_eq!(sine.generate(0.25), 2.0, epsilon = 1e-12);
        assert_relative_eq!(sine.generate(0.75), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_shape() {
        let tri = StimulusConfig::new(Waveform::Triangle, 2.0, 1.0);
        assert_eq!(tri.generate(0.0), -2.0);
        assert_eq!(tri.generate(0.25), 0.0);
        assert_eq!(tri.generate(0.5), 2.0);
        assert_eq!(tri.generate(0.75), 0.0);
        // negative time stays on the same cycle
        assert_eq!(tri.generate(-0.75), 0.0);
        assert_eq!(tri.generate(-0.5), 2.0);
    }

    #[test]
    fn test_pulse_shape() {
        let pulse = StimulusConfig::new(Waveform::Pulse, 3.0, 2.0);
        assert_eq!(pulse.generate(0.0), 3.0);
        assert_eq!(pulse.generate(0.2), 3.0);
        assert_eq!(pulse.generate(0.25), 0.0);
        assert_eq!(pulse.generate(0.4), 0.0);
        assert_eq!(pulse.generate(0.5), 3.0);
    }

    #[test]
    fn test_unknown_index_falls_back_to_dc() {
        assert_eq!(Waveform::from_index(7), Waveform::Dc);
        assert_eq!(Waveform::from_index(-1), Waveform::Dc);
        for wf in Waveform::ALL {
            assert_eq!(Waveform::from_index(wf.index()), wf);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Sine".parse::<Waveform>(), Ok(Waveform::Sine));
        assert_eq!("pulse-seq".parse::<Waveform>(), Ok(Waveform::PulseSequence));
        assert!("sawtooth".parse::<Waveform>().is_err());
    }

    #[test]
    fn test_pulse_sequence_order() {
        let mut cfg = StimulusConfig::new(Waveform::PulseSequence, 9.0, 9.0);
        cfg.pulse = PulseSettings { v_set: 2.0, v_reset: -1.5, v_read: 0.1, pulse_width: 0.5 };

        assert_eq!(cfg.generate(0.1), 2.0);
        assert_eq!(cfg.generate(0.6), 0.1);
        assert_eq!(cfg.generate(1.1), -1.5);
        assert_eq!(cfg.generate(1.6), 0.1);
        // restarts every 2 s
        assert_eq!(cfg.generate(2.1), 2.0);
        assert_eq!(cfg.generate(5.1), -1.5);
        assert_eq!(cfg.pulse.phase_at(1.75), Some(PulsePhase::ReadAfterReset));
    }

    #[test]
    fn test_pulse_sequence_degenerate_width_reads() {
        let mut cfg = StimulusConfig::new(Waveform::PulseSequence, 1.0, 1.0);
        cfg.pulse.pulse_width = 0.0;
        assert_eq!(cfg.generate(0.3), cfg.pulse.v_read);
        cfg.pulse.pulse_width = f64::NAN;
        assert_eq!(cfg.pulse.phase_at(0.3), None);
    }
}
