use tracing::{debug, info};

use crate::memristor::Memristor;
use crate::presets::MaterialPreset;
use crate::scope::Sample;
use crate::stimulus::StimulusConfig;

/// One simulation session: a stimulus driving a single device.
///
/// Each tick runs generator -> integrator -> sample to completion, so callers
/// never see partially updated state.
pub struct Simulator {
    pub stimulus: StimulusConfig,
    pub device: Memristor,
    time: f64,
}

impl Simulator {
    pub fn new(device: Memristor, stimulus: StimulusConfig) -> Self {
        Simulator { stimulus, device, time: 0.0 }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advances simulated time by `dt`, drives the device with the voltage at
    /// the new time and returns what was observed.
    pub fn tick(&mut self, dt: f64) -> Sample {
        let t = if dt > 0.0 { self.time + dt } else { self.time };
        self.advance_to(t, dt)
    }

    /// Runs `steps` fixed steps of `dt`, calling `on_sample` after each.
    /// Time is derived from the step index so long runs don't accumulate
    /// rounding error.
    pub fn run<F: FnMut(&Sample)>(&mut self, steps: usize, dt: f64, mut on_sample: F) {
        let start = self.time;
        let dt = if dt > 0.0 { dt } else { 0.0 };
        for k in 1..=steps {
            let sample = self.advance_to(start + (k as f64) * dt, dt);
            on_sample(&sample);
        }
    }

    /// Device back to `w_init`, clock back to zero.
    pub fn reset(&mut self) {
        self.device.reset();
        self.time = 0.0;
    }

    fn advance_to(&mut self, t: f64, dt: f64) -> Sample {
        self.time = t;
        let voltage = self.stimulus.generate(t);
        self.device.update(dt, voltage);
        Sample {
            time: t,
            voltage,
            current: self.device.i(),
            state: self.device.w(),
            resistance: self.device.r(),
            power: self.device.power(),
            overheated: self.device.overheated(),
        }
    }
}

/// Outcome of one preset in a sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepResult {
    pub preset: &'static str,
    pub seed: u64,
    pub final_state: f64,
    pub final_resistance: f64,
    pub peak_power: f64,
    /// Ticks on which the thermal override fired
    pub overheated_ticks: usize,
}

/// Derives a per-instance seed so parallel devices get uncorrelated noise.
pub fn derive_seed(base_seed: u64, index: u64) -> u64 {
    base_seed.wrapping_mul(0x9e3779b97f4a7c15) ^ index.wrapping_mul(0x517cc1b727220a95)
}

/// Runs the same stimulus against each preset, each device owning its own
/// noise stream.
pub fn sweep_presets(
    presets: &[MaterialPreset],
    stimulus: &StimulusConfig,
    steps: usize,
    dt: f64,
    base_seed: u64,
) -> Vec<SweepResult> {
    presets
        .iter()
        .enumerate()
        .map(|(idx, preset)| {
            let seed = derive_seed(base_seed, idx as u64);
            let mut sim = Simulator::new(Memristor::new(preset.params, seed), stimulus.clone());
            let mut peak_power = 0.0f64;
            let mut overheated_ticks = 0;
            sim.run(steps, dt, |s| {
                peak_power = peak_power.max(s.power);
                if s.overheated {
                    overheated_ticks += 1;
                }
            });
            debug!(preset = preset.key, seed, overheated_ticks, "sweep entry finished");
            SweepResult {
                preset: preset.key,
                seed,
                final_state: sim.device.w(),
                final_resistance: sim.device.r(),
                peak_power,
                overheated_ticks,
            }
        })
        .inspect(|r| info!("{:<8} w={:.4} R={:.1}Ω", r.preset, r.final_state, r.final_resistance))
        .collect()
}
