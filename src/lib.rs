//! Single-device memristor simulator.
//!
//! A [`StimulusConfig`] produces the drive voltage for simulated time `t`; a
//! [`Memristor`] integrates its internal state `w` under that voltage with
//! RK4, then derives resistance, compliance-limited noisy current and
//! dissipated power, and applies the thermal-runaway override. [`Simulator`]
//! ties the two together one tick at a time.
//!
//! ```
//! use memristor_sim::{DeviceParameters, Memristor, Simulator, StimulusConfig, Waveform};
//!
//! let device = Memristor::new(DeviceParameters::default(), 42);
//! let mut sim = Simulator::new(device, StimulusConfig::new(Waveform::Dc, 2.0, 1.0));
//! sim.run(1000, 0.001, |_| {});
//! assert_eq!(sim.device.w(), 1.0);
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod memristor;
pub mod models;
pub mod presets;
pub mod scope;
pub mod session;
pub mod stimulus;
pub mod three_view;

pub use camera::OrbitCamera;
pub use config::SimConfig;
pub use error::{ConfigError, ParameterError};
pub use memristor::Memristor;
pub use models::{DeviceParameters, MemristorPhysics};
pub use presets::{find_preset, presets, MaterialPreset};
pub use scope::{Sample, ScrollingBuffer};
pub use session::{sweep_presets, Simulator, SweepResult};
pub use stimulus::{PulseSettings, StimulusConfig, Waveform};
