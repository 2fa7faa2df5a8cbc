//! JSON persistence for device parameters and stimulus settings.
//!
//! Loading merges: any group or field missing from the document keeps the
//! value it had before the load.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::error::ConfigError;
use crate::models::DeviceParameters;
use crate::stimulus::{StimulusConfig, Waveform};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimConfig {
    pub params: DeviceParameters,
    pub stimulus: StimulusConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    physics: Option<PhysicsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wave: Option<WaveSection>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PhysicsSection {
    v_on: Option<f64>,
    v_off: Option<f64>,
    k_on: Option<f64>,
    k_off: Option<f64>,
    #[serde(rename = "R_on")]
    r_on: Option<f64>,
    #[serde(rename = "R_off")]
    r_off: Option<f64>,
    #[serde(rename = "I_compliance")]
    i_compliance: Option<f64>,
    theta_thermal: Option<f64>,
    #[serde(rename = "T_critical")]
    t_critical: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WaveSection {
    #[serde(rename = "type")]
    kind: Option<i64>,
    pulse_v_set: Option<f64>,
    pulse_v_reset: Option<f64>,
    pulse_v_read: Option<f64>,
    pulse_width: Option<f64>,
}

fn merge(target: &mut f64, value: Option<f64>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl SimConfig {
    pub fn new(params: DeviceParameters, stimulus: StimulusConfig) -> Self {
        Self { params, stimulus }
    }

    fn to_document(&self) -> Document {
        let p = &self.params;
        let pulse = &self.stimulus.pulse;
        Document {
            physics: Some(PhysicsSection {
                v_on: Some(p.v_on),
                v_off: Some(p.v_off),
                k_on: Some(p.k_on),
                k_off: Some(p.k_off),
                r_on: Some(p.r_on),
                r_off: Some(p.r_off),
                i_compliance: Some(p.i_compliance),
                theta_thermal: Some(p.theta_thermal),
                t_critical: Some(p.t_critical),
            }),
            wave: Some(WaveSection {
                kind: Some(self.stimulus.waveform.index()),
                pulse_v_set: Some(pulse.v_set),
                pulse_v_reset: Some(pulse.v_reset),
                pulse_v_read: Some(pulse.v_read),
                pulse_width: Some(pulse.pulse_width),
            }),
        }
    }

    fn apply(&mut self, doc: Document) {
        if let Some(p) = doc.physics {
            let params = &mut self.params;
            merge(&mut params.v_on, p.v_on);
            merge(&mut params.v_off, p.v_off);
            merge(&mut params.k_on, p.k_on);
            merge(&mut params.k_off, p.k_off);
            merge(&mut params.r_on, p.r_on);
            merge(&mut params.r_off, p.r_off);
            merge(&mut params.i_compliance, p.i_compliance);
            merge(&mut params.theta_thermal, p.theta_thermal);
            merge(&mut params.t_critical, p.t_critical);
        }
        if let Some(w) = doc.wave {
            if let Some(kind) = w.kind {
                self.stimulus.waveform = Waveform::from_index(kind);
            }
            let pulse = &mut self.stimulus.pulse;
            merge(&mut pulse.v_set, w.pulse_v_set);
            merge(&mut pulse.v_reset, w.pulse_v_reset);
            merge(&mut pulse.v_read, w.pulse_v_read);
            merge(&mut pulse.pulse_width, w.pulse_width);
        }
    }

    /// Serializes to a 4-space indented JSON document.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.to_document().serialize(&mut ser)?;
        // serde_json only ever writes UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Merges a JSON document into this config.
    pub fn merge_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let doc: Document = serde_json::from_str(json)?;
        self.apply(doc);
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let mut json = self.to_json()?;
        json.push('\n');
        fs::write(path, json).map_err(|e| ConfigError::io(path, e))?;
        info!("saved config to {}", path.display());
        Ok(())
    }

    /// Loads `path` on top of the current values.
    pub fn load_into(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        self.merge_json(&json)?;
        info!("loaded config from {}", path.display());
        Ok(())
    }
}
