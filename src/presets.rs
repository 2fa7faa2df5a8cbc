//! Material library: named parameter sets used to re-seed a live device.

use crate::models::DeviceParameters;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialPreset {
    /// Short lowercase lookup key (CLI)
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub params: DeviceParameters,
}

pub const PRESETS: [MaterialPreset; 4] = [
    MaterialPreset {
        key: "tio2",
        name: "TiO2 (standard)",
        description: "Cubic threshold drift, 100 Ω to 10 kΩ",
        params: DeviceParameters::STANDARD,
    },
    MaterialPreset {
        key: "hfo2",
        name: "HfO2 (fast switching)",
        description: "Low thresholds and steep drift, switches within a few ms",
        params: DeviceParameters {
            v_on: -0.6,
            v_off: 0.6,
            k_on: -2000.0,
            k_off: 2000.0,
            alpha_on: 2.0,
            alpha_off: 2.0,
            r_on: 50.0,
            r_off: 50_000.0,
            w_init: 0.0,
            theta_thermal: 0.02,
            t_critical: 3.0,
            i_compliance: 0.1,
        },
    },
    MaterialPreset {
        key: "ag-si",
        name: "Ag/a-Si (near-linear)",
        description: "Unit exponents, drift proportional to overdrive",
        params: DeviceParameters {
            v_on: -0.2,
            v_off: 0.2,
            k_on: -10.0,
            k_off: 10.0,
            alpha_on: 1.0,
            alpha_off: 1.0,
            r_on: 1_000.0,
            r_off: 20_000.0,
            w_init: 0.5,
            theta_thermal: 0.005,
            t_critical: 8.0,
            i_compliance: 0.01,
        },
    },
    MaterialPreset {
        key: "gst",
        name: "GST (thermally fragile)",
        description: "Large heat proxy, burns out under sustained current",
        params: DeviceParameters {
            v_on: -0.8,
            v_off: 0.8,
            k_on: -300.0,
            k_off: 300.0,
            alpha_on: 3.0,
            alpha_off: 3.0,
            r_on: 200.0,
            r_off: 5_000.0,
            w_init: 0.0,
            theta_thermal: 200.0,
            t_critical: 1.0,
            i_compliance: 0.02,
        },
    },
];

pub fn presets() -> &'static [MaterialPreset] {
    &PRESETS
}

/// Looks up a preset by key or display name, ignoring case.
pub fn find_preset(name: &str) -> Option<&'static MaterialPreset> {
    PRESETS
        .iter()
        .find(|p| p.key.eq_ignore_ascii_case(name) || p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_presets_are_valid_and_unique() {
        let mut keys = HashSet::new();
        for p in presets() {
            assert!(p.params.validate().is_ok(), "{} invalid", p.name);
            assert!(keys.insert(p.key), "duplicate key {}", p.key);
        }
        assert!(presets().len() >= 3);
    }

    #[test]
    fn test_distinct_regimes() {
        let std = find_preset("tio2").unwrap().params;
        let fast = find_preset("hfo2").unwrap().params;
        let linear = find_preset("ag-si").unwrap().params;
        assert!(fast.k_off > std.k_off);
        assert_eq!(linear.alpha_off, 1.0);
        assert_eq!(std, DeviceParameters::default());
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        assert_eq!(find_preset("HFO2").map(|p| p.key), Some("hfo2"));
        assert_eq!(find_preset("tio2 (STANDARD)").map(|p| p.key), Some("tio2"));
        assert!(find_preset("graphene").is_none());
    }
}
