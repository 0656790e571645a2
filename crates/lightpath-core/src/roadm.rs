//! ROADM: Per-Degree Power Equalization
//!
//! A ROADM flattens every channel to a per-channel power target on each
//! egress degree. The achievable target is the lesser of the configured
//! one and the weakest incoming channel, so equalization only ever
//! attenuates. Signal, ASE and NLI of a channel are scaled by the same
//! factor; the ROADM itself adds no noise here, its add/drop OSNR
//! contribution is accounted for at evaluation time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spectral::SpectralInformation;
use crate::units::dbm2watt;

/// Construction parameters for one ROADM node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmParams {
    pub uid: String,
    /// Default per-channel target at egress (dBm).
    pub target_pch_out_dbm: f64,
    /// Per-degree overrides, keyed by egress degree name.
    #[serde(default)]
    pub per_degree_pch_out_dbm: HashMap<String, f64>,
    /// Add/drop OSNR contribution in 0.1 nm (dB).
    pub add_drop_osnr_db: f64,
}

#[derive(Debug, Clone)]
pub struct Roadm {
    params: RoadmParams,
}

impl Roadm {
    pub fn new(params: RoadmParams) -> Self {
        Self { params }
    }

    pub fn uid(&self) -> &str {
        &self.params.uid
    }

    pub fn add_drop_osnr_db(&self) -> f64 {
        self.params.add_drop_osnr_db
    }

    /// Configured per-channel target toward `degree` (dBm).
    pub fn target_dbm(&self, degree: &str) -> f64 {
        self.params
            .per_degree_pch_out_dbm
            .get(degree)
            .copied()
            .unwrap_or(self.params.target_pch_out_dbm)
    }

    /// Equalize the spectrum towards the given egress degree.
    pub fn propagate(&self, mut si: SpectralInformation, degree: &str) -> SpectralInformation {
        let configured = self.target_dbm(degree);
        // never amplify: the weakest channel caps the reachable target
        let target_dbm = configured.min(si.min_signal_dbm());
        let target_w = dbm2watt(target_dbm);
        debug!(
            uid = self.params.uid.as_str(),
            degree,
            configured_dbm = configured,
            target_dbm,
            "roadm equalize"
        );
        for ch in 0..si.channels() {
            let factor = target_w / si.signal()[ch];
            si.scale_channel(ch, factor);
        }
        si
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{db2lin, watt2dbm};

    fn roadm(target_dbm: f64) -> Roadm {
        Roadm::new(RoadmParams {
            uid: "roadm A".into(),
            target_pch_out_dbm: target_dbm,
            per_degree_pch_out_dbm: HashMap::new(),
            add_drop_osnr_db: 38.0,
        })
    }

    fn tilted_grid() -> SpectralInformation {
        let mut si =
            SpectralInformation::on_grid(191.3e12, 191.45e12, 50e9, 32e9, 1e-4).unwrap();
        // skew the channels and give them some noise history
        si.scale_channel(0, db2lin(-3.0));
        si.scale_channel(2, db2lin(2.0));
        let ase = vec![1e-8; si.channels()];
        si.add_ase(&ase);
        si
    }

    #[test]
    fn test_equalizes_to_target() {
        let si = tilted_grid();
        let out = roadm(-20.0).propagate(si, "to B");
        for &s in out.signal() {
            assert!((watt2dbm(s) + 20.0).abs() < 1e-9, "ch at {} dBm", watt2dbm(s));
        }
    }

    #[test]
    fn test_weakest_channel_caps_target() {
        // weakest channel is at -13 dBm, target of -11 dBm is unreachable
        let si = tilted_grid();
        let out = roadm(-11.0).propagate(si, "to B");
        for &s in out.signal() {
            assert!((watt2dbm(s) + 13.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_per_degree_override() {
        let mut params = RoadmParams {
            uid: "roadm A".into(),
            target_pch_out_dbm: -20.0,
            per_degree_pch_out_dbm: HashMap::new(),
            add_drop_osnr_db: 38.0,
        };
        params.per_degree_pch_out_dbm.insert("to C".into(), -23.0);
        let roadm = Roadm::new(params);
        assert!((roadm.target_dbm("to B") + 20.0).abs() < 1e-12);
        assert!((roadm.target_dbm("to C") + 23.0).abs() < 1e-12);
    }

    #[test]
    fn test_equalization_preserves_snr() {
        // signal and noise scale together, per-channel SNR is untouched
        let si = tilted_grid();
        let snr_in = si.snr_db();
        let out = roadm(-20.0).propagate(si, "to B");
        let snr_out = out.snr_db();
        for (a, b) in snr_in.iter().zip(&snr_out) {
            assert!((a - b).abs() < 1e-9, "snr changed: {a} -> {b}");
        }
    }

    #[test]
    fn test_adds_no_noise_of_its_own() {
        let mut si = SpectralInformation::on_grid(191.3e12, 191.45e12, 50e9, 32e9, 1e-4).unwrap();
        si.scale_channel(0, db2lin(1.0));
        let out = roadm(-20.0).propagate(si, "to B");
        for &a in out.ase() {
            assert!(a.abs() < f64::EPSILON);
        }
    }
}
