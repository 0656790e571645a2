//! Equipment Library: Variety Catalogs and Spectral Defaults
//!
//! Immutable catalog of deployable hardware: fiber types, EDFA varieties
//! with their noise-figure models and rated limits, transceiver modes and
//! the global spectral defaults used to derive the channel grid. Loaded by
//! an external reader and passed explicitly into topology construction and
//! auto-design; there is no process-wide registry.
//!
//! The variable-gain noise-figure model is the classic two-coil estimate:
//! nf1/nf2/delta_p are solved from the quoted nf_min (at flat-max gain) and
//! nf_max (at minimum gain), then evaluated at the operating gain.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::{db2lin, lin2db};

#[derive(Debug, Error)]
pub enum EquipmentError {
    #[error("unknown {kind} variety: {name}")]
    UnknownVariety { kind: &'static str, name: String },

    #[error("unknown transceiver mode: {0}")]
    UnknownMode(String),

    #[error("invalid noise-figure model for {name}: {reason}")]
    InvalidNfModel { name: String, reason: String },
}

/// Fiber type physical parameters, per km.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiberVariety {
    pub name: String,
    /// Lineic attenuation (dB/km).
    pub loss_coef_db_km: f64,
    /// Chromatic dispersion (ps/nm/km).
    pub dispersion_ps_nm_km: f64,
    /// Nonlinear coefficient gamma (1/W/km).
    pub gamma_w_km: f64,
}

impl FiberVariety {
    /// Standard single-mode fiber.
    pub fn ssmf() -> Self {
        Self {
            name: "SSMF".into(),
            loss_coef_db_km: 0.2,
            dispersion_ps_nm_km: 16.7,
            gamma_w_km: 1.27,
        }
    }
}

/// Amplifier noise-figure model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NfModel {
    /// Constant NF regardless of gain (plus low-gain input padding).
    FixedGain { nf0_db: f64 },
    /// Two-coil variable-gain model with internal VOA between the coils.
    VariableGain {
        nf1_db: f64,
        nf2_db: f64,
        delta_p_db: f64,
    },
}

impl NfModel {
    /// Derive a two-coil model from the quoted nf_min/nf_max of a variety.
    ///
    /// Solves `nf_{min,max} = nf1 + nf2 / g1a_{max,min}` (linear units) with
    /// a fixed 5 dB inter-coil power split, mirroring how amplifier vendors
    /// characterize variable-gain EDFAs.
    pub fn variable_gain(
        name: &str,
        gain_min_db: f64,
        gain_flatmax_db: f64,
        nf_min_db: f64,
        nf_max_db: f64,
    ) -> Result<Self, EquipmentError> {
        if nf_min_db < -10.0 || nf_max_db < -10.0 {
            return Err(EquipmentError::InvalidNfModel {
                name: name.into(),
                reason: format!("nf_min {nf_min_db} / nf_max {nf_max_db} out of range"),
            });
        }
        let delta_p_db = 5.0;
        let g1a_min = gain_min_db - (gain_flatmax_db - gain_min_db) - delta_p_db;
        let g1a_max = gain_flatmax_db - delta_p_db;
        let nf2_db = lin2db(
            (db2lin(nf_min_db) - db2lin(nf_max_db))
                / (1.0 / db2lin(g1a_max) - 1.0 / db2lin(g1a_min)),
        );
        let nf1_db = lin2db(db2lin(nf_min_db) - db2lin(nf2_db) / db2lin(g1a_max));
        if !nf1_db.is_finite() || !nf2_db.is_finite() || nf1_db < 4.0 {
            return Err(EquipmentError::InvalidNfModel {
                name: name.into(),
                reason: format!("derived first-coil NF {nf1_db:.2} dB is not plausible"),
            });
        }
        Ok(Self::VariableGain {
            nf1_db,
            nf2_db,
            delta_p_db,
        })
    }

    /// Noise figure (dB) at `gain_db`, given the variety's gain limits.
    ///
    /// Operating below `gain_min` is modelled as input padding: the pad
    /// attenuation degrades the NF dB-for-dB.
    pub fn nf_db(&self, gain_db: f64, gain_min_db: f64, gain_flatmax_db: f64) -> f64 {
        let pad = (gain_min_db - gain_db).max(0.0);
        let gain_db = gain_db + pad;
        let dg = (gain_flatmax_db - gain_db).max(0.0);
        let nf = match self {
            Self::FixedGain { nf0_db } => *nf0_db,
            Self::VariableGain {
                nf1_db,
                nf2_db,
                delta_p_db,
            } => {
                let g1a = gain_db - delta_p_db - dg;
                lin2db(db2lin(*nf1_db) + db2lin(*nf2_db) / db2lin(g1a))
            }
        };
        nf + pad
    }
}

/// EDFA variety catalog entry with rated limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdfaVariety {
    pub name: String,
    /// Maximum flat gain (dB).
    pub gain_flatmax_db: f64,
    /// Minimum gain without input padding (dB).
    pub gain_min_db: f64,
    /// Rated maximum total output power (dBm).
    pub p_max_dbm: f64,
    pub nf: NfModel,
    /// Whether auto-design may pick this variety for unbound amplifiers.
    pub allowed_for_design: bool,
}

impl EdfaVariety {
    /// Noise figure at the given operating gain.
    pub fn nf_db(&self, gain_db: f64) -> f64 {
        self.nf.nf_db(gain_db, self.gain_min_db, self.gain_flatmax_db)
    }
}

/// One operating mode of a transceiver type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransceiverMode {
    /// Mode/format name, e.g. "PS_SP64_1".
    pub format: String,
    pub baud_rate: f64,
    /// Minimum required SNR in 0.1 nm at the receiver (dB).
    pub required_snr_db: f64,
    /// Transmitter OSNR in 0.1 nm (dB), applied as a back-to-back penalty.
    pub tx_osnr_db: f64,
    /// Narrowest grid this mode fits in (Hz).
    pub min_spacing_hz: f64,
    pub bit_rate: f64,
}

/// Global spectral defaults used when a request leaves them unspecified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralDefaults {
    pub f_min_hz: f64,
    pub f_max_hz: f64,
    pub baud_rate: f64,
    pub spacing_hz: f64,
    pub power_dbm: f64,
}

impl Default for SpectralDefaults {
    fn default() -> Self {
        Self {
            f_min_hz: 191.35e12,
            f_max_hz: 196.1e12,
            baud_rate: 32e9,
            spacing_hz: 50e9,
            power_dbm: 0.0,
        }
    }
}

/// ROADM equalization defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmDefaults {
    /// Per-channel power target at ROADM egress (dBm).
    pub target_pch_out_dbm: f64,
    /// Add/drop OSNR contribution in 0.1 nm (dB).
    pub add_drop_osnr_db: f64,
}

impl Default for RoadmDefaults {
    fn default() -> Self {
        Self {
            target_pch_out_dbm: -20.0,
            add_drop_osnr_db: 100.0,
        }
    }
}

/// The full read-only equipment library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentLibrary {
    pub fibers: Vec<FiberVariety>,
    pub edfas: Vec<EdfaVariety>,
    pub transceiver_modes: Vec<TransceiverMode>,
    #[serde(default)]
    pub spectral: SpectralDefaults,
    #[serde(default)]
    pub roadm: RoadmDefaults,
}

impl EquipmentLibrary {
    pub fn fiber(&self, name: &str) -> Result<&FiberVariety, EquipmentError> {
        self.fibers
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| EquipmentError::UnknownVariety {
                kind: "fiber",
                name: name.into(),
            })
    }

    pub fn edfa(&self, name: &str) -> Result<&EdfaVariety, EquipmentError> {
        self.edfas
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| EquipmentError::UnknownVariety {
                kind: "edfa",
                name: name.into(),
            })
    }

    pub fn mode(&self, format: &str) -> Result<&TransceiverMode, EquipmentError> {
        self.transceiver_modes
            .iter()
            .find(|m| m.format == format)
            .ok_or_else(|| EquipmentError::UnknownMode(format.into()))
    }
}
