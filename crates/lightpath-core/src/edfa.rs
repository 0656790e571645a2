//! EDFA: Gain, Tilt and Amplified Spontaneous Emission
//!
//! An EDFA applies a per-channel gain ramp (flat gain plus linear tilt
//! across the band) and injects ASE noise referred to its input, so the
//! output ASE scales with the applied gain. The amplifier refuses to
//! operate outside its rated envelope: asking for more than the variety's
//! flat-max gain or driving total output power beyond p_max is a hard
//! error, never a silent clamp.
//!
//! An amplifier may be created without an operating point; auto-design
//! commits one exactly once per evaluated path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::equipment::EdfaVariety;
use crate::spectral::SpectralInformation;
use crate::units::{db2lin, PLANCK};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElementError {
    #[error("{uid}: requested gain {gain_db:.2} dB exceeds flat-max {gain_flatmax_db:.2} dB of {variety}")]
    GainAboveRating {
        uid: String,
        gain_db: f64,
        gain_flatmax_db: f64,
        variety: String,
    },

    #[error("{uid}: total output power {p_out_dbm:.2} dBm exceeds rating {p_max_dbm:.2} dBm of {variety}")]
    PowerAboveRating {
        uid: String,
        p_out_dbm: f64,
        p_max_dbm: f64,
        variety: String,
    },

    #[error("{uid}: amplifier has no committed operating point")]
    GainNotDesigned { uid: String },

    #[error("{uid}: operating point already committed")]
    AlreadyDesigned { uid: String },
}

/// Committed operating point of one amplifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub gain_db: f64,
    /// Gain difference between the last and first channel (dB).
    pub tilt_db: f64,
}

/// Erbium-doped fiber amplifier node.
#[derive(Debug, Clone)]
pub struct Edfa {
    uid: String,
    variety: Option<EdfaVariety>,
    operating: Option<OperatingPoint>,
}

impl Edfa {
    /// Fully specified amplifier: variety and operating point fixed up front.
    pub fn new(uid: impl Into<String>, variety: EdfaVariety, operating: OperatingPoint) -> Self {
        Self {
            uid: uid.into(),
            variety: Some(variety),
            operating: Some(operating),
        }
    }

    /// Placeholder amplifier to be filled in by auto-design. A variety may
    /// already be pinned while the gain is left open.
    pub fn undesigned(uid: impl Into<String>, variety: Option<EdfaVariety>) -> Self {
        Self {
            uid: uid.into(),
            variety,
            operating: None,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn variety(&self) -> Option<&EdfaVariety> {
        self.variety.as_ref()
    }

    pub fn operating(&self) -> Option<OperatingPoint> {
        self.operating
    }

    pub fn is_designed(&self) -> bool {
        self.operating.is_some() && self.variety.is_some()
    }

    /// Commit variety and operating point. Rejected when an operating point
    /// was already committed, and when the gain exceeds the variety rating.
    pub fn commit(
        &mut self,
        variety: EdfaVariety,
        operating: OperatingPoint,
    ) -> Result<(), ElementError> {
        if self.operating.is_some() {
            return Err(ElementError::AlreadyDesigned {
                uid: self.uid.clone(),
            });
        }
        if operating.gain_db > variety.gain_flatmax_db {
            return Err(ElementError::GainAboveRating {
                uid: self.uid.clone(),
                gain_db: operating.gain_db,
                gain_flatmax_db: variety.gain_flatmax_db,
                variety: variety.name.clone(),
            });
        }
        self.variety = Some(variety);
        self.operating = Some(operating);
        Ok(())
    }

    /// Amplify the spectrum.
    ///
    /// ASE is injected at the input as `h * f * baud * NF_lin` per channel
    /// and then amplified together with the signal, so the amplifier's own
    /// contribution at the output is `h f R NF G`.
    pub fn propagate(&self, mut si: SpectralInformation) -> Result<SpectralInformation, ElementError> {
        let variety = self.variety.as_ref().ok_or_else(|| ElementError::GainNotDesigned {
            uid: self.uid.clone(),
        })?;
        let op = self.operating.ok_or_else(|| ElementError::GainNotDesigned {
            uid: self.uid.clone(),
        })?;
        if op.gain_db > variety.gain_flatmax_db {
            return Err(ElementError::GainAboveRating {
                uid: self.uid.clone(),
                gain_db: op.gain_db,
                gain_flatmax_db: variety.gain_flatmax_db,
                variety: variety.name.clone(),
            });
        }

        let nf_db = variety.nf_db(op.gain_db);
        let nf_lin = db2lin(nf_db);
        let baud = si.baud_rate();
        let ase: Vec<f64> = si
            .frequency()
            .iter()
            .map(|&f| PLANCK * f * baud * nf_lin)
            .collect();
        si.add_ase(&ase);

        let n = si.channels();
        for ch in 0..n {
            let ramp = if n > 1 {
                op.tilt_db * (ch as f64 / (n as f64 - 1.0) - 0.5)
            } else {
                0.0
            };
            si.scale_channel(ch, db2lin(op.gain_db + ramp));
        }

        let p_out_dbm = si.total_power_dbm();
        if p_out_dbm > variety.p_max_dbm {
            return Err(ElementError::PowerAboveRating {
                uid: self.uid.clone(),
                p_out_dbm,
                p_max_dbm: variety.p_max_dbm,
                variety: variety.name.clone(),
            });
        }
        debug!(
            uid = self.uid.as_str(),
            gain_db = op.gain_db,
            nf_db,
            p_out_dbm,
            "edfa propagate"
        );
        Ok(si)
    }
}
