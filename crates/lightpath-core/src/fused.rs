//! Fused splice: a passive fixed-loss pass-through.

use serde::{Deserialize, Serialize};

use crate::spectral::SpectralInformation;

/// Fused connection or splice with a fixed broadband loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fused {
    pub uid: String,
    pub loss_db: f64,
}

impl Fused {
    pub fn new(uid: impl Into<String>, loss_db: f64) -> Self {
        Self {
            uid: uid.into(),
            loss_db,
        }
    }

    pub fn propagate(&self, mut si: SpectralInformation) -> SpectralInformation {
        si.attenuate_db(self.loss_db);
        si
    }
}
