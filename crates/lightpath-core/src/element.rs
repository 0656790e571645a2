//! Network Elements: the Propagation Seam
//!
//! [`NetworkElement`] is the closed set of node kinds a spectrum can pass
//! through. Propagation over a path is a left fold: each element consumes
//! the spectral information and hands the transformed copy to the next.
//! ROADMs additionally need to know the egress degree to pick their
//! equalization target; every other element ignores it.

use crate::edfa::{Edfa, ElementError};
use crate::fiber::Fiber;
use crate::fused::Fused;
use crate::roadm::Roadm;
use crate::spectral::SpectralInformation;

/// Path endpoint. Purely a measurement plane: it transforms nothing and
/// remembers the spectrum it last saw.
#[derive(Debug, Clone)]
pub struct Transceiver {
    uid: String,
    snapshot: Option<SpectralInformation>,
}

impl Transceiver {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            snapshot: None,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Spectrum observed at the last propagation through this endpoint.
    pub fn snapshot(&self) -> Option<&SpectralInformation> {
        self.snapshot.as_ref()
    }

    pub fn propagate(&mut self, si: SpectralInformation) -> SpectralInformation {
        self.snapshot = Some(si.clone());
        si
    }
}

/// Any node of the optical topology.
#[derive(Debug, Clone)]
pub enum NetworkElement {
    Transceiver(Transceiver),
    Fiber(Fiber),
    Edfa(Edfa),
    Roadm(Roadm),
    Fused(Fused),
}

impl NetworkElement {
    pub fn uid(&self) -> &str {
        match self {
            Self::Transceiver(t) => t.uid(),
            Self::Fiber(f) => f.uid(),
            Self::Edfa(e) => e.uid(),
            Self::Roadm(r) => r.uid(),
            Self::Fused(f) => &f.uid,
        }
    }

    /// True when the element restores launch power, resetting the loss
    /// deficit tracked by auto-design.
    pub fn restores_power(&self) -> bool {
        matches!(self, Self::Edfa(_) | Self::Roadm(_))
    }

    /// Push the spectrum through this element toward `egress_degree`
    /// (the uid of the next element on the path, if any).
    pub fn propagate(
        &mut self,
        si: SpectralInformation,
        egress_degree: Option<&str>,
    ) -> Result<SpectralInformation, ElementError> {
        match self {
            Self::Transceiver(t) => Ok(t.propagate(si)),
            Self::Fiber(f) => Ok(f.propagate(si)),
            Self::Edfa(e) => e.propagate(si),
            Self::Roadm(r) => Ok(r.propagate(si, egress_degree.unwrap_or(""))),
            Self::Fused(f) => Ok(f.propagate(si)),
        }
    }
}
