//! # Lightpath Core: Optical Signal Propagation
//!
//! This crate models how a dense-WDM spectrum degrades as it crosses the
//! elements of an optical transport network. It provides the per-channel
//! bookkeeping ([`SpectralInformation`]), the element models (fiber spans
//! with Gaussian-noise nonlinear interference, EDFAs with gain/tilt/ASE,
//! equalizing ROADMs, fused splices, transceiver endpoints) and the
//! equipment catalogs they are built from.
//!
//! ## Signal Flow
//!
//! ```text
//! TX -> [ROADM -> fiber -> EDFA -> fiber -> ... -> ROADM] -> RX
//!        each element folds SpectralInformation left to right
//! ```
//!
//! Signal, amplified spontaneous emission and nonlinear interference are
//! carried separately per channel, in watts; OSNR and generalized SNR are
//! read out at any point from those three tracks.
//!
//! ## Example
//!
//! ```
//! use lightpath_core::prelude::*;
//!
//! // a C-band grid at 50 GHz spacing, 0 dBm per channel
//! let si = SpectralInformation::on_grid(191.35e12, 196.1e12, 50e9, 32e9, 1e-3).unwrap();
//!
//! let fiber = Fiber::new(FiberParams {
//!     uid: "span A-B".into(),
//!     length_km: 80.0,
//!     con_in_db: 0.5,
//!     con_out_db: 0.5,
//!     att_in_db: 0.0,
//!     variety: FiberVariety::ssmf(),
//! });
//! let amp = Edfa::new(
//!     "amp B",
//!     EdfaVariety {
//!         name: "std".into(),
//!         gain_flatmax_db: 26.0,
//!         gain_min_db: 15.0,
//!         p_max_dbm: 23.0,
//!         nf: NfModel::FixedGain { nf0_db: 6.0 },
//!         allowed_for_design: true,
//!     },
//!     OperatingPoint { gain_db: 17.0, tilt_db: 0.0 },
//! );
//!
//! let si = amp.propagate(fiber.propagate(si)).unwrap();
//! assert!(si.mean_osnr_db() > 30.0);
//! ```

pub mod edfa;
pub mod element;
pub mod equipment;
pub mod fiber;
pub mod fused;
pub mod roadm;
pub mod spectral;
pub mod units;

pub use edfa::{Edfa, ElementError, OperatingPoint};
pub use element::{NetworkElement, Transceiver};
pub use fused::Fused;
pub use equipment::{
    EdfaVariety, EquipmentError, EquipmentLibrary, FiberVariety, NfModel, RoadmDefaults,
    SpectralDefaults, TransceiverMode,
};
pub use fiber::{Fiber, FiberParams};
pub use roadm::{Roadm, RoadmParams};
pub use spectral::{SpectralError, SpectralInformation};

/// Convenience re-exports for the common propagation workflow.
pub mod prelude {
    pub use crate::edfa::{Edfa, ElementError, OperatingPoint};
    pub use crate::element::{NetworkElement, Transceiver};
    pub use crate::fused::Fused;
    pub use crate::equipment::{
        EdfaVariety, EquipmentLibrary, FiberVariety, NfModel, TransceiverMode,
    };
    pub use crate::fiber::{Fiber, FiberParams};
    pub use crate::roadm::{Roadm, RoadmParams};
    pub use crate::spectral::SpectralInformation;
    pub use crate::units::{db2lin, dbm2watt, lin2db, snr_sum, watt2dbm};
}
