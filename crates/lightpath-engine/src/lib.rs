//! # Lightpath Engine: Routing and Feasibility
//!
//! Everything above the element physics: the directed network topology,
//! service requests with waypoint and disjointness constraints, shortest
//! path search, automatic amplifier design along a candidate path, and the
//! evaluator that folds a launch spectrum through the routed elements and
//! compares the resulting generalized SNR against the transceiver mode's
//! threshold.
//!
//! ## Pipeline
//!
//! ```text
//! request -> path search -> auto-design -> propagate -> feasible / blocked
//! ```
//!
//! ## Example
//!
//! ```
//! use lightpath_core::prelude::*;
//! use lightpath_engine::prelude::*;
//!
//! let library = EquipmentLibrary {
//!     fibers: vec![FiberVariety::ssmf()],
//!     edfas: vec![EdfaVariety {
//!         name: "std".into(),
//!         gain_flatmax_db: 26.0,
//!         gain_min_db: 8.0,
//!         p_max_dbm: 23.0,
//!         nf: NfModel::FixedGain { nf0_db: 6.0 },
//!         allowed_for_design: true,
//!     }],
//!     transceiver_modes: vec![TransceiverMode {
//!         format: "mode 1".into(),
//!         baud_rate: 32e9,
//!         required_snr_db: 20.0,
//!         tx_osnr_db: 45.0,
//!         min_spacing_hz: 50e9,
//!         bit_rate: 200e9,
//!     }],
//!     spectral: Default::default(),
//!     roadm: Default::default(),
//! };
//!
//! let topology = Topology::builder()
//!     .add(NetworkElement::Transceiver(Transceiver::new("trx A"))).unwrap()
//!     .add(NetworkElement::Fiber(Fiber::new(FiberParams {
//!         uid: "fiber A-B".into(),
//!         length_km: 80.0,
//!         con_in_db: 0.5,
//!         con_out_db: 0.5,
//!         att_in_db: 0.0,
//!         variety: FiberVariety::ssmf(),
//!     }))).unwrap()
//!     .add(NetworkElement::Edfa(Edfa::undesigned("amp B", None))).unwrap()
//!     .add(NetworkElement::Transceiver(Transceiver::new("trx B"))).unwrap()
//!     .connect("trx A", "fiber A-B").unwrap()
//!     .connect("fiber A-B", "amp B").unwrap()
//!     .connect("amp B", "trx B").unwrap()
//!     .build();
//!
//! let evaluator = Evaluator::new(topology, library);
//! let request = ServiceRequest::new("req 1", "trx A", "trx B", "mode 1");
//! let result = evaluator.evaluate(&request).unwrap();
//! assert!(result.outcome.is_feasible());
//! ```

pub mod autodesign;
pub mod error;
pub mod evaluator;
pub mod request;
pub mod routing;
pub mod topology;

pub use autodesign::{design_path, DesignError};
pub use error::EngineError;
pub use evaluator::{BlockingReason, EvaluationResult, Evaluator, Outcome, RequestState};
pub use request::{
    DisjointnessMode, RelaxationPolicy, ServiceRequest, SpectralOverrides, WaypointMode,
};
pub use routing::{PathSearch, RoutedPath, SearchFailure};
pub use topology::{Edge, NodeId, Topology, TopologyBuilder, TopologyError};

/// Convenience re-exports for the request-evaluation workflow.
pub mod prelude {
    pub use crate::evaluator::{BlockingReason, EvaluationResult, Evaluator, Outcome};
    pub use crate::request::{DisjointnessMode, RelaxationPolicy, ServiceRequest, WaypointMode};
    pub use crate::topology::Topology;
}
