//! Feasibility Evaluation
//!
//! Runs one [`ServiceRequest`] end to end: route, auto-design, propagate,
//! judge. Each evaluation works on elements cloned out of the shared
//! topology, so designed operating points are scoped to the evaluated path
//! and concurrent evaluations never interfere.
//!
//! Requests without a disjointness group are independent and evaluated in
//! parallel; grouped requests are resolved serially in submission order,
//! each one excluding the paths already granted to its group.

use lightpath_core::element::NetworkElement;
use lightpath_core::equipment::EquipmentLibrary;
use lightpath_core::spectral::SpectralInformation;
use lightpath_core::units::{dbm2watt, lin2db, snr_sum, BW_01NM_HZ};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::autodesign::design_path;
use crate::error::EngineError;
use crate::request::{RelaxationPolicy, ServiceRequest, WaypointMode};
use crate::routing::{PathSearch, RoutedPath, SearchFailure};
use crate::topology::{NodeId, Topology};

/// Why a request could not be carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockingReason {
    OsnrBelowThreshold,
    PathUnreachable,
    UnreachableWithConstraint,
    DisjointInfeasible,
    DesignInfeasible,
}

/// Verdict of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Feasible {
        /// Mean OSNR in 0.1 nm at the receiver (dB).
        osnr_01nm_db: f64,
        /// Mean generalized SNR in 0.1 nm, penalties included (dB).
        snr_01nm_db: f64,
    },
    Blocked {
        reason: BlockingReason,
    },
    /// The request itself was malformed: unknown endpoint, unknown
    /// transceiver mode, or a spectrum that violates the mode. Carried on
    /// the result so one bad request never poisons a batch.
    Error {
        message: String,
    },
}

impl Outcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible { .. })
    }
}

/// How far an evaluation progressed before settling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Pending,
    PathSearched,
    Designed,
    Propagated,
    Evaluated,
}

/// Full answer for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub request_id: String,
    pub state: RequestState,
    pub outcome: Outcome,
    /// Element uids along the routed path, empty when routing failed.
    pub path: Vec<String>,
    /// Waypoints given up by loose-mode relaxation.
    pub relaxed_waypoints: Vec<String>,
    /// Human-readable cause for blocked outcomes: the offending element,
    /// constraint, or margin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Shared, immutable evaluation context.
pub struct Evaluator {
    topology: Topology,
    library: EquipmentLibrary,
    relaxation: RelaxationPolicy,
}

impl Evaluator {
    pub fn new(topology: Topology, library: EquipmentLibrary) -> Self {
        Self {
            topology,
            library,
            relaxation: RelaxationPolicy::default(),
        }
    }

    pub fn with_relaxation(mut self, policy: RelaxationPolicy) -> Self {
        self.relaxation = policy;
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Evaluate one request against the unrestricted topology.
    pub fn evaluate(&self, request: &ServiceRequest) -> Result<EvaluationResult, EngineError> {
        let search = PathSearch::new(&self.topology);
        self.evaluate_with_search(request, &search)
    }

    /// Evaluate a batch. Ungrouped requests run in parallel; members of a
    /// disjointness group are resolved serially in submission order, each
    /// excluding the paths already granted within the group.
    ///
    /// Requests are isolated from each other: a malformed request yields an
    /// [`Outcome::Error`] record in its slot and the rest of the batch is
    /// evaluated regardless.
    pub fn evaluate_all(&self, requests: &[ServiceRequest]) -> Vec<EvaluationResult> {
        let ungrouped: Vec<(usize, &ServiceRequest)> = requests
            .iter()
            .enumerate()
            .filter(|(_, r)| r.disjoint_group.is_none())
            .collect();
        let mut indexed: Vec<(usize, EvaluationResult)> = ungrouped
            .par_iter()
            .map(|&(idx, req)| {
                let result = self
                    .evaluate(req)
                    .unwrap_or_else(|err| Self::error_result(req, err));
                (idx, result)
            })
            .collect();

        // group members in submission order, one search context per group
        let mut group_order: Vec<&str> = Vec::new();
        for req in requests {
            if let Some(g) = req.disjoint_group.as_deref() {
                if !group_order.contains(&g) {
                    group_order.push(g);
                }
            }
        }
        for group in group_order {
            let mut search = PathSearch::new(&self.topology);
            for (idx, req) in requests
                .iter()
                .enumerate()
                .filter(|(_, r)| r.disjoint_group.as_deref() == Some(group))
            {
                let result = self
                    .evaluate_grouped(req, &mut search)
                    .unwrap_or_else(|err| Self::error_result(req, err));
                indexed.push((idx, result));
            }
        }

        // every request lands in exactly one of the two passes
        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, result)| result).collect()
    }

    fn error_result(request: &ServiceRequest, err: EngineError) -> EvaluationResult {
        info!(request = request.id.as_str(), %err, "request rejected");
        EvaluationResult {
            request_id: request.id.clone(),
            state: RequestState::Pending,
            outcome: Outcome::Error {
                message: err.to_string(),
            },
            path: Vec::new(),
            relaxed_waypoints: Vec::new(),
            detail: None,
        }
    }

    fn evaluate_grouped(
        &self,
        request: &ServiceRequest,
        search: &mut PathSearch<'_>,
    ) -> Result<EvaluationResult, EngineError> {
        let result = self.evaluate_with_search(request, search)?;
        match self.route(request, search) {
            Ok(path) if result.outcome.is_feasible() => {
                search.exclude_path(&path, request.disjoint_mode);
                Ok(result)
            }
            Ok(_) => Ok(result),
            // routing failed under accumulated exclusions: report it as a
            // disjointness conflict when the open topology has a route
            Err(_) => {
                let open = PathSearch::new(&self.topology);
                let (reason, detail) = match self.route(request, &open) {
                    Ok(_) => (
                        BlockingReason::DisjointInfeasible,
                        request.disjoint_group.as_ref().map(|g| {
                            format!("no route disjoint from earlier paths of group {g}")
                        }),
                    ),
                    Err(SearchFailure::ConstraintUnsatisfiable) => (
                        BlockingReason::UnreachableWithConstraint,
                        Some(format!("waypoints: {}", request.waypoints.join(", "))),
                    ),
                    Err(SearchFailure::Unreachable) => (
                        BlockingReason::PathUnreachable,
                        Some(format!("{} -> {}", request.source, request.destination)),
                    ),
                };
                Ok(EvaluationResult {
                    request_id: request.id.clone(),
                    state: RequestState::PathSearched,
                    outcome: Outcome::Blocked { reason },
                    path: Vec::new(),
                    relaxed_waypoints: Vec::new(),
                    detail,
                })
            }
        }
    }

    fn route(
        &self,
        request: &ServiceRequest,
        search: &PathSearch<'_>,
    ) -> Result<RoutedPath, SearchFailure> {
        // endpoint resolution already validated by the caller
        let src = self.topology.node_id(&request.source).map_err(|_| SearchFailure::Unreachable)?;
        let dst = self
            .topology
            .node_id(&request.destination)
            .map_err(|_| SearchFailure::Unreachable)?;
        // a waypoint uid absent from the topology blocks a strict request;
        // loose requests drop it up front and report it as relaxed
        let mut waypoints: Vec<NodeId> = Vec::new();
        let mut unknown: Vec<String> = Vec::new();
        for uid in &request.waypoints {
            match self.topology.node_id(uid) {
                Ok(id) => waypoints.push(id),
                Err(_) => match request.waypoint_mode {
                    WaypointMode::Strict => {
                        return Err(SearchFailure::ConstraintUnsatisfiable)
                    }
                    WaypointMode::Loose => unknown.push(uid.clone()),
                },
            }
        }
        let mut path =
            search.constrained(src, dst, &waypoints, request.waypoint_mode, self.relaxation)?;
        if !unknown.is_empty() {
            unknown.append(&mut path.relaxed_waypoints);
            path.relaxed_waypoints = unknown;
        }
        Ok(path)
    }

    fn evaluate_with_search(
        &self,
        request: &ServiceRequest,
        search: &PathSearch<'_>,
    ) -> Result<EvaluationResult, EngineError> {
        self.topology.node_id(&request.source)?;
        self.topology.node_id(&request.destination)?;
        let mode = self.library.mode(&request.mode)?.clone();

        let blocked = |state, reason, detail: String| EvaluationResult {
            request_id: request.id.clone(),
            state,
            outcome: Outcome::Blocked { reason },
            path: Vec::new(),
            relaxed_waypoints: Vec::new(),
            detail: Some(detail),
        };

        let routed = match self.route(request, search) {
            Ok(p) => p,
            Err(SearchFailure::Unreachable) => {
                info!(request = request.id.as_str(), "no route");
                return Ok(blocked(
                    RequestState::PathSearched,
                    BlockingReason::PathUnreachable,
                    format!("{} -> {}", request.source, request.destination),
                ));
            }
            Err(SearchFailure::ConstraintUnsatisfiable) => {
                info!(request = request.id.as_str(), "waypoint constraint unsatisfiable");
                return Ok(blocked(
                    RequestState::PathSearched,
                    BlockingReason::UnreachableWithConstraint,
                    format!("waypoints: {}", request.waypoints.join(", ")),
                ));
            }
        };
        let path_uids: Vec<String> = routed
            .nodes
            .iter()
            .map(|&n| self.topology.uid(n).to_string())
            .collect();
        debug!(
            request = request.id.as_str(),
            hops = path_uids.len(),
            km = routed.total_km,
            "path searched"
        );

        // operating points live on this clone only
        let mut elements: Vec<NetworkElement> = routed
            .nodes
            .iter()
            .map(|&n| self.topology.element(n).clone())
            .collect();
        if let Err(err) = design_path(&mut elements, &self.library) {
            info!(request = request.id.as_str(), %err, "design infeasible");
            let mut result = blocked(
                RequestState::PathSearched,
                BlockingReason::DesignInfeasible,
                err.to_string(),
            );
            result.path = path_uids;
            result.relaxed_waypoints = routed.relaxed_waypoints;
            return Ok(result);
        }

        let mut si = self.launch_spectrum(request, &mode)?;
        let n = elements.len();
        for i in 0..n {
            let degree_uid = if i + 1 < n {
                Some(path_uids[i + 1].as_str())
            } else {
                None
            };
            si = elements[i].propagate(si, degree_uid)?;
        }

        // generalized SNR with transmitter and add/drop contributions folded in
        let baud = si.baud_rate();
        let mut snr_db = snr_sum(si.mean_snr_db(), baud, mode.tx_osnr_db);
        for element in &elements {
            if let NetworkElement::Roadm(roadm) = element {
                snr_db = snr_sum(snr_db, baud, roadm.add_drop_osnr_db());
            }
        }
        let to_01nm = lin2db(baud / BW_01NM_HZ);
        let snr_01nm_db = snr_db + to_01nm;
        let osnr_01nm_db = si.mean_osnr_db() + to_01nm;

        let (outcome, detail) = if snr_01nm_db >= mode.required_snr_db {
            (Outcome::Feasible { osnr_01nm_db, snr_01nm_db }, None)
        } else {
            info!(
                request = request.id.as_str(),
                snr_01nm_db,
                required = mode.required_snr_db,
                "snr below mode threshold"
            );
            (
                Outcome::Blocked {
                    reason: BlockingReason::OsnrBelowThreshold,
                },
                Some(format!(
                    "snr {snr_01nm_db:.2} dB below the {:.2} dB required by {}",
                    mode.required_snr_db, mode.format
                )),
            )
        };
        Ok(EvaluationResult {
            request_id: request.id.clone(),
            state: RequestState::Evaluated,
            outcome,
            path: path_uids,
            relaxed_waypoints: routed.relaxed_waypoints,
            detail,
        })
    }

    /// Build the launch spectrum for a request: library defaults overlaid
    /// with per-request overrides, baud rate taken from the mode.
    fn launch_spectrum(
        &self,
        request: &ServiceRequest,
        mode: &lightpath_core::equipment::TransceiverMode,
    ) -> Result<SpectralInformation, EngineError> {
        let defaults = &self.library.spectral;
        let spacing = request.spectral.spacing_hz.unwrap_or(defaults.spacing_hz);
        if spacing < mode.min_spacing_hz {
            return Err(EngineError::SpacingBelowMode {
                mode: mode.format.clone(),
                min_spacing_hz: mode.min_spacing_hz,
                spacing_hz: spacing,
            });
        }
        let f_min = request.spectral.f_min_hz.unwrap_or(defaults.f_min_hz);
        let f_max = request.spectral.f_max_hz.unwrap_or(defaults.f_max_hz);
        let power_dbm = request.spectral.power_dbm.unwrap_or(defaults.power_dbm);
        Ok(SpectralInformation::on_grid(
            f_min,
            f_max,
            spacing,
            mode.baud_rate,
            dbm2watt(power_dbm),
        )?)
    }
}
