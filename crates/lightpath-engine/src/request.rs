//! Service Requests
//!
//! A request asks whether one lightpath can be carried: endpoints, the
//! transceiver mode to use, optional overrides of the default spectrum,
//! ordered waypoint constraints and membership in a disjointness group.
//! Requests are plain data, deserializable from the planning front end.

use serde::{Deserialize, Serialize};

/// How waypoint constraints bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointMode {
    /// Constraint failure blocks the request.
    Strict,
    /// Constraint failure triggers the configured relaxation policy.
    Loose,
}

impl Default for WaypointMode {
    fn default() -> Self {
        Self::Loose
    }
}

/// What loose-mode constraint relaxation is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationPolicy {
    /// Drop unsatisfiable waypoints one at a time, keeping the rest in order.
    DropInOrder,
    /// Give up on all waypoints and fall back to the plain shortest path.
    Fallback,
}

impl Default for RelaxationPolicy {
    fn default() -> Self {
        Self::DropInOrder
    }
}

/// What disjoint paths within a group must not share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisjointnessMode {
    /// Paths share no fiber link.
    EdgeDisjoint,
    /// Paths share no interior node (implies edge disjointness).
    NodeDisjoint,
}

impl Default for DisjointnessMode {
    fn default() -> Self {
        Self::NodeDisjoint
    }
}

/// Per-request overrides of the library spectral defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpectralOverrides {
    pub power_dbm: Option<f64>,
    pub spacing_hz: Option<f64>,
    pub f_min_hz: Option<f64>,
    pub f_max_hz: Option<f64>,
}

/// One feasibility question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    /// Source transceiver uid.
    pub source: String,
    /// Destination transceiver uid.
    pub destination: String,
    /// Transceiver mode format name, resolved against the equipment library.
    pub mode: String,
    #[serde(default)]
    pub spectral: SpectralOverrides,
    /// Node uids the path must visit, in this order.
    #[serde(default)]
    pub waypoints: Vec<String>,
    #[serde(default)]
    pub waypoint_mode: WaypointMode,
    /// Requests sharing a group name must be mutually disjoint.
    #[serde(default)]
    pub disjoint_group: Option<String>,
    /// What the group's committed paths must not share.
    #[serde(default)]
    pub disjoint_mode: DisjointnessMode,
}

impl ServiceRequest {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            destination: destination.into(),
            mode: mode.into(),
            spectral: SpectralOverrides::default(),
            waypoints: Vec::new(),
            waypoint_mode: WaypointMode::default(),
            disjoint_group: None,
            disjoint_mode: DisjointnessMode::default(),
        }
    }

    pub fn with_waypoints(mut self, waypoints: Vec<String>, mode: WaypointMode) -> Self {
        self.waypoints = waypoints;
        self.waypoint_mode = mode;
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.disjoint_group = Some(group.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request_from_json() {
        let json = r#"{
            "id": "req 1",
            "source": "trx A",
            "destination": "trx B",
            "mode": "mode 1"
        }"#;
        let req: ServiceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.waypoint_mode, WaypointMode::Loose);
        assert!(req.waypoints.is_empty());
        assert!(req.disjoint_group.is_none());
        assert_eq!(req.disjoint_mode, DisjointnessMode::NodeDisjoint);
        assert!(req.spectral.power_dbm.is_none());
    }

    #[test]
    fn test_full_request_from_json() {
        let json = r#"{
            "id": "req 2",
            "source": "trx A",
            "destination": "trx C",
            "mode": "mode 1",
            "spectral": { "power_dbm": 2.0 },
            "waypoints": ["roadm B"],
            "waypoint_mode": "strict",
            "disjoint_group": "pair 1"
        }"#;
        let req: ServiceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.waypoint_mode, WaypointMode::Strict);
        assert_eq!(req.waypoints, vec!["roadm B"]);
        assert_eq!(req.disjoint_group.as_deref(), Some("pair 1"));
        assert!((req.spectral.power_dbm.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_builder_helpers() {
        let req = ServiceRequest::new("req 3", "trx A", "trx B", "mode 1")
            .with_waypoints(vec!["roadm X".into()], WaypointMode::Strict)
            .in_group("pair 2");
        assert_eq!(req.waypoints.len(), 1);
        assert_eq!(req.disjoint_group.as_deref(), Some("pair 2"));
    }
}
