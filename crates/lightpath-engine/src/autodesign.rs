//! Auto-Design: Committing Amplifier Operating Points
//!
//! Walks a cloned element chain end to end and fills in every amplifier
//! that has no committed operating point. The walk tracks the dB loss
//! accumulated since the last power-restoring element (EDFA or ROADM);
//! an unconfigured amplifier gets exactly that deficit as gain, flat tilt.
//!
//! When the amplifier has no pinned variety the catalog is consulted:
//! varieties allowed for design whose flat-max gain reaches to within a
//! 2.1 dB margin of the target are candidates, the lowest noise figure at
//! the target gain wins, and a variety that cannot quite reach the target
//! operates at its flat-max. An empty candidate list makes the whole path
//! design-infeasible; there is no silent fallback variety.

use lightpath_core::edfa::OperatingPoint;
use lightpath_core::element::NetworkElement;
use lightpath_core::equipment::{EdfaVariety, EquipmentLibrary};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("{uid}: no amplifier variety reaches {gain_db:.2} dB gain")]
    NoSuitableVariety { uid: String, gain_db: f64 },

    #[error("{uid}: {source}")]
    Commit {
        uid: String,
        source: lightpath_core::edfa::ElementError,
    },
}

/// Margin by which a variety's flat-max gain may fall short of the target
/// and still be selected; it then runs at flat-max.
const GAIN_MARGIN_DB: f64 = 2.1;

/// Pick the catalog variety for an amplifier that must deliver `gain_db`.
fn select_variety(library: &EquipmentLibrary, gain_db: f64) -> Option<&EdfaVariety> {
    let mut best: Option<(&EdfaVariety, f64, f64)> = None;
    for variety in library.edfas.iter().filter(|v| v.allowed_for_design) {
        let shortfall = (gain_db - variety.gain_flatmax_db).max(0.0);
        if shortfall > GAIN_MARGIN_DB {
            continue;
        }
        let nf = variety.nf_db(gain_db.min(variety.gain_flatmax_db));
        let better = match best {
            None => true,
            // full-reach varieties beat short ones; then lowest NF
            Some((_, best_shortfall, best_nf)) => {
                (shortfall, nf) < (best_shortfall, best_nf)
            }
        };
        if better {
            best = Some((variety, shortfall, nf));
        }
    }
    best.map(|(v, _, _)| v)
}

/// Fill in every undesigned amplifier along `elements`, in place.
pub fn design_path(
    elements: &mut [NetworkElement],
    library: &EquipmentLibrary,
) -> Result<(), DesignError> {
    let mut deficit_db = 0.0;
    for element in elements.iter_mut() {
        match element {
            NetworkElement::Fiber(f) => deficit_db += f.loss_db(),
            NetworkElement::Fused(f) => deficit_db += f.loss_db,
            NetworkElement::Roadm(_) => deficit_db = 0.0,
            NetworkElement::Edfa(amp) => {
                if !amp.is_designed() {
                    let uid = amp.uid().to_string();
                    let variety = match amp.variety() {
                        Some(v) => v.clone(),
                        None => select_variety(library, deficit_db)
                            .ok_or(DesignError::NoSuitableVariety {
                                uid: uid.clone(),
                                gain_db: deficit_db,
                            })?
                            .clone(),
                    };
                    let gain_db = deficit_db.min(variety.gain_flatmax_db);
                    debug!(
                        uid = uid.as_str(),
                        variety = variety.name.as_str(),
                        gain_db,
                        "amplifier designed"
                    );
                    amp.commit(variety, OperatingPoint { gain_db, tilt_db: 0.0 })
                        .map_err(|source| DesignError::Commit { uid, source })?;
                }
                deficit_db = 0.0;
            }
            NetworkElement::Transceiver(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightpath_core::edfa::Edfa;
    use lightpath_core::element::Transceiver;
    use lightpath_core::equipment::{
        FiberVariety, NfModel, RoadmDefaults, SpectralDefaults,
    };
    use lightpath_core::fiber::{Fiber, FiberParams};

    fn library() -> EquipmentLibrary {
        EquipmentLibrary {
            fibers: vec![FiberVariety::ssmf()],
            edfas: vec![
                EdfaVariety {
                    name: "low_gain".into(),
                    gain_flatmax_db: 16.0,
                    gain_min_db: 8.0,
                    p_max_dbm: 23.0,
                    nf: NfModel::FixedGain { nf0_db: 5.0 },
                    allowed_for_design: true,
                },
                EdfaVariety {
                    name: "high_gain".into(),
                    gain_flatmax_db: 26.0,
                    gain_min_db: 15.0,
                    p_max_dbm: 23.0,
                    nf: NfModel::FixedGain { nf0_db: 6.5 },
                    allowed_for_design: true,
                },
                EdfaVariety {
                    name: "lab_only".into(),
                    gain_flatmax_db: 35.0,
                    gain_min_db: 25.0,
                    p_max_dbm: 26.0,
                    nf: NfModel::FixedGain { nf0_db: 5.5 },
                    allowed_for_design: false,
                },
            ],
            transceiver_modes: vec![],
            spectral: SpectralDefaults::default(),
            roadm: RoadmDefaults::default(),
        }
    }

    fn span(uid: &str, km: f64) -> NetworkElement {
        NetworkElement::Fiber(Fiber::new(FiberParams {
            uid: uid.into(),
            length_km: km,
            con_in_db: 0.5,
            con_out_db: 0.5,
            att_in_db: 0.0,
            variety: FiberVariety::ssmf(),
        }))
    }

    #[test]
    fn test_gain_matches_span_loss() {
        let mut chain = vec![
            NetworkElement::Transceiver(Transceiver::new("trx A")),
            span("fiber A-B", 80.0), // 17 dB
            NetworkElement::Edfa(Edfa::undesigned("amp B", None)),
            NetworkElement::Transceiver(Transceiver::new("trx B")),
        ];
        design_path(&mut chain, &library()).unwrap();
        let NetworkElement::Edfa(amp) = &chain[2] else { panic!() };
        let op = amp.operating().unwrap();
        assert!((op.gain_db - 17.0).abs() < 1e-9, "gain = {}", op.gain_db);
        assert!(op.tilt_db.abs() < f64::EPSILON);
    }

    #[test]
    fn test_low_nf_variety_wins_when_both_reach() {
        let mut chain = vec![
            span("fiber", 50.0), // 11 dB, both varieties reach
            NetworkElement::Edfa(Edfa::undesigned("amp", None)),
        ];
        design_path(&mut chain, &library()).unwrap();
        let NetworkElement::Edfa(amp) = &chain[1] else { panic!() };
        assert_eq!(amp.variety().unwrap().name, "low_gain");
    }

    #[test]
    fn test_high_gain_variety_picked_when_needed() {
        let mut chain = vec![
            span("fiber", 100.0), // 21 dB, beyond low_gain
            NetworkElement::Edfa(Edfa::undesigned("amp", None)),
        ];
        design_path(&mut chain, &library()).unwrap();
        let NetworkElement::Edfa(amp) = &chain[1] else { panic!() };
        assert_eq!(amp.variety().unwrap().name, "high_gain");
        assert!((amp.operating().unwrap().gain_db - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_within_margin_runs_at_flatmax() {
        let mut chain = vec![
            span("fiber", 133.0), // 27.6 dB, 1.6 dB above high_gain flat-max
            NetworkElement::Edfa(Edfa::undesigned("amp", None)),
        ];
        design_path(&mut chain, &library()).unwrap();
        let NetworkElement::Edfa(amp) = &chain[1] else { panic!() };
        assert_eq!(amp.variety().unwrap().name, "high_gain");
        assert!((amp.operating().unwrap().gain_db - 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_variety_reaches_is_infeasible() {
        let mut chain = vec![
            span("fiber", 160.0), // 33 dB, out of everyone's reach
            NetworkElement::Edfa(Edfa::undesigned("amp", None)),
        ];
        let err = design_path(&mut chain, &library()).unwrap_err();
        assert!(matches!(err, DesignError::NoSuitableVariety { gain_db, .. }
            if (gain_db - 33.0).abs() < 1e-9));
    }

    #[test]
    fn test_disallowed_variety_never_selected() {
        // lab_only would reach 33 dB but is not allowed for design
        let mut chain = vec![
            span("fiber", 160.0),
            NetworkElement::Edfa(Edfa::undesigned("amp", None)),
        ];
        assert!(design_path(&mut chain, &library()).is_err());
    }

    #[test]
    fn test_preconfigured_amp_left_alone_and_resets_deficit() {
        let preset = Edfa::new(
            "amp mid",
            library().edfas[1].clone(),
            OperatingPoint { gain_db: 20.0, tilt_db: 0.3 },
        );
        let mut chain = vec![
            span("fiber 1", 80.0),
            NetworkElement::Edfa(preset),
            span("fiber 2", 50.0), // 11 dB since the preset amp
            NetworkElement::Edfa(Edfa::undesigned("amp end", None)),
        ];
        design_path(&mut chain, &library()).unwrap();
        let NetworkElement::Edfa(mid) = &chain[1] else { panic!() };
        assert!((mid.operating().unwrap().gain_db - 20.0).abs() < 1e-12);
        assert!((mid.operating().unwrap().tilt_db - 0.3).abs() < 1e-12);
        let NetworkElement::Edfa(end) = &chain[3] else { panic!() };
        assert!((end.operating().unwrap().gain_db - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_roadm_resets_deficit() {
        use lightpath_core::roadm::{Roadm, RoadmParams};
        use std::collections::HashMap;
        let mut chain = vec![
            span("fiber 1", 100.0),
            NetworkElement::Roadm(Roadm::new(RoadmParams {
                uid: "roadm B".into(),
                target_pch_out_dbm: -20.0,
                per_degree_pch_out_dbm: HashMap::new(),
                add_drop_osnr_db: 38.0,
            })),
            span("fiber 2", 50.0),
            NetworkElement::Edfa(Edfa::undesigned("amp C", None)),
        ];
        design_path(&mut chain, &library()).unwrap();
        let NetworkElement::Edfa(amp) = &chain[3] else { panic!() };
        // only fiber 2's 11 dB count after the roadm
        assert!((amp.operating().unwrap().gain_db - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_pinned_variety_without_gain_gets_deficit() {
        let mut chain = vec![
            span("fiber", 80.0),
            NetworkElement::Edfa(Edfa::undesigned("amp", Some(library().edfas[1].clone()))),
        ];
        design_path(&mut chain, &library()).unwrap();
        let NetworkElement::Edfa(amp) = &chain[1] else { panic!() };
        assert_eq!(amp.variety().unwrap().name, "high_gain");
        assert!((amp.operating().unwrap().gain_db - 17.0).abs() < 1e-9);
    }
}
