//! Unit Conversions and Physical Constants
//!
//! dB/linear and dBm/watt conversions plus the constants and channel-grid
//! helpers used throughout the transmission model. All powers inside the
//! propagation engine are carried in watts; dB values only appear at the
//! configuration and reporting boundaries.
//!
//! ## Example
//!
//! ```rust
//! use lightpath_core::units::{db2lin, lin2db, dbm2watt, watt2dbm};
//!
//! assert!((db2lin(3.0) - 1.995).abs() < 0.01);
//! assert!((lin2db(100.0) - 20.0).abs() < 1e-12);
//! assert!((dbm2watt(0.0) - 1e-3).abs() < 1e-15);
//! assert!((watt2dbm(1e-3)).abs() < 1e-12);
//! ```

/// Planck constant (J*s).
pub const PLANCK: f64 = 6.626_070_15e-34;

/// Speed of light (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Conventional C-band reference frequency (Hz).
pub const REF_FREQUENCY_HZ: f64 = 193.5e12;

/// Reference noise bandwidth of a 0.1 nm optical spectrum analyzer slot (Hz).
pub const BW_01NM_HZ: f64 = 12.5e9;

/// Convert a dB value to linear scale.
pub fn db2lin(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Convert a linear value to dB.
pub fn lin2db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Convert a power in dBm to watts.
pub fn dbm2watt(dbm: f64) -> f64 {
    1e-3 * db2lin(dbm)
}

/// Convert a power in watts to dBm.
pub fn watt2dbm(watt: f64) -> f64 {
    lin2db(watt * 1e3)
}

/// Number of channels that fit between `f_min` and `f_max` on a fixed grid.
///
/// The first channel sits one `spacing` above `f_min`, so a 4.75 THz band
/// on a 50 GHz grid carries 95 channels.
pub fn channel_count(f_min_hz: f64, f_max_hz: f64, spacing_hz: f64) -> usize {
    if spacing_hz <= 0.0 || f_max_hz <= f_min_hz {
        return 0;
    }
    ((f_max_hz - f_min_hz) / spacing_hz).floor() as usize
}

/// Center frequencies of a fixed channel grid.
pub fn channel_frequencies(f_min_hz: f64, spacing_hz: f64, count: usize) -> Vec<f64> {
    (1..=count).map(|i| f_min_hz + spacing_hz * i as f64).collect()
}

/// Combine an SNR (measured in bandwidth `bw_hz`) with a penalty quoted in
/// the 0.1 nm reference bandwidth, using inverse-dB summation.
///
/// Penalties such as transmitter OSNR or ROADM add/drop OSNR are quoted in
/// 0.1 nm; the penalty is first rescaled into the signal bandwidth, then the
/// two noise contributions add linearly.
pub fn snr_sum(snr_db: f64, bw_hz: f64, penalty_01nm_db: f64) -> f64 {
    let penalty = penalty_01nm_db - lin2db(bw_hz / BW_01NM_HZ);
    -lin2db(db2lin(-snr_db) + db2lin(-penalty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_roundtrip() {
        for db in [-30.0, -3.0, 0.0, 3.0, 16.0, 20.0] {
            let back = lin2db(db2lin(db));
            assert!((back - db).abs() < 1e-12, "roundtrip {db} -> {back}");
        }
    }

    #[test]
    fn test_dbm_known_values() {
        // 0 dBm = 1 mW, 30 dBm = 1 W
        assert!((dbm2watt(0.0) - 1e-3).abs() < 1e-15);
        assert!((dbm2watt(30.0) - 1.0).abs() < 1e-12);
        assert!((watt2dbm(1.0) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_channel_count_cband() {
        // Full C band on a 50 GHz grid
        let n = channel_count(191.35e12, 196.1e12, 50e9);
        assert_eq!(n, 95, "C band / 50 GHz should give 95 channels, got {n}");
    }

    #[test]
    fn test_channel_frequencies_grid() {
        let freqs = channel_frequencies(191.35e12, 50e9, 3);
        assert_eq!(freqs.len(), 3);
        assert!((freqs[0] - 191.4e12).abs() < 1.0);
        assert!((freqs[2] - freqs[1] - 50e9).abs() < 1.0);
    }

    #[test]
    fn test_snr_sum_dominated_by_worst() {
        // A huge penalty leaves the SNR unchanged
        let snr = snr_sum(20.0, 32e9, 100.0);
        assert!((snr - 20.0).abs() < 0.01, "snr = {snr:.3}");
        // Equal contributions cost 3 dB: penalty re-scaled into 32 GBd is
        // 20 dB when quoted as 20 + 10log10(32/12.5) in 0.1 nm
        let penalty = 20.0 + lin2db(32e9 / BW_01NM_HZ);
        let snr = snr_sum(20.0, 32e9, penalty);
        assert!((snr - 16.99).abs() < 0.02, "snr = {snr:.3}");
    }
}
