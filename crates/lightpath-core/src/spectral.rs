//! Spectral Information: Per-Channel Power and Noise State
//!
//! The evolving physical state of a multiplexed channel comb at one point
//! in the network. Each network element consumes the state, applies its
//! transfer function and hands it to the next element; only signal power
//! and the two noise accumulators (ASE, NLI) ever change after creation;
//! the frequency grid and baud rate are fixed for the lifetime of a
//! propagation run.
//!
//! ## Example
//!
//! ```rust
//! use lightpath_core::spectral::SpectralInformation;
//!
//! // Full C band, 50 GHz grid, 32 GBd, 0 dBm per channel
//! let si = SpectralInformation::on_grid(191.35e12, 196.1e12, 50e9, 32e9, 1e-3).unwrap();
//! assert_eq!(si.channels(), 95);
//! assert!((si.total_power_dbm() - 19.77).abs() < 0.05);
//! ```

use thiserror::Error;

use crate::units::{lin2db, watt2dbm};

#[derive(Debug, Error)]
pub enum SpectralError {
    #[error("baud rate {baud_rate:.3e} Bd exceeds channel spacing {spacing:.3e} Hz")]
    BaudRateAboveSpacing { baud_rate: f64, spacing: f64 },

    #[error("empty channel grid: f_min {f_min:.3e} Hz, f_max {f_max:.3e} Hz, spacing {spacing:.3e} Hz")]
    EmptyGrid { f_min: f64, f_max: f64, spacing: f64 },
}

/// Per-channel power/noise state of a WDM comb, all powers in watts.
#[derive(Debug, Clone)]
pub struct SpectralInformation {
    frequency: Vec<f64>,
    baud_rate: f64,
    spacing: f64,
    signal: Vec<f64>,
    ase: Vec<f64>,
    nli: Vec<f64>,
}

impl SpectralInformation {
    /// Build a flat comb on a fixed grid with `power_w` launch power per
    /// channel and zero accumulated noise.
    pub fn on_grid(
        f_min_hz: f64,
        f_max_hz: f64,
        spacing_hz: f64,
        baud_rate: f64,
        power_w: f64,
    ) -> Result<Self, SpectralError> {
        if baud_rate > spacing_hz {
            return Err(SpectralError::BaudRateAboveSpacing {
                baud_rate,
                spacing: spacing_hz,
            });
        }
        let n = crate::units::channel_count(f_min_hz, f_max_hz, spacing_hz);
        if n == 0 {
            return Err(SpectralError::EmptyGrid {
                f_min: f_min_hz,
                f_max: f_max_hz,
                spacing: spacing_hz,
            });
        }
        Ok(Self {
            frequency: crate::units::channel_frequencies(f_min_hz, spacing_hz, n),
            baud_rate,
            spacing: spacing_hz,
            signal: vec![power_w; n],
            ase: vec![0.0; n],
            nli: vec![0.0; n],
        })
    }

    pub fn channels(&self) -> usize {
        self.frequency.len()
    }

    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    pub fn baud_rate(&self) -> f64 {
        self.baud_rate
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn signal(&self) -> &[f64] {
        &self.signal
    }

    pub fn ase(&self) -> &[f64] {
        &self.ase
    }

    pub fn nli(&self) -> &[f64] {
        &self.nli
    }

    /// Scale signal and both noise accumulators by a linear factor.
    ///
    /// Passive elements attenuate everything proportionally, which is why
    /// noise ratios survive insertion loss unchanged.
    pub fn scale(&mut self, factor: f64) {
        for i in 0..self.signal.len() {
            self.signal[i] *= factor;
            self.ase[i] *= factor;
            self.nli[i] *= factor;
        }
    }

    /// Scale a single channel (signal + noise) by a linear factor.
    pub fn scale_channel(&mut self, ch: usize, factor: f64) {
        self.signal[ch] *= factor;
        self.ase[ch] *= factor;
        self.nli[ch] *= factor;
    }

    /// Attenuate all channels by a positive dB loss.
    pub fn attenuate_db(&mut self, loss_db: f64) {
        self.scale(1.0 / crate::units::db2lin(loss_db));
    }

    /// Add per-channel NLI power (W), e.g. generated by one fiber span.
    pub fn add_nli(&mut self, nli_w: &[f64]) {
        for (acc, add) in self.nli.iter_mut().zip(nli_w) {
            *acc += add;
        }
    }

    /// Add per-channel ASE power (W), e.g. injected by an amplifier.
    pub fn add_ase(&mut self, ase_w: &[f64]) {
        for (acc, add) in self.ase.iter_mut().zip(ase_w) {
            *acc += add;
        }
    }

    /// Per-channel OSNR (signal over ASE) in dB. Infinite before the first
    /// amplifier since no ASE has accumulated yet.
    pub fn osnr_db(&self) -> Vec<f64> {
        self.signal
            .iter()
            .zip(&self.ase)
            .map(|(s, a)| lin2db(s / a))
            .collect()
    }

    /// Per-channel SNR (signal over ASE + NLI) in dB.
    pub fn snr_db(&self) -> Vec<f64> {
        self.signal
            .iter()
            .zip(self.ase.iter().zip(&self.nli))
            .map(|(s, (a, n))| lin2db(s / (a + n)))
            .collect()
    }

    pub fn mean_osnr_db(&self) -> f64 {
        mean(&self.osnr_db())
    }

    pub fn mean_snr_db(&self) -> f64 {
        mean(&self.snr_db())
    }

    /// Total comb power (signal + ASE + NLI) in watts.
    pub fn total_power_w(&self) -> f64 {
        self.signal.iter().sum::<f64>() + self.ase.iter().sum::<f64>() + self.nli.iter().sum::<f64>()
    }

    pub fn total_power_dbm(&self) -> f64 {
        watt2dbm(self.total_power_w())
    }

    /// Weakest per-channel signal power in dBm.
    pub fn min_signal_dbm(&self) -> f64 {
        watt2dbm(self.signal.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn mean_signal_dbm(&self) -> f64 {
        watt2dbm(self.signal.iter().sum::<f64>() / self.signal.len() as f64)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comb() -> SpectralInformation {
        SpectralInformation::on_grid(191.35e12, 196.1e12, 50e9, 32e9, 1e-3).unwrap()
    }

    #[test]
    fn test_grid_construction() {
        let si = comb();
        assert_eq!(si.channels(), 95);
        assert!((si.frequency()[0] - 191.4e12).abs() < 1.0);
        assert!((si.mean_signal_dbm()).abs() < 1e-9, "launch should be 0 dBm");
    }

    #[test]
    fn test_baud_rate_above_spacing_rejected() {
        let res = SpectralInformation::on_grid(191.35e12, 196.1e12, 50e9, 64e9, 1e-3);
        assert!(matches!(
            res,
            Err(SpectralError::BaudRateAboveSpacing { .. })
        ));
    }

    #[test]
    fn test_empty_grid_rejected() {
        let res = SpectralInformation::on_grid(196.1e12, 191.35e12, 50e9, 32e9, 1e-3);
        assert!(matches!(res, Err(SpectralError::EmptyGrid { .. })));
    }

    #[test]
    fn test_attenuation_scales_noise_proportionally() {
        let mut si = comb();
        si.add_ase(&vec![1e-7; 95]);
        si.add_nli(&vec![1e-8; 95]);
        let snr_before = si.mean_snr_db();
        si.attenuate_db(10.0);
        let snr_after = si.mean_snr_db();
        assert!(
            (snr_before - snr_after).abs() < 1e-9,
            "proportional loss must leave SNR unchanged: {snr_before} vs {snr_after}"
        );
        assert!((si.mean_signal_dbm() - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_osnr_snr_ordering() {
        let mut si = comb();
        si.add_ase(&vec![1e-7; 95]);
        si.add_nli(&vec![1e-8; 95]);
        // SNR includes NLI on top of ASE, so it is always the lower figure
        assert!(si.mean_snr_db() < si.mean_osnr_db());
    }
}
