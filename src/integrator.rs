use num_complex::Complex;

use crate::config::{CorrelatorConfig, SpectrumOrder};
use crate::utils::{accumulate_power_add, block_energy, fft_shift};

/// Averaged statistics of one completed integration window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSummary {
    /// 1-based window number.
    pub index: u64,
    /// Nominal time at the end of the window, `index * integration_seconds`.
    pub elapsed_seconds: f64,
    /// `sqrt(sum |z|^2 / (N * blocks))`.
    pub rms_power: f64,
    /// `sqrt(sum |Z_k|^2 / blocks)` per bin, in the configured column order.
    pub rms_spectrum: Vec<f64>,
}

/// Accumulates cross power and cross spectrum power block by block and emits
/// a [`WindowSummary`] whenever `window_blocks` blocks have been absorbed.
///
/// Both accumulators are reset together in the same call that produces the
/// summary, so no state straddles a window boundary.
pub struct Integrator {
    out_complex: usize,
    window_blocks: usize,
    integration_seconds: f64,
    order: SpectrumOrder,
    power_accum: f64,
    spectral_accum: Vec<f64>,
    block_count: usize,
    elapsed_seconds: f64,
    windows_emitted: u64,
}

impl Integrator {
    pub fn new(config: &CorrelatorConfig) -> Self {
        Self {
            out_complex: config.out_complex,
            window_blocks: config.window_blocks(),
            integration_seconds: config.integration_seconds_f64(),
            order: config.spectrum_order,
            power_accum: 0.0,
            spectral_accum: vec![0.0; config.out_complex],
            block_count: 0,
            elapsed_seconds: 0.0,
            windows_emitted: 0,
        }
    }

    /// Absorbs one block: `z` is the cross-correlation vector and `spectrum`
    /// its DFT. Returns the window summary when this block closes a window.
    pub fn accumulate(
        &mut self,
        z: &[Complex<f32>],
        spectrum: &[Complex<f32>],
    ) -> Option<WindowSummary> {
        debug_assert_eq!(z.len(), self.out_complex);
        debug_assert_eq!(spectrum.len(), self.out_complex);

        self.power_accum += block_energy(z);
        accumulate_power_add(&mut self.spectral_accum, spectrum);
        self.block_count += 1;

        if self.block_count == self.window_blocks {
            Some(self.flush())
        } else {
            None
        }
    }

    fn flush(&mut self) -> WindowSummary {
        self.elapsed_seconds += self.integration_seconds;
        self.windows_emitted += 1;

        let blocks = self.block_count as f64;
        let rms_power = (self.power_accum / (self.out_complex as f64 * blocks)).sqrt();
        let natural: Vec<f64> = self
            .spectral_accum
            .iter()
            .map(|&acc| (acc / blocks).sqrt())
            .collect();
        let rms_spectrum = match self.order {
            SpectrumOrder::Natural => natural,
            SpectrumOrder::Centered => fft_shift(&natural),
        };

        self.power_accum = 0.0;
        self.spectral_accum.fill(0.0);
        self.block_count = 0;

        WindowSummary {
            index: self.windows_emitted,
            elapsed_seconds: self.elapsed_seconds,
            rms_power,
            rms_spectrum,
        }
    }

    /// Blocks absorbed into the window that is still open.
    pub fn pending_blocks(&self) -> usize {
        self.block_count
    }

    pub fn windows_emitted(&self) -> u64 {
        self.windows_emitted
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Drops the open window at end of stream and returns how many blocks it
    /// held. Nothing is emitted for a partial window.
    pub fn discard_partial(&mut self) -> usize {
        let dropped = self.block_count;
        self.power_accum = 0.0;
        self.spectral_accum.fill(0.0);
        self.block_count = 0;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(order: SpectrumOrder) -> CorrelatorConfig {
        CorrelatorConfig {
            out_complex: 4,
            blocks_per_second: 3,
            integration_seconds: 2,
            sample_rate_hz: 4.0,
            spectrum_order: order,
            ..CorrelatorConfig::default()
        }
    }

    fn ones(len: usize) -> Vec<Complex<f32>> {
        vec![Complex::new(1.0, 0.0); len]
    }

    fn dc_spectrum(len: usize) -> Vec<Complex<f32>> {
        let mut spec = vec![Complex::new(0.0, 0.0); len];
        spec[0] = Complex::new(len as f32, 0.0);
        spec
    }

    #[test]
    fn flush_fires_exactly_at_window_boundary() {
        let cfg = small_config(SpectrumOrder::Natural);
        let mut integ = Integrator::new(&cfg);
        let z = ones(4);
        let spec = dc_spectrum(4);

        for _ in 0..cfg.window_blocks() - 1 {
            assert!(integ.accumulate(&z, &spec).is_none());
        }
        assert_eq!(integ.pending_blocks(), 5);
        let window = integ.accumulate(&z, &spec).expect("window should close");
        assert_eq!(integ.pending_blocks(), 0);

        assert_eq!(window.index, 1);
        assert_eq!(window.elapsed_seconds, 2.0);
        assert!((window.rms_power - 1.0).abs() < 1e-12);
        assert_eq!(window.rms_spectrum.len(), 4);
        assert!((window.rms_spectrum[0] - 4.0).abs() < 1e-12);
        assert!(window.rms_spectrum[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn averages_divide_by_block_count() {
        let cfg = CorrelatorConfig {
            blocks_per_second: 2,
            integration_seconds: 1,
            ..small_config(SpectrumOrder::Natural)
        };
        let mut integ = Integrator::new(&cfg);
        let z1 = vec![Complex::new(2.0f32, 0.0); 4];
        let z2 = vec![Complex::new(0.0f32, 0.0); 4];
        let s1 = vec![Complex::new(3.0f32, 4.0); 4];
        let s2 = vec![Complex::new(0.0f32, 0.0); 4];
        assert!(integ.accumulate(&z1, &s1).is_none());
        let window = integ.accumulate(&z2, &s2).unwrap();
        // power: (4 * 4) / (4 * 2) = 2
        assert!((window.rms_power - 2.0f64.sqrt()).abs() < 1e-12);
        // spectrum: 25 / 2 per bin
        for v in &window.rms_spectrum {
            assert!((v - 12.5f64.sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn accumulators_reset_between_windows() {
        let cfg = small_config(SpectrumOrder::Natural);
        let mut integ = Integrator::new(&cfg);
        let loud = vec![Complex::new(3.0f32, 0.0); 4];
        let quiet = ones(4);
        let spec = dc_spectrum(4);

        let mut windows = Vec::new();
        for _ in 0..cfg.window_blocks() {
            windows.extend(integ.accumulate(&loud, &spec));
        }
        for _ in 0..cfg.window_blocks() {
            windows.extend(integ.accumulate(&quiet, &spec));
        }
        assert_eq!(windows.len(), 2);
        assert!((windows[0].rms_power - 3.0).abs() < 1e-12);
        assert!((windows[1].rms_power - 1.0).abs() < 1e-12);
        assert_eq!(windows[1].elapsed_seconds, 4.0);
        assert_eq!(windows[1].index, 2);
        assert_eq!(integ.windows_emitted(), 2);
        assert_eq!(integ.elapsed_seconds(), 4.0);
    }

    #[test]
    fn partial_window_is_discarded() {
        let cfg = small_config(SpectrumOrder::Centered);
        let mut integ = Integrator::new(&cfg);
        for _ in 0..cfg.window_blocks() - 1 {
            assert!(integ.accumulate(&ones(4), &dc_spectrum(4)).is_none());
        }
        assert_eq!(integ.discard_partial(), cfg.window_blocks() - 1);
        assert_eq!(integ.pending_blocks(), 0);
        assert_eq!(integ.windows_emitted(), 0);
        assert_eq!(integ.elapsed_seconds(), 0.0);
    }

    #[test]
    fn centered_order_moves_dc_to_middle_column() {
        let cfg = small_config(SpectrumOrder::Centered);
        let mut integ = Integrator::new(&cfg);
        let spec = vec![
            Complex::new(1.0f32, 0.0),
            Complex::new(2.0, 0.0),
            Complex::new(3.0, 0.0),
            Complex::new(4.0, 0.0),
        ];
        let mut last = None;
        for _ in 0..cfg.window_blocks() {
            last = integ.accumulate(&ones(4), &spec);
        }
        let window = last.unwrap();
        assert_eq!(window.rms_spectrum, vec![3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn nan_samples_propagate_without_error() {
        let cfg = CorrelatorConfig {
            blocks_per_second: 1,
            integration_seconds: 1,
            ..small_config(SpectrumOrder::Natural)
        };
        let mut integ = Integrator::new(&cfg);
        let z = vec![Complex::new(f32::NAN, 0.0); 4];
        let window = integ.accumulate(&z, &z).unwrap();
        assert!(window.rms_power.is_nan());
        assert!(window.rms_spectrum.iter().all(|v| v.is_nan()));
    }
}
