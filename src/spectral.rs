use std::f64::consts::PI;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{CorrelatorError, Result};

/// Forward DFT applied to each block's cross-correlation vector.
///
/// Implementations keep no state between blocks beyond their plan and
/// scratch space. Output is natural DFT order (bin 0 = DC).
pub trait SpectralTransform {
    fn len(&self) -> usize;

    fn name(&self) -> &'static str;

    /// Transforms `buffer` in place. `buffer.len()` must equal [`Self::len`].
    fn forward(&mut self, buffer: &mut [Complex<f32>]) -> Result<()>;
}

/// Planned FFT backend.
pub struct RustFftTransform {
    len: usize,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl RustFftTransform {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(len);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self { len, fft, scratch }
    }
}

impl SpectralTransform for RustFftTransform {
    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &'static str {
        "rustfft"
    }

    fn forward(&mut self, buffer: &mut [Complex<f32>]) -> Result<()> {
        if buffer.len() != self.len {
            return Err(CorrelatorError::LengthMismatch {
                expected: self.len,
                actual: buffer.len(),
            });
        }
        self.fft.process_with_scratch(buffer, &mut self.scratch);
        Ok(())
    }
}

/// Textbook O(N^2) DFT evaluated in double precision. Slow, but independent
/// of any FFT library.
pub struct DirectDft {
    twiddles: Vec<Complex<f64>>,
    work: Vec<Complex<f64>>,
}

impl DirectDft {
    pub fn new(len: usize) -> Self {
        let twiddles = (0..len)
            .map(|k| Complex::from_polar(1.0, -2.0 * PI * k as f64 / len as f64))
            .collect();
        Self {
            twiddles,
            work: vec![Complex::new(0.0, 0.0); len],
        }
    }
}

impl SpectralTransform for DirectDft {
    fn len(&self) -> usize {
        self.twiddles.len()
    }

    fn name(&self) -> &'static str {
        "direct-dft"
    }

    fn forward(&mut self, buffer: &mut [Complex<f32>]) -> Result<()> {
        let len = self.twiddles.len();
        if buffer.len() != len {
            return Err(CorrelatorError::LengthMismatch {
                expected: len,
                actual: buffer.len(),
            });
        }
        for (k, out) in self.work.iter_mut().enumerate() {
            let mut acc = Complex::new(0.0, 0.0);
            for (n, x) in buffer.iter().enumerate() {
                let x = Complex::new(f64::from(x.re), f64::from(x.im));
                acc += x * self.twiddles[(k * n) % len];
            }
            *out = acc;
        }
        for (dst, src) in buffer.iter_mut().zip(self.work.iter()) {
            *dst = Complex::new(src.re as f32, src.im as f32);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signal(len: usize) -> Vec<Complex<f32>> {
        (0..len)
            .map(|n| {
                let t = n as f32;
                Complex::new((0.3 * t).cos() + 0.1 * t, (0.7 * t).sin() - 0.05)
            })
            .collect()
    }

    #[test]
    fn ones_vector_concentrates_in_dc_bin() {
        let mut fft = RustFftTransform::new(8);
        let mut buf = vec![Complex::new(1.0f32, 0.0); 8];
        fft.forward(&mut buf).unwrap();
        assert!((buf[0] - Complex::new(8.0, 0.0)).norm() < 1e-5);
        for bin in &buf[1..] {
            assert!(bin.norm() < 1e-5);
        }
    }

    #[test]
    fn tone_lands_in_its_bin() {
        let len = 16;
        let tone_bin = 3;
        let mut buf: Vec<Complex<f32>> = (0..len)
            .map(|n| {
                Complex::from_polar(1.0, 2.0 * std::f32::consts::PI * (tone_bin * n) as f32 / len as f32)
            })
            .collect();
        RustFftTransform::new(len).forward(&mut buf).unwrap();
        let peak = buf
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().partial_cmp(&b.1.norm()).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        assert_eq!(peak, tone_bin);
        assert!((buf[tone_bin].norm() - len as f32).abs() < 1e-3);
    }

    #[test]
    fn backends_agree() {
        for len in [1usize, 5, 8, 12, 256] {
            let signal = test_signal(len);
            let mut fast = signal.clone();
            let mut slow = signal.clone();
            RustFftTransform::new(len).forward(&mut fast).unwrap();
            DirectDft::new(len).forward(&mut slow).unwrap();
            let scale: f32 = slow.iter().map(|c| c.norm()).fold(1.0, f32::max);
            for (k, (f, s)) in fast.iter().zip(slow.iter()).enumerate() {
                assert!(
                    (f - s).norm() <= 1e-4 * scale,
                    "len {len} bin {k}: {f} vs {s}"
                );
            }
        }
    }

    #[test]
    fn wrong_length_is_reported() {
        let mut fft = RustFftTransform::new(8);
        let mut buf = vec![Complex::new(0.0f32, 0.0); 4];
        assert!(matches!(
            fft.forward(&mut buf),
            Err(CorrelatorError::LengthMismatch { expected: 8, actual: 4 })
        ));
        let mut dft = DirectDft::new(8);
        assert!(dft.forward(&mut buf).is_err());
    }

    #[test]
    fn trait_objects_report_their_size() {
        let backends: Vec<Box<dyn SpectralTransform>> =
            vec![Box::new(RustFftTransform::new(32)), Box::new(DirectDft::new(32))];
        for backend in &backends {
            assert_eq!(backend.len(), 32);
            assert!(!backend.name().is_empty());
        }
    }
}
