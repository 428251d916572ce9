use num_complex::Complex;

/// Per-sample cross product `z[i] = a[i] * conj(b[i])`.
///
/// All three slices must have the same length.
pub fn cross_multiply(a: &[Complex<f32>], b: &[Complex<f32>], z: &mut [Complex<f32>]) {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), z.len());
    for ((out, &x), &y) in z.iter_mut().zip(a.iter()).zip(b.iter()) {
        *out = x * y.conj();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::block_energy;

    fn close(a: Complex<f32>, b: Complex<f32>) -> bool {
        (a - b).norm() <= 1e-5 * (1.0 + b.norm())
    }

    #[test]
    fn product_uses_conjugate_of_second_channel() {
        let a = [Complex::new(1.0f32, 2.0), Complex::new(-3.0, 0.5), Complex::new(0.0, -1.0)];
        let b = [Complex::new(4.0f32, -1.0), Complex::new(2.0, 2.0), Complex::new(0.0, -1.0)];
        let mut z = vec![Complex::default(); 3];
        cross_multiply(&a, &b, &mut z);

        assert_eq!(z.len(), a.len());
        for i in 0..a.len() {
            // (ar + i ai)(br - i bi)
            let expected = Complex::new(
                a[i].re * b[i].re + a[i].im * b[i].im,
                a[i].im * b[i].re - a[i].re * b[i].im,
            );
            assert!(close(z[i], expected), "bin {i}: {} vs {}", z[i], expected);
        }
        // Self product of a pure imaginary sample is real and positive.
        assert!(close(z[2], Complex::new(1.0, 0.0)));
    }

    #[test]
    fn identical_channels_give_power_on_real_axis() {
        let a: Vec<Complex<f32>> = (0..16)
            .map(|i| Complex::from_polar(1.0 + i as f32 * 0.25, i as f32 * 0.7))
            .collect();
        let mut z = vec![Complex::default(); a.len()];
        cross_multiply(&a, &a, &mut z);
        for (zi, ai) in z.iter().zip(a.iter()) {
            assert!(zi.im.abs() < 1e-4);
            assert!((zi.re - ai.norm_sqr()).abs() < 1e-4 * (1.0 + ai.norm_sqr()));
        }
    }

    #[test]
    fn block_energy_equals_sum_of_product_magnitudes() {
        let a: Vec<Complex<f32>> = (0..32)
            .map(|i| Complex::new((i as f32 * 0.3).sin(), (i as f32 * 0.1).cos()))
            .collect();
        let b: Vec<Complex<f32>> = (0..32)
            .map(|i| Complex::new(0.5 - i as f32 * 0.01, (i as f32).sqrt()))
            .collect();
        let mut z = vec![Complex::default(); a.len()];
        cross_multiply(&a, &b, &mut z);

        let direct: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| f64::from(x.norm_sqr()) * f64::from(y.norm_sqr()))
            .sum();
        let energy = block_energy(&z);
        assert!((energy - direct).abs() < 1e-4 * direct, "{energy} vs {direct}");
    }
}
