//! FFT power spectrum.

use crate::{AnalysisError, AnalysisResult};
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

/// Magnitudes of the first half of the DFT of `data`. Radix-2 only: the
/// input length must be a power of two (callers zero-pad beforehand).
pub fn power_spectrum(data: &[f64]) -> AnalysisResult<Vec<f64>> {
    let n = data.len();
    if !n.is_power_of_two() {
        return Err(AnalysisError::NotPowerOfTwo(n));
    }
    if n <= 1 {
        return Ok(data.iter().map(|v| v.abs()).collect());
    }

    let mut buf: Vec<Complex64> = data.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    FftPlanner::<f64>::new().plan_fft_forward(n).process(&mut buf);

    Ok(buf[..n / 2].iter().map(|c| c.norm()).collect())
}
