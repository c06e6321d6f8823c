//! Peak frequency detection with parabolic interpolation
//!
//! Locates the dominant bin of a magnitude spectrum and refines the peak
//! position to sub-bin accuracy by fitting a parabola through the maximum
//! and its two neighbors.

/// A refined spectral peak
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PeakEstimate {
    /// Fractional bin index of the peak
    pub bin: f32,
    /// Peak position converted to Hz
    pub frequency_hz: f32,
}

/// Find the dominant frequency in `magnitudes` within `range_hz`.
///
/// `magnitudes` is a half-spectrum (one value per bin, `fft_size / 2`
/// entries); any monotonic scale works, dB included. Returns a zero
/// estimate when the slice is empty or the range contains no bins.
pub fn estimate_peak(
    magnitudes: &[f32],
    sample_rate: u32,
    range_hz: (f32, f32),
) -> PeakEstimate {
    let bins = magnitudes.len();
    if bins == 0 {
        return PeakEstimate::default();
    }

    let sr = sample_rate as f32;
    let (low_hz, high_hz) = range_hz;
    let low_bin = ((low_hz * bins as f32 * 2.0) / sr).floor() as usize;
    let high_bin = (((high_hz * bins as f32 * 2.0) / sr).floor() as usize).min(bins);

    let mut max_value = f32::NEG_INFINITY;
    let mut max_index = low_bin;
    for (i, &m) in magnitudes
        .iter()
        .enumerate()
        .take(high_bin)
        .skip(low_bin)
    {
        if m > max_value {
            max_value = m;
            max_index = i;
        }
    }

    if !max_value.is_finite() {
        return PeakEstimate::default();
    }

    // Parabolic refinement through (i-1, y1), (i, y2), (i+1, y3).
    // Only a concave-down fit (a < 0) describes a genuine peak.
    let mut peak = max_index as f32;
    if max_index > 0 && max_index < bins - 1 {
        let y1 = magnitudes[max_index - 1];
        let y2 = magnitudes[max_index];
        let y3 = magnitudes[max_index + 1];

        let a = (y1 - 2.0 * y2 + y3) / 2.0;
        let b = (y3 - y1) / 2.0;

        if a < 0.0 {
            peak = max_index as f32 - b / (2.0 * a);
        }
    }

    let bin_hz = sr / (2.0 * bins as f32);
    PeakEstimate {
        bin: peak,
        frequency_hz: peak * bin_hz,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 48000;

    fn bin_hz(bins: usize) -> f32 {
        SAMPLE_RATE as f32 / (2.0 * bins as f32)
    }

    #[test]
    fn test_exact_bin_impulse_has_no_correction() {
        let bins = 1024;
        let mut mags = vec![0.0f32; bins];
        mags[40] = 1.0;

        let est = estimate_peak(&mags, SAMPLE_RATE, (20.0, 2000.0));
        // Neighbors are zero: the parabola degenerates (a == 0, b == 0)
        assert_eq!(est.bin, 40.0);
        assert!((est.frequency_hz - 40.0 * bin_hz(bins)).abs() < 1e-3);
    }

    #[test]
    fn test_sub_bin_peak_is_refined() {
        let bins = 1024;
        let width = bin_hz(bins);
        // True peak 30% of the way between bins 40 and 41
        let true_freq = (40.0 + 0.3) * width;

        // Gaussian-like magnitudes straddling the two bins
        let mut mags = vec![0.0f32; bins];
        for i in 38..=43 {
            let d = i as f32 * width - true_freq;
            mags[i] = (-d * d / (width * width)).exp();
        }

        let est = estimate_peak(&mags, SAMPLE_RATE, (20.0, 2000.0));
        let nearest_bin_freq = 40.0 * width;

        let refined_err = (est.frequency_hz - true_freq).abs();
        let nearest_err = (nearest_bin_freq - true_freq).abs();
        assert!(
            refined_err < nearest_err,
            "refined {refined_err} should beat nearest-bin {nearest_err}"
        );
    }

    #[test]
    fn test_search_range_excludes_out_of_band_peaks() {
        let bins = 1024;
        let mut mags = vec![0.0f32; bins];
        // Huge peak near DC, smaller one at ~440 Hz
        mags[1] = 10.0;
        let target_bin = (440.0 / bin_hz(bins)).round() as usize;
        mags[target_bin] = 1.0;

        let est = estimate_peak(&mags, SAMPLE_RATE, (50.0, 2000.0));
        assert!((est.frequency_hz - 440.0).abs() < bin_hz(bins));
    }

    #[test]
    fn test_empty_spectrum_returns_zero() {
        let est = estimate_peak(&[], SAMPLE_RATE, (50.0, 2000.0));
        assert_eq!(est.frequency_hz, 0.0);
    }

    #[test]
    fn test_works_on_db_scaled_input() {
        let bins = 1024;
        let mut mags = vec![-120.0f32; bins];
        mags[39] = -40.0;
        mags[40] = -20.0;
        mags[41] = -35.0;

        let est = estimate_peak(&mags, SAMPLE_RATE, (20.0, 2000.0));
        // Refined toward the louder right neighbor, still within the bin
        assert!(est.bin > 40.0 && est.bin < 40.5);
    }
}
