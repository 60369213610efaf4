//! Conversion of the normalized interleaves to gradient amplitudes.

use crate::integrator::HardwareLimits;
use crate::topology::Waveform;
use crate::{GradientSampleVec, PeakAmplitude};

/// Physical gradients of every interleave, expressed relative to the peak
/// amplitude of each axis, plus those peaks. An axis that is zero
/// everywhere keeps zero samples and a zero peak.
pub fn normalize(
    interleaves: &[Waveform],
    kmax: f64,
    limits: &HardwareLimits,
) -> (Vec<GradientSampleVec>, PeakAmplitude) {
    let scale = limits.gradient(kmax);
    let physical: Vec<GradientSampleVec> = interleaves
        .iter()
        .map(|w| w.samples.scaled(PeakAmplitude {
            x: scale,
            y: scale,
            z: scale,
        }))
        .collect();

    let peak = physical
        .iter()
        .map(GradientSampleVec::peak)
        .fold(PeakAmplitude::default(), |acc, p| PeakAmplitude {
            x: acc.x.max(p.x),
            y: acc.y.max(p.y),
            z: acc.z.max(p.z),
        });

    let inverse = |p: f64| if p > 0.0 { 1.0 / p } else { 0.0 };
    let inverse = PeakAmplitude {
        x: inverse(peak.x),
        y: inverse(peak.y),
        z: inverse(peak.z),
    };
    let normalized = physical.iter().map(|g| g.scaled(inverse)).collect();

    tracing::debug!(
        peak_x = peak.x,
        peak_y = peak.y,
        peak_z = peak.z,
        "normalized gradient amplitudes"
    );

    (normalized, peak)
}
