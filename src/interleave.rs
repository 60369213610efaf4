use std::f64::consts::TAU;

use rayon::prelude::*;

use crate::topology::Waveform;
use crate::util::PlaneMatrix;
use crate::GradientSampleVec;

/// Rotates the base interleaf by `TAU * i / nitlv` for every interleave `i`.
/// z is copied unchanged, every interleave oscillates with the same phase
/// in time.
pub fn replicate(base: &Waveform, nitlv: u32) -> Vec<Waveform> {
    let interleaves: Vec<Waveform> = (0..nitlv)
        .into_par_iter()
        .map(|i| rotate(base, TAU * i as f64 / nitlv as f64))
        .collect();

    tracing::debug!(nitlv, samples = base.len(), "replicated interleaves");
    interleaves
}

pub fn rotate(base: &Waveform, angle: f64) -> Waveform {
    let rotation = PlaneMatrix::rotation(angle);
    let samples: Vec<_> = base
        .samples
        .iter()
        .map(|mut sample| {
            sample *= &rotation;
            sample
        })
        .collect();

    Waveform {
        samples: GradientSampleVec::from(samples),
        segment_starts: base.segment_starts.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn base() -> Waveform {
        let n = 50;
        let samples = GradientSampleVec {
            x: (0..n).map(|i| (i as f64 * 0.3).cos()).collect(),
            y: (0..n).map(|i| (i as f64 * 0.3).sin() * 0.5).collect(),
            z: (0..n).map(|i| i as f64 * 0.01).collect(),
        };
        Waveform {
            samples,
            segment_starts: vec![0, 25],
        }
    }

    #[test]
    fn count_and_order() {
        let base = base();
        let interleaves = replicate(&base, 7);
        check!(interleaves.len() == 7);
        check!(interleaves[0] == rotate(&base, 0.0));
        for w in interleaves.windows(2) {
            let next = rotate(&w[0], TAU / 7.0);
            check!(next.segment_starts == w[1].segment_starts);
            for (a, b) in next.samples.iter().zip(w[1].samples.iter()) {
                check!((a.x - b.x).abs() < 1e-12);
                check!((a.y - b.y).abs() < 1e-12);
                check!(a.z == b.z);
            }
        }
    }

    #[test]
    fn deterministic() {
        let base = base();
        check!(replicate(&base, 13) == replicate(&base, 13));
    }
}
