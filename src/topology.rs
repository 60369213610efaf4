//! Builds a single interleaf from the integrated spiral arm.
//!
//! Every layout is made of the out arm `g` and two derived forms of it:
//! `retrace(g)` runs the same path backwards in time (center is reached
//! last), `mirror(g)` is the arm reflected across the line through the
//! center and its end point. Layouts with two arms turn around at `kmax`,
//! so the out arm is designed to come to rest there.

use std::f64::consts::PI;

use crate::config::{SpiralType, TrajectoryConfig};
use crate::error::InfeasibleError;
use crate::integrator::{HardwareLimits, Segment, Terminal};
use crate::util::PlaneMatrix;
use crate::GradientSampleVec;

/// One interleaf in normalized units: k-space step per raster interval
/// divided by `kmax`.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: GradientSampleVec,
    /// Index of the first sample of every spiral arm
    pub segment_starts: Vec<usize>,
}

impl Waveform {
    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Speed the out arm must have at `kmax` for the given layout
pub fn terminal(spiral_type: SpiralType) -> Terminal {
    match spiral_type {
        SpiralType::SpiralOut | SpiralType::SpiralIn | SpiralType::LotusMultiband => Terminal::Free,
        SpiralType::DoubleSpiral
        | SpiralType::SpiralOutIn
        | SpiralType::SpiralInOut
        | SpiralType::DoubleSpiralReversed => Terminal::AtRest,
    }
}

fn forward(segment: &Segment) -> (Vec<f64>, Vec<f64>) {
    (segment.x.clone(), segment.y.clone())
}

fn retrace((x, y): (Vec<f64>, Vec<f64>)) -> (Vec<f64>, Vec<f64>) {
    (
        x.into_iter().rev().map(|v| -v).collect(),
        y.into_iter().rev().map(|v| -v).collect(),
    )
}

fn mirror((x, y): (Vec<f64>, Vec<f64>), direction: f64) -> (Vec<f64>, Vec<f64>) {
    let m = PlaneMatrix::reflection(direction);
    x.into_iter().zip(y).map(|(x, y)| m.apply(x, y)).unzip()
}

fn concat(arms: Vec<(Vec<f64>, Vec<f64>)>) -> Waveform {
    let mut samples = GradientSampleVec::default();
    let mut segment_starts = Vec::with_capacity(arms.len());
    for (x, y) in arms {
        segment_starts.push(samples.x.len());
        samples.z.extend(std::iter::repeat(0.0).take(x.len()));
        samples.x.extend(x);
        samples.y.extend(y);
    }
    Waveform {
        samples,
        segment_starts,
    }
}

/// Lateral z oscillation with amplitude `1 / (2 deltaz)`: the two slices of
/// a multiband excitation pick up opposite phase at its extremes. The
/// frequency is the highest one that fits a whole number of half periods
/// into the readout and stays within amplitude and slew limits. Returns the
/// z steps normalized to `kmax`.
fn lotus_oscillation(
    samples: usize,
    config: &TrajectoryConfig,
    limits: &HardwareLimits,
) -> Result<Vec<f64>, InfeasibleError> {
    // deltaz in mm, kz in 1/m
    let kz_max = 500.0 / config.deltaz;
    let omega_max = (limits.max_speed() / kz_max).min((limits.max_accel() / kz_max).sqrt());
    let duration = samples as f64 * limits.raster_time;
    let half_periods = (omega_max * duration / PI).floor();
    if !half_periods.is_finite() || half_periods < 1.0 {
        return Err(InfeasibleError::SliceSeparation {
            deltaz: config.deltaz,
        });
    }
    let omega = PI * half_periods / duration;

    tracing::debug!(kz_max, half_periods, "lotus z oscillation");

    // Normalized to kmax = 1 / (2 res)
    let amplitude = config.res / config.deltaz;
    let kz: Vec<f64> = (0..=samples)
        .map(|n| amplitude * (omega * n as f64 * limits.raster_time).sin())
        .collect();
    Ok(kz.windows(2).map(|w| w[1] - w[0]).collect())
}

pub fn assemble(
    segment: &Segment,
    config: &TrajectoryConfig,
    limits: &HardwareLimits,
) -> Result<Waveform, InfeasibleError> {
    let (end_x, end_y) = segment.end_point();
    let end_direction = end_y.atan2(end_x);

    let waveform = match config.spiral_type {
        SpiralType::SpiralOut => concat(vec![forward(segment)]),
        SpiralType::SpiralIn => concat(vec![retrace(forward(segment))]),
        SpiralType::DoubleSpiral => concat(vec![
            forward(segment),
            mirror(retrace(forward(segment)), end_direction),
        ]),
        SpiralType::SpiralOutIn => concat(vec![forward(segment), retrace(forward(segment))]),
        SpiralType::SpiralInOut => concat(vec![retrace(forward(segment)), forward(segment)]),
        SpiralType::DoubleSpiralReversed => concat(vec![
            mirror(forward(segment), end_direction),
            retrace(forward(segment)),
        ]),
        SpiralType::LotusMultiband => {
            let mut waveform = concat(vec![forward(segment)]);
            waveform.samples.z = lotus_oscillation(segment.len(), config, limits)?;
            waveform
        }
    };

    tracing::debug!(
        spiral_type = ?config.spiral_type,
        samples = waveform.len(),
        segments = waveform.segment_starts.len(),
        "assembled interleaf"
    );

    Ok(waveform)
}
