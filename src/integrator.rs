//! Time-optimal traversal of the spiral curve under gradient amplitude and
//! slew rate limits.
//!
//! Internally all quantities use `1 / m` for k-space, `us` for time and
//! `mT / m` for gradients. The speed along the curve is bounded by the
//! gradient amplitude and, through the centripetal acceleration, by the
//! slew rate. A forward sweep accelerates from rest as fast as the slew
//! budget left over by the centripetal part allows, a backward sweep does the
//! same from the terminal condition. The pointwise minimum of both is the
//! fastest feasible speed profile, which is then sampled on the raster.
//! The sampled waveform is checked against the limits once more, and the
//! design is repeated with a smaller budget if the discretization pushed
//! it over.

use crate::config::TrajectoryConfig;
use crate::error::InfeasibleError;
use crate::spiral::CurveNodes;

/// Fraction of the slew rate the design may use. The rest absorbs the
/// discretization of the curve.
const SLEW_HEADROOM: f64 = 0.98;

/// Longest readout that is designed. Unit: raster samples
pub const MAX_RASTER_SAMPLES: u64 = 1 << 20;

/// Designs with tightened limits before giving up
const MAX_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareLimits {
    /// Unit: `mT / m`
    pub max_amp: f64,
    /// Unit: `mT / m / us`
    pub max_slew: f64,
    /// Unit: `us`
    pub raster_time: f64,
    /// Unit: `1 / m / (mT / m * us)`
    pub gamma: f64,
}

impl HardwareLimits {
    pub fn from_config(config: &TrajectoryConfig) -> Self {
        Self {
            max_amp: config.max_amp,
            max_slew: 1.0 / config.min_rise,
            raster_time: config.grad_raster_time,
            // MHz/T -> 1/m per (mT/m * us)
            gamma: config.gammabar * 1e-3,
        }
    }

    /// Fastest k-space traversal at full gradient amplitude. Unit: `1 / m / us`
    pub fn max_speed(&self) -> f64 {
        self.gamma * self.max_amp
    }

    /// Largest k-space acceleration the design uses. Unit: `1 / m / us^2`
    pub fn max_accel(&self) -> f64 {
        self.gamma * self.max_slew * SLEW_HEADROOM
    }

    /// Converts a k-space step over one raster interval to a gradient. Unit: `mT / m`
    pub fn gradient(&self, dk: f64) -> f64 {
        dk / (self.gamma * self.raster_time)
    }
}

/// Speed at the end of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// As fast as the limits allow, the waveform ends at full amplitude
    Free,
    /// The gradient ramps down to zero at `kmax`
    AtRest,
}

/// One spiral arm from the center to `kmax`, sampled on the gradient raster.
#[derive(Debug, Clone)]
pub struct Segment {
    /// k-space step per raster interval, normalized to `kmax`
    pub x: Vec<f64>,
    /// k-space step per raster interval, normalized to `kmax`
    pub y: Vec<f64>,
    /// Unit: `1 / m`
    pub kmax: f64,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Normalized k-space position after the last step
    pub fn end_point(&self) -> (f64, f64) {
        (self.x.iter().sum(), self.y.iter().sum())
    }

    /// Largest amplitude and largest gradient change, both relative to the
    /// hardware limits. The first sample and, for `Terminal::AtRest`, the
    /// last one count twice: reversed copies of the arm are joined there.
    pub fn excess(&self, limits: &HardwareLimits, terminal: Terminal) -> (f64, f64) {
        let max_step = limits.max_slew * limits.raster_time;
        let grads: Vec<(f64, f64)> = self
            .x
            .iter()
            .zip(&self.y)
            .map(|(x, y)| {
                (
                    limits.gradient(x * self.kmax),
                    limits.gradient(y * self.kmax),
                )
            })
            .collect();

        let amp = grads
            .iter()
            .map(|(x, y)| x.hypot(*y))
            .fold(0.0, f64::max);

        let mut step = grads
            .windows(2)
            .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
            .fold(0.0, f64::max);
        if let Some((x, y)) = grads.first() {
            step = step.max(2.0 * x.hypot(*y));
        }
        if let (Terminal::AtRest, Some((x, y))) = (terminal, grads.last()) {
            step = step.max(2.0 * x.hypot(*y));
        }

        (amp / limits.max_amp, step / max_step)
    }
}

/// Tangential acceleration left after the centripetal part
fn tangential(accel: f64, curvature: f64, speed: f64) -> f64 {
    let normal = curvature * speed * speed;
    (accel * accel - normal * normal).max(0.0).sqrt()
}

/// Speed after accelerating over `ds`, evaluating the slew budget at the
/// higher end speed so the step stays conservative.
fn accelerate(accel: f64, curvature: f64, speed: f64, ds: f64) -> f64 {
    let guess = (speed * speed + 2.0 * tangential(accel, curvature, speed) * ds).sqrt();
    (speed * speed + 2.0 * tangential(accel, curvature, guess) * ds).sqrt()
}

/// Fastest feasible speed at every curve node. Unit: `1 / m / us`
fn speed_profile(nodes: &CurveNodes, vmax: f64, amax: f64, terminal: Terminal) -> Vec<f64> {
    let n = nodes.len();

    let cap: Vec<f64> = nodes
        .curvature
        .iter()
        .map(|&kappa| {
            if kappa > 0.0 {
                vmax.min((amax / kappa).sqrt())
            } else {
                vmax
            }
        })
        .collect();

    let mut forward = vec![0.0; n];
    for i in 0..n - 1 {
        let kappa = nodes.curvature[i].max(nodes.curvature[i + 1]);
        forward[i + 1] = cap[i + 1].min(accelerate(amax, kappa, forward[i], nodes.ds[i]));
    }

    let mut backward = vec![0.0; n];
    backward[n - 1] = match terminal {
        Terminal::Free => cap[n - 1],
        Terminal::AtRest => 0.0,
    };
    for i in (0..n - 1).rev() {
        let kappa = nodes.curvature[i].max(nodes.curvature[i + 1]);
        backward[i] = cap[i].min(accelerate(amax, kappa, backward[i + 1], nodes.ds[i]));
    }

    tracing::trace!(
        peak_forward = forward.iter().cloned().fold(0.0, f64::max),
        peak_backward = backward.iter().cloned().fold(0.0, f64::max),
        "speed profile sweeps done"
    );

    forward
        .into_iter()
        .zip(backward)
        .map(|(f, b)| f.min(b))
        .collect()
}

/// Runs the speed profile with the given limits and samples the curve at
/// every raster instant.
fn resample(
    nodes: &CurveNodes,
    limits: &HardwareLimits,
    vmax: f64,
    amax: f64,
    terminal: Terminal,
) -> Result<Segment, InfeasibleError> {
    let n = nodes.len();
    let kmax = nodes.kmax;
    let speed = speed_profile(nodes, vmax, amax, terminal);

    // Constant acceleration between nodes: time = 2 ds / (v0 + v1)
    let mut time = Vec::with_capacity(n);
    time.push(0.0);
    for i in 0..n - 1 {
        let v = speed[i] + speed[i + 1];
        if !(v > 0.0) {
            return Err(InfeasibleError::Stalled {
                radius: nodes.radius[i],
            });
        }
        time.push(time[i] + 2.0 * nodes.ds[i] / v);
    }

    let total = time[n - 1];
    let samples = (total / limits.raster_time - 1e-9).ceil().max(1.0);
    if !samples.is_finite() || samples as u64 > MAX_RASTER_SAMPLES {
        return Err(InfeasibleError::TooLong {
            samples: samples.min(u64::MAX as f64) as u64,
            limit: MAX_RASTER_SAMPLES,
        });
    }
    let samples = samples as usize;
    // Stretching to a whole number of raster intervals only slows down
    let step = total / samples as f64;

    // Arc length per unit radius, relative to the radial direction
    let stretch: Vec<f64> = nodes
        .radius
        .iter()
        .zip(&nodes.dtheta)
        .map(|(r, q)| (r * kmax * q).hypot(1.0))
        .collect();

    let mut px = Vec::with_capacity(samples + 1);
    let mut py = Vec::with_capacity(samples + 1);
    let mut j = 0;
    for s in 0..=samples {
        let t = (s as f64 * step).min(total);
        while j < n - 2 && time[j + 1] < t {
            j += 1;
        }

        let dt = t - time[j];
        let (v0, v1, ds) = (speed[j], speed[j + 1], nodes.ds[j]);
        let accel = (v1 * v1 - v0 * v0) / (2.0 * ds);
        let frac = ((v0 * dt + 0.5 * accel * dt * dt) / ds).clamp(0.0, 1.0);

        // Curve parameter f in [0, 1] that covers the fraction `frac` of the
        // arc, with the arc length growing quadratically between the nodes
        let (l0, l1) = (stretch[j], stretch[j + 1]);
        let target = frac * 0.5 * (l0 + l1);
        let f = 2.0 * target / (l0 + (l0 * l0 + 2.0 * (l1 - l0) * target).max(0.0).sqrt());

        // theta(r) is quadratic between nodes, so the direction turns smoothly
        let dr = nodes.radius[j + 1] - nodes.radius[j];
        let (q0, q1) = (nodes.dtheta[j], nodes.dtheta[j + 1]);
        let theta = nodes.theta[j] + dr * kmax * f * (q0 + 0.5 * (q1 - q0) * f);
        let rho = (nodes.radius[j] + f * dr) * kmax;

        px.push(rho * theta.cos());
        py.push(rho * theta.sin());
    }

    let x = px.windows(2).map(|w| (w[1] - w[0]) / kmax).collect();
    let y = py.windows(2).map(|w| (w[1] - w[0]) / kmax).collect();

    Ok(Segment { x, y, kmax })
}

/// Designs the arm and checks the sampled waveform against the limits.
/// Whatever the discretization leaves over the limits is taken off the
/// speed or acceleration budget of the next attempt.
pub fn integrate(
    nodes: &CurveNodes,
    limits: &HardwareLimits,
    terminal: Terminal,
) -> Result<Segment, InfeasibleError> {
    if nodes.len() < 2 {
        return Err(InfeasibleError::Stalled { radius: 0.0 });
    }

    let mut vmax = limits.max_speed();
    let mut amax = limits.max_accel();
    let mut worst = 0.0;
    for attempt in 0..MAX_ATTEMPTS {
        let segment = resample(nodes, limits, vmax, amax, terminal)?;
        let (amp, slew) = segment.excess(limits, terminal);
        if amp <= 1.0 && slew <= 1.0 {
            tracing::debug!(
                samples = segment.len(),
                duration_us = segment.len() as f64 * limits.raster_time,
                ?terminal,
                attempt,
                "integrated spiral segment"
            );
            return Ok(segment);
        }

        tracing::debug!(attempt, amp, slew, "sampled segment exceeds limits, tightening");
        if amp > 1.0 {
            vmax /= amp * (1.0 + 1e-6);
        }
        if slew > 1.0 {
            amax /= slew * 1.01;
        }
        worst = amp.max(slew);
    }

    Err(InfeasibleError::LimitsExceeded { ratio: worst })
}
