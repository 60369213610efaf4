//! The target curve `k(r) = r * exp(i * theta(r))` of a single spiral arm,
//! before any hardware limits are applied.

use std::f64::consts::TAU;

use crate::config::TrajectoryConfig;
use crate::density::DensityProfile;
use crate::error::ConfigError;
use crate::integrator::HardwareLimits;

/// Largest angle step between two curve nodes. Unit: `rad`
const MAX_ANGLE_STEP: f64 = 2e-3;
const MIN_STEPS: usize = 4096;
const MAX_STEPS: usize = 1 << 22;

#[derive(Debug, Clone)]
pub struct SpiralCurve {
    density: DensityProfile,
    nitlv: f64,
    /// Unit: `1 / m`
    kmax: f64,
}

/// The curve discretized on a uniform radius grid. All vectors have one
/// entry per node, `ds` has one entry less.
#[derive(Debug, Clone)]
pub struct CurveNodes {
    /// Normalized radius `r / kmax`
    pub radius: Vec<f64>,
    /// Unwrapped polar angle. Unit: `rad`
    pub theta: Vec<f64>,
    /// `d theta / d r` for the physical radius. Unit: `m`
    pub dtheta: Vec<f64>,
    /// Unit: `1 / m`
    pub x: Vec<f64>,
    /// Unit: `1 / m`
    pub y: Vec<f64>,
    /// Unit: `m`
    pub curvature: Vec<f64>,
    /// Chord length between neighbouring nodes. Unit: `1 / m`
    pub ds: Vec<f64>,
    /// Unit: `1 / m`
    pub kmax: f64,
}

impl CurveNodes {
    pub fn len(&self) -> usize {
        self.radius.len()
    }
}

impl SpiralCurve {
    pub fn new(config: &TrajectoryConfig) -> Result<Self, ConfigError> {
        let density = DensityProfile::from_config(config)?;
        Ok(Self::with_density(density, config.nitlv, config.res))
    }

    pub fn with_density(density: DensityProfile, nitlv: u32, res: f64) -> Self {
        Self {
            density,
            nitlv: nitlv as f64,
            // res is in mm, k in 1/m
            kmax: 500.0 / res,
        }
    }

    pub fn kmax(&self) -> f64 {
        self.kmax
    }

    /// `d theta / d r` for the physical radius, chosen so that neighbouring
    /// arms of all interleaves are `1 / fov` apart. Unit: `m`
    pub fn dtheta_dr(&self, radius: f64) -> f64 {
        TAU * self.density.fov_at(radius) * 1e-3 / self.nitlv
    }

    /// Derivative of `dtheta_dr` with respect to the physical radius. Unit: `m^2`
    fn d2theta_dr2(&self, radius: f64) -> f64 {
        TAU * self.density.slope_at(radius) * 1e-3 / (self.nitlv * self.kmax)
    }

    /// Curvature of the arm at the given normalized radius. Unit: `m`
    pub fn curvature(&self, radius: f64) -> f64 {
        let r = radius * self.kmax;
        let q = self.dtheta_dr(radius);
        let dq = self.d2theta_dr2(radius);
        let rq2 = (r * q).powi(2);
        (2.0 * q + r * dq + r * r * q.powi(3)).abs() / (1.0 + rq2).powf(1.5)
    }

    /// Total angle swept from the center to `kmax`. Unit: `rad`
    pub fn total_angle(&self) -> f64 {
        // Exact for a piecewise-linear FOV: integrate every piece with the trapezoidal rule
        self.density
            .points()
            .windows(2)
            .map(|w| 0.5 * (w[1].0 - w[0].0) * (self.dtheta_dr(w[0].0) + self.dtheta_dr(w[1].0)))
            .sum::<f64>()
            * self.kmax
    }

    /// Lower bound of the readout time: even at full gradient amplitude the
    /// arm can't be faster than its tangential length allows. Unit: `us`
    pub fn min_readout_time(&self, limits: &HardwareLimits) -> f64 {
        const N: usize = 1024;
        let tangential: f64 = (0..N)
            .map(|i| {
                let radius = (i as f64 + 0.5) / N as f64;
                radius * self.kmax * self.dtheta_dr(radius)
            })
            .sum::<f64>()
            * self.kmax
            / N as f64;
        tangential / limits.max_speed()
    }

    pub fn nodes(&self) -> CurveNodes {
        let steps = ((self.total_angle() / MAX_ANGLE_STEP).ceil() as usize)
            .clamp(MIN_STEPS, MAX_STEPS);
        let dr = 1.0 / steps as f64;

        let radius: Vec<f64> = (0..=steps).map(|i| i as f64 * dr).collect();
        let dtheta: Vec<f64> = radius.iter().map(|&r| self.dtheta_dr(r)).collect();

        // Trapezoidal rule, exact for the quadratic theta(r) between two nodes
        let mut theta = Vec::with_capacity(steps + 1);
        let mut acc = 0.0;
        theta.push(0.0);
        for q in dtheta.windows(2) {
            acc += 0.5 * (q[0] + q[1]) * dr * self.kmax;
            theta.push(acc);
        }

        let x: Vec<f64> = radius
            .iter()
            .zip(&theta)
            .map(|(r, t)| r * self.kmax * t.cos())
            .collect();
        let y: Vec<f64> = radius
            .iter()
            .zip(&theta)
            .map(|(r, t)| r * self.kmax * t.sin())
            .collect();
        let ds = (0..steps)
            .map(|i| (x[i + 1] - x[i]).hypot(y[i + 1] - y[i]))
            .collect();
        let curvature = radius.iter().map(|&r| self.curvature(r)).collect();

        tracing::trace!(steps, total_angle = acc, "discretized spiral curve");

        CurveNodes {
            radius,
            theta,
            dtheta,
            x,
            y,
            curvature,
            ds,
            kmax: self.kmax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn curve(os: f64) -> SpiralCurve {
        SpiralCurve::new(&TrajectoryConfig {
            spiral_os: os,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn nyquist_spacing() {
        let c = curve(1.0);
        check!(c.kmax() == 500.0);
        // 15 interleaves, 192 mm: arms of all interleaves 1/fov apart
        let spacing = TAU / (15.0 * c.dtheta_dr(0.5));
        check!((spacing - 1.0 / 0.192).abs() < 1e-9);
    }

    #[test]
    fn archimedean_total_angle() {
        let c = curve(1.0);
        let expected = TAU * 0.192 / 15.0 * 500.0;
        check!((c.total_angle() - expected).abs() < 1e-9);

        let nodes = c.nodes();
        check!((nodes.theta.last().unwrap() - expected).abs() < 1e-9);
        check!(nodes.radius[0] == 0.0);
        check!(*nodes.radius.last().unwrap() == 1.0);
        check!(nodes.ds.len() + 1 == nodes.len());
        check!(nodes.ds.iter().all(|&ds| ds > 0.0));
    }

    #[test]
    fn curvature_limits() {
        let c = curve(1.0);
        let q = c.dtheta_dr(0.0);
        // Archimedean spiral: 2q at the center, approaching 1/r far out
        check!((c.curvature(0.0) - 2.0 * q).abs() < 1e-12);
        let r = c.kmax();
        check!((c.curvature(1.0) * r - 1.0).abs() < 1e-3);
    }

    #[test]
    fn curvature_matches_nodes() {
        let c = curve(2.0);
        let nodes = c.nodes();
        // Turning angle between consecutive chords over the chord length
        for i in [100, nodes.len() / 5, nodes.len() / 2, nodes.len() - 100] {
            let a0 = (nodes.y[i] - nodes.y[i - 1]).atan2(nodes.x[i] - nodes.x[i - 1]);
            let a1 = (nodes.y[i + 1] - nodes.y[i]).atan2(nodes.x[i + 1] - nodes.x[i]);
            let mut turn = a1 - a0;
            if turn > std::f64::consts::PI {
                turn -= TAU;
            } else if turn < -std::f64::consts::PI {
                turn += TAU;
            }
            let estimate = turn / (0.5 * (nodes.ds[i - 1] + nodes.ds[i]));
            check!((estimate - nodes.curvature[i]).abs() < 1e-2 * nodes.curvature[i]);
        }
    }

    #[test]
    fn angle_slope_matches_nodes() {
        let nodes = curve(1.5).nodes();
        let dr = nodes.radius[1] * nodes.kmax;
        for i in [0, 1, nodes.len() / 3, nodes.len() - 2] {
            let step = nodes.theta[i + 1] - nodes.theta[i];
            check!((step - 0.5 * dr * (nodes.dtheta[i] + nodes.dtheta[i + 1])).abs() < 1e-9);
        }
        check!(nodes.dtheta.len() == nodes.len());
    }

    #[test]
    fn oversampling_winds_faster() {
        check!(curve(2.0).total_angle() > curve(1.0).total_angle());
        check!(curve(2.0).dtheta_dr(0.1) == 2.0 * curve(1.0).dtheta_dr(0.1));
    }
}
