//! Design of interleaved, variable density spiral gradient waveforms. The
//! public API is a single function: [`calc_traj`] takes a
//! [`TrajectoryConfig`] and returns a [`Trajectory`], which holds the gradient
//! samples of all interleaves together with the information needed to turn
//! them back into physical amplitudes or k-space positions.
//!
//! Internally the design runs through a fixed pipeline: density profile,
//! spiral curve, time-optimal integration under the hardware limits,
//! assembly of the interleaf topology, rotation to all interleaves and
//! finally the per-axis normalization.

mod config;
mod density;
mod error;
mod integrator;
mod interleave;
mod normalize;
mod spiral;
mod topology;
mod trajectory;
mod types;
mod util;

pub use config::{SpiralType, TrajectoryConfig, GAMMABAR_H1};
pub use density::DensityProfile;
pub use error::{ConfigError, Error, InfeasibleError};
pub use integrator::MAX_RASTER_SAMPLES;
pub use trajectory::Trajectory;
pub use types::*;

use integrator::HardwareLimits;
use spiral::SpiralCurve;

/// Designs the gradient waveforms for all interleaves of a spiral
/// trajectory. The result only depends on `config`.
///
/// Fails with [`Error::Config`] if the configuration is invalid and with
/// [`Error::Infeasible`] if the hardware limits do not allow a waveform.
pub fn calc_traj(config: &TrajectoryConfig) -> Result<Trajectory, Error> {
    config.validate()?;
    tracing::debug!(?config, "designing spiral trajectory");

    let limits = HardwareLimits::from_config(config);
    let curve = SpiralCurve::new(config)?;

    // Reject hopeless designs before sampling the curve
    let lower_bound = (curve.min_readout_time(&limits) / limits.raster_time).ceil();
    if lower_bound > MAX_RASTER_SAMPLES as f64 {
        return Err(InfeasibleError::TooLong {
            samples: lower_bound as u64,
            limit: MAX_RASTER_SAMPLES,
        }
        .into());
    }

    let nodes = curve.nodes();
    let segment = integrator::integrate(&nodes, &limits, topology::terminal(config.spiral_type))?;
    let base = topology::assemble(&segment, config, &limits)?;
    let segment_starts = base.segment_starts.clone();
    let interleaves = interleave::replicate(&base, config.nitlv);
    let (interleaves, peak) = normalize::normalize(&interleaves, curve.kmax(), &limits);

    tracing::debug!(
        interleaves = interleaves.len(),
        samples = base.len(),
        duration_us = base.len() as f64 * limits.raster_time,
        "spiral trajectory done"
    );

    Ok(Trajectory {
        interleaves,
        peak,
        raster_time: limits.raster_time,
        gamma: limits.gamma,
        segment_starts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use std::f64::consts::TAU;

    fn scenario() -> TrajectoryConfig {
        TrajectoryConfig {
            nitlv: 4,
            res: 2.0,
            fov: 200.0,
            max_amp: 40.0,
            min_rise: 6.0,
            spiral_type: SpiralType::DoubleSpiral,
            spiral_os: 1.0,
            grad_raster_time: 10.0,
            vd_transition_begin: 0.2,
            vd_transition_end: 0.3,
            ..Default::default()
        }
    }

    /// Amplitude and slew limits, checked within every interleave
    fn check_bounds(config: &TrajectoryConfig, traj: &Trajectory) {
        let max_step = config.max_step() * (1.0 + 1e-6);
        for i in 0..traj.interleave_count() {
            let g: Vec<GradientSample> = traj.interleave(i).unwrap().iter().collect();
            check!(g.iter().all(|s| s.in_plane() <= config.max_amp * (1.0 + 1e-6)));
            check!(g.iter().all(|s| s.z.abs() <= config.max_amp * (1.0 + 1e-6)));
            check!(g
                .windows(2)
                .all(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y) <= max_step));
            check!(g.windows(2).all(|w| (w[1].z - w[0].z).abs() <= max_step));
        }
    }

    #[test]
    fn double_spiral_scenario() {
        let config = scenario();
        let traj = calc_traj(&config).unwrap();

        check!(traj.interleave_count() == 4);
        check!(traj.segment_starts().len() == 2);
        check!(traj.samples().len() == 4 * traj.samples_per_interleave());
        check_bounds(&config, &traj);

        let peak = traj.peak();
        check!(peak.x <= 40.0 * (1.0 + 1e-6));
        check!(peak.y <= 40.0 * (1.0 + 1e-6));
        check!(peak.x > 0.0);
        check!(peak.z == 0.0);

        let kmax = 500.0 / config.res;
        for i in 0..4 {
            let k = traj.kspace(i).unwrap();
            let turn = k[traj.segment_starts()[1] - 1];
            check!((turn.x.hypot(turn.y) - kmax).abs() < 1e-6 * kmax);
            let end = k[k.len() - 1];
            check!(end.x.hypot(end.y) < 1e-6 * kmax);
        }
    }

    #[test]
    fn every_topology_respects_limits() {
        for spiral_type in SpiralType::ALL {
            for grad_raster_time in [1.0, 10.0] {
                let config = TrajectoryConfig {
                    spiral_type,
                    grad_raster_time,
                    ..scenario()
                };
                let traj = calc_traj(&config).unwrap();
                check!(traj.segment_starts().len() == spiral_type.segment_count());
                check_bounds(&config, &traj);
            }
        }
    }

    #[test]
    fn random_configs() {
        for _ in 0..10 {
            let begin = rand::random::<f64>() * 0.5;
            let config = TrajectoryConfig {
                nitlv: rand::random::<u32>() % 23 + 2,
                res: 1.5 + rand::random::<f64>() * 2.0,
                fov: 150.0 + rand::random::<f64>() * 150.0,
                max_amp: 20.0 + rand::random::<f64>() * 40.0,
                min_rise: 4.0 + rand::random::<f64>() * 6.0,
                spiral_type: SpiralType::ALL[rand::random::<usize>() % 7],
                spiral_os: 0.5 + rand::random::<f64>() * 2.0,
                grad_raster_time: 0.5 + rand::random::<f64>() * 9.5,
                vd_transition_begin: begin,
                vd_transition_end: begin + 0.05 + rand::random::<f64>() * 0.4,
                ..Default::default()
            };
            let traj = calc_traj(&config).unwrap();
            check!(traj.interleave_count() == config.nitlv as usize);
            check_bounds(&config, &traj);
        }
    }

    #[test]
    fn fine_raster_respects_limits() {
        let configs = [
            TrajectoryConfig {
                grad_raster_time: 1.0,
                ..Default::default()
            },
            TrajectoryConfig {
                nitlv: 48,
                grad_raster_time: 1.0,
                ..Default::default()
            },
            TrajectoryConfig {
                nitlv: 64,
                res: 1.0,
                max_amp: 80.0,
                min_rise: 20.0,
                spiral_os: 5.0,
                grad_raster_time: 0.5,
                spiral_type: SpiralType::SpiralOut,
                ..Default::default()
            },
        ];
        for config in configs {
            let traj = calc_traj(&config).unwrap();
            check_bounds(&config, &traj);
        }
    }

    #[test]
    fn interleaves_are_rotated() {
        let config = TrajectoryConfig {
            nitlv: 5,
            ..scenario()
        };
        let traj = calc_traj(&config).unwrap();
        let (sin, cos) = (TAU / 5.0).sin_cos();
        for i in 0..4 {
            let a = traj.interleave(i).unwrap();
            let b = traj.interleave(i + 1).unwrap();
            for (a, b) in a.iter().zip(b.iter()) {
                check!((cos * a.x - sin * a.y - b.x).abs() < 1e-9);
                check!((sin * a.x + cos * a.y - b.y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn out_in_is_time_reversed() {
        let config = TrajectoryConfig {
            spiral_type: SpiralType::SpiralOutIn,
            ..scenario()
        };
        let traj = calc_traj(&config).unwrap();
        let g = traj.interleave(0).unwrap();
        let n = traj.segment_starts()[1];
        check!(g.len() == 2 * n);
        for i in 0..n {
            check!((g.x[n + i] + g.x[n - 1 - i]).abs() < 1e-12);
            check!((g.y[n + i] + g.y[n - 1 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn lotus_oscillates_in_z() {
        let config = TrajectoryConfig {
            spiral_type: SpiralType::LotusMultiband,
            ..scenario()
        };
        let traj = calc_traj(&config).unwrap();
        check!(traj.peak().z > 0.0);
        for i in 0..traj.interleave_count() {
            let k = traj.kspace(i).unwrap();
            check!(k[k.len() - 1].z.abs() < 1e-6 * 500.0 / config.deltaz);
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = TrajectoryConfig {
            vd_transition_begin: 0.5,
            vd_transition_end: 0.5,
            ..scenario()
        };
        check!(let Err(Error::Config(ConfigError::InvalidTransition { .. })) = calc_traj(&config));

        let config = TrajectoryConfig {
            nitlv: 0,
            ..scenario()
        };
        let result = calc_traj(&config);
        check!(let Err(Error::Config(ConfigError::NonPositive { name: "nitlv", .. })) = result);
    }

    #[test]
    fn too_long_fails_fast() {
        let config = TrajectoryConfig {
            nitlv: 1,
            res: 0.01,
            fov: 10000.0,
            ..Default::default()
        };
        check!(let Err(Error::Infeasible(InfeasibleError::TooLong { .. })) = calc_traj(&config));
    }

    #[test]
    fn deterministic() {
        check!(calc_traj(&scenario()).unwrap() == calc_traj(&scenario()).unwrap());
    }
}
