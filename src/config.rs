use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error};

/// Gyromagnetic ratio of hydrogen. Unit: `MHz / T`
pub const GAMMABAR_H1: f64 = 42.5766;

/// The seven supported spiral layouts. The integer selectors are the ones
/// used by scanner protocols, see `TryFrom<i64>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SpiralType {
    SpiralOut,
    SpiralIn,
    DoubleSpiral,
    /// Spiral out followed by the same path back in
    SpiralOutIn,
    SpiralInOut,
    DoubleSpiralReversed,
    /// Laterally oscillating trajectory for undersampling slices (LOTUS)
    LotusMultiband,
}

impl SpiralType {
    pub const ALL: [SpiralType; 7] = [
        SpiralType::SpiralOut,
        SpiralType::SpiralIn,
        SpiralType::DoubleSpiral,
        SpiralType::SpiralOutIn,
        SpiralType::SpiralInOut,
        SpiralType::DoubleSpiralReversed,
        SpiralType::LotusMultiband,
    ];

    /// Number of spiral arms (out or in) a single interleaf is built from.
    pub fn segment_count(self) -> usize {
        match self {
            SpiralType::SpiralOut | SpiralType::SpiralIn | SpiralType::LotusMultiband => 1,
            SpiralType::DoubleSpiral
            | SpiralType::SpiralOutIn
            | SpiralType::SpiralInOut
            | SpiralType::DoubleSpiralReversed => 2,
        }
    }
}

impl TryFrom<i64> for SpiralType {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SpiralType::SpiralOut),
            2 => Ok(SpiralType::SpiralIn),
            3 => Ok(SpiralType::DoubleSpiral),
            4 => Ok(SpiralType::SpiralOutIn),
            5 => Ok(SpiralType::SpiralInOut),
            6 => Ok(SpiralType::DoubleSpiralReversed),
            7 => Ok(SpiralType::LotusMultiband),
            other => Err(ConfigError::UnknownSpiralType(other)),
        }
    }
}

impl From<SpiralType> for i64 {
    fn from(value: SpiralType) -> Self {
        match value {
            SpiralType::SpiralOut => 1,
            SpiralType::SpiralIn => 2,
            SpiralType::DoubleSpiral => 3,
            SpiralType::SpiralOutIn => 4,
            SpiralType::SpiralInOut => 5,
            SpiralType::DoubleSpiralReversed => 6,
            SpiralType::LotusMultiband => 7,
        }
    }
}

/// All inputs of a trajectory design. Missing keys in a TOML file fall back
/// to the `Default` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Number of spiral interleaves
    pub nitlv: u32,
    /// Unit: `mm`
    pub res: f64,
    /// Nominal field of view of the outer k-space. Unit: `mm`
    pub fov: f64,
    /// Slice separation, only used by `SpiralType::LotusMultiband`. Unit: `mm`
    pub deltaz: f64,
    /// Unit: `mT / m`
    pub max_amp: f64,
    /// Unit: `us / (mT / m)`
    pub min_rise: f64,
    #[serde(alias = "spiraltype")]
    pub spiral_type: SpiralType,
    /// FOV oversampling of the inner k-space
    pub spiral_os: f64,
    /// Unit: `MHz / T`
    pub gammabar: f64,
    /// Unit: `us`
    pub grad_raster_time: f64,
    /// Normalized radius where the oversampled region ends
    pub vd_transition_begin: f64,
    /// Normalized radius where the nominal FOV is reached
    pub vd_transition_end: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            nitlv: 15,
            res: 1.0,
            fov: 192.0,
            deltaz: 60.0,
            max_amp: 42.0,
            min_rise: 5.0,
            spiral_type: SpiralType::DoubleSpiral,
            spiral_os: 1.0,
            gammabar: GAMMABAR_H1,
            grad_raster_time: 10.0,
            vd_transition_begin: 0.18,
            vd_transition_end: 0.25,
        }
    }
}

impl TrajectoryConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("res", self.res),
            ("fov", self.fov),
            ("deltaz", self.deltaz),
            ("max_amp", self.max_amp),
            ("min_rise", self.min_rise),
            ("spiral_os", self.spiral_os),
            ("gammabar", self.gammabar),
            ("grad_raster_time", self.grad_raster_time),
            ("vd_transition_begin", self.vd_transition_begin),
            ("vd_transition_end", self.vd_transition_end),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::NonFinite { name });
        }

        if self.nitlv == 0 {
            return Err(ConfigError::NonPositive {
                name: "nitlv",
                value: 0.0,
            });
        }

        let mut positive = vec![
            ("res", self.res),
            ("fov", self.fov),
            ("max_amp", self.max_amp),
            ("min_rise", self.min_rise),
            ("spiral_os", self.spiral_os),
            ("gammabar", self.gammabar),
            ("grad_raster_time", self.grad_raster_time),
        ];
        if self.spiral_type == SpiralType::LotusMultiband {
            positive.push(("deltaz", self.deltaz));
        }
        if let Some(&(name, value)) = positive.iter().find(|(_, value)| *value <= 0.0) {
            return Err(ConfigError::NonPositive { name, value });
        }

        let (begin, end) = (self.vd_transition_begin, self.vd_transition_end);
        if begin >= end || end > 1.0 || begin < 0.0 {
            return Err(ConfigError::InvalidTransition { begin, end });
        }

        Ok(())
    }

    /// Largest gradient change between two raster samples. Unit: `mT / m`
    pub fn max_step(&self) -> f64 {
        self.grad_raster_time / self.min_rise
    }
}
