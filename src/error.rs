use thiserror::Error;

/// Rejected input, reported before any waveform is computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("variable density transition must satisfy 0 <= begin < end <= 1, got begin = {begin}, end = {end}")]
    InvalidTransition { begin: f64, end: f64 },

    #[error("unknown spiral type selector {0} (expected 1..=7)")]
    UnknownSpiralType(i64),

    #[error("parameter `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("parameter `{name}` must be finite")]
    NonFinite { name: &'static str },

    #[error("invalid density control points: {0}")]
    InvalidDensity(String),
}

/// The configuration is valid but the hardware limits do not allow a waveform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InfeasibleError {
    /// Unit: normalized radius where the curve stopped advancing
    #[error("spiral cannot advance past normalized radius {radius:.4}")]
    Stalled { radius: f64 },

    #[error("readout needs at least {samples} raster samples, limit is {limit}")]
    TooLong { samples: u64, limit: u64 },

    #[error("sampled waveform stays {ratio:.4} times over the hardware limits")]
    LimitsExceeded { ratio: f64 },

    /// Unit: `mm`
    #[error("slice separation {deltaz} mm needs a z oscillation faster than the gradient limits allow")]
    SliceSeparation { deltaz: f64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Infeasible(#[from] InfeasibleError),

    #[error("failed to parse trajectory config: {0}")]
    Toml(#[from] toml::de::Error),
}
