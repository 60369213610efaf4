use crate::Axis;

/// Contains the gradient amplitudes for a single raster step.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct GradientSample {
    /// Unit: `mT / m`
    pub x: f64,
    /// Unit: `mT / m`
    pub y: f64,
    /// Unit: `mT / m`
    pub z: f64,
}

impl GradientSample {
    /// Magnitude of the in-plane (x, y) part
    pub fn in_plane(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Largest absolute gradient amplitude reached on every axis.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct PeakAmplitude {
    /// Unit: `mT / m`
    pub x: f64,
    /// Unit: `mT / m`
    pub y: f64,
    /// Unit: `mT / m`
    pub z: f64,
}

impl PeakAmplitude {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Position in k-space, obtained by integrating the gradients.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct KSpacePoint {
    /// Unit: `1 / m`
    pub x: f64,
    /// Unit: `1 / m`
    pub y: f64,
    /// Unit: `1 / m`
    pub z: f64,
}
