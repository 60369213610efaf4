use std::ops::MulAssign;

use crate::GradientSample;

/// Linear map of the (x, y) plane. z is never touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneMatrix([[f64; 2]; 2]);

impl PlaneMatrix {
    /// Counter-clockwise rotation
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self([[cos, -sin], [sin, cos]])
    }

    /// Reflection across the line through the origin with the given direction
    pub fn reflection(direction: f64) -> Self {
        let (sin, cos) = (2.0 * direction).sin_cos();
        Self([[cos, sin], [sin, -cos]])
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.0[0][0] * x + self.0[0][1] * y,
            self.0[1][0] * x + self.0[1][1] * y,
        )
    }
}

impl MulAssign<&PlaneMatrix> for GradientSample {
    fn mul_assign(&mut self, rhs: &PlaneMatrix) {
        let (x, y) = rhs.apply(self.x, self.y);
        self.x = x;
        self.y = y;
    }
}
