use crate::{Axis, GradientSample, PeakAmplitude};

#[derive(Default, Debug, Clone, PartialEq)]
pub struct GradientSampleVec {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

// Convert AoS to SoA

impl From<Vec<GradientSample>> for GradientSampleVec {
    fn from(value: Vec<GradientSample>) -> Self {
        Self {
            x: value.iter().map(|s| s.x).collect(),
            y: value.iter().map(|s| s.y).collect(),
            z: value.iter().map(|s| s.z).collect(),
        }
    }
}

impl From<&GradientSampleVec> for Vec<GradientSample> {
    fn from(value: &GradientSampleVec) -> Self {
        value.iter().collect()
    }
}

impl GradientSampleVec {
    pub fn len(&self) -> usize {
        let len1 = self.x.len();
        let len2 = self.y.len();
        let len3 = self.z.len();
        assert!(len1 == len2 && len2 == len3);
        len1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<GradientSample> {
        Some(GradientSample {
            x: *self.x.get(index)?,
            y: *self.y.get(index)?,
            z: *self.z.get(index)?,
        })
    }

    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = GradientSample> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| GradientSample { x, y, z })
    }

    pub fn append(&mut self, other: &GradientSampleVec) {
        self.x.extend_from_slice(&other.x);
        self.y.extend_from_slice(&other.y);
        self.z.extend_from_slice(&other.z);
    }

    /// Multiplies every axis with its own factor
    pub fn scaled(&self, factor: PeakAmplitude) -> Self {
        Self {
            x: self.x.iter().map(|v| v * factor.x).collect(),
            y: self.y.iter().map(|v| v * factor.y).collect(),
            z: self.z.iter().map(|v| v * factor.z).collect(),
        }
    }

    /// Largest absolute value per axis, zero for an empty vector
    pub fn peak(&self) -> PeakAmplitude {
        let peak = |v: &[f64]| v.iter().fold(0.0, |acc: f64, x| acc.max(x.abs()));
        PeakAmplitude {
            x: peak(&self.x),
            y: peak(&self.y),
            z: peak(&self.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn aos_soa() {
        let samples = vec![
            GradientSample {
                x: 1.0,
                y: -2.0,
                z: 0.5,
            },
            GradientSample {
                x: -3.0,
                y: 1.0,
                z: 0.0,
            },
        ];
        let vec = GradientSampleVec::from(samples.clone());
        check!(vec.len() == 2);
        check!(vec.axis(Axis::Y) == &[-2.0, 1.0]);
        check!(vec.get(1) == Some(samples[1]));
        check!(vec.get(2) == None);
        check!(Vec::<GradientSample>::from(&vec) == samples);

        let peak = vec.peak();
        check!(peak == PeakAmplitude { x: 3.0, y: 2.0, z: 0.5 });
        let scaled = vec.scaled(PeakAmplitude { x: 2.0, y: 1.0, z: 0.0 });
        check!(scaled.x == vec![2.0, -6.0]);
        check!(scaled.z == vec![0.0, 0.0]);
    }

    #[test]
    fn append_keeps_order() {
        let mut a = GradientSampleVec {
            x: vec![1.0],
            y: vec![2.0],
            z: vec![3.0],
        };
        let b = a.clone();
        a.append(&b);
        check!(a.len() == 2);
        check!(a.get(0) == a.get(1));
        check!(GradientSampleVec::default().is_empty());
    }
}
