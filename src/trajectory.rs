use crate::{GradientSample, GradientSampleVec, KSpacePoint, PeakAmplitude};

/// A designed spiral trajectory. The samples are stored normalized to the
/// per-axis peak, which is how scanners usually consume gradient shapes; the
/// accessors below return either that form or physical gradients in `mT / m`.
///
/// All interleaves have the same length and the same segment layout, they
/// only differ by an in-plane rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub(crate) interleaves: Vec<GradientSampleVec>,
    pub(crate) peak: PeakAmplitude,
    /// Unit: `us`
    pub(crate) raster_time: f64,
    /// Unit: `1 / m / (mT / m * us)`
    pub(crate) gamma: f64,
    pub(crate) segment_starts: Vec<usize>,
}

impl Trajectory {
    /// Largest absolute amplitude per axis over all interleaves. Unit: `mT / m`
    pub fn peak(&self) -> PeakAmplitude {
        self.peak
    }

    pub fn interleave_count(&self) -> usize {
        self.interleaves.len()
    }

    pub fn samples_per_interleave(&self) -> usize {
        self.interleaves.first().map_or(0, GradientSampleVec::len)
    }

    /// Total number of samples of all interleaves
    pub fn len(&self) -> usize {
        self.interleave_count() * self.samples_per_interleave()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every gradient sample in `mT / m`, interleaves concatenated in
    /// rotation order.
    pub fn samples(&self) -> Vec<GradientSample> {
        self.interleaves
            .iter()
            .flat_map(|g| g.iter())
            .map(|s| GradientSample {
                x: s.x * self.peak.x,
                y: s.y * self.peak.y,
                z: s.z * self.peak.z,
            })
            .collect()
    }

    /// Same as [`Self::samples`], as struct of arrays.
    pub fn sample_vec(&self) -> GradientSampleVec {
        let mut out = GradientSampleVec::default();
        for g in &self.interleaves {
            out.append(&g.scaled(self.peak));
        }
        out
    }

    /// Physical gradients of a single interleave. Unit: `mT / m`
    pub fn interleave(&self, index: usize) -> Option<GradientSampleVec> {
        self.interleaves.get(index).map(|g| g.scaled(self.peak))
    }

    /// Gradients of a single interleave relative to [`Self::peak`], in `[-1, 1]`.
    pub fn normalized_interleave(&self, index: usize) -> Option<&GradientSampleVec> {
        self.interleaves.get(index)
    }

    /// Index of the first sample of every spiral arm within one interleave.
    pub fn segment_starts(&self) -> &[usize] {
        &self.segment_starts
    }

    /// Unit: `us`
    pub fn raster_time(&self) -> f64 {
        self.raster_time
    }

    /// Duration of one interleave. Unit: `us`
    pub fn duration(&self) -> f64 {
        self.samples_per_interleave() as f64 * self.raster_time
    }

    /// k-space position at the end of every raster interval of an
    /// interleave, starting from the center. Unit: `1 / m`
    pub fn kspace(&self, index: usize) -> Option<Vec<KSpacePoint>> {
        let g = self.interleave(index)?;
        let scale = self.gamma * self.raster_time;
        Some(
            g.iter()
                .scan(KSpacePoint::default(), |k, s| {
                    k.x += s.x * scale;
                    k.y += s.y * scale;
                    k.z += s.z * scale;
                    Some(*k)
                })
                .collect(),
        )
    }
}

#[allow(dead_code)]
fn assert_send_sync() {
    fn check<T: Send + Sync>() {}
    check::<Trajectory>();
}
