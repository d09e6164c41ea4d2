//! Multi-channel sample buffers
//!
//! A signal is an ordered sequence of samples across channels with one
//! sampling rate and one element type, shaped `(channels, samples)`. Signals
//! are read-only to the engine; processing allocates fresh output buffers.

use crate::model::Dtype;
use ndarray::Array2;

/// Sample storage in either precision.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    F32(Array2<f32>),
    F64(Array2<f64>),
}

impl SampleData {
    pub fn dtype(&self) -> Dtype {
        match self {
            SampleData::F32(_) => Dtype::F32,
            SampleData::F64(_) => Dtype::F64,
        }
    }

    /// (channels, samples)
    pub fn dim(&self) -> (usize, usize) {
        match self {
            SampleData::F32(a) => a.dim(),
            SampleData::F64(a) => a.dim(),
        }
    }
}

impl From<Array2<f32>> for SampleData {
    fn from(a: Array2<f32>) -> Self {
        SampleData::F32(a)
    }
}

impl From<Array2<f64>> for SampleData {
    fn from(a: Array2<f64>) -> Self {
        SampleData::F64(a)
    }
}

/// Multi-channel time-domain signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    data: SampleData,
    sampling_rate: f64,
}

impl Signal {
    /// Create a signal from sample data shaped `(channels, samples)`.
    pub fn new(data: impl Into<SampleData>, sampling_rate: f64) -> Self {
        Self {
            data: data.into(),
            sampling_rate,
        }
    }

    /// All-zero signal with the given shape and element type.
    pub fn zeros(channels: usize, samples: usize, dtype: Dtype, sampling_rate: f64) -> Self {
        let data = match dtype {
            Dtype::F32 => SampleData::F32(Array2::zeros((channels, samples))),
            Dtype::F64 => SampleData::F64(Array2::zeros((channels, samples))),
        };
        Self {
            data,
            sampling_rate,
        }
    }

    /// Unit impulse at t=0 on `channel`, zero elsewhere.
    ///
    /// # Panics
    /// Panics if `channel >= channels` and `samples > 0`.
    pub fn impulse(
        channels: usize,
        channel: usize,
        samples: usize,
        dtype: Dtype,
        sampling_rate: f64,
    ) -> Self {
        let mut signal = Self::zeros(channels, samples, dtype, sampling_rate);
        if samples > 0 {
            match &mut signal.data {
                SampleData::F32(a) => a[[channel, 0]] = 1.0,
                SampleData::F64(a) => a[[channel, 0]] = 1.0,
            }
        }
        signal
    }

    pub fn n_channels(&self) -> usize {
        self.data.dim().0
    }

    pub fn n_samples(&self) -> usize {
        self.data.dim().1
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }

    pub fn data(&self) -> &SampleData {
        &self.data
    }

    /// Borrow the samples if stored in single precision.
    pub fn samples_f32(&self) -> Option<&Array2<f32>> {
        match &self.data {
            SampleData::F32(a) => Some(a),
            SampleData::F64(_) => None,
        }
    }

    /// Borrow the samples if stored in double precision.
    pub fn samples_f64(&self) -> Option<&Array2<f64>> {
        match &self.data {
            SampleData::F32(_) => None,
            SampleData::F64(a) => Some(a),
        }
    }

    /// Explicit element type conversion. Converting to the current type
    /// copies the buffer unchanged; converting f64 to f32 rounds.
    pub fn cast(&self, dtype: Dtype) -> Signal {
        let data = match (dtype, &self.data) {
            (Dtype::F32, SampleData::F32(a)) => SampleData::F32(a.clone()),
            (Dtype::F32, SampleData::F64(a)) => SampleData::F32(a.mapv(|v| v as f32)),
            (Dtype::F64, SampleData::F32(a)) => SampleData::F64(a.mapv(f64::from)),
            (Dtype::F64, SampleData::F64(a)) => SampleData::F64(a.clone()),
        };
        Signal {
            data,
            sampling_rate: self.sampling_rate,
        }
    }

    /// Samples widened to double precision.
    pub(crate) fn to_f64(&self) -> Array2<f64> {
        match &self.data {
            SampleData::F32(a) => a.mapv(f64::from),
            SampleData::F64(a) => a.clone(),
        }
    }
}
