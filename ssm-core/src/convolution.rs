//! Convolution-based reference path
//!
//! Computes the output of an LTI system started from rest by convolving the
//! system's impulse response against each input channel and summing the
//! contributions. Used as ground truth in tests and benchmarks, never for
//! production throughput: it needs the whole horizon up front and always
//! recomputes from a zero initial state.

use crate::error::{Result, SsmError};
use crate::model::{Dtype, StateSpaceModel};
use crate::signal::Signal;
use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

/// Output of `model` driven by `signal` from a zero state, via frequency-
/// domain convolution, truncated to the input length. Accumulates in double
/// precision regardless of the model's element type.
pub fn convolved_output(model: &StateSpaceModel, signal: &Signal) -> Result<Signal> {
    let m = model.n_inputs();
    if signal.n_channels() != m {
        return Err(SsmError::DimensionMismatch {
            expected: m,
            found: signal.n_channels(),
        });
    }

    let p = model.n_outputs();
    let t = signal.n_samples();
    let sampling_rate = signal.sampling_rate();
    if t == 0 {
        return Ok(Signal::zeros(p, 0, Dtype::F64, sampling_rate));
    }

    let input = signal.to_f64();
    let responses: Vec<Array2<f64>> = model
        .impulse_response(t)
        .iter()
        .map(|h| h.to_f64())
        .collect();

    // Linear convolution needs 2t-1 samples; round up to a power of two.
    let fft_size = (2 * t - 1).next_power_of_two();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    let ifft = planner.plan_fft_inverse(fft_size);

    // One spectrum per input channel, reused across all output rows.
    let mut input_spectra = Vec::with_capacity(m);
    for channel in 0..m {
        let mut buf = vec![Complex::new(0.0, 0.0); fft_size];
        for (i, &v) in input.row(channel).iter().enumerate() {
            buf[i] = Complex::new(v, 0.0);
        }
        fft.process(&mut buf);
        input_spectra.push(buf);
    }

    let scale = 1.0 / fft_size as f64;
    let mut output = Array2::<f64>::zeros((p, t));
    let mut response_buf = vec![Complex::new(0.0, 0.0); fft_size];
    let mut accumulator = vec![Complex::new(0.0, 0.0); fft_size];

    for row in 0..p {
        accumulator.fill(Complex::new(0.0, 0.0));
        for channel in 0..m {
            response_buf.fill(Complex::new(0.0, 0.0));
            for (i, &v) in responses[channel].row(row).iter().enumerate() {
                response_buf[i] = Complex::new(v, 0.0);
            }
            fft.process(&mut response_buf);
            for (acc, (h, u)) in accumulator
                .iter_mut()
                .zip(response_buf.iter().zip(&input_spectra[channel]))
            {
                *acc += h * u;
            }
        }
        ifft.process(&mut accumulator);
        for i in 0..t {
            output[[row, i]] = accumulator[i].re * scale;
        }
    }

    Ok(Signal::new(output, sampling_rate))
}
