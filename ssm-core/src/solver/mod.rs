//! Interchangeable recursion backends
//!
//! Every backend executes the same per-step recursion in lockstep, for every
//! sample index i:
//!
//! ```text
//! y[:, i] = C·x + D·u[:, i]
//! x       = A·x + B·u[:, i]
//! ```
//!
//! The output at step i is computed from the state before the update, then
//! the state is advanced. Backends differ only in how the matrix-vector
//! products are carried out, and must agree with each other up to
//! floating-point rounding.

pub(crate) mod blas;
pub(crate) mod compiled;
pub(crate) mod reference;

use crate::error::SsmError;
use crate::model::{to_layout, Element, Layout, Realization};
use ndarray::{Array1, Array2, CowArray, Ix2};
use std::fmt;
use std::str::FromStr;

/// Solver backend selection. Stateless; bound to a model at processing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Naive dot products; slowest, establishes correctness.
    Reference,
    /// Layout-specialized contiguous loops; primary performance path.
    #[default]
    Compiled,
    /// gemv-style library calls with fused scale/accumulate.
    Blas,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Reference => "reference",
            Backend::Compiled => "compiled",
            Backend::Blas => "blas",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = SsmError;

    fn from_str(s: &str) -> Result<Self, SsmError> {
        match s {
            "reference" => Ok(Backend::Reference),
            "compiled" => Ok(Backend::Compiled),
            "blas" => Ok(Backend::Blas),
            other => Err(SsmError::UnsupportedBackend(other.to_string())),
        }
    }
}

/// Dispatch one whole-sequence run to the selected kernel.
///
/// `output` is pre-sized `(n_outputs, n_samples)` in the model's layout and
/// written in place; `state` is updated in place so subsequent calls continue
/// the same trajectory.
pub(crate) fn run<T: Element>(
    backend: Backend,
    layout: Layout,
    realization: &Realization<T>,
    state: &mut Array1<T>,
    input: &Array2<T>,
    output: &mut Array2<T>,
) {
    match backend {
        Backend::Reference => reference::run(realization, state, input.view(), output),
        Backend::Compiled => {
            let adapted = adapt_layout(input, layout);
            compiled::run(realization, state, adapted.view(), output, layout);
        }
        Backend::Blas => blas::run(realization, state, input.view(), output),
    }
}

/// Borrow the input when its storage order already matches the model's
/// layout; copy into that order only on mismatch.
fn adapt_layout<'a, T: Element>(input: &'a Array2<T>, layout: Layout) -> CowArray<'a, T, Ix2> {
    let matches = match layout {
        Layout::RowMajor => input.is_standard_layout(),
        Layout::ColMajor => input.t().is_standard_layout(),
    };
    if matches {
        CowArray::from(input.view())
    } else {
        CowArray::from(to_layout(input.clone(), layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dtype, ModelConfig, StateSpaceModel, Vector};
    use crate::signal::Signal;
    use crate::testing::{isclose, output_norm, random_realization};
    use ndarray::Array2;

    const BACKENDS: [Backend; 3] = [Backend::Reference, Backend::Compiled, Backend::Blas];
    const LAYOUTS: [Layout; 2] = [Layout::RowMajor, Layout::ColMajor];

    /// A = 0.8·I (5×5), B = ones (5×2), C = ones (3×5), D = 0.
    fn impulse_decay_model(dtype: Dtype, layout: Layout) -> StateSpaceModel {
        let a = Array2::<f64>::eye(5) * 0.8;
        let b = Array2::<f64>::ones((5, 2));
        let c = Array2::<f64>::ones((3, 5));
        let config = ModelConfig {
            sampling_rate: 1.0,
            dtype: Some(dtype),
            layout,
        };
        StateSpaceModel::new(a, b, c, None, config).unwrap()
    }

    fn random_model(
        n: usize,
        m: usize,
        p: usize,
        dtype: Dtype,
        layout: Layout,
        seed: u64,
    ) -> StateSpaceModel {
        let (a, b, c) = random_realization(n, m, p, seed);
        let config = ModelConfig {
            sampling_rate: 1.0,
            dtype: Some(dtype),
            layout,
        };
        StateSpaceModel::new(a, b, c, None, config).unwrap()
    }

    fn random_signal(m: usize, t: usize, dtype: Dtype, seed: u64) -> Signal {
        Signal::new(crate::testing::random_samples(m, t, seed), 1.0).cast(dtype)
    }

    #[test]
    fn test_impulse_trajectory_all_backends() {
        // Unit impulse on channel 0: y[:,0] = 0, then 5, 4, 3.2 on every row.
        let expected = [0.0, 5.0, 4.0, 3.2];
        for layout in LAYOUTS {
            for backend in BACKENDS {
                let mut model = impulse_decay_model(Dtype::F64, layout);
                model.initialize_state();
                let input = Signal::impulse(2, 0, 4, Dtype::F64, 1.0);
                let output = model.process_with(&input, backend).unwrap();
                let y = output.samples_f64().unwrap();
                assert_eq!(y.dim(), (3, 4));
                for row in 0..3 {
                    for (i, &want) in expected.iter().enumerate() {
                        assert!(
                            (y[[row, i]] - want).abs() < 1e-12,
                            "{backend} {layout}: y[{row}, {i}] = {}, want {want}",
                            y[[row, i]]
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_impulse_trajectory_single_precision() {
        let expected = [0.0_f32, 5.0, 4.0, 3.2];
        for layout in LAYOUTS {
            for backend in BACKENDS {
                let mut model = impulse_decay_model(Dtype::F32, layout);
                model.initialize_state();
                let input = Signal::impulse(2, 0, 4, Dtype::F32, 1.0);
                let output = model.process_with(&input, backend).unwrap();
                let y = output.samples_f32().unwrap();
                for row in 0..3 {
                    for (i, &want) in expected.iter().enumerate() {
                        assert!(isclose(y[[row, i]], want, 0.0, 1e-4));
                    }
                }
            }
        }
    }

    #[test]
    fn test_backend_equivalence() {
        let (n, m, p, t) = (6, 2, 3, 64);
        for layout in LAYOUTS {
            let signal = random_signal(m, t, Dtype::F64, 1);

            let mut reference = random_model(n, m, p, Dtype::F64, layout, 0);
            reference.initialize_state_with(vec![0.1; n]).unwrap();
            let want = reference
                .process_with(&signal, Backend::Reference)
                .unwrap()
                .to_f64();
            let tol = 1e-5 * output_norm(&want).max(1.0);

            for backend in [Backend::Compiled, Backend::Blas] {
                let mut model = random_model(n, m, p, Dtype::F64, layout, 0);
                model.initialize_state_with(vec![0.1; n]).unwrap();
                let got = model.process_with(&signal, backend).unwrap().to_f64();
                let err = output_norm(&(&got - &want));
                assert!(err <= tol, "{backend} {layout}: error {err} > {tol}");
            }
        }
    }

    #[test]
    fn test_backend_equivalence_single_precision() {
        let (n, m, p, t) = (6, 2, 3, 64);
        for layout in LAYOUTS {
            let signal = random_signal(m, t, Dtype::F32, 1);

            let mut reference = random_model(n, m, p, Dtype::F32, layout, 0);
            reference.initialize_state();
            let want = reference
                .process_with(&signal, Backend::Reference)
                .unwrap()
                .to_f64();
            let tol = 1e-3 * output_norm(&want).max(1.0);

            for backend in [Backend::Compiled, Backend::Blas] {
                let mut model = random_model(n, m, p, Dtype::F32, layout, 0);
                model.initialize_state();
                let got = model.process_with(&signal, backend).unwrap().to_f64();
                let err = output_norm(&(&got - &want));
                assert!(err <= tol, "{backend} {layout}: error {err} > {tol}");
            }
        }
    }

    #[test]
    fn test_streaming_continuity() {
        let (n, m, p, t) = (5, 2, 2, 48);
        let signal = random_signal(m, t, Dtype::F64, 7);
        let full = signal.samples_f64().unwrap();
        let head = Signal::new(full.slice(ndarray::s![.., ..20]).to_owned(), 1.0);
        let tail = Signal::new(full.slice(ndarray::s![.., 20..]).to_owned(), 1.0);

        for backend in BACKENDS {
            let mut one_pass = random_model(n, m, p, Dtype::F64, Layout::ColMajor, 3);
            one_pass.initialize_state();
            let want = one_pass.process_with(&signal, backend).unwrap();

            let mut chunked = random_model(n, m, p, Dtype::F64, Layout::ColMajor, 3);
            chunked.initialize_state();
            let first = chunked.process_with(&head, backend).unwrap();
            let second = chunked.process_with(&tail, backend).unwrap();

            let want = want.to_f64();
            let got = ndarray::concatenate(
                ndarray::Axis(1),
                &[first.to_f64().view(), second.to_f64().view()],
            )
            .unwrap();
            let err = output_norm(&(&got - &want));
            assert!(err <= 1e-12 * output_norm(&want).max(1.0), "{backend}: {err}");
            assert_eq!(one_pass.state().unwrap(), chunked.state().unwrap());
        }
    }

    #[test]
    fn test_channel_mismatch_leaves_state_unchanged() {
        let mut model = impulse_decay_model(Dtype::F64, Layout::ColMajor);
        model.initialize_state_with(vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let before = model.state().unwrap();

        // B has 2 columns; feed 3 channels.
        let signal = Signal::zeros(3, 8, Dtype::F64, 1.0);
        let err = model.process(&signal).unwrap_err();
        assert_eq!(
            err,
            SsmError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        );
        assert_eq!(model.state().unwrap(), before);
    }

    #[test]
    fn test_mixed_precision_rejected() {
        let mut model = impulse_decay_model(Dtype::F64, Layout::ColMajor);
        model.initialize_state();
        let before = model.state().unwrap();

        let signal = Signal::zeros(2, 8, Dtype::F32, 1.0);
        let err = model.process(&signal).unwrap_err();
        assert_eq!(
            err,
            SsmError::DtypeMismatch {
                expected: Dtype::F64,
                found: Dtype::F32
            }
        );
        assert_eq!(model.state().unwrap(), before);
    }

    #[test]
    fn test_process_before_initialization() {
        let mut model = impulse_decay_model(Dtype::F64, Layout::ColMajor);
        let signal = Signal::zeros(2, 8, Dtype::F64, 1.0);
        assert_eq!(model.process(&signal).unwrap_err(), SsmError::NotInitialized);
    }

    #[test]
    fn test_backend_names() {
        assert_eq!("reference".parse::<Backend>().unwrap(), Backend::Reference);
        assert_eq!("compiled".parse::<Backend>().unwrap(), Backend::Compiled);
        assert_eq!("blas".parse::<Backend>().unwrap(), Backend::Blas);
        assert!(matches!(
            "simd".parse::<Backend>(),
            Err(SsmError::UnsupportedBackend(_))
        ));
    }

    #[test]
    fn test_empty_signal() {
        let mut model = impulse_decay_model(Dtype::F64, Layout::ColMajor);
        model.initialize_state();
        let signal = Signal::zeros(2, 0, Dtype::F64, 1.0);
        let output = model.process(&signal).unwrap();
        assert_eq!(output.n_samples(), 0);
        assert_eq!(output.n_channels(), 3);
    }

    #[test]
    fn test_initial_state_feeds_first_output() {
        // With x0 = [1, 1, 1, 1, 1] and zero input, y[:,0] = C·x0 = 5.
        let mut model = impulse_decay_model(Dtype::F64, Layout::RowMajor);
        model
            .initialize_state_with(Vector::from(vec![1.0; 5]))
            .unwrap();
        let signal = Signal::zeros(2, 2, Dtype::F64, 1.0);
        let output = model.process(&signal).unwrap();
        let y = output.samples_f64().unwrap();
        assert!((y[[0, 0]] - 5.0).abs() < 1e-12);
        assert!((y[[0, 1]] - 4.0).abs() < 1e-12);
    }
}
