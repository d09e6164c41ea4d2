//! Discrete-time state-space model
//!
//! Owns a realization (A, B, C, D), validates it once at construction, and
//! carries the persistent state vector between processing calls so long
//! signals can be fed in chunks with continuity.

use super::dtype::{Dtype, Layout};
use super::element::Element;
use super::matrix::{zeros_with_layout, Matrix, Vector};
use crate::error::{Result, SsmError};
use crate::signal::Signal;
use crate::solver::{self, Backend};
use ndarray::{Array1, Array2};

/// Model construction options.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Sampling rate in Hz, carried into impulse responses.
    pub sampling_rate: f64,

    /// Element type of the realization. `None` promotes to the widest type
    /// among the supplied matrices.
    pub dtype: Option<Dtype>,

    /// Storage order of the matrices, chosen to match the access pattern of
    /// the intended solver.
    pub layout: Layout,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 48_000.0,
            dtype: None,
            layout: Layout::ColMajor,
        }
    }
}

/// The matrix quadruple in its canonical internal representation: one element
/// type, one storage order, immutable once constructed.
#[derive(Debug, Clone)]
pub(crate) struct Realization<T> {
    pub a: Array2<T>,
    pub b: Array2<T>,
    pub c: Array2<T>,
    pub d: Array2<T>,
}

impl<T: Element> Realization<T> {
    pub fn n_states(&self) -> usize {
        self.a.nrows()
    }

    pub fn n_inputs(&self) -> usize {
        self.b.ncols()
    }

    pub fn n_outputs(&self) -> usize {
        self.c.nrows()
    }

    /// Response to a unit impulse on each input channel in turn, from a zero
    /// state. One `(n_outputs, n_samples)` buffer per input channel.
    pub fn impulse_response(&self, n_samples: usize, layout: Layout) -> Vec<Array2<T>> {
        let m = self.n_inputs();
        let p = self.n_outputs();
        (0..m)
            .map(|channel| {
                let mut state = Array1::zeros(self.n_states());
                let mut input = Array2::zeros((m, n_samples));
                if n_samples > 0 {
                    input[[channel, 0]] = T::one();
                }
                let mut output = zeros_with_layout((p, n_samples), layout);
                crate::solver::reference::run(self, &mut state, input.view(), &mut output);
                output
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Inner<T> {
    realization: Realization<T>,
    state: Option<Array1<T>>,
}

impl<T: Element> Inner<T> {
    fn from_matrices(
        a: &Matrix,
        b: &Matrix,
        c: &Matrix,
        d: Option<&Matrix>,
        d_shape: (usize, usize),
        layout: Layout,
    ) -> Self {
        let d = match d {
            Some(d) => T::cast_matrix(d, layout),
            None => zeros_with_layout(d_shape, layout),
        };
        Self {
            realization: Realization {
                a: T::cast_matrix(a, layout),
                b: T::cast_matrix(b, layout),
                c: T::cast_matrix(c, layout),
                d,
            },
            state: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Repr {
    F32(Inner<f32>),
    F64(Inner<f64>),
}

/// A discrete-time LTI system realization with persistent state.
///
/// Construction validates shapes and normalizes element type and layout in
/// one pass; the quadruple is immutable afterwards. The state vector must be
/// initialized explicitly before processing and is updated in place by each
/// call, so successive calls continue the same trajectory.
#[derive(Debug, Clone)]
pub struct StateSpaceModel {
    repr: Repr,
    dtype: Dtype,
    layout: Layout,
    sampling_rate: f64,
}

impl StateSpaceModel {
    /// Build a model from a realization.
    ///
    /// # Arguments
    /// * `a` - State transition, n×n
    /// * `b` - Input-to-state, n×m
    /// * `c` - State-to-output, p×n
    /// * `d` - Feedthrough, p×m; `None` means the zero matrix
    /// * `config` - Sampling rate, element type, and layout policy
    pub fn new(
        a: impl Into<Matrix>,
        b: impl Into<Matrix>,
        c: impl Into<Matrix>,
        d: Option<Matrix>,
        config: ModelConfig,
    ) -> Result<Self> {
        let (a, b, c) = (a.into(), b.into(), c.into());

        let (ar, ac) = a.shape();
        if ar != ac {
            return Err(SsmError::ShapeMismatch {
                name: "A",
                expected: format!("({ar}, {ar})"),
                found: format!("({ar}, {ac})"),
            });
        }
        let n = ar;

        let (br, m) = b.shape();
        if br != n {
            return Err(SsmError::ShapeMismatch {
                name: "B",
                expected: format!("({n}, {m})"),
                found: format!("({br}, {m})"),
            });
        }

        let (p, cc) = c.shape();
        if cc != n {
            return Err(SsmError::ShapeMismatch {
                name: "C",
                expected: format!("({p}, {n})"),
                found: format!("({p}, {cc})"),
            });
        }

        if let Some(d) = &d {
            if d.shape() != (p, m) {
                let (dr, dc) = d.shape();
                return Err(SsmError::ShapeMismatch {
                    name: "D",
                    expected: format!("({p}, {m})"),
                    found: format!("({dr}, {dc})"),
                });
            }
        }

        let dtype = config.dtype.unwrap_or_else(|| {
            let mut dtype = a.dtype().promote(b.dtype()).promote(c.dtype());
            if let Some(d) = &d {
                dtype = dtype.promote(d.dtype());
            }
            dtype
        });

        let repr = match dtype {
            Dtype::F32 => Repr::F32(Inner::from_matrices(
                &a,
                &b,
                &c,
                d.as_ref(),
                (p, m),
                config.layout,
            )),
            Dtype::F64 => Repr::F64(Inner::from_matrices(
                &a,
                &b,
                &c,
                d.as_ref(),
                (p, m),
                config.layout,
            )),
        };

        Ok(Self {
            repr,
            dtype,
            layout: config.layout,
            sampling_rate: config.sampling_rate,
        })
    }

    /// State dimension n.
    pub fn n_states(&self) -> usize {
        match &self.repr {
            Repr::F32(inner) => inner.realization.n_states(),
            Repr::F64(inner) => inner.realization.n_states(),
        }
    }

    /// Input channel count m.
    pub fn n_inputs(&self) -> usize {
        match &self.repr {
            Repr::F32(inner) => inner.realization.n_inputs(),
            Repr::F64(inner) => inner.realization.n_inputs(),
        }
    }

    /// Output channel count p.
    pub fn n_outputs(&self) -> usize {
        match &self.repr {
            Repr::F32(inner) => inner.realization.n_outputs(),
            Repr::F64(inner) => inner.realization.n_outputs(),
        }
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Owned copies of (A, B, C, D).
    pub fn matrices(&self) -> (Matrix, Matrix, Matrix, Matrix) {
        match &self.repr {
            Repr::F32(inner) => {
                let r = &inner.realization;
                (
                    Matrix::from(r.a.clone()),
                    Matrix::from(r.b.clone()),
                    Matrix::from(r.c.clone()),
                    Matrix::from(r.d.clone()),
                )
            }
            Repr::F64(inner) => {
                let r = &inner.realization;
                (
                    Matrix::from(r.a.clone()),
                    Matrix::from(r.b.clone()),
                    Matrix::from(r.c.clone()),
                    Matrix::from(r.d.clone()),
                )
            }
        }
    }

    /// Derive a new model from this one's quadruple under a different
    /// configuration. Runs the full shape/dtype validation again; the new
    /// model starts without a state vector.
    pub fn reconfigure(&self, config: ModelConfig) -> Result<StateSpaceModel> {
        let (a, b, c, d) = self.matrices();
        StateSpaceModel::new(a, b, c, Some(d), config)
    }

    /// Set the state vector to zero. Any previous state is discarded.
    pub fn initialize_state(&mut self) {
        match &mut self.repr {
            Repr::F32(inner) => {
                inner.state = Some(Array1::zeros(inner.realization.n_states()));
            }
            Repr::F64(inner) => {
                inner.state = Some(Array1::zeros(inner.realization.n_states()));
            }
        }
    }

    /// Set the state vector to `value`, converted to the model's element
    /// type. Any previous state is discarded.
    pub fn initialize_state_with(&mut self, value: impl Into<Vector>) -> Result<()> {
        let value = value.into();
        let n = self.n_states();
        if value.len() != n {
            return Err(SsmError::ShapeMismatch {
                name: "state",
                expected: format!("({n},)"),
                found: format!("({},)", value.len()),
            });
        }
        match &mut self.repr {
            Repr::F32(inner) => inner.state = Some(<f32 as Element>::cast_vector(&value)),
            Repr::F64(inner) => inner.state = Some(<f64 as Element>::cast_vector(&value)),
        }
        Ok(())
    }

    /// Current state vector.
    pub fn state(&self) -> Result<Vector> {
        match &self.repr {
            Repr::F32(inner) => inner
                .state
                .as_ref()
                .map(|s| Vector::from(s.clone()))
                .ok_or(SsmError::NotInitialized),
            Repr::F64(inner) => inner
                .state
                .as_ref()
                .map(|s| Vector::from(s.clone()))
                .ok_or(SsmError::NotInitialized),
        }
    }

    /// Response to a unit impulse on each input channel in turn, starting
    /// from a zero state. Returns one signal of `n_outputs` channels per
    /// input channel. The model's own state is not touched.
    pub fn impulse_response(&self, n_samples: usize) -> Vec<Signal> {
        match &self.repr {
            Repr::F32(inner) => inner
                .realization
                .impulse_response(n_samples, self.layout)
                .into_iter()
                .map(|out| Signal::new(out, self.sampling_rate))
                .collect(),
            Repr::F64(inner) => inner
                .realization
                .impulse_response(n_samples, self.layout)
                .into_iter()
                .map(|out| Signal::new(out, self.sampling_rate))
                .collect(),
        }
    }

    /// Process a signal with the default solver backend.
    pub fn process(&mut self, signal: &Signal) -> Result<Signal> {
        self.process_with(signal, Backend::default())
    }

    /// Process a signal with a specific solver backend.
    ///
    /// The output at step i is computed from the state before the update,
    /// then the state is advanced; the final state is kept so the next call
    /// continues the same trajectory. All failures are detected before the
    /// recursion starts and leave the state unchanged.
    pub fn process_with(&mut self, signal: &Signal, backend: Backend) -> Result<Signal> {
        let m = self.n_inputs();
        if signal.n_channels() != m {
            return Err(SsmError::DimensionMismatch {
                expected: m,
                found: signal.n_channels(),
            });
        }
        if signal.dtype() != self.dtype {
            return Err(SsmError::DtypeMismatch {
                expected: self.dtype,
                found: signal.dtype(),
            });
        }
        let layout = self.layout;
        match &mut self.repr {
            Repr::F32(inner) => process_inner(inner, layout, signal, backend),
            Repr::F64(inner) => process_inner(inner, layout, signal, backend),
        }
    }
}

fn process_inner<T: Element>(
    inner: &mut Inner<T>,
    layout: Layout,
    signal: &Signal,
    backend: Backend,
) -> Result<Signal> {
    let input = T::samples(signal.data()).ok_or(SsmError::DtypeMismatch {
        expected: T::DTYPE,
        found: signal.dtype(),
    })?;
    let state = inner.state.as_mut().ok_or(SsmError::NotInitialized)?;

    let p = inner.realization.n_outputs();
    let mut output = zeros_with_layout::<T>((p, signal.n_samples()), layout);
    solver::run(backend, layout, &inner.realization, state, input, &mut output);

    Ok(Signal::new(T::samples_from(output), signal.sampling_rate()))
}
