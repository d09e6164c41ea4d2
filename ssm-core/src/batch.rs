//! Concurrent processing of independent model/signal pairs
//!
//! The recursion itself is strictly sequential (step i+1 depends on step i),
//! so parallelism lives across jobs: each model owns its state vector
//! exclusively, and distinct pairs share nothing mutable.

use crate::error::Result;
use crate::model::StateSpaceModel;
use crate::signal::Signal;
use crate::solver::Backend;

/// Process each (model, signal) pair on its own worker thread.
///
/// States are updated in place per model, exactly as with sequential calls,
/// and results are returned in job order.
pub fn process_batch(
    jobs: &mut [(StateSpaceModel, Signal)],
    backend: Backend,
) -> Vec<Result<Signal>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .iter_mut()
            .map(|(model, signal)| scope.spawn(move || model.process_with(signal, backend)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker thread panicked"))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dtype, Layout, ModelConfig};
    use crate::testing::{output_norm, random_realization, random_samples};

    #[test]
    fn test_batch_matches_sequential() {
        let (n, m, p, t) = (5, 2, 3, 32);
        let make_job = |seed: u64| {
            let (a, b, c) = random_realization(n, m, p, seed);
            let config = ModelConfig {
                sampling_rate: 1.0,
                dtype: Some(Dtype::F64),
                layout: Layout::ColMajor,
            };
            let mut model = StateSpaceModel::new(a, b, c, None, config).unwrap();
            model.initialize_state();
            let signal = Signal::new(random_samples(m, t, seed + 100), 1.0);
            (model, signal)
        };

        let mut sequential: Vec<_> = (0..4).map(make_job).collect();
        let mut batched: Vec<_> = (0..4).map(make_job).collect();

        let want: Vec<_> = sequential
            .iter_mut()
            .map(|(model, signal)| model.process(signal).unwrap())
            .collect();
        let got = process_batch(&mut batched, Backend::default());

        for (want, got) in want.iter().zip(&got) {
            let got = got.as_ref().unwrap();
            let err = output_norm(&(&got.to_f64() - &want.to_f64()));
            assert!(err == 0.0, "batched output diverged: {err}");
        }
        for ((seq_model, _), (batch_model, _)) in sequential.iter().zip(&batched) {
            assert_eq!(seq_model.state().unwrap(), batch_model.state().unwrap());
        }
    }

    #[test]
    fn test_batch_reports_per_job_errors() {
        let (a, b, c) = random_realization(4, 2, 2, 0);
        let mut model = StateSpaceModel::new(a, b, c, None, ModelConfig::default()).unwrap();
        model.initialize_state();
        // Second job left uninitialized.
        let (a, b, c) = random_realization(4, 2, 2, 1);
        let uninitialized = StateSpaceModel::new(a, b, c, None, ModelConfig::default()).unwrap();

        let signal = Signal::new(random_samples(2, 16, 2), 48_000.0);
        let mut jobs = vec![(model, signal.clone()), (uninitialized, signal)];
        let results = process_batch(&mut jobs, Backend::Compiled);

        assert!(results[0].is_ok());
        assert_eq!(
            results[1].clone().unwrap_err(),
            crate::error::SsmError::NotInitialized
        );
    }
}
