//! Priority decoder exposed as a scalar objective for external search.

use rand::Rng;

use crate::model::Instance;

use super::engine::PriorityDecoder;
use super::err::MalformedInput;

/// Objective over real-valued priority vectors. Lower is better.
///
/// This is the only contract a population-based search needs: draw or
/// mutate vectors of length [`dimension`](Self::dimension) and score
/// them with [`evaluate`](Self::evaluate). Implementations must be pure,
/// so one value can be shared across worker threads.
///
/// # Examples
///
/// ```
/// use u_fjsp::decoder::{MakespanEvaluator, PriorityObjective};
/// use u_fjsp::model::{InstanceBuilder, OperationSpec};
///
/// let instance = InstanceBuilder::new()
///     .add_job("a", vec![OperationSpec::new(&[1, 2], &[], 2)])
///     .add_job("b", vec![OperationSpec::new(&[1], &[], 3)])
///     .build()
///     .unwrap();
/// let evaluator = MakespanEvaluator::new(&instance);
///
/// let mut rng = rand::rng();
/// let keys = evaluator.random_priorities(&mut rng);
/// assert_eq!(keys.len(), evaluator.dimension());
/// assert!(evaluator.evaluate(&keys).unwrap() >= 3.0);
/// ```
pub trait PriorityObjective: Send + Sync {
    /// Required length of every priority vector.
    fn dimension(&self) -> usize;

    /// Scores one priority vector.
    fn evaluate(&self, priorities: &[f64]) -> Result<f64, MalformedInput>;

    /// Uniform keys in `[0, 1)`, one per dimension.
    fn random_priorities<R: Rng>(&self, rng: &mut R) -> Vec<f64>
    where
        Self: Sized,
    {
        (0..self.dimension()).map(|_| rng.random::<f64>()).collect()
    }
}

/// Makespan of the greedy decoding, as an objective.
#[derive(Debug, Clone)]
pub struct MakespanEvaluator {
    decoder: PriorityDecoder,
}

impl MakespanEvaluator {
    pub fn new(instance: &Instance) -> Self {
        Self {
            decoder: PriorityDecoder::from_instance(instance),
        }
    }

    #[inline]
    pub fn decoder(&self) -> &PriorityDecoder {
        &self.decoder
    }

    /// Makespan as an integer.
    #[inline]
    pub fn makespan(&self, priorities: &[f64]) -> Result<i64, MalformedInput> {
        self.decoder.makespan(priorities)
    }

    /// Scores many vectors; results keep the input order.
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate_batch(&self, batch: &[Vec<f64>]) -> Vec<Result<i64, MalformedInput>> {
        batch.iter().map(|p| self.makespan(p)).collect()
    }

    /// Scores many vectors in parallel; results keep the input order.
    #[cfg(feature = "parallel")]
    pub fn evaluate_batch(&self, batch: &[Vec<f64>]) -> Vec<Result<i64, MalformedInput>> {
        use rayon::prelude::*;
        batch.par_iter().map(|p| self.makespan(p)).collect()
    }
}

impl From<PriorityDecoder> for MakespanEvaluator {
    fn from(decoder: PriorityDecoder) -> Self {
        Self { decoder }
    }
}

impl PriorityObjective for MakespanEvaluator {
    #[inline]
    fn dimension(&self) -> usize {
        self.decoder.dimension()
    }

    fn evaluate(&self, priorities: &[f64]) -> Result<f64, MalformedInput> {
        self.makespan(priorities).map(|m| m as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstanceBuilder, OperationSpec};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn instance() -> Instance {
        InstanceBuilder::new()
            .add_job(
                "job_1",
                vec![OperationSpec::new(&[1, 2], &[], 3), OperationSpec::new(&[2], &[], 2)],
            )
            .add_job(
                "job_2",
                vec![OperationSpec::new(&[1], &[], 2), OperationSpec::new(&[1, 2], &[], 4)],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_evaluate_matches_decoder() {
        let evaluator = MakespanEvaluator::new(&instance());
        let p = [0.4, 0.1, 0.3, 0.2];
        let schedule = evaluator.decoder().decode(&p).unwrap();
        assert_eq!(evaluator.evaluate(&p).unwrap(), schedule.makespan() as f64);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let evaluator = MakespanEvaluator::new(&instance());
        let a = [0.9, -3.0, 1e9, 0.0];
        let b = [0.0, 0.1, 0.2, 0.3];
        let first = evaluator.evaluate(&a).unwrap();
        evaluator.evaluate(&b).unwrap();
        assert_eq!(evaluator.evaluate(&a).unwrap(), first);
    }

    #[test]
    fn test_wrong_length() {
        let evaluator = MakespanEvaluator::new(&instance());
        let err = evaluator.evaluate(&[0.1, 0.2]).unwrap_err();
        assert_eq!(err, MalformedInput { expected: 4, actual: 2 });
        assert_eq!(err.to_string(), "priority vector has length 2, expected 4");
    }

    #[test]
    fn test_random_priorities() {
        let evaluator = MakespanEvaluator::new(&instance());
        let mut rng = StdRng::seed_from_u64(42);
        let keys = evaluator.random_priorities(&mut rng);
        assert_eq!(keys.len(), 4);
        assert!(keys.iter().all(|k| (0.0..1.0).contains(k)));
        assert!(evaluator.evaluate(&keys).is_ok());
    }

    #[test]
    fn test_evaluate_batch_keeps_order() {
        let evaluator = MakespanEvaluator::new(&instance());
        let mut rng = StdRng::seed_from_u64(7);
        let mut batch: Vec<Vec<f64>> = (0..16).map(|_| evaluator.random_priorities(&mut rng)).collect();
        batch.push(vec![0.5]);

        let results = evaluator.evaluate_batch(&batch);
        assert_eq!(results.len(), batch.len());
        for (p, r) in batch.iter().zip(&results) {
            assert_eq!(r, &evaluator.makespan(p));
        }
        assert!(results[16].is_err());
    }

    #[test]
    fn test_shared_across_threads() {
        let evaluator = MakespanEvaluator::new(&instance());
        let p = vec![0.3, 0.2, 0.1, 0.0];
        let expected = evaluator.makespan(&p).unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert_eq!(evaluator.makespan(&p).unwrap(), expected));
            }
        });
    }
}
