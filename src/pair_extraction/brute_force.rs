use super::{IntersectionStrategy, PairProcessor, validate_epsilon};
use crate::error::CoreResult;
use crate::primitive::HyperSphere;

/// Reference pair extraction testing every point against every primitive.
///
/// Unlike [`IntersectionFunctor`](super::IntersectionFunctor) the epsilon is
/// used as given and every `(i, j)` combination is reported, including `i <= j`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForceFunctor;

impl<const D: usize> IntersectionStrategy<D> for BruteForceFunctor {
    fn process<P: PairProcessor>(
        &self,
        primitives: &[HyperSphere<D>],
        points: &[[f64; D]],
        epsilon: f64,
        _min_node_size: usize,
        processor: &mut P,
    ) -> CoreResult<f64> {
        validate_epsilon(epsilon)?;
        for (j, q) in points.iter().enumerate() {
            for (i, m) in primitives.iter().enumerate() {
                if m.intersect_point(q, epsilon) {
                    processor.process(i, j);
                }
            }
        }
        Ok(epsilon)
    }
}
