use crate::error::{CoreError, CoreResult};
use crate::primitive::HyperSphere;

pub mod brute_force;
pub mod intersection;
pub mod nd_node;

/// Receives the `(primitive, point)` index pairs found by an [`IntersectionStrategy`].
///
/// `begin_primitive_collect` / `end_primitive_collect` bracket the pairs reported
/// for a primitive when the strategy visits primitives one after the other.
pub trait PairProcessor {
    fn begin_primitive_collect(&mut self, _primitive: usize) {}

    /// Called once for each primitive `i` whose shell contains point `j`.
    fn process(&mut self, i: usize, j: usize);

    fn end_primitive_collect(&mut self, _primitive: usize) {}
}

/// Collects every reported pair as is.
impl PairProcessor for Vec<(usize, usize)> {
    fn process(&mut self, i: usize, j: usize) {
        self.push((i, j));
    }
}

/// Trait defining a pair extraction strategy.
/// This allows swapping the recursive subdivision for a plain brute force scan.
pub trait IntersectionStrategy<const D: usize>: Send + Sync {
    /// Reports to `processor` the pairs `(i, j)` such that point `j` of `points`
    /// lies within `epsilon` of the surface of primitive `i` of `primitives`.
    ///
    /// Points are expected in the unit hypercube. Returns the epsilon that was
    /// effectively used, which may be a quantised version of the input.
    fn process<P: PairProcessor>(
        &self,
        primitives: &[HyperSphere<D>],
        points: &[[f64; D]],
        epsilon: f64,
        min_node_size: usize,
        processor: &mut P,
    ) -> CoreResult<f64>;
}

pub(crate) fn validate_epsilon(epsilon: f64) -> CoreResult<()> {
    if epsilon.is_finite() && epsilon > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidConfiguration(format!(
            "epsilon must be finite and positive, got {}",
            epsilon
        )))
    }
}

pub use brute_force::BruteForceFunctor;
pub use intersection::IntersectionFunctor;
pub use nd_node::NdNode;
